// Configuration management with layered configuration (file, env)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub preview: PreviewConfig,
    pub evidence: EvidenceConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
}

/// Limits applied when running automation SQL for preview or evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Rows returned to the authoring UI
    pub row_limit: u32,
    /// Upper bound on rows read when evaluating an automation
    pub evaluation_row_limit: u32,
    pub statement_timeout_seconds: u64,
}

/// Display names substituted into SOC evidence narratives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceConfig {
    /// Replaces the "Framework A" placeholder
    pub master_framework_name: String,
    /// Replaces the "Framework B" placeholder
    pub secondary_report_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub tracing_endpoint: Option<String>,
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }

        if self.database.url.is_empty() {
            return Err("Database URL cannot be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.database.min_connections > self.database.max_connections {
            return Err("Database min_connections cannot exceed max_connections".to_string());
        }

        if self.preview.row_limit == 0 {
            return Err("Preview row_limit must be greater than 0".to_string());
        }
        if self.preview.evaluation_row_limit < self.preview.row_limit {
            return Err("Preview evaluation_row_limit cannot be below row_limit".to_string());
        }
        if self.preview.statement_timeout_seconds == 0 {
            return Err("Preview statement_timeout_seconds must be greater than 0".to_string());
        }

        if self.evidence.master_framework_name.trim().is_empty() {
            return Err("Evidence master_framework_name cannot be empty".to_string());
        }
        if self.evidence.secondary_report_name.trim().is_empty() {
            return Err("Evidence secondary_report_name cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/compliance".to_string(),
                max_connections: 10,
                min_connections: 2,
                connect_timeout_seconds: 30,
            },
            preview: PreviewConfig {
                row_limit: 100,
                evaluation_row_limit: 10_000,
                statement_timeout_seconds: 15,
            },
            evidence: EvidenceConfig {
                master_framework_name: "Master Control Framework".to_string(),
                secondary_report_name: "SOC 2 Type II".to_string(),
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                tracing_endpoint: None,
            },
        }
    }
}
