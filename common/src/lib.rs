// Common library for the compliance automation service: query builder, evidence cleanup, and shared plumbing

pub mod automation;
pub mod config;
pub mod db;
pub mod errors;
pub mod evidence;
pub mod models;
pub mod query_builder;
pub mod substitution;
pub mod telemetry;
