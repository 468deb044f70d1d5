// Database layer module

pub mod pool;
pub mod preview;

pub use pool::DbPool;
pub use preview::{prepare_preview_sql, validate_application_id, PreviewExecutor, QueryRunner};
