// Automation query builder
// Structured SELECT state edited by the automation authoring UI, compiled one way to SQL text

pub mod sql;
pub mod state;

pub use sql::generate;
pub use state::{
    Aggregate, Condition, JoinClause, JoinType, Logic, Operator, OrderByColumn, QueryBuilderState,
    SelectColumn, SortDirection,
};

/// Column every automation query must return so results can be matched to applications
pub const APPLICATION_ID_COLUMN: &str = "application_id";
