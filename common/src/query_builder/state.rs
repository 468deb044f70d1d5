// Query builder state
// One instance per authoring session; only the generated SQL text outlives it

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::APPLICATION_ID_COLUMN;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Join flavour emitted before `JOIN`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinType {
    Inner,
    Left,
    Right,
}

impl JoinType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
        }
    }
}

/// Aggregate functions offered by the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Aggregate {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    BoolAnd,
    BoolOr,
    StringAgg,
}

impl Aggregate {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Aggregate::Count => "COUNT",
            Aggregate::Sum => "SUM",
            Aggregate::Avg => "AVG",
            Aggregate::Min => "MIN",
            Aggregate::Max => "MAX",
            Aggregate::BoolAnd => "BOOL_AND",
            Aggregate::BoolOr => "BOOL_OR",
            Aggregate::StringAgg => "STRING_AGG",
        }
    }
}

/// Boolean connective placed in front of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        }
    }
}

/// Comparison operators, serialized with their SQL spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "<>")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    LtEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    GtEq,
    #[serde(rename = "LIKE")]
    Like,
    #[serde(rename = "ILIKE")]
    ILike,
    #[serde(rename = "NOT LIKE")]
    NotLike,
    #[serde(rename = "NOT ILIKE")]
    NotILike,
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "NOT IN")]
    NotIn,
    #[serde(rename = "IS NULL")]
    IsNull,
    #[serde(rename = "IS NOT NULL")]
    IsNotNull,
}

impl Operator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Ne => "<>",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::Like => "LIKE",
            Operator::ILike => "ILIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::NotILike => "NOT ILIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        }
    }

    /// Null checks are unary; everything else takes a right operand
    pub fn takes_operand(&self) -> bool {
        !matches!(self, Operator::IsNull | Operator::IsNotNull)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinClause {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub join_type: JoinType,
    pub table: String,
    #[serde(default)]
    pub alias: String,
    pub on_left: String,
    pub on_right: String,
}

impl JoinClause {
    pub fn new(
        join_type: JoinType,
        table: impl Into<String>,
        alias: impl Into<String>,
        on_left: impl Into<String>,
        on_right: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            join_type,
            table: table.into(),
            alias: alias.into(),
            on_left: on_left.into(),
            on_right: on_right.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectColumn {
    #[serde(default = "new_id")]
    pub id: String,
    pub expression: String,
    /// Empty means no `AS` clause
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub aggregate: Option<Aggregate>,
}

impl SelectColumn {
    pub fn new(expression: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            expression: expression.into(),
            alias: alias.into(),
            aggregate: None,
        }
    }

    pub fn aggregated(
        aggregate: Aggregate,
        expression: impl Into<String>,
        alias: impl Into<String>,
    ) -> Self {
        Self {
            aggregate: Some(aggregate),
            ..Self::new(expression, alias)
        }
    }
}

/// A WHERE or HAVING predicate.
///
/// `logic` joins this condition to the one before it. It is ignored on the
/// first condition of a clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub logic: Logic,
    pub left: String,
    pub operator: Operator,
    #[serde(default)]
    pub right: String,
}

impl Condition {
    pub fn new(
        logic: Logic,
        left: impl Into<String>,
        operator: Operator,
        right: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            logic,
            left: left.into(),
            operator,
            right: right.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderByColumn {
    #[serde(default = "new_id")]
    pub id: String,
    pub expression: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl OrderByColumn {
    pub fn new(expression: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            id: new_id(),
            expression: expression.into(),
            direction,
        }
    }
}

trait Identified {
    fn id(&self) -> &str;
}

macro_rules! impl_identified {
    ($($ty:ty),*) => {
        $(impl Identified for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

impl_identified!(JoinClause, SelectColumn, Condition, OrderByColumn);

fn remove_by_id<T: Identified>(items: &mut Vec<T>, id: &str) -> bool {
    let before = items.len();
    items.retain(|item| item.id() != id);
    items.len() != before
}

fn move_by_id<T: Identified>(items: &mut Vec<T>, id: &str, new_index: usize) -> bool {
    let Some(current) = items.iter().position(|item| item.id() == id) else {
        return false;
    };
    let item = items.remove(current);
    let target = new_index.min(items.len());
    items.insert(target, item);
    true
}

/// Structural representation of a single SELECT statement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryBuilderState {
    pub from_table: String,
    pub from_alias: String,
    pub joins: Vec<JoinClause>,
    pub select_columns: Vec<SelectColumn>,
    pub where_conditions: Vec<Condition>,
    pub group_by_columns: Vec<String>,
    pub having_conditions: Vec<Condition>,
    pub order_by_columns: Vec<OrderByColumn>,
}

impl QueryBuilderState {
    /// Empty builder over a base relation
    pub fn new(from_table: impl Into<String>, from_alias: impl Into<String>) -> Self {
        Self {
            from_table: from_table.into(),
            from_alias: from_alias.into(),
            ..Self::default()
        }
    }

    /// Builder seeded on `applications a`, already selecting `application_id`
    pub fn for_applications() -> Self {
        let mut state = Self::new("applications", "a");
        state.add_select_column(SelectColumn::new("a.id", APPLICATION_ID_COLUMN));
        state
    }

    pub fn add_join(&mut self, join: JoinClause) -> String {
        let id = join.id.clone();
        self.joins.push(join);
        id
    }

    pub fn remove_join(&mut self, id: &str) -> bool {
        remove_by_id(&mut self.joins, id)
    }

    pub fn add_select_column(&mut self, column: SelectColumn) -> String {
        let id = column.id.clone();
        self.select_columns.push(column);
        id
    }

    pub fn remove_select_column(&mut self, id: &str) -> bool {
        remove_by_id(&mut self.select_columns, id)
    }

    pub fn add_where_condition(&mut self, condition: Condition) -> String {
        let id = condition.id.clone();
        self.where_conditions.push(condition);
        id
    }

    pub fn remove_where_condition(&mut self, id: &str) -> bool {
        remove_by_id(&mut self.where_conditions, id)
    }

    /// Reorder a WHERE condition. Each condition keeps its own `logic`, so the
    /// connective travels with the condition rather than staying in place.
    pub fn move_where_condition(&mut self, id: &str, new_index: usize) -> bool {
        move_by_id(&mut self.where_conditions, id, new_index)
    }

    pub fn add_having_condition(&mut self, condition: Condition) -> String {
        let id = condition.id.clone();
        self.having_conditions.push(condition);
        id
    }

    pub fn remove_having_condition(&mut self, id: &str) -> bool {
        remove_by_id(&mut self.having_conditions, id)
    }

    pub fn move_having_condition(&mut self, id: &str, new_index: usize) -> bool {
        move_by_id(&mut self.having_conditions, id, new_index)
    }

    pub fn add_group_by(&mut self, expression: impl Into<String>) {
        self.group_by_columns.push(expression.into());
    }

    /// Removes the first matching expression
    pub fn remove_group_by(&mut self, expression: &str) -> bool {
        match self.group_by_columns.iter().position(|c| c == expression) {
            Some(index) => {
                self.group_by_columns.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn add_order_by(&mut self, column: OrderByColumn) -> String {
        let id = column.id.clone();
        self.order_by_columns.push(column);
        id
    }

    pub fn remove_order_by(&mut self, id: &str) -> bool {
        remove_by_id(&mut self.order_by_columns, id)
    }

    pub fn condition_mut(&mut self, id: &str) -> Option<&mut Condition> {
        self.where_conditions
            .iter_mut()
            .chain(self.having_conditions.iter_mut())
            .find(|c| c.id == id)
    }

    pub fn to_sql(&self) -> String {
        super::sql::generate(self)
    }
}
