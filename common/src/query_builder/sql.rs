// SQL generation for the automation query builder
// Output layout must stay stable: stored automations were produced by this exact formatting

use super::state::{Condition, QueryBuilderState, SelectColumn};
use tracing::instrument;

/// Render builder state as SQL text.
///
/// Clauses are emitted in a fixed order (SELECT, FROM, JOINs, WHERE, GROUP BY,
/// HAVING, ORDER BY), one clause per line, with SELECT/WHERE/HAVING bodies
/// indented by two spaces. The statement always ends with `;`.
///
/// This never validates: an empty `from_table` or a missing `application_id`
/// column produces SQL that fails later, at preview time.
#[instrument(skip(state), fields(
    joins = state.joins.len(),
    columns = state.select_columns.len(),
    conditions = state.where_conditions.len()
))]
pub fn generate(state: &QueryBuilderState) -> String {
    let mut lines: Vec<String> = Vec::new();

    if state.select_columns.is_empty() {
        lines.push("SELECT *".to_string());
    } else {
        lines.push("SELECT".to_string());
        let last = state.select_columns.len() - 1;
        for (index, column) in state.select_columns.iter().enumerate() {
            let mut line = format!("  {}", select_expression(column));
            if index < last {
                line.push(',');
            }
            lines.push(line);
        }
    }

    lines.push(format!("FROM {} {}", state.from_table, state.from_alias));

    for join in &state.joins {
        lines.push(format!(
            "{} JOIN {} {}",
            join.join_type.as_sql(),
            join.table,
            join.alias
        ));
        lines.push(format!("  ON {} = {}", join.on_left, join.on_right));
    }

    if !state.where_conditions.is_empty() {
        lines.push("WHERE".to_string());
        push_conditions(&mut lines, &state.where_conditions);
    }

    if !state.group_by_columns.is_empty() {
        lines.push(format!("GROUP BY {}", state.group_by_columns.join(", ")));
    }

    if !state.having_conditions.is_empty() {
        lines.push("HAVING".to_string());
        push_conditions(&mut lines, &state.having_conditions);
    }

    if !state.order_by_columns.is_empty() {
        let columns: Vec<String> = state
            .order_by_columns
            .iter()
            .map(|c| format!("{} {}", c.expression, c.direction.as_sql()))
            .collect();
        lines.push(format!("ORDER BY {}", columns.join(", ")));
    }

    let mut sql = lines.join("\n");
    sql.push(';');

    tracing::debug!(sql_len = sql.len(), "Generated automation SQL");
    sql
}

fn select_expression(column: &SelectColumn) -> String {
    let expression = match column.aggregate {
        Some(aggregate) => format!("{}({})", aggregate.as_sql(), column.expression),
        None => column.expression.clone(),
    };

    if column.alias.is_empty() {
        expression
    } else {
        format!("{} AS {}", expression, column.alias)
    }
}

// The connective comes from the condition being written, not the previous one
fn push_conditions(lines: &mut Vec<String>, conditions: &[Condition]) {
    for (index, condition) in conditions.iter().enumerate() {
        let mut line = if index == 0 {
            format!("  {} {}", condition.left, condition.operator.as_sql())
        } else {
            format!(
                "  {} {} {}",
                condition.logic.as_sql(),
                condition.left,
                condition.operator.as_sql()
            )
        };

        if condition.operator.takes_operand() {
            line.push(' ');
            line.push_str(&condition.right);
        }

        lines.push(line);
    }
}
