use indexmap::IndexMap;
use log::warn;

use super::RESULT_VAR;
use crate::execution::{CallContext, Evaluator, Scope, Value};
use crate::table::Table;

/// Folds the generated tables through `expressions`. Every table is bound
/// under its model id and the running result under `result`, which starts
/// empty; each expression's table becomes the next `result`. Expressions
/// that fail or yield something other than a table are skipped.
pub fn compose(
    expressions: &[String],
    generated: &IndexMap<String, Table>,
    evaluator: &Evaluator,
    ctx: &mut CallContext,
) -> Table {
    let mut scope = Scope::new();
    for (id, table) in generated {
        if id == RESULT_VAR {
            warn!("model id '{}' is reserved in output expressions and is not bound", id);
            continue;
        }
        scope.insert(id.clone(), Value::Table(table.clone()));
    }
    scope.insert(RESULT_VAR, Value::Table(Table::new()));

    for expr in expressions {
        match evaluator
            .evaluate(expr, &scope, ctx)
            .and_then(Value::into_table)
        {
            Ok(table) => {
                scope.insert(RESULT_VAR, Value::Table(table));
            }
            Err(e) => warn!("output expression {}: {}", expr, e),
        }
    }
    match scope.remove(RESULT_VAR) {
        Some(Value::Table(table)) => table,
        _ => Table::new(),
    }
}
