use log::{debug, info, warn};

use super::{resolve, Session, TABLE_VAR, TARGET_COLUMN};
use crate::execution::{EvalError, Scope, Value};
use crate::model::ModelDefinition;
use crate::table::Table;

/// Resolves the model's bindings and evaluates its attributes, then its
/// target, into a table. Postprocessing is not applied. Returns the table
/// and the scope it was built in.
pub fn build_table(model: &ModelDefinition, session: &mut Session) -> (Table, Scope) {
    let mut scope = Scope::new();
    scope.insert(TABLE_VAR, Value::Table(Table::new()));
    let mut scope = resolve(model, scope, session);

    let mut table = Table::new();
    for (name, expr) in &model.attributes {
        match add_column(&mut table, name, expr, &scope, session) {
            Ok(()) => {
                scope.insert(TABLE_VAR, Value::Table(table.clone()));
            }
            Err(e) => warn!("model '{}': attribute '{}' = {}: {}", model.id, name, expr, e),
        }
    }

    match &model.target {
        Some(expr) => match add_column(&mut table, TARGET_COLUMN, expr, &scope, session) {
            Ok(()) => {
                scope.insert(TABLE_VAR, Value::Table(table.clone()));
            }
            Err(e) => warn!("model '{}': target = {}: {}", model.id, expr, e),
        },
        None => info!("model '{}' has no target expression", model.id),
    }
    (table, scope)
}

fn add_column(
    table: &mut Table,
    name: &str,
    expr: &str,
    scope: &Scope,
    session: &mut Session,
) -> Result<(), EvalError> {
    match session.main.evaluate(expr, scope, &mut session.ctx)? {
        Value::Scalar(v) => table.insert_value(name, v, session.ctx.rows)?,
        value => {
            let column = value.into_column(table.nrows())?;
            table.insert_column(name, column)?;
        }
    }
    debug!("column '{}' ({} rows)", name, table.nrows());
    Ok(())
}

/// Builds the model's table and applies its postprocess expressions in
/// order. Each postprocess result replaces the whole table; one that fails
/// or does not produce a table leaves the table as it was.
pub fn generate(model: &ModelDefinition, session: &mut Session) -> Table {
    let (mut table, mut scope) = build_table(model, session);
    for expr in &model.postprocess {
        scope.insert(TABLE_VAR, Value::Table(table.clone()));
        match session
            .main
            .evaluate(expr, &scope, &mut session.ctx)
            .and_then(Value::into_table)
        {
            Ok(replacement) => table = replacement,
            Err(e) => warn!(
                "model '{}': postprocess {} left the table unchanged: {}",
                model.id, expr, e
            ),
        }
    }
    table
}
