use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, warn};

use super::Session;
use crate::execution::{CallContext, Evaluator, Scope};
use crate::model::ModelDefinition;

/// Runs pre-bindings, declared variables and post-bindings in that order,
/// each step seeing every write of the steps before it. Pre- and
/// post-bindings use the auxiliary evaluator, variables the main one.
/// A binding that fails to evaluate is logged and left unbound.
pub fn resolve(model: &ModelDefinition, mut scope: Scope, session: &mut Session) -> Scope {
    bind_all(&model.id, "pre-binding", &model.pre, &session.aux, &mut scope, &mut session.ctx);
    bind_all(&model.id, "variable", &model.variables, &session.main, &mut scope, &mut session.ctx);
    bind_all(&model.id, "post-binding", &model.post, &session.aux, &mut scope, &mut session.ctx);
    debug!("model '{}': scope holds {}", model.id, scope.names().join(", "));
    scope
}

fn bind_all(
    model_id: &str,
    kind: &str,
    bindings: &IndexMap<String, String>,
    evaluator: &Evaluator,
    scope: &mut Scope,
    ctx: &mut CallContext,
) {
    for (name, expr) in bindings {
        match evaluator.evaluate(expr, scope, ctx) {
            Ok(value) => {
                debug!("model '{}': {} {} = {}", model_id, kind, name, value);
                scope.insert(name.clone(), value);
            }
            Err(e) => warn!("model '{}': {} '{}' = {}: {}", model_id, kind, name, expr, e),
        }
    }
}
