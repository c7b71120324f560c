use crate::config::Config;
use crate::execution::{CallContext, Evaluator};
use crate::model::ModelDefinition;

pub mod resolve;
pub use resolve::resolve;

pub mod generate;
pub use generate::{build_table, generate};

pub mod compose;
pub use compose::compose;

/// Scope name under which the table being built is visible.
pub const TABLE_VAR: &str = "table";
/// Column that receives a model's target expression.
pub const TARGET_COLUMN: &str = "target";
/// Scope name of the running result during output composition.
pub const RESULT_VAR: &str = "result";

/// The two evaluators and the call state for one resolution pass over a model.
pub struct Session {
    pub main: Evaluator,
    pub aux: Evaluator,
    pub ctx: CallContext,
}

impl Session {
    pub fn new(rows: usize, seed: Option<u64>) -> Self {
        Self {
            main: Evaluator::standard(),
            aux: Evaluator::auxiliary(),
            ctx: CallContext::new(rows, seed),
        }
    }

    pub fn for_model(model: &ModelDefinition, config: &Config) -> Self {
        Self::new(config.samples_for(model), config.seed_for(model))
    }
}
