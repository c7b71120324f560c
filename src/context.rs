use indexmap::IndexMap;

use crate::config::Config;
use crate::model::ModelDefinition;
use crate::table::Table;

/// State threaded through a run: settings, the models in registration
/// order, the tables generated so far keyed by model id, and the composed
/// output once one exists.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub config: Config,
    pub models: Vec<ModelDefinition>,
    pub generated: IndexMap<String, Table>,
    pub composed: Option<Table>,
}

impl Context {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }
}
