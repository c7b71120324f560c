extern crate pest;
#[macro_use]
extern crate pest_derive;

pub mod ast;
pub mod commands;
pub mod config;
pub mod context;
pub mod execution;
pub mod model;
pub mod parser;
pub mod storage;
pub mod synthesis;
pub mod table;
pub mod timeseries;

pub use commands::{run_pipeline, Command, Compose, Generate, LoadModels, TimeSeries};
pub use config::Config;
pub use context::Context;
pub use execution::{EvalError, Evaluator, FunctionTable, Scope, Value};
pub use model::ModelDefinition;
pub use table::Table;
pub use timeseries::Operator;
