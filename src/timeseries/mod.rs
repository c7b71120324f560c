pub mod operator;
pub use operator::{Operator, UnknownOperator, OPERATORS};

pub mod engine;
pub use engine::{apply_step, simulate, DeltaError, DeltaRun, DeltaTable, Snapshot};
