pub mod error;
pub use error::EvalError;

pub mod value;
pub use value::{Func, Value};

pub mod scope;
pub use scope::Scope;

pub mod functions;
pub use functions::{FunctionDef, FunctionTable};

pub mod evaluator;
pub use evaluator::{evaluate, CallContext, Evaluator};
