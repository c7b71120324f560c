use std::fmt;

use ndarray::{Array1, Zip};

use super::functions::FunctionDef;
use super::EvalError;
use crate::table::Table;

/// A callable value. Produced by naming a registered function in the
/// auxiliary language, or by the composition helpers.
#[derive(Debug, Clone)]
pub enum Func {
    Native(&'static FunctionDef),
    /// `compose(f, g)(x) == f(g(x))`, stored outermost first
    Compose(Vec<Func>),
    /// leading arguments bound ahead of the call
    Partial(Box<Func>, Vec<Value>),
}

impl fmt::Display for Func {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Func::Native(def) => write!(f, "{}", def.name),
            Func::Compose(funcs) => {
                let names = funcs.iter().map(|func| func.to_string()).collect::<Vec<_>>();
                write!(f, "compose({})", names.join(", "))
            }
            Func::Partial(func, args) => write!(f, "partial({}, <{} args>)", func, args.len()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Scalar(f64),
    Column(Array1<f64>),
    Table(Table),
    Text(String),
    Func(Func),
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Scalar(value)
    }
}

impl From<Array1<f64>> for Value {
    fn from(value: Array1<f64>) -> Self {
        Value::Column(value)
    }
}

impl From<Table> for Value {
    fn from(value: Table) -> Self {
        Value::Table(value)
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "scalar",
            Value::Column(_) => "column",
            Value::Table(_) => "table",
            Value::Text(_) => "string",
            Value::Func(_) => "function",
        }
    }

    pub fn as_scalar(&self) -> Result<f64, EvalError> {
        match self {
            Value::Scalar(v) => Ok(*v),
            other => Err(EvalError::type_err(format!(
                "expected a scalar, got a {}",
                other.type_name()
            ))),
        }
    }

    /// a scalar that is a whole number
    pub fn as_integer(&self) -> Result<i64, EvalError> {
        let v = self.as_scalar()?;
        if v.fract() != 0.0 || !v.is_finite() {
            return Err(EvalError::type_err(format!("expected an integer, got {}", v)));
        }
        Ok(v as i64)
    }

    pub fn as_text(&self) -> Result<&str, EvalError> {
        match self {
            Value::Text(s) => Ok(s.as_str()),
            other => Err(EvalError::type_err(format!(
                "expected a string, got a {}",
                other.type_name()
            ))),
        }
    }

    pub fn as_table(&self) -> Result<&Table, EvalError> {
        match self {
            Value::Table(t) => Ok(t),
            other => Err(EvalError::type_err(format!(
                "expected a table, got a {}",
                other.type_name()
            ))),
        }
    }

    pub fn into_table(self) -> Result<Table, EvalError> {
        match self {
            Value::Table(t) => Ok(t),
            other => Err(EvalError::type_err(format!(
                "expected a table, got a {}",
                other.type_name()
            ))),
        }
    }

    pub fn into_func(self) -> Result<Func, EvalError> {
        match self {
            Value::Func(f) => Ok(f),
            other => Err(EvalError::type_err(format!(
                "expected a function, got a {}",
                other.type_name()
            ))),
        }
    }

    /// The values of a scalar or column as a column; scalars give one element.
    pub fn to_values(&self) -> Result<Array1<f64>, EvalError> {
        match self {
            Value::Scalar(v) => Ok(Array1::from_elem(1, *v)),
            Value::Column(c) => Ok(c.clone()),
            other => Err(EvalError::type_err(format!(
                "expected a scalar or column, got a {}",
                other.type_name()
            ))),
        }
    }

    /// Converts to a column of `rows` entries, broadcasting scalars.
    pub fn into_column(self, rows: usize) -> Result<Array1<f64>, EvalError> {
        match self {
            Value::Scalar(v) => Ok(Array1::from_elem(rows, v)),
            Value::Column(c) => Ok(c),
            other => Err(EvalError::type_err(format!(
                "cannot use a {} as a column",
                other.type_name()
            ))),
        }
    }

    pub fn map(self, f: impl Fn(f64) -> f64) -> Result<Value, EvalError> {
        match self {
            Value::Scalar(v) => Ok(Value::Scalar(f(v))),
            Value::Column(c) => Ok(Value::Column(c.mapv(f))),
            other => Err(EvalError::type_err(format!(
                "expected a scalar or column, got a {}",
                other.type_name()
            ))),
        }
    }

    /// Elementwise combination with scalar broadcasting. Two columns must
    /// have the same length.
    pub fn zip_with(
        self,
        other: Value,
        op: &str,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Value, EvalError> {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Scalar(f(a, b))),
            (Value::Column(a), Value::Scalar(b)) => Ok(Value::Column(a.mapv(|x| f(x, b)))),
            (Value::Scalar(a), Value::Column(b)) => Ok(Value::Column(b.mapv(|x| f(a, x)))),
            (Value::Column(a), Value::Column(b)) => {
                if a.len() != b.len() {
                    return Err(EvalError::type_err(format!(
                        "operands of '{}' have different lengths ({} and {})",
                        op,
                        a.len(),
                        b.len()
                    )));
                }
                Ok(Value::Column(
                    Zip::from(&a).and(&b).map_collect(|&x, &y| f(x, y)),
                ))
            }
            (l, r) => Err(EvalError::type_err(format!(
                "unsupported operand types for '{}': {} and {}",
                op,
                l.type_name(),
                r.type_name()
            ))),
        }
    }

    pub fn binary_op(self, op: char, other: Value) -> Result<Value, EvalError> {
        let f: fn(f64, f64) -> f64 = match op {
            '+' => |a, b| a + b,
            '-' => |a, b| a - b,
            '*' => |a, b| a * b,
            '/' => |a, b| a / b,
            '^' => f64::powf,
            _ => return Err(EvalError::type_err(format!("unknown operator '{}'", op))),
        };
        self.zip_with(other, &op.to_string(), f)
    }

    /// `target[index]`: a table by column name or position, a column by row
    /// position. Negative positions count from the end.
    pub fn index(self, index: Value) -> Result<Value, EvalError> {
        match (self, index) {
            (Value::Table(table), Value::Text(name)) => table
                .column(&name)
                .cloned()
                .map(Value::Column)
                .ok_or_else(|| EvalError::name(format!("no column named '{}'", name))),
            (Value::Table(table), i @ Value::Scalar(_)) => {
                let pos = resolve_position(i.as_integer()?, table.ncols())?;
                table
                    .column_at(pos)
                    .map(|(_, column)| Value::Column(column.clone()))
                    .ok_or_else(|| EvalError::type_err(format!("no column at position {}", pos)))
            }
            (Value::Column(column), i @ Value::Scalar(_)) => {
                let pos = resolve_position(i.as_integer()?, column.len())?;
                Ok(Value::Scalar(column[pos]))
            }
            (target, index) => Err(EvalError::type_err(format!(
                "cannot index a {} with a {}",
                target.type_name(),
                index.type_name()
            ))),
        }
    }
}

fn resolve_position(i: i64, len: usize) -> Result<usize, EvalError> {
    let pos = if i < 0 { i + len as i64 } else { i };
    if pos < 0 || pos >= len as i64 {
        return Err(EvalError::type_err(format!(
            "index {} out of range for length {}",
            i, len
        )));
    }
    Ok(pos as usize)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Scalar(v) => write!(f, "{}", v),
            Value::Column(c) => write!(f, "column[{}]", c.len()),
            Value::Table(t) => write!(f, "{}", t),
            Value::Text(s) => write!(f, "'{}'", s),
            Value::Func(func) => write!(f, "<function {}>", func),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn broadcasting() {
        let v = Value::Column(array![1.0, 2.0]).binary_op('+', Value::Scalar(1.0)).unwrap();
        assert!(matches!(v, Value::Column(c) if c == array![2.0, 3.0]));
        let v = Value::Scalar(2.0).binary_op('^', Value::Column(array![1.0, 3.0])).unwrap();
        assert!(matches!(v, Value::Column(c) if c == array![2.0, 8.0]));
    }

    #[test]
    fn mismatched_lengths_are_type_errors() {
        let err = Value::Column(array![1.0, 2.0])
            .binary_op('*', Value::Column(array![1.0]))
            .unwrap_err();
        assert!(matches!(err, EvalError::Type(_)));
        let err = Value::Text("a".into()).binary_op('+', Value::Scalar(1.0)).unwrap_err();
        assert!(matches!(err, EvalError::Type(_)));
    }

    #[test]
    fn indexing() {
        let table =
            Table::from_columns([("a", array![1.0, 2.0]), ("b", array![3.0, 4.0])]).unwrap();
        let col = Value::Table(table.clone()).index(Value::Text("b".into())).unwrap();
        assert!(matches!(&col, Value::Column(c) if *c == array![3.0, 4.0]));
        let last = col.index(Value::Scalar(-1.0)).unwrap();
        assert_eq!(last.as_scalar().unwrap(), 4.0);
        let first = Value::Table(table.clone()).index(Value::Scalar(0.0)).unwrap();
        assert!(matches!(first, Value::Column(c) if c == array![1.0, 2.0]));
        let err = Value::Table(table.clone()).index(Value::Text("z".into())).unwrap_err();
        assert!(matches!(err, EvalError::Name(_)));
        let err = Value::Table(table).index(Value::Scalar(5.0)).unwrap_err();
        assert!(matches!(err, EvalError::Type(_)));
    }
}
