use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use ndarray::Array1;
use thiserror::Error;

/// Elementwise operator folding a per-step delta into a dataset column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Multiply,
    Add,
    Subtract,
    Divide,
}

pub const OPERATORS: &[(&str, Operator)] = &[
    ("multiply", Operator::Multiply),
    ("add", Operator::Add),
    ("subtract", Operator::Subtract),
    ("divide", Operator::Divide),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operator '{name}', valid operators are: {valid}")]
pub struct UnknownOperator {
    pub name: String,
    pub valid: String,
}

impl Operator {
    pub fn name(&self) -> &'static str {
        match self {
            Operator::Multiply => "multiply",
            Operator::Add => "add",
            Operator::Subtract => "subtract",
            Operator::Divide => "divide",
        }
    }

    pub fn valid_names() -> Vec<&'static str> {
        OPERATORS.iter().map(|(name, _)| *name).collect()
    }

    pub fn apply_scalar(&self, x: f64, delta: f64) -> f64 {
        match self {
            Operator::Multiply => x * delta,
            Operator::Add => x + delta,
            Operator::Subtract => x - delta,
            Operator::Divide => x / delta,
        }
    }

    /// `column <op> delta` for every element.
    pub fn apply(&self, column: &Array1<f64>, delta: f64) -> Array1<f64> {
        column.mapv(|x| self.apply_scalar(x, delta))
    }
}

impl FromStr for Operator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OPERATORS
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, op)| *op)
            .ok_or_else(|| UnknownOperator {
                name: s.to_string(),
                valid: OPERATORS.iter().map(|(name, _)| name).join(", "),
            })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn names_round_trip() {
        for name in Operator::valid_names() {
            assert_eq!(name.parse::<Operator>().unwrap().name(), name);
        }
    }

    #[test]
    fn unknown_lists_valid_operators() {
        let err = "power".parse::<Operator>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown operator 'power', valid operators are: multiply, add, subtract, divide"
        );
    }

    #[test]
    fn apply_broadcasts_delta() {
        let c = array![10.0, 20.0];
        assert_eq!(Operator::Add.apply(&c, 1.0), array![11.0, 21.0]);
        assert_eq!(Operator::Subtract.apply(&c, 1.0), array![9.0, 19.0]);
        assert_eq!(Operator::Multiply.apply(&c, 2.0), array![20.0, 40.0]);
        assert_eq!(Operator::Divide.apply(&c, 2.0), array![5.0, 10.0]);
    }
}
