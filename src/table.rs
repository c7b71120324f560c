use std::fmt;

use indexmap::IndexMap;
use ndarray::Array1;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("column '{name}' has {found} rows but the table has {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("no column named '{0}'")]
    MissingColumn(String),
    #[error("column '{0}' appears more than once")]
    DuplicateColumn(String),
    #[error("cannot parse '{value}' in column '{column}', row {row} as a number")]
    Parse {
        column: String,
        row: usize,
        value: String,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// An ordered set of named f64 columns sharing one row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: IndexMap<String, Array1<f64>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_columns<I, S>(columns: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (S, Array1<f64>)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (name, column) in columns {
            let name: String = name.into();
            if table.has_column(&name) {
                return Err(TableError::DuplicateColumn(name));
            }
            table.insert_column(name, column)?;
        }
        Ok(table)
    }

    /// number of rows, zero for a table without columns
    pub fn nrows(&self) -> usize {
        self.columns.values().next().map_or(0, |c| c.len())
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&Array1<f64>> {
        self.columns.get(name)
    }

    pub fn column_at(&self, index: usize) -> Option<(&String, &Array1<f64>)> {
        self.columns.get_index(index)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Array1<f64>)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Adds a column, or replaces an existing one in place. The first column
    /// fixes the row count; later columns must match it unless the column
    /// being replaced is the only one.
    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        column: Array1<f64>,
    ) -> Result<(), TableError> {
        let name = name.into();
        let sole_column = self.columns.len() == 1 && self.columns.contains_key(&name);
        if !self.columns.is_empty() && !sole_column && column.len() != self.nrows() {
            return Err(TableError::LengthMismatch {
                name,
                expected: self.nrows(),
                found: column.len(),
            });
        }
        self.columns.insert(name, column);
        Ok(())
    }

    /// Adds `value` repeated over the table's rows, or over `fallback_rows`
    /// when the table has no columns yet.
    pub fn insert_value(
        &mut self,
        name: impl Into<String>,
        value: f64,
        fallback_rows: usize,
    ) -> Result<(), TableError> {
        let rows = if self.is_empty() {
            fallback_rows
        } else {
            self.nrows()
        };
        self.insert_column(name, Array1::from_elem(rows, value))
    }

    /// Applies `f` to an existing column, keeping its position.
    pub fn map_column<F>(&mut self, name: &str, f: F) -> Result<(), TableError>
    where
        F: FnOnce(&Array1<f64>) -> Array1<f64>,
    {
        let column = self
            .columns
            .get_mut(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))?;
        let updated = f(&*column);
        if updated.len() != column.len() {
            return Err(TableError::LengthMismatch {
                name: name.to_string(),
                expected: column.len(),
                found: updated.len(),
            });
        }
        *column = updated;
        Ok(())
    }

    pub fn remove_column(&mut self, name: &str) -> Option<Array1<f64>> {
        self.columns.shift_remove(name)
    }

    pub fn select(&self, names: &[&str]) -> Result<Table, TableError> {
        let mut table = Table::new();
        for &name in names {
            let column = self
                .column(name)
                .ok_or_else(|| TableError::MissingColumn(name.to_string()))?;
            table.insert_column(name, column.clone())?;
        }
        Ok(table)
    }

    /// Rows `[start, end)` of every column.
    pub fn slice_rows(&self, start: usize, end: usize) -> Table {
        let end = end.min(self.nrows());
        let start = start.min(end);
        Table {
            columns: self
                .columns
                .iter()
                .map(|(k, v)| (k.clone(), v.slice(ndarray::s![start..end]).to_owned()))
                .collect(),
        }
    }

    /// Picks rows in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|(k, v)| (k.clone(), rows.iter().map(|&r| v[r]).collect()))
                .collect(),
        }
    }

    /// Stacks the rows of `tables` in order. Columns are the union of all
    /// inputs in first-seen order; a table lacking a column contributes NaN.
    /// Tables without columns contribute nothing.
    pub fn concat_rows<'t>(tables: impl IntoIterator<Item = &'t Table>) -> Table {
        let tables = tables.into_iter().filter(|t| !t.is_empty()).collect::<Vec<_>>();
        let mut names: Vec<&str> = Vec::new();
        for table in &tables {
            for name in table.column_names() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        let columns = names
            .iter()
            .map(|&name| {
                let values = tables
                    .iter()
                    .flat_map(|t| match t.column(name) {
                        Some(c) => c.to_vec(),
                        None => vec![f64::NAN; t.nrows()],
                    })
                    .collect::<Array1<f64>>();
                (name.to_string(), values)
            })
            .collect();
        Table { columns }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Table[{}x{}](", self.nrows(), self.ncols())?;
        for (i, name) in self.column_names().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", name)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn first_column_fixes_row_count() {
        let mut table = Table::new();
        table.insert_column("a", array![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(table.nrows(), 3);
        let err = table.insert_column("b", array![1.0]).unwrap_err();
        assert!(matches!(err, TableError::LengthMismatch { expected: 3, found: 1, .. }));
        assert_eq!(table.ncols(), 1);
        // replacing the only column may change the row count
        table.insert_column("a", array![1.0]).unwrap();
        assert_eq!(table.nrows(), 1);
    }

    #[test]
    fn replace_keeps_position() {
        let mut table =
            Table::from_columns([("a", array![1.0]), ("b", array![2.0]), ("c", array![3.0])])
                .unwrap();
        table.insert_column("b", array![5.0]).unwrap();
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(table.column("b").unwrap(), &array![5.0]);
    }

    #[test]
    fn duplicate_names_are_rejected_on_construction() {
        let err = Table::from_columns([("c", array![1.0]), ("c", array![2.0])]).unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn(ref name) if name == "c"));
    }

    #[test]
    fn values_broadcast_to_rows() {
        let mut table = Table::new();
        table.insert_value("k", 2.0, 3).unwrap();
        assert_eq!(table.column("k").unwrap(), &array![2.0, 2.0, 2.0]);
        table.insert_column("a", array![1.0, 2.0, 3.0]).unwrap();
        table.insert_value("j", 1.0, 10).unwrap();
        assert_eq!(table.column("j").unwrap(), &array![1.0, 1.0, 1.0]);
    }

    #[test]
    fn concat_fills_missing_with_nan() {
        let a = Table::from_columns([("x", array![1.0, 2.0])]).unwrap();
        let b = Table::from_columns([("y", array![3.0]), ("x", array![4.0])]).unwrap();
        let merged = Table::concat_rows([&Table::new(), &a, &b]);
        assert_eq!(merged.column_names().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(merged.column("x").unwrap(), &array![1.0, 2.0, 4.0]);
        let y = merged.column("y").unwrap();
        assert!(y[0].is_nan() && y[1].is_nan());
        assert_eq!(y[2], 3.0);
    }

    #[test]
    fn select_and_take() {
        let table =
            Table::from_columns([("a", array![1.0, 2.0, 3.0]), ("b", array![4.0, 5.0, 6.0])])
                .unwrap();
        let picked = table.select(&["b"]).unwrap();
        assert_eq!(picked.column_names().collect::<Vec<_>>(), vec!["b"]);
        assert!(table.select(&["z"]).is_err());
        let taken = table.take_rows(&[2, 0]);
        assert_eq!(taken.column("a").unwrap(), &array![3.0, 1.0]);
        let sliced = table.slice_rows(1, 10);
        assert_eq!(sliced.column("b").unwrap(), &array![5.0, 6.0]);
    }
}
