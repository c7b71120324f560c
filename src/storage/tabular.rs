use std::fs;
use std::path::Path;

use ndarray::Array1;

use crate::table::{Table, TableError};

/// Reads a CSV file with a header row. Every cell must parse as a number;
/// empty cells read as NaN.
pub fn read_table(path: &Path) -> Result<Table, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers = reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        for (i, field) in record.iter().enumerate() {
            let value = if field.is_empty() {
                f64::NAN
            } else {
                field.parse::<f64>().map_err(|_| TableError::Parse {
                    column: headers[i].clone(),
                    row,
                    value: field.to_string(),
                })?
            };
            columns[i].push(value);
        }
    }
    Table::from_columns(
        headers
            .into_iter()
            .zip(columns)
            .map(|(name, values)| (name, Array1::from(values))),
    )
}

/// Writes `table` as CSV with a header row, creating parent directories.
pub fn write_table(path: &Path, table: &Table) -> Result<(), TableError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    if table.is_empty() {
        fs::write(path, "")?;
        return Ok(());
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.column_names())?;
    let columns = table.iter().map(|(_, c)| c).collect::<Vec<_>>();
    for row in 0..table.nrows() {
        writer.write_record(columns.iter().map(|c| c[row].to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("t.csv");
        let table = Table::from_columns([
            ("a", array![1.0, 2.5]),
            ("b", array![-3.0, f64::NAN]),
        ])
        .unwrap();
        write_table(&path, &table).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "a,b\n1,-3\n2.5,NaN\n");
        let back = read_table(&path).unwrap();
        assert_eq!(back.column("a").unwrap(), &array![1.0, 2.5]);
        assert!(back.column("b").unwrap()[1].is_nan());
    }

    #[test]
    fn rejects_repeated_header_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, "c,c\n1,2\n").unwrap();
        let err = read_table(&path).unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn(ref name) if name == "c"));
    }

    #[test]
    fn rejects_non_numeric_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, "a, b\n1, x\n").unwrap();
        let err = read_table(&path).unwrap_err();
        assert!(matches!(err, TableError::Parse { ref column, row: 0, .. } if column == "b"));
    }
}
