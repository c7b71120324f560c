use std::path::{Path, PathBuf};

use log::{info, warn};
use ndarray::{Array1, Zip};
use rand::seq::SliceRandom;
use rand::Rng;

use super::{companion_path, write_table};
use crate::table::{Table, TableError};

/// Pearson correlation between every pair of columns. Row `i` of the result
/// corresponds to column `i` of the input.
pub fn correlation(table: &Table) -> Result<Table, TableError> {
    let columns = table.iter().collect::<Vec<_>>();
    Table::from_columns(columns.iter().map(|(name, a)| {
        let values = columns
            .iter()
            .map(|(_, b)| pearson(a, b))
            .collect::<Array1<f64>>();
        (*name, values)
    }))
}

fn pearson(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    let n = a.len() as f64;
    if n == 0.0 {
        return f64::NAN;
    }
    let ma = a.sum() / n;
    let mb = b.sum() / n;
    let (mut cov, mut va, mut vb) = (0.0, 0.0, 0.0);
    Zip::from(a).and(b).for_each(|&x, &y| {
        cov += (x - ma) * (y - mb);
        va += (x - ma) * (x - ma);
        vb += (y - mb) * (y - mb);
    });
    cov / (va.sqrt() * vb.sqrt())
}

/// Shuffles rows and splits them into `(train, test)` with `train_fraction`
/// of the rows (rounded) in the first half.
pub fn train_test_split(
    table: &Table,
    train_fraction: f64,
    rng: &mut impl Rng,
) -> (Table, Table) {
    let mut rows = (0..table.nrows()).collect::<Vec<_>>();
    rows.shuffle(rng);
    let n_train = ((table.nrows() as f64) * train_fraction).round() as usize;
    let n_train = n_train.min(rows.len());
    (
        table.take_rows(&rows[..n_train]),
        table.take_rows(&rows[n_train..]),
    )
}

/// Companion artifacts derived from a persisted table. They only read the
/// table; failures are logged and never reach the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideProducts {
    pub heatmap: bool,
    pub split: Option<f64>,
}

impl SideProducts {
    pub fn emit(&self, table: &Table, path: &Path, rng: &mut impl Rng) -> Vec<PathBuf> {
        let mut written = Vec::new();
        if self.heatmap {
            let heatmap = companion_path(path, "heatmap");
            match correlation(table).and_then(|c| write_table(&heatmap, &c)) {
                Ok(()) => written.push(heatmap),
                Err(e) => warn!("cannot write {}: {}", heatmap.display(), e),
            }
        }
        if let Some(fraction) = self.split {
            let (train, test) = train_test_split(table, fraction, rng);
            let result: Result<(), TableError> = (|| {
                let train_path = companion_path(path, "train");
                write_table(&train_path, &train)?;
                written.push(train_path);
                let test_path = companion_path(path, "test");
                write_table(&test_path, &test)?;
                written.push(test_path);
                Ok(())
            })();
            if let Err(e) = result {
                warn!("cannot write train/test split for {}: {}", path.display(), e);
            }
        }
        for p in &written {
            info!("wrote {}", p.display());
        }
        written
    }
}
