use log::debug;
use thiserror::Error;

use super::Operator;
use crate::model::ModelDefinition;
use crate::synthesis::{build_table, Session, TARGET_COLUMN};
use crate::table::{Table, TableError};

#[derive(Debug, Error)]
pub enum DeltaError {
    #[error("dataset {dataset} has no column '{column}' for the deltas of model '{model}'")]
    MissingColumn {
        model: String,
        dataset: usize,
        column: String,
    },
    #[error(transparent)]
    Table(#[from] TableError),
}

/// A model's generated table read as per-step deltas: row `t` of each column
/// is the value applied at step `t`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaTable {
    table: Table,
}

impl DeltaTable {
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    /// Resolves the model and evaluates its attributes and target, exactly
    /// as for generation but without postprocessing.
    pub fn compute(model: &ModelDefinition, session: &mut Session) -> Self {
        let (table, _) = build_table(model, session);
        Self { table }
    }

    pub fn steps(&self) -> usize {
        self.table.nrows()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.table.column_names()
    }

    pub fn value(&self, column: &str, step: usize) -> Option<f64> {
        self.table.column(column).and_then(|c| c.get(step).copied())
    }
}

/// The dataset after one applied step.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub dataset: usize,
    pub step: usize,
    pub table: Table,
}

/// Applies a delta table to one dataset step by step, yielding a snapshot
/// after each step.
#[derive(Debug)]
pub struct DeltaRun<'d> {
    delta: &'d DeltaTable,
    working: Table,
    dataset_index: usize,
    columns: Vec<String>,
    operator: Operator,
    step: usize,
}

impl<'d> DeltaRun<'d> {
    /// Checks every delta column against the dataset before anything is
    /// applied. The target column is applied only when the dataset has it;
    /// any other column missing from the dataset is an error.
    pub fn new(
        dataset: Table,
        dataset_index: usize,
        model_id: &str,
        delta: &'d DeltaTable,
        operator: Operator,
    ) -> Result<Self, DeltaError> {
        let mut columns = Vec::new();
        for name in delta.columns() {
            if dataset.has_column(name) {
                columns.push(name.to_string());
            } else if name == TARGET_COLUMN {
                debug!(
                    "dataset {} has no '{}' column, target deltas of '{}' skipped",
                    dataset_index, TARGET_COLUMN, model_id
                );
            } else {
                return Err(DeltaError::MissingColumn {
                    model: model_id.to_string(),
                    dataset: dataset_index,
                    column: name.to_string(),
                });
            }
        }
        Ok(Self {
            delta,
            working: dataset,
            dataset_index,
            columns,
            operator,
            step: 0,
        })
    }

    pub fn into_working(self) -> Table {
        self.working
    }
}

/// Replaces every listed column of `dataset` by `operator(column, delta)`,
/// where `delta` is the step's single value for that column.
pub fn apply_step(
    dataset: &mut Table,
    delta: &DeltaTable,
    columns: &[String],
    step: usize,
    operator: Operator,
) -> Result<(), TableError> {
    for name in columns {
        let value = delta
            .value(name, step)
            .ok_or_else(|| TableError::MissingColumn(name.clone()))?;
        dataset.map_column(name, |c| operator.apply(c, value))?;
    }
    Ok(())
}

impl<'d> Iterator for DeltaRun<'d> {
    type Item = Result<Snapshot, DeltaError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.step >= self.delta.steps() {
            return None;
        }
        let step = self.step;
        self.step += 1;
        let applied = apply_step(
            &mut self.working,
            self.delta,
            &self.columns,
            step,
            self.operator,
        );
        if let Err(e) = applied {
            self.step = self.delta.steps();
            return Some(Err(e.into()));
        }
        Some(Ok(Snapshot {
            dataset: self.dataset_index,
            step,
            table: self.working.clone(),
        }))
    }
}

/// Runs one (dataset, model) pair to completion: computes the model's delta
/// table, then applies every step to a copy of `dataset`, handing each
/// snapshot to `on_snapshot`. Returns the dataset after the last step.
pub fn simulate(
    dataset: &Table,
    dataset_index: usize,
    model: &ModelDefinition,
    session: &mut Session,
    operator: Operator,
    mut on_snapshot: impl FnMut(&Snapshot),
) -> Result<Table, DeltaError> {
    let delta = DeltaTable::compute(model, session);
    debug!(
        "model '{}': {} delta steps over columns {:?}",
        model.id,
        delta.steps(),
        delta.columns().collect::<Vec<_>>()
    );
    let mut run = DeltaRun::new(dataset.clone(), dataset_index, &model.id, &delta, operator)?;
    for snapshot in &mut run {
        on_snapshot(&snapshot?);
    }
    Ok(run.into_working())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn dataset() -> Table {
        Table::from_columns([("c", array![10.0, 10.0, 10.0]), ("d", array![1.0, 2.0, 3.0])])
            .unwrap()
    }

    #[test]
    fn scalar_broadcast_per_step() {
        let delta = DeltaTable::new(Table::from_columns([("c", array![1.0, 2.0, 3.0])]).unwrap());
        let run = DeltaRun::new(dataset(), 0, "m", &delta, Operator::Add).unwrap();
        let snapshots = run.collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(snapshots.len(), 3);
        let expected = [11.0, 13.0, 16.0];
        for (t, snapshot) in snapshots.iter().enumerate() {
            assert_eq!(snapshot.step, t);
            assert_eq!(snapshot.dataset, 0);
            let e = expected[t];
            assert_eq!(snapshot.table.column("c").unwrap(), &array![e, e, e]);
            // untouched column
            assert_eq!(snapshot.table.column("d").unwrap(), &array![1.0, 2.0, 3.0]);
        }
    }

    #[test]
    fn missing_column_fails_before_any_step() {
        let delta = DeltaTable::new(
            Table::from_columns([("c", array![1.0]), ("z", array![1.0])]).unwrap(),
        );
        let err = DeltaRun::new(dataset(), 2, "m", &delta, Operator::Add).unwrap_err();
        assert!(matches!(
            err,
            DeltaError::MissingColumn { ref column, dataset: 2, .. } if column == "z"
        ));
    }

    #[test]
    fn target_applied_only_when_present() {
        let delta = DeltaTable::new(
            Table::from_columns([("c", array![2.0]), (TARGET_COLUMN, array![5.0])]).unwrap(),
        );
        let run = DeltaRun::new(dataset(), 0, "m", &delta, Operator::Multiply).unwrap();
        let last = run.last().unwrap().unwrap();
        assert!(!last.table.has_column(TARGET_COLUMN));
        assert_eq!(last.table.column("c").unwrap(), &array![20.0, 20.0, 20.0]);

        let mut with_target = dataset();
        with_target.insert_column(TARGET_COLUMN, array![1.0, 1.0, 1.0]).unwrap();
        let run = DeltaRun::new(with_target, 0, "m", &delta, Operator::Subtract).unwrap();
        let last = run.last().unwrap().unwrap();
        assert_eq!(last.table.column(TARGET_COLUMN).unwrap(), &array![-4.0, -4.0, -4.0]);
    }

    #[test]
    fn simulate_generates_deltas_from_model() {
        let model = ModelDefinition::new("m", "m.csv")
            .with_pre("base", "1")
            .with_attribute("c", "range(base)");
        let mut session = Session::new(3, Some(0));
        let mut seen = Vec::new();
        let last = simulate(&dataset(), 1, &model, &mut session, Operator::Add, |s| {
            seen.push((s.dataset, s.step, s.table.column("c").unwrap()[0]))
        })
        .unwrap();
        assert_eq!(seen, vec![(1, 0, 11.0), (1, 1, 13.0), (1, 2, 16.0)]);
        assert_eq!(last.column("c").unwrap(), &array![16.0, 16.0, 16.0]);
    }

    #[test]
    fn simulate_aborts_without_snapshots() {
        let model = ModelDefinition::new("m", "m.csv")
            .with_attribute("c", "1")
            .with_attribute("z", "1");
        let mut session = Session::new(3, Some(0));
        let mut count = 0;
        let result = simulate(&dataset(), 0, &model, &mut session, Operator::Add, |_| count += 1);
        assert!(result.is_err());
        assert_eq!(count, 0);
    }
}
