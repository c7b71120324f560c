use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use log::{info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::Config;
use crate::context::Context;
use crate::execution::{CallContext, Evaluator};
use crate::model::{load_models, ModelDefinition};
use crate::storage::{output_path, read_table, write_table, SideProducts};
use crate::synthesis::{compose, generate, Session};
use crate::table::Table;
use crate::timeseries::{simulate, Operator};

/// One stage of a run. Each command takes the context by value and hands
/// back the updated one.
pub trait Command {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: Context) -> Result<Context>;
}

/// Runs `commands` in order; the first error stops the run.
pub fn run_pipeline(commands: &[Box<dyn Command>], ctx: Context) -> Result<Context> {
    commands.iter().try_fold(ctx, |ctx, command| {
        info!("running {}", command.name());
        command.run(ctx)
    })
}

pub struct LoadModels {
    pub paths: Vec<PathBuf>,
}

impl Command for LoadModels {
    fn name(&self) -> &'static str {
        "load-models"
    }

    fn run(&self, mut ctx: Context) -> Result<Context> {
        for model in load_models(&self.paths) {
            if ctx.models.iter().any(|m| m.id == model.id) {
                warn!("model '{}' is already loaded, skipped", model.id);
                continue;
            }
            ctx.models.push(model);
        }
        if ctx.models.is_empty() {
            warn!("no models loaded");
        } else {
            info!("loaded {} model(s)", ctx.models.len());
        }
        Ok(ctx)
    }
}

/// Generates every loaded model in registration order and persists each
/// table under its output filename.
pub struct Generate;

impl Command for Generate {
    fn name(&self) -> &'static str {
        "generate"
    }

    fn run(&self, mut ctx: Context) -> Result<Context> {
        for model in &ctx.models {
            info!("generating model '{}'", model.id);
            let mut session = Session::for_model(model, &ctx.config);
            let table = generate(model, &mut session);
            let path = output_path(&ctx.config.out_dir, &model.output, None, None);
            if persist(&model.id, &path, &table) {
                side_products(&ctx.config, model).emit(&table, &path, &mut session.ctx.rng);
                report_training(model);
            }
            ctx.generated.insert(model.id.clone(), table);
        }
        Ok(ctx)
    }
}

/// Folds the generated tables through output expressions and persists the
/// result once.
pub struct Compose {
    pub expressions: Vec<String>,
    pub output: String,
}

impl Command for Compose {
    fn name(&self) -> &'static str {
        "compose"
    }

    fn run(&self, mut ctx: Context) -> Result<Context> {
        let mut call_ctx = CallContext::new(ctx.config.samples, ctx.config.seed);
        let result = compose(
            &self.expressions,
            &ctx.generated,
            &Evaluator::output(),
            &mut call_ctx,
        );
        let path = output_path(&ctx.config.out_dir, &self.output, None, None);
        if persist("output", &path, &result) && ctx.config.heatmap {
            let products = SideProducts {
                heatmap: true,
                split: None,
            };
            products.emit(&result, &path, &mut call_ctx.rng);
        }
        ctx.composed = Some(result);
        Ok(ctx)
    }
}

/// Applies every model's deltas to every preloaded dataset. The operator is
/// already validated; a delta column missing from a dataset aborts the run.
pub struct TimeSeries {
    pub datasets: Vec<PathBuf>,
    pub operator: Operator,
}

impl Command for TimeSeries {
    fn name(&self) -> &'static str {
        "time-series"
    }

    fn run(&self, ctx: Context) -> Result<Context> {
        let datasets = self
            .datasets
            .iter()
            .map(|path| {
                read_table(path).with_context(|| format!("cannot load dataset {}", path.display()))
            })
            .collect::<Result<Vec<_>>>()?;
        for (index, dataset) in datasets.iter().enumerate() {
            for model in &ctx.models {
                info!(
                    "applying deltas of '{}' to dataset {} with {}",
                    model.id, index, self.operator
                );
                let mut session = Session::for_model(model, &ctx.config);
                let mut rng = side_product_rng(&ctx.config, model);
                let products = side_products(&ctx.config, model);
                simulate(dataset, index, model, &mut session, self.operator, |snapshot| {
                    let path = output_path(
                        &ctx.config.out_dir,
                        &model.output,
                        Some(snapshot.dataset),
                        Some(snapshot.step),
                    );
                    if persist(&model.id, &path, &snapshot.table) {
                        products.emit(&snapshot.table, &path, &mut rng);
                    }
                })
                .with_context(|| format!("time-series run aborted at model '{}'", model.id))?;
            }
        }
        Ok(ctx)
    }
}

fn persist(label: &str, path: &Path, table: &Table) -> bool {
    match write_table(path, table) {
        Ok(()) => {
            info!(
                "{}: wrote {} ({} rows, {} columns)",
                label,
                path.display(),
                table.nrows(),
                table.ncols()
            );
            true
        }
        Err(e) => {
            warn!("{}: cannot write {}: {}", label, path.display(), e);
            false
        }
    }
}

fn side_products(config: &Config, model: &ModelDefinition) -> SideProducts {
    SideProducts {
        heatmap: config.heatmap_for(model),
        split: config.split_for(model),
    }
}

fn side_product_rng(config: &Config, model: &ModelDefinition) -> SmallRng {
    match config.seed_for(model) {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}

fn report_training(model: &ModelDefinition) {
    if let Some(training) = &model.training {
        if training.model.is_some() || training.epochs.is_some() {
            info!(
                "model '{}': predictor training ({}) is left to external tooling",
                model.id,
                training.model.as_deref().unwrap_or("default")
            );
        }
    }
}
