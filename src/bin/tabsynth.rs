use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tabsynth::config::DEFAULT_SAMPLES;
use tabsynth::{
    run_pipeline, Command, Compose, Config, Context, Generate, LoadModels, Operator, TimeSeries,
};

/// synthesises tabular datasets from model definitions
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate one table per model, optionally composing them into one output
    Generate {
        #[command(flatten)]
        common: CommonArgs,

        /// Output expression, evaluated in order (repeatable)
        #[arg(short = 'e', long = "output-expr")]
        output_exprs: Vec<String>,

        /// Filename of the composed output
        #[arg(long, default_value = "output.csv")]
        output_file: String,
    },
    /// Apply each model's rows as per-step deltas to preloaded datasets
    Ts {
        #[command(flatten)]
        common: CommonArgs,

        /// Dataset CSV file (repeatable)
        #[arg(short, long = "dataset", required = true)]
        datasets: Vec<PathBuf>,

        /// One of: multiply, add, subtract, divide
        #[arg(long)]
        operator: String,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Model definition files (YAML)
    #[arg(required = true)]
    models: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Rows per model when the model does not set `samples`
    #[arg(short, long, default_value_t = DEFAULT_SAMPLES)]
    samples: usize,

    /// Random seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Write a correlation table next to every output
    #[arg(long)]
    heatmap: bool,

    /// Write a train/test split with this train fraction next to every output
    #[arg(long)]
    split: Option<f64>,
}

impl CommonArgs {
    fn config(&self) -> Config {
        Config {
            out_dir: self.out_dir.clone(),
            samples: self.samples,
            seed: self.seed,
            heatmap: self.heatmap,
            split: self.split,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let (common, mut commands): (&CommonArgs, Vec<Box<dyn Command>>) = match &cli.command {
        Commands::Generate {
            common,
            output_exprs,
            output_file,
        } => {
            let mut commands: Vec<Box<dyn Command>> = vec![Box::new(Generate)];
            if !output_exprs.is_empty() {
                commands.push(Box::new(Compose {
                    expressions: output_exprs.clone(),
                    output: output_file.clone(),
                }));
            }
            (common, commands)
        }
        Commands::Ts {
            common,
            datasets,
            operator,
        } => {
            // checked before any model or dataset is read
            let operator: Operator = operator.parse()?;
            let commands: Vec<Box<dyn Command>> = vec![Box::new(TimeSeries {
                datasets: datasets.clone(),
                operator,
            })];
            (common, commands)
        }
    };
    if let Some(split) = common.split {
        anyhow::ensure!((0.0..=1.0).contains(&split), "--split {} is not in [0, 1]", split);
    }
    commands.insert(
        0,
        Box::new(LoadModels {
            paths: common.models.clone(),
        }),
    );
    run_pipeline(&commands, Context::new(common.config()))?;
    Ok(())
}
