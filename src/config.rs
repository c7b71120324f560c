use std::path::PathBuf;

use crate::model::ModelDefinition;

pub const DEFAULT_SAMPLES: usize = 100;

/// Run-wide settings. Model-level values take precedence where both exist.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub out_dir: PathBuf,
    /// rows per model when the model does not set `samples`
    pub samples: usize,
    pub seed: Option<u64>,
    pub heatmap: bool,
    /// train fraction for a train/test split of every persisted table
    pub split: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            samples: DEFAULT_SAMPLES,
            seed: None,
            heatmap: false,
            split: None,
        }
    }
}

impl Config {
    pub fn samples_for(&self, model: &ModelDefinition) -> usize {
        model.samples.unwrap_or(self.samples)
    }

    pub fn seed_for(&self, model: &ModelDefinition) -> Option<u64> {
        model.seed.or(self.seed)
    }

    pub fn heatmap_for(&self, model: &ModelDefinition) -> bool {
        self.heatmap || model.training.as_ref().is_some_and(|t| t.heatmap)
    }

    pub fn split_for(&self, model: &ModelDefinition) -> Option<f64> {
        model
            .training
            .as_ref()
            .and_then(|t| t.split)
            .or(self.split)
    }
}
