//! Model definitions: the YAML document schema and its validation into
//! [`ModelDefinition`].
//!
//! A model file holds one or more YAML documents, each with a top-level
//! `model:` section:
//!
//! ```yaml
//! model:
//!   id: iris
//!   name: Iris-like flowers
//!   output: iris.csv
//!   samples: 150
//!   seed: 42
//!   pre:
//!     scale: "2"
//!   variables:
//!     base: "normal(5, 0.5)"
//!   attributes:
//!     sepal_length: "base * scale"
//!     sepal_width: "base / 2"
//!   target: "randint(0, 3)"
//!   postprocess:
//!     - "standardize(table)"
//!   training:
//!     split: 0.8
//!     heatmap: true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::warn;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse model YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    model: Option<RawModel>,
}

/// An expression written either as a string or as a bare YAML number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawExpr {
    Text(String),
    Number(f64),
}

impl From<RawExpr> for String {
    fn from(expr: RawExpr) -> Self {
        match expr {
            RawExpr::Text(text) => text,
            RawExpr::Number(value) => value.to_string(),
        }
    }
}

fn exprs(raw: IndexMap<String, RawExpr>) -> IndexMap<String, String> {
    raw.into_iter().map(|(k, v)| (k, v.into())).collect()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawModel {
    id: Option<String>,
    name: Option<String>,
    output: Option<String>,
    attributes: Option<IndexMap<String, RawExpr>>,
    target: Option<RawExpr>,
    #[serde(default)]
    variables: IndexMap<String, RawExpr>,
    #[serde(default)]
    pre: IndexMap<String, RawExpr>,
    #[serde(default)]
    post: IndexMap<String, RawExpr>,
    #[serde(default)]
    postprocess: Vec<String>,
    samples: Option<usize>,
    seed: Option<u64>,
    training: Option<TrainingConfig>,
}

/// Side products requested for a generated table. Fitting a predictor is
/// left to external tooling; `model` and `epochs` are carried for it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainingConfig {
    /// fraction of rows in the train half of a train/test split
    pub split: Option<f64>,
    #[serde(default)]
    pub heatmap: bool,
    pub model: Option<String>,
    pub epochs: Option<usize>,
}

/// A validated model. Ordered maps keep declaration order, which is also
/// evaluation order.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDefinition {
    pub id: String,
    pub name: String,
    pub output: String,
    pub attributes: IndexMap<String, String>,
    pub target: Option<String>,
    pub variables: IndexMap<String, String>,
    pub pre: IndexMap<String, String>,
    pub post: IndexMap<String, String>,
    pub postprocess: Vec<String>,
    pub samples: Option<usize>,
    pub seed: Option<u64>,
    pub training: Option<TrainingConfig>,
}

impl ModelDefinition {
    /// Minimal model for building definitions in code.
    pub fn new(id: &str, output: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            output: output.to_string(),
            attributes: IndexMap::new(),
            target: None,
            variables: IndexMap::new(),
            pre: IndexMap::new(),
            post: IndexMap::new(),
            postprocess: Vec::new(),
            samples: None,
            seed: None,
            training: None,
        }
    }

    pub fn with_attribute(mut self, name: &str, expr: &str) -> Self {
        self.attributes.insert(name.to_string(), expr.to_string());
        self
    }

    pub fn with_target(mut self, expr: &str) -> Self {
        self.target = Some(expr.to_string());
        self
    }

    pub fn with_variable(mut self, name: &str, expr: &str) -> Self {
        self.variables.insert(name.to_string(), expr.to_string());
        self
    }

    pub fn with_pre(mut self, name: &str, expr: &str) -> Self {
        self.pre.insert(name.to_string(), expr.to_string());
        self
    }

    pub fn with_post(mut self, name: &str, expr: &str) -> Self {
        self.post.insert(name.to_string(), expr.to_string());
        self
    }

    pub fn with_postprocess(mut self, expr: &str) -> Self {
        self.postprocess.push(expr.to_string());
        self
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = Some(samples);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn from_raw(raw: RawModel) -> Result<Self, ModelError> {
        let id = raw.id.ok_or(ModelError::MissingField("id"))?;
        if id.trim().is_empty() {
            return Err(ModelError::InvalidField {
                field: "id",
                reason: "must not be empty".to_string(),
            });
        }
        let output = raw.output.ok_or(ModelError::MissingField("output"))?;
        let attributes = raw.attributes.ok_or(ModelError::MissingField("attributes"))?;
        if let Some(split) = raw.training.as_ref().and_then(|t| t.split) {
            if !(0.0..=1.0).contains(&split) {
                return Err(ModelError::InvalidField {
                    field: "training.split",
                    reason: format!("{} is not in [0, 1]", split),
                });
            }
        }
        if raw.target.is_none() {
            warn!("model '{}' has no target expression", id);
        }
        Ok(Self {
            name: raw.name.unwrap_or_else(|| id.clone()),
            id,
            output,
            attributes: exprs(attributes),
            target: raw.target.map(String::from),
            variables: exprs(raw.variables),
            pre: exprs(raw.pre),
            post: exprs(raw.post),
            postprocess: raw.postprocess,
            samples: raw.samples,
            seed: raw.seed,
            training: raw.training,
        })
    }
}

/// Parses every YAML document in `text`. Each entry is either a model or
/// the reason that document was rejected.
///
/// A YAML syntax error ends the file: documents after it are not read.
pub fn parse_models(text: &str) -> Vec<Result<ModelDefinition, ModelError>> {
    let mut models = Vec::new();
    for doc in serde_yaml::Deserializer::from_str(text) {
        let value = match serde_yaml::Value::deserialize(doc) {
            Ok(value) => value,
            Err(e) => {
                models.push(Err(e.into()));
                break;
            }
        };
        models.push(model_from_value(value));
    }
    models
}

fn model_from_value(value: serde_yaml::Value) -> Result<ModelDefinition, ModelError> {
    let raw: RawDocument = serde_yaml::from_value(value)?;
    let model = raw.model.ok_or(ModelError::MissingField("model"))?;
    ModelDefinition::from_raw(model)
}

pub fn load_model_file(
    path: &Path,
) -> Result<Vec<Result<ModelDefinition, ModelError>>, ModelError> {
    let text = fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_models(&text))
}

/// Loads all models from `paths` in order. Malformed models, unreadable
/// files and duplicate ids are skipped with a warning.
pub fn load_models(paths: &[PathBuf]) -> Vec<ModelDefinition> {
    let mut models: Vec<ModelDefinition> = Vec::new();
    for path in paths {
        let entries = match load_model_file(path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };
        for (i, entry) in entries.into_iter().enumerate() {
            match entry {
                Ok(model) if models.iter().any(|m| m.id == model.id) => {
                    warn!(
                        "{} document {}: duplicate model id '{}', skipped",
                        path.display(),
                        i,
                        model.id
                    );
                }
                Ok(model) => models.push(model),
                Err(e) => warn!("{} document {}: {}, skipped", path.display(), i, e),
            }
        }
    }
    models
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "
model:
  id: iris
  output: iris.csv
  samples: 10
  pre:
    k: 2
  variables:
    base: 'normal(5, 1)'
  attributes:
    b: 'base * k'
    a: 'base'
  target: 'randint(0, 3)'
  postprocess:
    - 'normalize(table)'
  training:
    split: 0.75
    heatmap: true
";

    #[test]
    fn parses_in_declaration_order() {
        let models = parse_models(TEXT);
        assert_eq!(models.len(), 1);
        let model = models.into_iter().next().unwrap().unwrap();
        assert_eq!(model.id, "iris");
        assert_eq!(model.name, "iris");
        assert_eq!(model.samples, Some(10));
        assert_eq!(model.attributes.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(model.pre["k"], "2");
        assert_eq!(model.postprocess, vec!["normalize(table)"]);
        let training = model.training.unwrap();
        assert_eq!(training.split, Some(0.75));
        assert!(training.heatmap);
    }

    #[test]
    fn missing_fields_reject_only_that_document() {
        let text = "
model:
  id: a
  output: a.csv
  attributes:
    x: '1'
---
model:
  id: b
  attributes:
    x: '1'
---
model:
  output: c.csv
  attributes:
    x: '1'
";
        let models = parse_models(text);
        assert_eq!(models.len(), 3);
        assert!(models[0].is_ok());
        assert!(matches!(models[1], Err(ModelError::MissingField("output"))));
        assert!(matches!(models[2], Err(ModelError::MissingField("id"))));
    }

    #[test]
    fn invalid_split() {
        let text = "
model:
  id: a
  output: a.csv
  attributes: {x: '1'}
  training: {split: 1.5}
";
        let models = parse_models(text);
        assert!(matches!(
            models[0],
            Err(ModelError::InvalidField { field: "training.split", .. })
        ));
    }

    #[test]
    fn load_skips_bad_files_and_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.yaml");
        fs::write(&good, TEXT).unwrap();
        let dup = dir.path().join("dup.yaml");
        fs::write(&dup, TEXT).unwrap();
        let bad = dir.path().join("bad.yaml");
        fs::write(&bad, "model: [unclosed").unwrap();
        let missing = dir.path().join("missing.yaml");
        let models = load_models(&[good, bad, missing, dup]);
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].id, "iris");
    }

    #[test]
    fn syntax_error_ends_the_file() {
        let models = parse_models("model: [unclosed");
        assert!(!models.is_empty() && models.len() <= 2);
        assert!(models.iter().all(|m| m.is_err()));
        assert!(matches!(models.last(), Some(Err(ModelError::Yaml(_)))));

        let text = format!("{}---\nmodel: [unclosed\n---\n{}", TEXT, TEXT);
        let models = parse_models(&text);
        assert!(models.len() <= 3);
        assert!(matches!(models.last(), Some(Err(ModelError::Yaml(_)))));
    }
}
