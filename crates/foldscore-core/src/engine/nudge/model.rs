use super::features::FEATURE_COUNT;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredictError {
    #[error("Delta model is unavailable: {0}")]
    Unavailable(String),

    #[error("Feature vector has {found} entries but the model expects {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Delta model produced a non-finite prediction")]
    NonFinite,
}

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("Failed to read delta model '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse delta model '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Delta model has {found} weights, expected {expected}")]
    Dimension { expected: usize, found: usize },
}

/// Predicts the change in score a candidate move would cause from its
/// feature vector.
///
/// Predictions only rank candidates; the reported ΔScore always comes from an
/// exact rescore.
pub trait DeltaModel: Send + Sync + fmt::Debug {
    fn predict(&self, features: &[f64]) -> Result<f64, PredictError>;

    fn name(&self) -> &str {
        "delta-model"
    }
}

/// A linear model `w·x + b` over the standard feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearDeltaModel {
    pub weights: Vec<f64>,
    #[serde(default)]
    pub bias: f64,
}

impl LinearDeltaModel {
    pub fn new(weights: Vec<f64>, bias: f64) -> Result<Self, ModelLoadError> {
        if weights.len() != FEATURE_COUNT {
            return Err(ModelLoadError::Dimension {
                expected: FEATURE_COUNT,
                found: weights.len(),
            });
        }
        Ok(Self { weights, bias })
    }

    pub fn load(path: &Path) -> Result<Self, ModelLoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model: Self = serde_json::from_str(&text).map_err(|source| ModelLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(model.weights, model.bias)
    }
}

impl DeltaModel for LinearDeltaModel {
    fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
        if features.len() != self.weights.len() {
            return Err(PredictError::DimensionMismatch {
                expected: self.weights.len(),
                found: features.len(),
            });
        }
        let value = self
            .weights
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(PredictError::NonFinite)
        }
    }

    fn name(&self) -> &str {
        "linear"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn unit_model(slot: usize) -> LinearDeltaModel {
        let mut weights = vec![0.0; FEATURE_COUNT];
        weights[slot] = 2.0;
        LinearDeltaModel::new(weights, 0.5).unwrap()
    }

    #[test]
    fn predicts_weighted_sum_plus_bias() {
        let model = unit_model(3);
        let mut x = vec![1.0; FEATURE_COUNT];
        x[3] = 4.0;
        assert_eq!(model.predict(&x).unwrap(), 8.5);
    }

    #[test]
    fn rejects_wrong_dimension() {
        let model = unit_model(0);
        assert_eq!(
            model.predict(&[1.0, 2.0]),
            Err(PredictError::DimensionMismatch {
                expected: FEATURE_COUNT,
                found: 2
            })
        );
        assert!(matches!(
            LinearDeltaModel::new(vec![1.0; 3], 0.0),
            Err(ModelLoadError::Dimension { found: 3, .. })
        ));
    }

    #[test]
    fn non_finite_prediction_is_an_error() {
        let model = unit_model(0);
        let mut x = vec![0.0; FEATURE_COUNT];
        x[0] = f64::INFINITY;
        assert_eq!(model.predict(&x), Err(PredictError::NonFinite));
    }

    #[test]
    fn load_reads_json_weights() {
        let mut file = NamedTempFile::new().unwrap();
        let weights = vec![0.25; FEATURE_COUNT];
        write!(file, "{}", serde_json::json!({ "weights": weights, "bias": -1.0 })).unwrap();
        let model = LinearDeltaModel::load(file.path()).unwrap();
        assert_eq!(model.bias, -1.0);
        assert_eq!(model.weights.len(), FEATURE_COUNT);
    }

    #[test]
    fn load_reports_missing_file_and_bad_json() {
        let missing = LinearDeltaModel::load(Path::new("/nonexistent/model.json"));
        assert!(matches!(missing, Err(ModelLoadError::Io { .. })));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ \"weights\": \"nope\" }}").unwrap();
        assert!(matches!(
            LinearDeltaModel::load(file.path()),
            Err(ModelLoadError::Parse { .. })
        ));
    }
}
