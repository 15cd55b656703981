use crate::models::{PlanInputs, TimeOfDay};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const FEATURE_COUNT: usize = 8;

/// Encoded model input:
/// `[duration, morning, afternoon, evening, night, concentration, days_since_last, previous_rating]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn encode(inputs: &PlanInputs) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        values[0] = inputs.total_duration_minutes as f64;
        for (i, tod) in TimeOfDay::ALL.iter().enumerate() {
            if *tod == inputs.time_of_day {
                values[1 + i] = 1.0;
            }
        }
        values[5] = inputs.concentration;
        values[6] = inputs.days_since_last_session as f64;
        values[7] = inputs.previous_session_rating;
        Self(values)
    }
}

/// Raw, unclamped model output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub work_minutes: f64,
    pub break_minutes: f64,
    pub next_session_hours: f64,
}

pub trait Predictor {
    fn predict(&self, features: &FeatureVector) -> Prediction;
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model file not found at {0}; re-run the training notebook to export model.json there")]
    Missing(PathBuf),
    #[error("failed to read model file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid model file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model head '{head}' has {got} coefficients, expected 8")]
    Shape { head: &'static str, got: usize },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LinearHead {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearHead {
    fn eval(&self, features: &FeatureVector) -> f64 {
        self.coefficients
            .iter()
            .zip(features.0.iter())
            .map(|(c, x)| c * x)
            .sum::<f64>()
            + self.intercept
    }
}

/// Ridge regression exported as one linear head per target.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RidgeModel {
    pub work_minutes: LinearHead,
    pub break_minutes: LinearHead,
    pub next_session_hours: LinearHead,
}

impl RidgeModel {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::Missing(path.to_path_buf()));
        }
        let data = fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_json(&data)?;
        log::info!("Loaded ridge model from {}", path.display());
        Ok(model)
    }

    pub fn from_json(data: &str) -> Result<Self, ModelError> {
        let model: RidgeModel = serde_json::from_str(data)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), ModelError> {
        for (head, lin) in [
            ("work_minutes", &self.work_minutes),
            ("break_minutes", &self.break_minutes),
            ("next_session_hours", &self.next_session_hours),
        ] {
            if lin.coefficients.len() != FEATURE_COUNT {
                return Err(ModelError::Shape {
                    head,
                    got: lin.coefficients.len(),
                });
            }
        }
        Ok(())
    }
}

impl Predictor for RidgeModel {
    fn predict(&self, features: &FeatureVector) -> Prediction {
        Prediction {
            work_minutes: self.work_minutes.eval(features),
            break_minutes: self.break_minutes.eval(features),
            next_session_hours: self.next_session_hours.eval(features),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    fn head(intercept: f64) -> LinearHead {
        LinearHead {
            coefficients: vec![0.0; FEATURE_COUNT],
            intercept,
        }
    }

    #[test]
    fn test_encode_one_hot() {
        let inputs = PlanInputs::new(120, TimeOfDay::Evening, 7.0, 2, 6.5).unwrap();
        let fv = FeatureVector::encode(&inputs);
        assert_eq!(fv.0, [120.0, 0.0, 0.0, 1.0, 0.0, 7.0, 2.0, 6.5]);
    }

    #[test]
    fn test_ridge_predict() {
        let mut work = head(10.0);
        work.coefficients[0] = 0.1;
        work.coefficients[5] = 2.0;
        let model = RidgeModel {
            work_minutes: work,
            break_minutes: head(7.5),
            next_session_hours: head(24.0),
        };
        let inputs = PlanInputs::new(100, TimeOfDay::Morning, 5.0, 0, 5.0).unwrap();
        let p = model.predict(&FeatureVector::encode(&inputs));
        assert!((p.work_minutes - 30.0).abs() < 1e-9);
        assert_eq!(p.break_minutes, 7.5);
        assert_eq!(p.next_session_hours, 24.0);
    }

    #[test]
    fn test_load_missing() {
        let dir = tempdir().unwrap();
        let err = RidgeModel::load(&dir.path().join("model.json")).unwrap_err();
        assert!(matches!(err, ModelError::Missing(_)));
        assert!(err.to_string().contains("re-run the training"));
    }

    #[test]
    fn test_demo_model_loads() -> Result<()> {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/model.json");
        let model = RidgeModel::load(&path)?;
        let inputs = PlanInputs::new(120, TimeOfDay::Morning, 7.0, 1, 6.0)?;
        let p = model.predict(&FeatureVector::encode(&inputs));
        assert!((p.work_minutes - 38.6).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_load_roundtrip_and_shape() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("model.json");
        let model = RidgeModel {
            work_minutes: head(25.0),
            break_minutes: head(5.0),
            next_session_hours: head(12.0),
        };
        fs::write(&path, serde_json::to_string(&model)?)?;
        assert_eq!(RidgeModel::load(&path)?, model);

        let mut bad = model.clone();
        bad.break_minutes.coefficients.pop();
        let err = RidgeModel::from_json(&serde_json::to_string(&bad)?).unwrap_err();
        assert!(matches!(
            err,
            ModelError::Shape {
                head: "break_minutes",
                got: 7
            }
        ));
        Ok(())
    }
}
