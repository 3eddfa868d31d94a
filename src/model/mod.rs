//! Model artifacts and the pretrained regression model.
//!
//! The artifacts are loaded once at startup and shared read-only for the
//! process lifetime: the ordered feature-column list, the categorical
//! column names, and the serialized regressor itself.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub mod adapter;

use crate::normalize::FeatureValue;

/// Feature schema the regressor was trained against
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    /// Column names in training order
    pub columns: Vec<String>,
    /// Names of the categorical columns
    pub categorical: HashSet<String>,
}

impl ModelArtifacts {
    /// Load the schema files produced by the training notebook
    pub fn load(features_path: &Path, categorical_path: &Path) -> Result<Self> {
        let columns: Vec<String> = read_json(features_path)
            .with_context(|| format!("loading feature list from {}", features_path.display()))?;

        let categorical_list: Vec<String> = read_json(categorical_path).with_context(|| {
            format!("loading categorical list from {}", categorical_path.display())
        })?;

        if columns.is_empty() {
            anyhow::bail!("feature list is empty");
        }

        let categorical: HashSet<String> = categorical_list.into_iter().collect();
        for name in &categorical {
            if !columns.iter().any(|c| c == name) {
                anyhow::bail!("categorical column '{}' is not in the feature list", name);
            }
        }

        info!(
            "Model schema loaded: {} columns, {} categorical",
            columns.len(),
            categorical.len()
        );

        Ok(Self { columns, categorical })
    }

    pub fn is_categorical(&self, column: &str) -> bool {
        self.categorical.contains(column)
    }
}

/// A pretrained price regressor.
///
/// `predict` takes one feature row ordered exactly as
/// [`ModelArtifacts::columns`] and returns the log-scale price per meter.
pub trait PriceModel: Send + Sync {
    fn predict(&self, row: &[FeatureValue]) -> Result<f64>;
}

/// Regressor exported from the training pipeline as a JSON artifact:
/// an intercept, per-column numeric coefficients and per-level scores
/// for categorical columns.
#[derive(Debug, Deserialize)]
pub struct SerializedModel {
    intercept: f64,
    #[serde(default)]
    coefficients: HashMap<String, f64>,
    #[serde(default)]
    categorical_scores: HashMap<String, HashMap<String, f64>>,
    #[serde(skip)]
    artifacts: Option<Arc<ModelArtifacts>>,
}

impl SerializedModel {
    /// Load the serialized regressor and bind it to the feature schema
    pub fn load(path: &Path, artifacts: Arc<ModelArtifacts>) -> Result<Self> {
        let mut model: SerializedModel = read_json(path)
            .with_context(|| format!("loading price model from {}", path.display()))?;

        model.artifacts = Some(artifacts);
        info!("Price model loaded from {}", path.display());
        Ok(model)
    }

    #[cfg(test)]
    pub fn from_parts(
        intercept: f64,
        coefficients: HashMap<String, f64>,
        categorical_scores: HashMap<String, HashMap<String, f64>>,
        artifacts: Arc<ModelArtifacts>,
    ) -> Self {
        Self {
            intercept,
            coefficients,
            categorical_scores,
            artifacts: Some(artifacts),
        }
    }

    fn artifacts(&self) -> Result<&ModelArtifacts> {
        self.artifacts
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("model is not bound to a feature schema"))
    }
}

impl PriceModel for SerializedModel {
    fn predict(&self, row: &[FeatureValue]) -> Result<f64> {
        let artifacts = self.artifacts()?;

        if row.len() != artifacts.columns.len() {
            anyhow::bail!(
                "feature row has {} values, schema declares {}",
                row.len(),
                artifacts.columns.len()
            );
        }

        let mut total = self.intercept;

        for (column, value) in artifacts.columns.iter().zip(row) {
            if artifacts.is_categorical(column) {
                let level = value.to_display_string();
                if let Some(score) = self
                    .categorical_scores
                    .get(column)
                    .and_then(|scores| scores.get(&level))
                {
                    total += score;
                }
            } else if let Some(coefficient) = self.coefficients.get(column) {
                total += coefficient * value.as_f64().unwrap_or(0.0);
            }
        }

        Ok(total)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn artifacts() -> Arc<ModelArtifacts> {
        Arc::new(ModelArtifacts {
            columns: vec![
                "TotalArea".to_string(),
                "Floor".to_string(),
                "District".to_string(),
            ],
            categorical: HashSet::from(["District".to_string()]),
        })
    }

    fn write_json(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_artifacts_load() {
        let features = write_json(r#"["TotalArea", "Floor", "District"]"#);
        let categorical = write_json(r#"["District"]"#);

        let artifacts = ModelArtifacts::load(features.path(), categorical.path()).unwrap();
        assert_eq!(artifacts.columns.len(), 3);
        assert!(artifacts.is_categorical("District"));
        assert!(!artifacts.is_categorical("Floor"));
    }

    #[test]
    fn test_artifacts_reject_unknown_categorical() {
        let features = write_json(r#"["TotalArea"]"#);
        let categorical = write_json(r#"["District"]"#);
        assert!(ModelArtifacts::load(features.path(), categorical.path()).is_err());
    }

    #[test]
    fn test_serialized_model_predicts() {
        let model_file = write_json(
            r#"{
                "intercept": 11.0,
                "coefficients": {"TotalArea": 0.01, "Floor": 0.002},
                "categorical_scores": {"District": {"Бутово": -0.1}}
            }"#,
        );

        let model = SerializedModel::load(model_file.path(), artifacts()).unwrap();
        let row = vec![
            FeatureValue::Float(64.2),
            FeatureValue::Float(7.0),
            FeatureValue::Text("Бутово".to_string()),
        ];

        let expected = 11.0 + 0.01 * 64.2 + 0.002 * 7.0 - 0.1;
        let predicted = model.predict(&row).unwrap();
        assert!((predicted - expected).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_categorical_level_scores_zero() {
        let model = SerializedModel::from_parts(
            10.0,
            HashMap::new(),
            HashMap::from([(
                "District".to_string(),
                HashMap::from([("Бутово".to_string(), 0.5)]),
            )]),
            artifacts(),
        );

        let row = vec![
            FeatureValue::Float(0.0),
            FeatureValue::Float(0.0),
            FeatureValue::Text("0".to_string()),
        ];
        assert!((model.predict(&row).unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_wrong_row_length_is_rejected() {
        let model =
            SerializedModel::from_parts(10.0, HashMap::new(), HashMap::new(), artifacts());
        assert!(model.predict(&[FeatureValue::Float(1.0)]).is_err());
    }
}
