//! One-hot encoding for categorical features.
//!
//! Each categorical column owns an ordered vocabulary learned at training time.
//! A value becomes a block as wide as that vocabulary, with a single 1 at the
//! value's position.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, PredictionError};
use crate::preprocessing::encoding::HandleUnknown;
use crate::preprocessing::traits::FittedStep;

/// Serializable parameters for a fitted OneHotEncoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoderParams {
    /// Categorical columns, in schema order.
    pub columns: Vec<String>,
    /// Vocabulary for each column, in block order.
    pub categories: Vec<Vec<String>>,
    /// Handle unknown strategy.
    #[serde(default)]
    pub handle_unknown: HandleUnknown,
}

/// Indicator block for one categorical column.
#[derive(Clone, Debug, PartialEq)]
pub struct OneHotBlock {
    values: Vec<f64>,
}

impl OneHotBlock {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn width(&self) -> usize {
        self.values.len()
    }

    /// Position of the hot entry; `None` for an all-zero block.
    pub fn hot_index(&self) -> Option<usize> {
        self.values.iter().position(|&v| v == 1.0)
    }

    pub fn is_zero(&self) -> bool {
        self.hot_index().is_none()
    }
}

/// A value outside its column's vocabulary that was encoded as a zero block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownCategory {
    pub column: String,
    pub value: String,
}

/// Output of [`FittedOneHotEncoder::encode`].
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedCategories {
    /// One block per column, in column order.
    pub blocks: Vec<OneHotBlock>,
    /// Values that hit the ignore policy.
    pub unknown: Vec<UnknownCategory>,
}

/// Fitted OneHotEncoder ready for inference.
#[derive(Clone, Debug)]
pub struct FittedOneHotEncoder {
    columns: Vec<String>,
    /// Categories for each column, in vocabulary order.
    categories: Vec<Vec<String>>,
    /// Category to position, per column.
    index: Vec<HashMap<String, usize>>,
    n_features_out: usize,
    handle_unknown: HandleUnknown,
}

impl FittedOneHotEncoder {
    /// Get the categories learned for each column.
    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    /// Vocabulary of `column`, if the encoder knows it.
    pub fn vocabulary(&self, column: &str) -> Option<&[String]> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.categories[i].as_slice())
    }

    /// Width of each column's block.
    pub fn block_widths(&self) -> Vec<usize> {
        self.categories.iter().map(Vec::len).collect()
    }

    pub fn handle_unknown(&self) -> HandleUnknown {
        self.handle_unknown
    }

    /// Output names, `<column>_<category>` in block order.
    pub fn feature_names_out(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(&self.categories)
            .flat_map(|(column, cats)| cats.iter().map(move |cat| format!("{column}_{cat}")))
            .collect()
    }

    /// Encode one value per column.
    ///
    /// Unknown values produce an all-zero block under [`HandleUnknown::Ignore`]
    /// and fail under [`HandleUnknown::Error`].
    pub fn encode(
        &self,
        values: &HashMap<String, String>,
    ) -> Result<EncodedCategories, PredictionError> {
        let mut blocks = Vec::with_capacity(self.columns.len());
        let mut unknown = Vec::new();

        for (col, column) in self.columns.iter().enumerate() {
            let value = values
                .get(column)
                .ok_or_else(|| PredictionError::MissingFeature(column.clone()))?;

            let mut block = vec![0.0; self.categories[col].len()];
            match self.index[col].get(value) {
                Some(&idx) => block[idx] = 1.0,
                None => match self.handle_unknown {
                    HandleUnknown::Error => {
                        return Err(PredictionError::UnknownCategory {
                            column: column.clone(),
                            value: value.clone(),
                        });
                    }
                    HandleUnknown::Ignore => {
                        tracing::warn!(
                            column = %column,
                            value = %value,
                            "unknown category, encoding as zero block"
                        );
                        unknown.push(UnknownCategory {
                            column: column.clone(),
                            value: value.clone(),
                        });
                    }
                },
            }
            blocks.push(OneHotBlock { values: block });
        }

        Ok(EncodedCategories { blocks, unknown })
    }
}

impl FittedStep for FittedOneHotEncoder {
    type Params = OneHotEncoderParams;

    fn extract_params(&self) -> Self::Params {
        OneHotEncoderParams {
            columns: self.columns.clone(),
            categories: self.categories.clone(),
            handle_unknown: self.handle_unknown,
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, ConfigurationError> {
        if params.columns.len() != params.categories.len() {
            return Err(ConfigurationError::InvalidParameters {
                component: "encoder",
                reason: format!(
                    "{} columns but {} vocabularies",
                    params.columns.len(),
                    params.categories.len()
                ),
            });
        }

        let mut seen = HashSet::with_capacity(params.columns.len());
        let mut index = Vec::with_capacity(params.columns.len());
        for (column, cats) in params.columns.iter().zip(&params.categories) {
            if !seen.insert(column.as_str()) {
                return Err(ConfigurationError::InvalidParameters {
                    component: "encoder",
                    reason: format!("column `{column}` listed twice"),
                });
            }
            if cats.is_empty() {
                return Err(ConfigurationError::InvalidVocabulary {
                    column: column.clone(),
                    reason: "vocabulary is empty".to_string(),
                });
            }
            let mut positions = HashMap::with_capacity(cats.len());
            for (i, cat) in cats.iter().enumerate() {
                if positions.insert(cat.clone(), i).is_some() {
                    return Err(ConfigurationError::InvalidVocabulary {
                        column: column.clone(),
                        reason: format!("category `{cat}` listed twice"),
                    });
                }
            }
            index.push(positions);
        }

        let n_features_out = params.categories.iter().map(Vec::len).sum();

        Ok(Self {
            columns: params.columns,
            categories: params.categories,
            index,
            n_features_out,
            handle_unknown: params.handle_unknown,
        })
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn n_features_out(&self) -> usize {
        self.n_features_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(handle_unknown: HandleUnknown) -> OneHotEncoderParams {
        OneHotEncoderParams {
            columns: vec!["province".into(), "region".into()],
            categories: vec![
                vec!["Antwerp".into(), "Brussels".into(), "Liège".into()],
                vec!["Brussels-Capital".into(), "Flanders".into()],
            ],
            handle_unknown,
        }
    }

    fn values(province: &str, region: &str) -> HashMap<String, String> {
        HashMap::from([
            ("province".to_string(), province.to_string()),
            ("region".to_string(), region.to_string()),
        ])
    }

    #[test]
    fn test_one_hot_encoder_blocks() {
        let fitted = FittedOneHotEncoder::from_params(params(HandleUnknown::Ignore)).unwrap();

        assert_eq!(fitted.n_features_in(), 2);
        assert_eq!(fitted.n_features_out(), 5);
        assert_eq!(fitted.block_widths(), vec![3, 2]);

        let encoded = fitted.encode(&values("Brussels", "Flanders")).unwrap();
        assert_eq!(encoded.blocks[0].values(), &[0.0, 1.0, 0.0]);
        assert_eq!(encoded.blocks[1].values(), &[0.0, 1.0]);
        assert!(encoded.unknown.is_empty());
    }

    #[test]
    fn test_one_hot_encoder_unknown_ignore() {
        let fitted = FittedOneHotEncoder::from_params(params(HandleUnknown::Ignore)).unwrap();

        let encoded = fitted.encode(&values("Atlantis", "Flanders")).unwrap();
        assert!(encoded.blocks[0].is_zero());
        assert_eq!(encoded.blocks[0].width(), 3);
        assert_eq!(encoded.blocks[1].hot_index(), Some(1));
        assert_eq!(
            encoded.unknown,
            vec![UnknownCategory {
                column: "province".into(),
                value: "Atlantis".into()
            }]
        );
    }

    #[test]
    fn test_one_hot_encoder_unknown_ignored_in_every_column() {
        let fitted = FittedOneHotEncoder::from_params(params(HandleUnknown::Ignore)).unwrap();

        let encoded = fitted.encode(&values("Atlantis", "Mordor")).unwrap();
        assert!(encoded.blocks.iter().all(OneHotBlock::is_zero));
        assert_eq!(encoded.unknown.len(), 2);
    }

    #[test]
    fn test_one_hot_encoder_unknown_error() {
        let fitted = FittedOneHotEncoder::from_params(params(HandleUnknown::Error)).unwrap();

        let err = fitted.encode(&values("Brussels", "Mordor")).unwrap_err();
        assert!(matches!(
            err,
            PredictionError::UnknownCategory { ref column, ref value }
                if column == "region" && value == "Mordor"
        ));
    }

    #[test]
    fn test_encoding_is_case_sensitive() {
        let fitted = FittedOneHotEncoder::from_params(params(HandleUnknown::Ignore)).unwrap();
        let encoded = fitted.encode(&values("brussels", "Flanders")).unwrap();
        assert!(encoded.blocks[0].is_zero());
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let fitted = FittedOneHotEncoder::from_params(params(HandleUnknown::Ignore)).unwrap();
        let first = fitted.encode(&values("Liège", "Brussels-Capital")).unwrap();
        fitted.encode(&values("Antwerp", "Flanders")).unwrap();
        let again = fitted.encode(&values("Liège", "Brussels-Capital")).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_feature_names_out() {
        let fitted = FittedOneHotEncoder::from_params(params(HandleUnknown::Ignore)).unwrap();
        assert_eq!(
            fitted.feature_names_out(),
            vec![
                "province_Antwerp",
                "province_Brussels",
                "province_Liège",
                "region_Brussels-Capital",
                "region_Flanders",
            ]
        );
    }

    #[test]
    fn test_from_params_rejects_empty_vocabulary() {
        let mut p = params(HandleUnknown::Ignore);
        p.categories[1].clear();
        let err = FittedOneHotEncoder::from_params(p).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidVocabulary { column, .. } if column == "region"
        ));
    }

    #[test]
    fn test_from_params_rejects_duplicate_category() {
        let mut p = params(HandleUnknown::Ignore);
        p.categories[0].push("Antwerp".into());
        assert!(FittedOneHotEncoder::from_params(p).is_err());
    }

    #[test]
    fn test_handle_unknown_defaults_to_ignore() {
        let json = r#"{"columns":["epc"],"categories":[["A","B"]]}"#;
        let p: OneHotEncoderParams = serde_json::from_str(json).unwrap();
        assert_eq!(p.handle_unknown, HandleUnknown::Ignore);
    }

    #[test]
    fn test_save_and_load() {
        let fitted = FittedOneHotEncoder::from_params(params(HandleUnknown::Error)).unwrap();
        let path = std::env::temp_dir().join("immo_price_encoder.json");
        fitted.save_to_file(&path).unwrap();
        let loaded = FittedOneHotEncoder::load_from_file(&path).unwrap();
        assert_eq!(loaded.categories(), fitted.categories());
        assert_eq!(loaded.handle_unknown(), HandleUnknown::Error);
        std::fs::remove_file(&path).ok();
    }
}
