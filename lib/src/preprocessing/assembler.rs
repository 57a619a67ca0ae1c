//! Feature assembly.
//!
//! Output layout is `numeric ++ flags ++ one-hot blocks`, each part in schema
//! order and each block in vocabulary order. The model was trained on exactly
//! this layout; nothing downstream can detect a permutation.

use std::collections::HashMap;

use ndarray::{Array1, ArrayView1};

use crate::error::PredictionError;
use crate::preprocessing::encoding::{FittedOneHotEncoder, OneHotBlock};
use crate::preprocessing::traits::FittedStep;
use crate::schema::FeatureSchema;

/// The fixed-width numeric input of a price model.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureVector(Array1<f64>);

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn view(&self) -> ArrayView1<'_, f64> {
        self.0.view()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }

    pub fn into_inner(self) -> Array1<f64> {
        self.0
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(Array1::from_vec(values))
    }
}

impl From<Array1<f64>> for FeatureVector {
    fn from(values: Array1<f64>) -> Self {
        Self(values)
    }
}

/// Concatenates the outputs of the imputer, the flags and the encoder.
#[derive(Clone, Debug)]
pub struct FeatureAssembler {
    numeric: Vec<String>,
    flags: Vec<String>,
    block_widths: Vec<usize>,
    feature_names: Vec<String>,
}

impl FeatureAssembler {
    /// Build the layout for `schema`, taking block widths from `encoder`.
    ///
    /// The encoder's columns are expected to already match the schema's
    /// categorical group; [`crate::artifact::LoadedArtifact`] checks that.
    pub fn new(schema: &FeatureSchema, encoder: &FittedOneHotEncoder) -> Self {
        let feature_names = schema
            .numeric()
            .iter()
            .chain(schema.flags())
            .cloned()
            .chain(encoder.feature_names_out())
            .collect();

        Self {
            numeric: schema.numeric().to_vec(),
            flags: schema.flags().to_vec(),
            block_widths: encoder.block_widths(),
            feature_names,
        }
    }

    /// `|numeric| + |flags| + Σ block widths`.
    pub fn width(&self) -> usize {
        self.numeric.len() + self.flags.len() + self.block_widths.iter().sum::<usize>()
    }

    /// Name of every output position.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Lay out one request's values as a feature vector.
    pub fn assemble(
        &self,
        numeric: &HashMap<String, f64>,
        flags: &HashMap<String, f64>,
        blocks: &[OneHotBlock],
    ) -> Result<FeatureVector, PredictionError> {
        if blocks.len() != self.block_widths.len() {
            return Err(PredictionError::ShapeMismatch {
                context: "one-hot block count",
                expected: self.block_widths.len(),
                got: blocks.len(),
            });
        }

        let mut values = Vec::with_capacity(self.width());

        for column in &self.numeric {
            let value = numeric
                .get(column)
                .ok_or_else(|| PredictionError::MissingFeature(column.clone()))?;
            values.push(*value);
        }

        for column in &self.flags {
            let value = flags
                .get(column)
                .ok_or_else(|| PredictionError::MissingFeature(column.clone()))?;
            values.push(*value);
        }

        for (block, &expected) in blocks.iter().zip(&self.block_widths) {
            if block.width() != expected {
                return Err(PredictionError::ShapeMismatch {
                    context: "one-hot block width",
                    expected,
                    got: block.width(),
                });
            }
            values.extend_from_slice(block.values());
        }

        if values.len() != self.width() {
            return Err(PredictionError::ShapeMismatch {
                context: "assembled feature vector",
                expected: self.width(),
                got: values.len(),
            });
        }

        Ok(FeatureVector::from(values))
    }
}

/// Width the assembler will produce for `schema` with `encoder`.
pub fn expected_width(schema: &FeatureSchema, encoder: &FittedOneHotEncoder) -> usize {
    schema.numeric().len() + schema.flags().len() + encoder.n_features_out()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::encoding::{HandleUnknown, OneHotEncoderParams};

    fn setup() -> (FeatureSchema, FittedOneHotEncoder) {
        let schema = FeatureSchema::new(
            ["total_area_sqm", "nbr_bedrooms"],
            ["fl_garden", "fl_terrace"],
            ["epc", "region"],
        )
        .unwrap();
        let encoder = FittedOneHotEncoder::from_params(OneHotEncoderParams {
            columns: vec!["epc".into(), "region".into()],
            categories: vec![
                vec!["A".into(), "B".into(), "C".into()],
                vec!["Flanders".into(), "Wallonia".into()],
            ],
            handle_unknown: HandleUnknown::Ignore,
        })
        .unwrap();
        (schema, encoder)
    }

    fn numeric() -> HashMap<String, f64> {
        HashMap::from([
            ("total_area_sqm".to_string(), 150.0),
            ("nbr_bedrooms".to_string(), 3.0),
        ])
    }

    fn flags() -> HashMap<String, f64> {
        HashMap::from([
            ("fl_garden".to_string(), 1.0),
            ("fl_terrace".to_string(), 0.0),
        ])
    }

    #[test]
    fn test_layout_and_order() {
        let (schema, encoder) = setup();
        let assembler = FeatureAssembler::new(&schema, &encoder);
        let categorical = HashMap::from([
            ("epc".to_string(), "C".to_string()),
            ("region".to_string(), "Flanders".to_string()),
        ]);
        let encoded = encoder.encode(&categorical).unwrap();

        let vector = assembler
            .assemble(&numeric(), &flags(), &encoded.blocks)
            .unwrap();

        assert_eq!(assembler.width(), 2 + 2 + 3 + 2);
        assert_eq!(vector.len(), assembler.width());
        assert_eq!(
            vector.to_vec(),
            vec![150.0, 3.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0]
        );
        assert_eq!(expected_width(&schema, &encoder), assembler.width());
    }

    #[test]
    fn test_feature_names_match_positions() {
        let (schema, encoder) = setup();
        let assembler = FeatureAssembler::new(&schema, &encoder);
        assert_eq!(
            assembler.feature_names(),
            &[
                "total_area_sqm",
                "nbr_bedrooms",
                "fl_garden",
                "fl_terrace",
                "epc_A",
                "epc_B",
                "epc_C",
                "region_Flanders",
                "region_Wallonia",
            ]
        );
        assert_eq!(assembler.feature_names().len(), assembler.width());
    }

    #[test]
    fn test_unknown_category_keeps_width() {
        let (schema, encoder) = setup();
        let assembler = FeatureAssembler::new(&schema, &encoder);
        let categorical = HashMap::from([
            ("epc".to_string(), "G".to_string()),
            ("region".to_string(), "Atlantis".to_string()),
        ]);
        let encoded = encoder.encode(&categorical).unwrap();
        let vector = assembler
            .assemble(&numeric(), &flags(), &encoded.blocks)
            .unwrap();
        assert_eq!(vector.len(), assembler.width());
        assert!(vector.to_vec()[4..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_missing_flag_names_column() {
        let (schema, encoder) = setup();
        let assembler = FeatureAssembler::new(&schema, &encoder);
        let mut flags = flags();
        flags.remove("fl_terrace");
        let blocks = encoder
            .encode(&HashMap::from([
                ("epc".to_string(), "A".to_string()),
                ("region".to_string(), "Wallonia".to_string()),
            ]))
            .unwrap()
            .blocks;

        let err = assembler.assemble(&numeric(), &flags, &blocks).unwrap_err();
        assert!(matches!(err, PredictionError::MissingFeature(c) if c == "fl_terrace"));
    }

    #[test]
    fn test_block_count_mismatch() {
        let (schema, encoder) = setup();
        let assembler = FeatureAssembler::new(&schema, &encoder);
        let err = assembler.assemble(&numeric(), &flags(), &[]).unwrap_err();
        assert!(matches!(
            err,
            PredictionError::ShapeMismatch {
                expected: 2,
                got: 0,
                ..
            }
        ));
    }
}
