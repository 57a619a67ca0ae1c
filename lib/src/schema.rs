//! Feature schema: the three disjoint attribute groups and their order.
//!
//! The final feature vector is always laid out as
//! `numeric ++ flags ++ one-hot(categorical)`, each group in declaration order.
//! The order is baked into the trained model, so a [`FeatureSchema`] is
//! immutable once loaded and is cross-checked against the learned components
//! in [`crate::artifact::LoadedArtifact`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Which group a column belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureGroup {
    Numeric,
    Flag,
    Categorical,
}

impl FeatureGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureGroup::Numeric => "numeric",
            FeatureGroup::Flag => "flag",
            FeatureGroup::Categorical => "categorical",
        }
    }
}

const STANDARD_NUMERIC: [&str; 8] = [
    "nbr_frontages",
    "nbr_bedrooms",
    "latitude",
    "longitude",
    "total_area_sqm",
    "surface_land_sqm",
    "terrace_sqm",
    "garden_sqm",
];

const STANDARD_FLAGS: [&str; 3] = ["fl_terrace", "fl_garden", "fl_swimming_pool"];

const STANDARD_CATEGORICAL: [&str; 8] = [
    "province",
    "heating_type",
    "state_building",
    "property_type",
    "epc",
    "locality",
    "subproperty_type",
    "region",
];

/// Ordered declaration of numeric, flag and categorical columns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    numeric: Vec<String>,
    flags: Vec<String>,
    categorical: Vec<String>,
}

impl FeatureSchema {
    /// Build a schema, rejecting duplicates and overlapping groups.
    pub fn new<S: Into<String>>(
        numeric: impl IntoIterator<Item = S>,
        flags: impl IntoIterator<Item = S>,
        categorical: impl IntoIterator<Item = S>,
    ) -> Result<Self, ConfigurationError> {
        let schema = Self {
            numeric: numeric.into_iter().map(Into::into).collect(),
            flags: flags.into_iter().map(Into::into).collect(),
            categorical: categorical.into_iter().map(Into::into).collect(),
        };
        schema.validate()?;
        Ok(schema)
    }

    /// The column set the production estimator is trained on.
    pub fn standard() -> Self {
        Self {
            numeric: STANDARD_NUMERIC.iter().map(|s| s.to_string()).collect(),
            flags: STANDARD_FLAGS.iter().map(|s| s.to_string()).collect(),
            categorical: STANDARD_CATEGORICAL.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Check the group invariants. Deserialized schemas must pass this before use.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let mut seen: Vec<(HashSet<&str>, FeatureGroup)> = Vec::with_capacity(3);

        for (group, columns) in self.groups() {
            let mut own = HashSet::with_capacity(columns.len());
            for column in columns {
                if column.is_empty() {
                    return Err(ConfigurationError::EmptyColumnName {
                        group: group.as_str(),
                    });
                }
                if !own.insert(column.as_str()) {
                    return Err(ConfigurationError::DuplicateColumn {
                        column: column.clone(),
                        group: group.as_str(),
                    });
                }
                if let Some((_, other)) = seen
                    .iter()
                    .find(|(set, _)| set.contains(column.as_str()))
                {
                    return Err(ConfigurationError::OverlappingGroups {
                        column: column.clone(),
                        first: other.as_str(),
                        second: group.as_str(),
                    });
                }
            }
            seen.push((own, group));
        }

        Ok(())
    }

    pub fn numeric(&self) -> &[String] {
        &self.numeric
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn categorical(&self) -> &[String] {
        &self.categorical
    }

    /// Groups in feature-vector order.
    pub fn groups(&self) -> [(FeatureGroup, &[String]); 3] {
        [
            (FeatureGroup::Numeric, self.numeric.as_slice()),
            (FeatureGroup::Flag, self.flags.as_slice()),
            (FeatureGroup::Categorical, self.categorical.as_slice()),
        ]
    }

    /// Which group declares `column`, if any.
    pub fn group_of(&self, column: &str) -> Option<FeatureGroup> {
        self.groups()
            .into_iter()
            .find(|(_, columns)| columns.iter().any(|c| c == column))
            .map(|(group, _)| group)
    }

    /// Every declared column, in feature-vector order.
    pub fn columns(&self) -> impl Iterator<Item = (FeatureGroup, &str)> {
        self.numeric
            .iter()
            .map(|c| (FeatureGroup::Numeric, c.as_str()))
            .chain(self.flags.iter().map(|c| (FeatureGroup::Flag, c.as_str())))
            .chain(
                self.categorical
                    .iter()
                    .map(|c| (FeatureGroup::Categorical, c.as_str())),
            )
    }

    /// Number of declared columns across all groups.
    pub fn n_columns(&self) -> usize {
        self.numeric.len() + self.flags.len() + self.categorical.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_schema_is_valid() {
        let schema = FeatureSchema::standard();
        assert!(schema.validate().is_ok());
        assert_eq!(schema.numeric().len(), 8);
        assert_eq!(schema.flags().len(), 3);
        assert_eq!(schema.categorical().len(), 8);
        assert_eq!(schema.n_columns(), 19);
    }

    #[test]
    fn test_overlapping_groups_rejected() {
        let result = FeatureSchema::new(["area", "garden"], ["garden"], ["region"]);
        assert!(matches!(
            result,
            Err(ConfigurationError::OverlappingGroups {
                first: "numeric",
                second: "flag",
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let result = FeatureSchema::new(["area"], [], ["region", "region"]);
        assert!(matches!(
            result,
            Err(ConfigurationError::DuplicateColumn {
                group: "categorical",
                ..
            })
        ));
    }

    #[test]
    fn test_empty_column_name_rejected() {
        let result = FeatureSchema::new(["area", ""], [], []);
        assert!(matches!(
            result,
            Err(ConfigurationError::EmptyColumnName { group: "numeric" })
        ));
    }

    #[test]
    fn test_columns_follow_vector_order() {
        let schema = FeatureSchema::new(["a", "b"], ["f"], ["c"]).unwrap();
        let cols: Vec<_> = schema.columns().collect();
        assert_eq!(
            cols,
            vec![
                (FeatureGroup::Numeric, "a"),
                (FeatureGroup::Numeric, "b"),
                (FeatureGroup::Flag, "f"),
                (FeatureGroup::Categorical, "c"),
            ]
        );
        assert_eq!(schema.group_of("f"), Some(FeatureGroup::Flag));
        assert_eq!(schema.group_of("zip_code"), None);
    }

    #[test]
    fn test_deserialized_schema_must_validate() {
        let json = r#"{"numeric":["a"],"flags":["a"],"categorical":[]}"#;
        let schema: FeatureSchema = serde_json::from_str(json).unwrap();
        assert!(schema.validate().is_err());
    }
}
