//! Feature Vector Assembly

use crate::alias::AliasTable;
use crate::canonical::{CanonicalFeature, DerivedFields, CANONICAL_ORDER};
use crate::FeatureError;
use data_validator::{PropertyRecord, Validator};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// One named entry of a feature vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedFeature {
    /// Name as requested by the schema
    pub name: String,
    pub value: f64,
}

/// Ordered feature vector for ML inference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    features: Vec<NamedFeature>,
}

impl FeatureVector {
    /// Number of features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Feature names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }

    /// Feature values in order
    pub fn values(&self) -> Vec<f64> {
        self.features.iter().map(|f| f.value).collect()
    }

    /// Value of a named feature
    pub fn get(&self, name: &str) -> Option<f64> {
        self.features.iter().find(|f| f.name == name).map(|f| f.value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NamedFeature> {
        self.features.iter()
    }
}

impl<'a> IntoIterator for &'a FeatureVector {
    type Item = &'a NamedFeature;
    type IntoIter = std::slice::Iter<'a, NamedFeature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

/// Builds feature vectors from property records.
///
/// Stateless apart from its configuration: the same record and schema always
/// produce the same vector.
#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder {
    validator: Validator,
    aliases: AliasTable,
}

impl FeatureBuilder {
    /// Create a new feature builder
    pub fn new(validator: Validator, aliases: AliasTable) -> Self {
        Self { validator, aliases }
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Resolve every schema name to its canonical feature.
    ///
    /// Fails on the first name the alias table does not know, or on a name
    /// that appears twice.
    pub fn resolve_schema<S: AsRef<str>>(
        &self,
        schema: &[S],
    ) -> Result<Vec<CanonicalFeature>, FeatureError> {
        let mut seen = HashSet::with_capacity(schema.len());
        schema
            .iter()
            .map(|name| {
                let name = name.as_ref();
                if !seen.insert(name) {
                    return Err(FeatureError::DuplicateFeature(name.to_string()));
                }
                self.aliases
                    .resolve(name)
                    .ok_or_else(|| FeatureError::UnresolvedFeature {
                        name: name.to_string(),
                    })
            })
            .collect()
    }

    /// Build the feature vector for `record`.
    ///
    /// With a schema the output holds exactly the schema's names in schema
    /// order; canonical fields the schema does not mention are dropped.
    /// Without one the canonical order is used.
    pub fn build<S: AsRef<str>>(
        &self,
        record: &PropertyRecord,
        schema: Option<&[S]>,
    ) -> Result<FeatureVector, FeatureError> {
        self.validator.validate_record(record).into_result()?;

        let derived = DerivedFields::from_record(record);

        let features = match schema {
            Some(schema) => {
                let resolved = self.resolve_schema(schema)?;
                schema
                    .iter()
                    .zip(resolved)
                    .map(|(name, feature)| NamedFeature {
                        name: name.as_ref().to_string(),
                        value: feature.value(record, &derived),
                    })
                    .collect()
            }
            None => CANONICAL_ORDER
                .iter()
                .map(|feature| NamedFeature {
                    name: feature.name().to_string(),
                    value: feature.value(record, &derived),
                })
                .collect(),
        };

        let vector = FeatureVector { features };
        debug!(
            "Built feature vector: {} features, property_age={}",
            vector.len(),
            derived.property_age
        );
        Ok(vector)
    }

    /// Build in canonical order
    pub fn build_default(&self, record: &PropertyRecord) -> Result<FeatureVector, FeatureError> {
        self.build::<&str>(record, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_validator::{PropertyType, ValidationConfig, ValidationError};
    use proptest::prelude::*;

    fn known_variants() -> FeatureBuilder {
        FeatureBuilder::new(Validator::default(), AliasTable::with_known_variants())
    }

    #[test]
    fn test_schema_selects_and_orders() {
        let builder = FeatureBuilder::default();
        let record = PropertyRecord {
            year_sold: 2023,
            beds: 3,
            property_type: PropertyType::Bungalow,
            ..Default::default()
        };

        let vector = builder
            .build(&record, Some(&["year_sold", "beds", "bungalow_flag"][..]))
            .unwrap();

        let entries: Vec<(&str, f64)> = vector.iter().map(|f| (f.name.as_str(), f.value)).collect();
        assert_eq!(
            entries,
            vec![("year_sold", 2023.0), ("beds", 3.0), ("bungalow_flag", 1.0)]
        );
    }

    #[test]
    fn test_default_order() {
        let builder = FeatureBuilder::default();
        let vector = builder.build_default(&PropertyRecord::default()).unwrap();
        let names: Vec<&str> = vector.names().collect();
        let expected: Vec<&str> = CANONICAL_ORDER.iter().map(|f| f.name()).collect();
        assert_eq!(names, expected);
        assert_eq!(vector.get("property_age"), Some(33.0));
        assert_eq!(vector.get("has_basement"), Some(1.0));
        assert_eq!(vector.get("condo_flag"), Some(0.0));
    }

    #[test]
    fn test_unmapped_name_is_unresolved() {
        let builder = FeatureBuilder::default();
        let err = builder
            .build(&PropertyRecord::default(), Some(&["year_sold", "soft"][..]))
            .unwrap_err();
        assert_eq!(
            err,
            FeatureError::UnresolvedFeature {
                name: "soft".to_string()
            }
        );
    }

    #[test]
    fn test_legacy_model_schema() {
        let schema = [
            "year_sold",
            "property_tax",
            "insurance",
            "beds",
            "baths",
            "soft",
            "year_built",
            "lot_size",
            "basement",
            "popular",
            "recession",
            "property_age",
            "property_type_Bunglow",
            "property_type_Condo",
        ];
        let record = PropertyRecord {
            property_type: PropertyType::Condo,
            square_footage: 2500,
            ..Default::default()
        };

        let vector = known_variants().build(&record, Some(&schema[..])).unwrap();

        assert_eq!(vector.names().collect::<Vec<_>>(), schema.to_vec());
        assert_eq!(vector.get("soft"), Some(2500.0));
        assert_eq!(vector.get("property_type_Bunglow"), Some(0.0));
        assert_eq!(vector.get("property_type_Condo"), Some(1.0));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = FeatureBuilder::default()
            .build(&PropertyRecord::default(), Some(&["beds", "beds"][..]))
            .unwrap_err();
        assert_eq!(err, FeatureError::DuplicateFeature("beds".to_string()));
    }

    #[test]
    fn test_two_aliases_of_one_field() {
        let vector = known_variants()
            .build(&PropertyRecord::default(), Some(&["sqft", "soft"][..]))
            .unwrap();
        assert_eq!(vector.values(), vec![1800.0, 1800.0]);
    }

    #[test]
    fn test_invalid_range_reported() {
        let record = PropertyRecord {
            year_sold: 1850,
            ..Default::default()
        };
        let err = FeatureBuilder::default().build_default(&record).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::InvalidRange(ValidationError::OutOfRange { field: "year_sold", .. })
        ));
    }

    #[test]
    fn test_negative_age_passes_through() {
        let record = PropertyRecord {
            year_sold: 2000,
            year_built: 2010,
            ..Default::default()
        };
        let vector = FeatureBuilder::default().build_default(&record).unwrap();
        assert_eq!(vector.get("property_age"), Some(-10.0));
    }

    #[test]
    fn test_negative_age_rejected_by_policy() {
        let builder = FeatureBuilder::new(
            Validator::new(ValidationConfig {
                allow_negative_age: false,
                ..Default::default()
            }),
            AliasTable::canonical(),
        );
        let record = PropertyRecord {
            year_sold: 2000,
            year_built: 2010,
            ..Default::default()
        };
        let err = builder.build_default(&record).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::InvalidRange(ValidationError::AgeOrdering { .. })
        ));
    }

    #[test]
    fn test_empty_schema() {
        let vector = FeatureBuilder::default()
            .build::<&str>(&PropertyRecord::default(), Some(&[][..]))
            .unwrap();
        assert!(vector.is_empty());
    }

    fn arb_record() -> impl Strategy<Value = PropertyRecord> {
        (
            (1900i32..=2100, 0.0f64..50_000.0, 0.0f64..20_000.0, 0i64..12),
            (0.0f64..8.0, 0i64..20_000, 1800i32..=2025, 0i64..500_000),
            (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()),
        )
            .prop_map(
                |(
                    (year_sold, property_tax, insurance, beds),
                    (baths, square_footage, year_built, lot_size),
                    (has_basement, is_popular_location, sold_during_recession, bungalow),
                )| PropertyRecord {
                    year_sold,
                    property_tax,
                    insurance,
                    beds,
                    baths,
                    square_footage,
                    year_built,
                    lot_size,
                    has_basement,
                    is_popular_location,
                    sold_during_recession,
                    property_type: if bungalow {
                        PropertyType::Bungalow
                    } else {
                        PropertyType::Condo
                    },
                },
            )
    }

    fn arb_schema() -> impl Strategy<Value = Vec<&'static str>> {
        let names: Vec<&'static str> = CANONICAL_ORDER.iter().map(|f| f.name()).collect();
        proptest::sample::subsequence(names, 0..=CANONICAL_ORDER.len()).prop_shuffle()
    }

    proptest! {
        #[test]
        fn prop_output_matches_schema(record in arb_record(), schema in arb_schema()) {
            let vector = FeatureBuilder::default().build(&record, Some(schema.as_slice())).unwrap();
            prop_assert_eq!(vector.names().collect::<Vec<_>>(), schema);
        }

        #[test]
        fn prop_flags_mutually_exclusive(record in arb_record()) {
            let vector = FeatureBuilder::default().build_default(&record).unwrap();
            let sum = vector.get("bungalow_flag").unwrap() + vector.get("condo_flag").unwrap();
            prop_assert_eq!(sum, 1.0);
        }

        #[test]
        fn prop_age_is_exact_difference(record in arb_record()) {
            let vector = FeatureBuilder::default().build_default(&record).unwrap();
            let expected = (record.year_sold - record.year_built) as f64;
            prop_assert_eq!(vector.get("property_age"), Some(expected));
        }

        #[test]
        fn prop_build_is_idempotent(record in arb_record(), schema in arb_schema()) {
            let builder = FeatureBuilder::default();
            let first = builder.build(&record, Some(schema.as_slice())).unwrap();
            let second = builder.build(&record, Some(schema.as_slice())).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
