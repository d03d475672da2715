//! Alias Table for External Feature Names

use crate::canonical::{CanonicalFeature, CANONICAL_ORDER};
use crate::FeatureError;
use std::collections::HashMap;

/// Names seen in deployed model schemas, including the `Bunglow` misspelling
const KNOWN_VARIANTS: [(&str, CanonicalFeature); 10] = [
    ("sqft", CanonicalFeature::SquareFootage),
    ("soft", CanonicalFeature::SquareFootage),
    ("basement", CanonicalFeature::HasBasement),
    ("popular", CanonicalFeature::IsPopularLocation),
    ("recession", CanonicalFeature::SoldDuringRecession),
    ("property_type_Bunglow", CanonicalFeature::BungalowFlag),
    ("property_type_Bungalow", CanonicalFeature::BungalowFlag),
    ("bungalow", CanonicalFeature::BungalowFlag),
    ("property_type_Condo", CanonicalFeature::CondoFlag),
    ("condo", CanonicalFeature::CondoFlag),
];

/// Explicit mapping from schema names to canonical features.
///
/// Once registered, a name keeps its target; canonical names always map to
/// themselves.
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: HashMap<String, CanonicalFeature>,
}

impl AliasTable {
    /// Table containing only the canonical names
    pub fn canonical() -> Self {
        let entries = CANONICAL_ORDER
            .iter()
            .map(|f| (f.name().to_string(), *f))
            .collect();
        Self { entries }
    }

    /// Canonical names plus the naming variants of known model artifacts
    pub fn with_known_variants() -> Self {
        let mut table = Self::canonical();
        for (alias, feature) in KNOWN_VARIANTS {
            table.entries.insert(alias.to_string(), feature);
        }
        table
    }

    /// Register an alias for the canonical feature named `target`
    pub fn insert(&mut self, alias: impl Into<String>, target: &str) -> Result<(), FeatureError> {
        let alias = alias.into();
        let feature = CanonicalFeature::from_name(target).ok_or_else(|| {
            FeatureError::UnresolvedFeature {
                name: target.to_string(),
            }
        })?;

        if let Some(existing) = self.resolve(&alias) {
            if existing != feature {
                return Err(FeatureError::AliasConflict {
                    alias,
                    existing: existing.name(),
                });
            }
        }

        self.entries.insert(alias, feature);
        Ok(())
    }

    /// Resolve a schema name
    pub fn resolve(&self, name: &str) -> Option<CanonicalFeature> {
        self.entries.get(name).copied()
    }

    /// Number of names the table resolves
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::canonical()
    }
}
