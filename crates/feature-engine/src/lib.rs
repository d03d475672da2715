//! Feature Engineering Engine
//!
//! Turns a validated property record into the exact, ordered feature vector
//! a pricing model was trained on. External schemas are resolved through an
//! explicit alias table; any name that does not resolve is an error.

mod alias;
mod canonical;
mod features;

pub use alias::AliasTable;
pub use canonical::{CanonicalFeature, DerivedFields, CANONICAL_ORDER};
pub use data_validator::{PropertyRecord, PropertyType, ValidationConfig, ValidationError, Validator};
pub use features::{FeatureBuilder, FeatureVector, NamedFeature};

use thiserror::Error;

/// Errors while building a feature vector
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error("Invalid input: {0}")]
    InvalidRange(#[from] ValidationError),
    #[error("Unresolved feature '{name}': no canonical field or alias matches")]
    UnresolvedFeature { name: String },
    #[error("Feature '{0}' requested more than once")]
    DuplicateFeature(String),
    #[error("Alias '{alias}' already maps to '{existing}'")]
    AliasConflict { alias: String, existing: &'static str },
}
