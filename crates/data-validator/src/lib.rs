//! Property Record Validation
//!
//! Defines the raw property record collected from the input surface and the
//! range checks applied before it is turned into model features.

mod error;
mod record;
mod validator;

pub use error::ValidationError;
pub use record::{PropertyRecord, PropertyType};
pub use validator::{ValidationConfig, ValidationResult, Validator};
