//! Validation Error Types

use thiserror::Error;

/// Errors during record validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Construction year after sale year while negative ages are disallowed
    #[error("year_built {year_built} is after year_sold {year_sold}")]
    AgeOrdering { year_built: i32, year_sold: i32 },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::OutOfRange { field, .. } => *field,
            ValidationError::AgeOrdering { .. } => "year_built",
        }
    }
}
