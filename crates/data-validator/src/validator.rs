//! Record Validator for Range Checking

use crate::error::ValidationError;
use crate::record::PropertyRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper bound used for fields that are only required to be non-negative
const UNBOUNDED: f64 = f64::MAX;

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Year sold valid range
    pub year_sold_range: (f64, f64),
    /// Year built valid range
    pub year_built_range: (f64, f64),
    /// Property tax valid range ($)
    pub property_tax_range: (f64, f64),
    /// Insurance valid range ($)
    pub insurance_range: (f64, f64),
    /// Bedrooms valid range
    pub beds_range: (f64, f64),
    /// Bathrooms valid range
    pub baths_range: (f64, f64),
    /// Square footage valid range
    pub square_footage_range: (f64, f64),
    /// Lot size valid range (sqft)
    pub lot_size_range: (f64, f64),
    /// Accept year_built later than year_sold (negative property age)
    pub allow_negative_age: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            year_sold_range: (1900.0, 2100.0),
            year_built_range: (1800.0, 2025.0),
            property_tax_range: (0.0, UNBOUNDED),
            insurance_range: (0.0, UNBOUNDED),
            beds_range: (0.0, UNBOUNDED),
            baths_range: (0.0, UNBOUNDED),
            square_footage_range: (0.0, UNBOUNDED),
            lot_size_range: (0.0, UNBOUNDED),
            allow_negative_age: true,
        }
    }
}

impl ValidationConfig {
    /// Bounds of the slider-based valuation form
    pub fn strict() -> Self {
        Self {
            year_sold_range: (2000.0, 2025.0),
            year_built_range: (1900.0, 2025.0),
            beds_range: (1.0, 6.0),
            baths_range: (1.0, 4.0),
            square_footage_range: (500.0, 10_000.0),
            ..Default::default()
        }
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "strict" => Some(Self::strict()),
            _ => None,
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }

    /// Convert into the first error, if any
    pub fn into_result(self) -> Result<(), ValidationError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Validator for property records
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a single value against an inclusive range.
    ///
    /// NaN and infinities never fall inside a range.
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if value.is_finite() && (range.0..=range.1).contains(&value) {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        }
    }

    /// Check the construction/sale year ordering against the age policy
    pub fn validate_age(&self, year_built: i32, year_sold: i32) -> Result<(), ValidationError> {
        if !self.config.allow_negative_age && year_built > year_sold {
            return Err(ValidationError::AgeOrdering {
                year_built,
                year_sold,
            });
        }
        Ok(())
    }

    /// Validate every field of a record, collecting all violations
    pub fn validate_record(&self, record: &PropertyRecord) -> ValidationResult {
        let c = &self.config;
        let checks = [
            self.validate_range("year_sold", record.year_sold as f64, c.year_sold_range),
            self.validate_range("property_tax", record.property_tax, c.property_tax_range),
            self.validate_range("insurance", record.insurance, c.insurance_range),
            self.validate_range("beds", record.beds as f64, c.beds_range),
            self.validate_range("baths", record.baths, c.baths_range),
            self.validate_range(
                "square_footage",
                record.square_footage as f64,
                c.square_footage_range,
            ),
            self.validate_range("year_built", record.year_built as f64, c.year_built_range),
            self.validate_range("lot_size", record.lot_size as f64, c.lot_size_range),
            self.validate_age(record.year_built, record.year_sold),
        ];

        let fields_checked = checks.len();
        let errors: Vec<ValidationError> = checks.into_iter().filter_map(Result::err).collect();

        if errors.is_empty() {
            ValidationResult::valid(fields_checked)
        } else {
            debug!("Record rejected with {} violation(s)", errors.len());
            ValidationResult::invalid(errors, fields_checked)
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
