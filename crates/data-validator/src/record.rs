//! Raw Property Record

use serde::{Deserialize, Serialize};

/// Kind of dwelling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    /// Detached single-storey house
    #[default]
    #[serde(alias = "bungalow")]
    Bungalow,
    /// Unit in a shared building
    #[serde(alias = "condo")]
    Condo,
}

impl PropertyType {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Bungalow => "Bungalow",
            PropertyType::Condo => "Condo",
        }
    }
}

/// Property attributes as collected from the input surface.
///
/// Integer fields are signed so that out-of-range input reaches the
/// validator instead of failing deserialization with an opaque message.
/// Missing JSON fields take the form's pre-filled values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyRecord {
    /// Year the property was sold
    pub year_sold: i32,
    /// Annual property tax ($)
    pub property_tax: f64,
    /// Annual insurance cost ($)
    pub insurance: f64,
    /// Number of bedrooms
    pub beds: i64,
    /// Number of bathrooms, halves allowed
    pub baths: f64,
    /// Living area (sqft)
    pub square_footage: i64,
    /// Year of construction
    pub year_built: i32,
    /// Lot area (sqft)
    pub lot_size: i64,
    pub has_basement: bool,
    pub is_popular_location: bool,
    pub sold_during_recession: bool,
    pub property_type: PropertyType,
}

impl Default for PropertyRecord {
    fn default() -> Self {
        Self {
            year_sold: 2023,
            property_tax: 600.0,
            insurance: 200.0,
            beds: 3,
            baths: 2.0,
            square_footage: 1800,
            year_built: 1990,
            lot_size: 10_000,
            has_basement: true,
            is_popular_location: true,
            sold_during_recession: false,
            property_type: PropertyType::Bungalow,
        }
    }
}
