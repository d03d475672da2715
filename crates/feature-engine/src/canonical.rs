//! Canonical Feature Set

use data_validator::{PropertyRecord, PropertyType};
use serde::{Deserialize, Serialize};

/// Builder-internal feature names. Every external schema entry must resolve
/// to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalFeature {
    YearSold,
    PropertyTax,
    Insurance,
    Beds,
    Baths,
    SquareFootage,
    YearBuilt,
    LotSize,
    HasBasement,
    IsPopularLocation,
    SoldDuringRecession,
    PropertyAge,
    BungalowFlag,
    CondoFlag,
}

/// Default feature order, used when a model declares no schema
pub const CANONICAL_ORDER: [CanonicalFeature; 14] = [
    CanonicalFeature::YearSold,
    CanonicalFeature::PropertyTax,
    CanonicalFeature::Insurance,
    CanonicalFeature::Beds,
    CanonicalFeature::Baths,
    CanonicalFeature::SquareFootage,
    CanonicalFeature::YearBuilt,
    CanonicalFeature::LotSize,
    CanonicalFeature::HasBasement,
    CanonicalFeature::IsPopularLocation,
    CanonicalFeature::SoldDuringRecession,
    CanonicalFeature::PropertyAge,
    CanonicalFeature::BungalowFlag,
    CanonicalFeature::CondoFlag,
];

impl CanonicalFeature {
    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            CanonicalFeature::YearSold => "year_sold",
            CanonicalFeature::PropertyTax => "property_tax",
            CanonicalFeature::Insurance => "insurance",
            CanonicalFeature::Beds => "beds",
            CanonicalFeature::Baths => "baths",
            CanonicalFeature::SquareFootage => "square_footage",
            CanonicalFeature::YearBuilt => "year_built",
            CanonicalFeature::LotSize => "lot_size",
            CanonicalFeature::HasBasement => "has_basement",
            CanonicalFeature::IsPopularLocation => "is_popular_location",
            CanonicalFeature::SoldDuringRecession => "sold_during_recession",
            CanonicalFeature::PropertyAge => "property_age",
            CanonicalFeature::BungalowFlag => "bungalow_flag",
            CanonicalFeature::CondoFlag => "condo_flag",
        }
    }

    /// Exact, case-sensitive lookup by canonical name
    pub fn from_name(name: &str) -> Option<Self> {
        CANONICAL_ORDER.iter().copied().find(|f| f.name() == name)
    }

    /// Numeric value of this feature for a record
    pub fn value(&self, record: &PropertyRecord, derived: &DerivedFields) -> f64 {
        match self {
            CanonicalFeature::YearSold => record.year_sold as f64,
            CanonicalFeature::PropertyTax => record.property_tax,
            CanonicalFeature::Insurance => record.insurance,
            CanonicalFeature::Beds => record.beds as f64,
            CanonicalFeature::Baths => record.baths,
            CanonicalFeature::SquareFootage => record.square_footage as f64,
            CanonicalFeature::YearBuilt => record.year_built as f64,
            CanonicalFeature::LotSize => record.lot_size as f64,
            CanonicalFeature::HasBasement => flag(record.has_basement),
            CanonicalFeature::IsPopularLocation => flag(record.is_popular_location),
            CanonicalFeature::SoldDuringRecession => flag(record.sold_during_recession),
            CanonicalFeature::PropertyAge => derived.property_age as f64,
            CanonicalFeature::BungalowFlag => derived.bungalow_flag as f64,
            CanonicalFeature::CondoFlag => derived.condo_flag as f64,
        }
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Fields computed from a record rather than entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedFields {
    /// year_sold - year_built; negative when built after the sale
    pub property_age: i64,
    /// 1 for bungalows
    pub bungalow_flag: u8,
    /// Always 1 - bungalow_flag
    pub condo_flag: u8,
}

impl DerivedFields {
    /// Compute derived fields for a record
    pub fn from_record(record: &PropertyRecord) -> Self {
        let bungalow_flag = u8::from(record.property_type == PropertyType::Bungalow);
        Self {
            property_age: i64::from(record.year_sold) - i64::from(record.year_built),
            bungalow_flag,
            condo_flag: 1 - bungalow_flag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for feature in CANONICAL_ORDER {
            assert_eq!(CanonicalFeature::from_name(feature.name()), Some(feature));
        }
        assert_eq!(CanonicalFeature::from_name("Year_Sold"), None);
        assert_eq!(CanonicalFeature::from_name("sqft"), None);
    }

    #[test]
    fn test_condo_flags() {
        let record = PropertyRecord {
            property_type: PropertyType::Condo,
            ..Default::default()
        };
        let derived = DerivedFields::from_record(&record);
        assert_eq!(derived.bungalow_flag, 0);
        assert_eq!(derived.condo_flag, 1);
    }

    #[test]
    fn test_same_year_gives_zero_age() {
        let record = PropertyRecord {
            year_sold: 2001,
            year_built: 2001,
            ..Default::default()
        };
        let derived = DerivedFields::from_record(&record);
        assert_eq!(derived.property_age, 0);
        assert_eq!(derived.bungalow_flag + derived.condo_flag, 1);
    }

    #[test]
    fn test_booleans_coerced() {
        let record = PropertyRecord {
            has_basement: false,
            sold_during_recession: true,
            ..Default::default()
        };
        let derived = DerivedFields::from_record(&record);
        assert_eq!(CanonicalFeature::HasBasement.value(&record, &derived), 0.0);
        assert_eq!(CanonicalFeature::SoldDuringRecession.value(&record, &derived), 1.0);
    }
}
