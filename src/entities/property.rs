// 🏠 Property Entity - current price plus its append-only history
//
// `current_price` is mutable; `price_history` only ever grows. The last
// history entry always carries the current price (see `price_history`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Document;
use crate::schema::{Checker, Validate, ValidationResult};

string_enum! {
    pub enum PropertyType {
        Residential => "residential",
        Commercial => "commercial",
        Land => "land",
        Rental => "rental",
    }
}

// ============================================================================
// VALUE TYPES
// ============================================================================

/// One entry of the price log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    pub price: f64,
    pub changed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Location {
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Location {
            street: street.into(),
            city: city.into(),
            state: state.into(),
            zip_code: zip_code.into(),
            country: country.into(),
            latitude: None,
            longitude: None,
        }
    }

    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

// ============================================================================
// PROPERTY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Empty until the store assigns one on create.
    #[serde(default)]
    pub property_id: String,
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub current_price: f64,
    #[serde(default)]
    pub price_history: Vec<PriceChange>,
    pub location: Location,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_sqft: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i32>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_tour_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        property_type: PropertyType,
        current_price: f64,
        location: Location,
    ) -> Self {
        let now = Utc::now();
        Property {
            property_id: String::new(),
            title: title.into(),
            description: description.into(),
            property_type,
            current_price,
            price_history: Vec::new(),
            location,
            bedrooms: None,
            bathrooms: None,
            area_sqft: None,
            year_built: None,
            amenities: Vec::new(),
            images: Vec::new(),
            documents: Vec::new(),
            virtual_tour_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, property_id: impl Into<String>) -> Self {
        self.property_id = property_id.into();
        self
    }

    pub fn with_rooms(mut self, bedrooms: u32, bathrooms: f64) -> Self {
        self.bedrooms = Some(bedrooms);
        self.bathrooms = Some(bathrooms);
        self
    }

    pub fn with_amenities<I, S>(mut self, amenities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.amenities = amenities.into_iter().map(Into::into).collect();
        self
    }

    /// Price recorded by the most recent history entry.
    pub fn last_recorded_price(&self) -> Option<f64> {
        self.price_history.last().map(|change| change.price)
    }
}

impl Validate for Property {
    fn validate(&self) -> ValidationResult {
        let mut checker = Checker::new(Self::COLLECTION);
        checker
            .required("property_id", &self.property_id)
            .required("title", &self.title)
            .required("description", &self.description)
            .positive("current_price", self.current_price)
            .required("location.street", &self.location.street)
            .required("location.city", &self.location.city)
            .required("location.state", &self.location.state)
            .required("location.zip_code", &self.location.zip_code)
            .required("location.country", &self.location.country)
            .not_blank("virtual_tour_url", self.virtual_tour_url.as_deref());

        if let Some(lat) = self.location.latitude {
            checker.check(
                (-90.0..=90.0).contains(&lat),
                "location.latitude",
                "Must be between -90 and 90",
            );
        }
        if let Some(lon) = self.location.longitude {
            checker.check(
                (-180.0..=180.0).contains(&lon),
                "location.longitude",
                "Must be between -180 and 180",
            );
        }

        for (i, change) in self.price_history.iter().enumerate() {
            if !change.price.is_finite() || change.price <= 0.0 {
                checker.fail(
                    "price_history",
                    format!("Entry {} has non-positive price {}", i, change.price),
                );
            }
        }
        checker.check(
            self.last_recorded_price() == Some(self.current_price),
            "price_history",
            "Last entry must record current_price",
        );

        checker.finish()
    }
}

impl Document for Property {
    const COLLECTION: &'static str = "properties";
    const KEY: &'static str = "property_id";

    fn key(&self) -> &str {
        &self.property_id
    }
}

// ============================================================================
// PATCH
// ============================================================================

/// Fields a caller may change on an existing property.
///
/// `price_change_reason` annotates the history entry appended when
/// `current_price` changes; it is never stored on the property.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<PropertyType>,
    pub current_price: Option<f64>,
    pub price_change_reason: Option<String>,
    pub location: Option<Location>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f64>,
    pub area_sqft: Option<f64>,
    pub year_built: Option<i32>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub documents: Option<Vec<String>>,
    pub virtual_tour_url: Option<String>,
}

impl PropertyPatch {
    pub fn price(price: f64, reason: impl Into<String>) -> Self {
        PropertyPatch {
            current_price: Some(price),
            price_change_reason: Some(reason.into()),
            ..PropertyPatch::default()
        }
    }

    /// Apply every field except the price pair.
    pub fn apply_fields(&mut self, property: &mut Property) {
        if let Some(title) = self.title.take() {
            property.title = title;
        }
        if let Some(description) = self.description.take() {
            property.description = description;
        }
        if let Some(kind) = self.property_type.take() {
            property.property_type = kind;
        }
        if let Some(location) = self.location.take() {
            property.location = location;
        }
        if let Some(bedrooms) = self.bedrooms.take() {
            property.bedrooms = Some(bedrooms);
        }
        if let Some(bathrooms) = self.bathrooms.take() {
            property.bathrooms = Some(bathrooms);
        }
        if let Some(area) = self.area_sqft.take() {
            property.area_sqft = Some(area);
        }
        if let Some(year) = self.year_built.take() {
            property.year_built = Some(year);
        }
        if let Some(amenities) = self.amenities.take() {
            property.amenities = amenities;
        }
        if let Some(images) = self.images.take() {
            property.images = images;
        }
        if let Some(documents) = self.documents.take() {
            property.documents = documents;
        }
        if let Some(url) = self.virtual_tour_url.take() {
            property.virtual_tour_url = Some(url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn austin() -> Location {
        Location::new("123 Main Street", "Austin", "TX", "78701", "USA").at(30.2672, -97.7431)
    }

    fn seeded(price: f64) -> Property {
        let mut property = Property::new(
            "3BR House",
            "Family home",
            PropertyType::Residential,
            price,
            austin(),
        )
        .with_id("prop_001");
        property.price_history.push(PriceChange {
            price,
            changed_at: Utc::now(),
            reason: Some("Initial listing".to_string()),
        });
        property
    }

    #[test]
    fn test_valid_property() {
        assert!(seeded(450_000.0).validate().is_ok());
    }

    #[test]
    fn test_history_must_end_with_current_price() {
        let mut property = seeded(450_000.0);
        property.current_price = 425_000.0;

        let errors = property.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "price_history"));
    }

    #[test]
    fn test_bad_coordinates_and_price() {
        let mut property = seeded(450_000.0);
        property.location.latitude = Some(123.0);
        property.current_price = -1.0;

        let errors = property.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"current_price"));
        assert!(fields.contains(&"location.latitude"));
    }

    #[test]
    fn test_patch_leaves_price_alone() {
        let mut property = seeded(450_000.0);
        let mut patch = PropertyPatch {
            title: Some("Renovated 3BR House".to_string()),
            bedrooms: Some(4),
            ..PropertyPatch::price(425_000.0, "Price reduced")
        };
        patch.apply_fields(&mut property);

        assert_eq!(property.title, "Renovated 3BR House");
        assert_eq!(property.bedrooms, Some(4));
        assert_eq!(property.current_price, 450_000.0);
        assert_eq!(patch.current_price, Some(425_000.0));
    }

    #[test]
    fn test_coordinates() {
        assert_eq!(austin().coordinates(), Some((30.2672, -97.7431)));
        let bare = Location::new("1 Road", "Nowhere", "TX", "00000", "USA");
        assert_eq!(bare.coordinates(), None);
    }
}
