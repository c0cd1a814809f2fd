// 📋 Listing Entity - a property offered by a lister

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{generate_id, Document};
use crate::schema::{Checker, Validate, ValidationResult};

string_enum! {
    pub enum ListingStatus {
        Active => "active",
        Hidden => "hidden",
        Pending => "pending",
        Verified => "verified",
        Rejected => "rejected",
        Expired => "expired",
    }
}

impl Default for ListingStatus {
    fn default() -> Self {
        ListingStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub listing_id: String,
    pub property_id: String,
    pub lister_firebase_uid: String,
    #[serde(default)]
    pub status: ListingStatus,
    #[serde(default)]
    pub views_count: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_by_admin_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// New pending listing with a generated id.
    pub fn new(property_id: impl Into<String>, lister_firebase_uid: impl Into<String>) -> Self {
        let now = Utc::now();
        Listing {
            listing_id: generate_id("listing"),
            property_id: property_id.into(),
            lister_firebase_uid: lister_firebase_uid.into(),
            status: ListingStatus::default(),
            views_count: 0,
            verified_at: None,
            verified_by_admin_uid: None,
            rejection_reason: None,
            expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, listing_id: impl Into<String>) -> Self {
        self.listing_id = listing_id.into();
        self
    }

    pub fn with_status(mut self, status: ListingStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |at| at <= now)
    }
}

impl Validate for Listing {
    fn validate(&self) -> ValidationResult {
        Checker::new(Self::COLLECTION)
            .required("listing_id", &self.listing_id)
            .required("property_id", &self.property_id)
            .required("lister_firebase_uid", &self.lister_firebase_uid)
            .not_blank("rejection_reason", self.rejection_reason.as_deref())
            .finish()
    }
}

impl Document for Listing {
    const COLLECTION: &'static str = "listings";
    const KEY: &'static str = "listing_id";

    fn key(&self) -> &str {
        &self.listing_id
    }
}

/// Fields a caller may change on an existing listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingPatch {
    pub status: Option<ListingStatus>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by_admin_uid: Option<String>,
    pub rejection_reason: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ListingPatch {
    pub fn status(status: ListingStatus) -> Self {
        ListingPatch {
            status: Some(status),
            ..ListingPatch::default()
        }
    }

    /// Apply the patch; moving to `verified` stamps `verified_at` unless given.
    pub fn apply(self, listing: &mut Listing, now: DateTime<Utc>) {
        if let Some(status) = self.status {
            listing.status = status;
            if status == ListingStatus::Verified && self.verified_at.is_none() {
                listing.verified_at = Some(now);
            }
        }
        if let Some(at) = self.verified_at {
            listing.verified_at = Some(at);
        }
        if let Some(admin) = self.verified_by_admin_uid {
            listing.verified_by_admin_uid = Some(admin);
        }
        if let Some(reason) = self.rejection_reason {
            listing.rejection_reason = Some(reason);
        }
        if let Some(at) = self.expires_at {
            listing.expires_at = Some(at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_listing_defaults() {
        let listing = Listing::new("prop_001", "lister_1");
        assert_eq!(listing.status, ListingStatus::Pending);
        assert_eq!(listing.views_count, 0);
        assert!(listing.listing_id.starts_with("listing_"));
        assert!(listing.validate().is_ok());
    }

    #[test]
    fn test_verified_status_stamps_time() {
        let now = Utc::now();
        let mut listing = Listing::new("prop_001", "lister_1");
        ListingPatch::status(ListingStatus::Verified).apply(&mut listing, now);

        assert_eq!(listing.status, ListingStatus::Verified);
        assert_eq!(listing.verified_at, Some(now));
    }

    #[test]
    fn test_explicit_verified_at_wins() {
        let now = Utc::now();
        let earlier = now - Duration::days(2);
        let mut listing = Listing::new("prop_001", "lister_1");
        ListingPatch {
            status: Some(ListingStatus::Verified),
            verified_at: Some(earlier),
            ..ListingPatch::default()
        }
        .apply(&mut listing, now);

        assert_eq!(listing.verified_at, Some(earlier));
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let mut listing = Listing::new("prop_001", "lister_1");
        assert!(!listing.is_expired_at(now));
        listing.expires_at = Some(now - Duration::hours(1));
        assert!(listing.is_expired_at(now));
    }
}
