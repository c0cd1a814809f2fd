// 🔖 Saved Listing - one bookmark per (user, listing) pair

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Document;
use crate::schema::{Checker, Validate, ValidationResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedListing {
    pub saved_id: String,
    pub user_firebase_uid: String,
    pub listing_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub saved_at: DateTime<Utc>,
}

impl SavedListing {
    pub fn new(
        user_firebase_uid: impl Into<String>,
        listing_id: impl Into<String>,
        notes: Option<String>,
    ) -> Self {
        let user_firebase_uid = user_firebase_uid.into();
        let listing_id = listing_id.into();
        let saved_at = Utc::now();
        SavedListing {
            saved_id: format!(
                "saved_{}_{}_{}",
                user_firebase_uid,
                listing_id,
                saved_at.timestamp()
            ),
            user_firebase_uid,
            listing_id,
            notes,
            saved_at,
        }
    }
}

impl Validate for SavedListing {
    fn validate(&self) -> ValidationResult {
        Checker::new(Self::COLLECTION)
            .required("saved_id", &self.saved_id)
            .required("user_firebase_uid", &self.user_firebase_uid)
            .required("listing_id", &self.listing_id)
            .finish()
    }
}

impl Document for SavedListing {
    const COLLECTION: &'static str = "saved_listings";
    const KEY: &'static str = "saved_id";

    fn key(&self) -> &str {
        &self.saved_id
    }
}
