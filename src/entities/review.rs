// ⭐ Review - a 1..=5 rating of a property or a lister

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{generate_id, Document};
use crate::schema::{Checker, Validate, ValidationResult};

string_enum! {
    pub enum ReviewTarget {
        Property => "property",
        Lister => "lister",
    }
}

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub review_id: String,
    pub reviewer_firebase_uid: String,
    pub target_type: ReviewTarget,
    /// `property_id` or lister `firebase_uid`, depending on `target_type`.
    pub target_id: String,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn new(
        reviewer_firebase_uid: impl Into<String>,
        target_type: ReviewTarget,
        target_id: impl Into<String>,
        rating: u8,
        comment: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Review {
            review_id: generate_id("review"),
            reviewer_firebase_uid: reviewer_firebase_uid.into(),
            target_type,
            target_id: target_id.into(),
            rating,
            comment,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Validate for Review {
    fn validate(&self) -> ValidationResult {
        Checker::new(Self::COLLECTION)
            .required("review_id", &self.review_id)
            .required("reviewer_firebase_uid", &self.reviewer_firebase_uid)
            .required("target_id", &self.target_id)
            .range(
                "rating",
                i64::from(self.rating),
                i64::from(MIN_RATING),
                i64::from(MAX_RATING),
            )
            .not_blank("comment", self.comment.as_deref())
            .finish()
    }
}

impl Document for Review {
    const COLLECTION: &'static str = "reviews";
    const KEY: &'static str = "review_id";

    fn key(&self) -> &str {
        &self.review_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        for (rating, ok) in [(0, false), (1, true), (5, true), (6, false)] {
            let review = Review::new("buyer_1", ReviewTarget::Property, "prop_001", rating, None);
            assert_eq!(review.validate().is_ok(), ok, "rating {}", rating);
        }
    }
}
