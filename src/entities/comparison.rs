// ⚖️ Property Comparison - a user's side-by-side shortlist

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{generate_id, Document};
use crate::schema::{Checker, Validate, ValidationResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyComparison {
    pub comparison_id: String,
    pub user_firebase_uid: String,
    pub property_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl PropertyComparison {
    pub fn new<I, S>(user_firebase_uid: impl Into<String>, property_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PropertyComparison {
            comparison_id: generate_id("cmp"),
            user_firebase_uid: user_firebase_uid.into(),
            property_ids: property_ids.into_iter().map(Into::into).collect(),
            created_at: Utc::now(),
        }
    }
}

impl Validate for PropertyComparison {
    fn validate(&self) -> ValidationResult {
        let mut checker = Checker::new(Self::COLLECTION);
        checker
            .required("comparison_id", &self.comparison_id)
            .required("user_firebase_uid", &self.user_firebase_uid)
            .check(
                self.property_ids.len() >= 2,
                "property_ids",
                "A comparison needs at least two properties",
            );

        let mut seen = std::collections::HashSet::new();
        for id in &self.property_ids {
            if id.trim().is_empty() {
                checker.fail("property_ids", "Contains an empty id");
            } else if !seen.insert(id.as_str()) {
                checker.fail("property_ids", format!("Duplicate property {}", id));
            }
        }

        checker.finish()
    }
}

impl Document for PropertyComparison {
    const COLLECTION: &'static str = "property_comparisons";
    const KEY: &'static str = "comparison_id";

    fn key(&self) -> &str {
        &self.comparison_id
    }
}
