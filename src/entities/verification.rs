// 🪪 Verification Document Entity
//
// Moves pending → verified | rejected exactly once. `verified_by_admin_uid`
// and `verified_at` are set on that transition, for either outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{generate_id, Document};
use crate::schema::{Checker, Validate, ValidationResult};

string_enum! {
    pub enum DocumentType {
        /// Verifying this type also verifies the owning user.
        IdentityProof => "identity_proof",
        PropertyOwnership => "property_ownership",
        BusinessLicense => "business_license",
    }
}

string_enum! {
    pub enum DocumentStatus {
        Pending => "pending",
        Verified => "verified",
        Rejected => "rejected",
    }
}

impl DocumentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DocumentStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationDocument {
    pub document_id: String,
    /// Owning user.
    pub user_firebase_uid: String,
    pub document_type: DocumentType,
    pub document_url: String,
    pub status: DocumentStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_by_admin_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl VerificationDocument {
    /// New pending document with a generated id.
    pub fn new(
        user_firebase_uid: impl Into<String>,
        document_type: DocumentType,
        document_url: impl Into<String>,
    ) -> Self {
        VerificationDocument {
            document_id: generate_id("doc"),
            user_firebase_uid: user_firebase_uid.into(),
            document_type,
            document_url: document_url.into(),
            status: DocumentStatus::Pending,
            verified_at: None,
            verified_by_admin_uid: None,
            rejection_reason: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = document_id.into();
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == DocumentStatus::Pending
    }

    /// True when verifying this document must also verify its owner.
    pub fn cascades_to_user(&self) -> bool {
        self.status == DocumentStatus::Verified
            && self.document_type == DocumentType::IdentityProof
    }
}

impl Validate for VerificationDocument {
    fn validate(&self) -> ValidationResult {
        let rejected = self.status == DocumentStatus::Rejected;
        let reviewed = self.status.is_terminal();

        Checker::new(Self::COLLECTION)
            .required("document_id", &self.document_id)
            .required("user_firebase_uid", &self.user_firebase_uid)
            .required("document_url", &self.document_url)
            .not_blank("rejection_reason", self.rejection_reason.as_deref())
            .check(
                rejected == self.rejection_reason.is_some(),
                "rejection_reason",
                "Required when status is rejected, and only then",
            )
            .check(
                reviewed == self.verified_by_admin_uid.is_some(),
                "verified_by_admin_uid",
                "Set exactly when the document has been reviewed",
            )
            .check(
                reviewed == self.verified_at.is_some(),
                "verified_at",
                "Set exactly when the document has been reviewed",
            )
            .finish()
    }
}

impl Document for VerificationDocument {
    const COLLECTION: &'static str = "verification_documents";
    const KEY: &'static str = "document_id";

    fn key(&self) -> &str {
        &self.document_id
    }
}
