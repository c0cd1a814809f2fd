// ✅ Verification Coordinator - reviews a document and, for identity proofs,
// verifies its owner in the same transaction
//
// Steps (one IMMEDIATE transaction):
//   1. Load the document; it must still be pending
//   2. Write the review, conditioned on the stored status being pending
//   3. Verified identity proof → owner.verification_status = verified
// Any failure rolls back every step.

use chrono::Utc;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::entities::{DocumentStatus, User, VerificationDocument, VerificationStatus};
use crate::error::{is_lock_contention, StoreError, StoreResult};
use crate::schema::{Checker, ValidationResult};
use crate::store::{self, verification_documents};
use crate::unit_of_work::{self, RetryPolicy};

const COLLECTION: &str = "verification_documents";

/// An admin's ruling on a pending document.
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationDecision {
    Verified,
    Rejected { reason: String },
}

impl VerificationDecision {
    pub fn rejected(reason: impl Into<String>) -> Self {
        VerificationDecision::Rejected {
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> DocumentStatus {
        match self {
            VerificationDecision::Verified => DocumentStatus::Verified,
            VerificationDecision::Rejected { .. } => DocumentStatus::Rejected,
        }
    }

    fn rejection_reason(&self) -> Option<String> {
        match self {
            VerificationDecision::Verified => None,
            VerificationDecision::Rejected { reason } => Some(reason.clone()),
        }
    }
}

/// What a successful review committed.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationOutcome {
    pub document: VerificationDocument,
    /// True when the owning user was verified alongside the document.
    pub user_verified: bool,
}

fn validate_request(admin_id: &str, decision: &VerificationDecision) -> ValidationResult {
    let mut checker = Checker::new(COLLECTION);
    checker.required("verified_by_admin_uid", admin_id);
    if let VerificationDecision::Rejected { reason } = decision {
        checker.required("rejection_reason", reason);
    }
    checker.finish()
}

/// Review `document_id` on behalf of `admin_id`.
///
/// Errors: `ValidationFailed` (before anything is opened), `NotFound`,
/// `NoOp` when the document was already reviewed, `TransactionAborted` when
/// the owner cannot be verified or the store is busy. Only a busy store is
/// retried under `policy`.
pub fn verify_document(
    conn: &Connection,
    policy: &RetryPolicy,
    document_id: &str,
    admin_id: &str,
    decision: VerificationDecision,
) -> StoreResult<VerificationOutcome> {
    validate_request(admin_id, &decision).map_err(StoreError::ValidationFailed)?;

    let outcome = unit_of_work::run(conn, policy, "verify_document", |tx| {
        let mut document: VerificationDocument = store::get(tx, document_id)?;
        if !document.is_pending() {
            return Err(already_reviewed(document_id, document.status));
        }

        document.status = decision.status();
        document.verified_by_admin_uid = Some(admin_id.to_string());
        document.verified_at = Some(Utc::now());
        document.rejection_reason = decision.rejection_reason();

        if verification_documents::replace_if_pending(tx, &document)? == 0 {
            return Err(already_reviewed(document_id, DocumentStatus::Pending));
        }

        let user_verified = if decision == VerificationDecision::Verified {
            verify_owner(tx, document_id)?
        } else {
            false
        };

        Ok(VerificationOutcome {
            document,
            user_verified,
        })
    })?;

    info!(
        document_id,
        admin_id,
        status = %outcome.document.status,
        user_verified = outcome.user_verified,
        "document reviewed"
    );
    Ok(outcome)
}

/// Verify the owner of a freshly verified identity proof. Returns whether the
/// user was touched.
fn verify_owner(tx: &Connection, document_id: &str) -> StoreResult<bool> {
    // Re-read inside the transaction so the owner comes from committed state
    let document: VerificationDocument = store::get(tx, document_id)?;
    if !document.cascades_to_user() {
        return Ok(false);
    }

    let owner = &document.user_firebase_uid;
    let mut user: User = store::find(tx, owner)?.ok_or_else(|| {
        warn!(document_id, owner = %owner, "owner of identity proof is missing");
        StoreError::aborted(format!("owner {owner:?} of document {document_id:?} does not exist"))
    })?;

    user.verification_status = VerificationStatus::Verified;
    user.updated_at = Utc::now();
    match store::replace(tx, &user) {
        Ok(1) => Ok(true),
        Ok(_) => Err(StoreError::aborted(format!("owner {owner:?} vanished mid-transaction"))),
        Err(StoreError::Database(err)) if !is_lock_contention(&err) => {
            Err(StoreError::aborted(format!("updating owner {owner:?} failed: {err}")))
        }
        Err(err) => Err(err.into_abort()),
    }
}

fn already_reviewed(document_id: &str, status: DocumentStatus) -> StoreError {
    StoreError::NoOp {
        collection: COLLECTION,
        id: document_id.to_string(),
        reason: format!("document is {status}, not pending"),
    }
}

/// Pending documents, oldest id first.
pub fn get_pending_verifications(
    conn: &Connection,
    limit: usize,
) -> StoreResult<Vec<VerificationDocument>> {
    verification_documents::get_pending_documents(conn, limit)
}
