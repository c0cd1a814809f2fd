// Verification documents collection
//
// Status transitions live in `crate::verification`; this module only
// creates and reads documents.

use chrono::Utc;
use rusqlite::Connection;
use tracing::info;

use super::sql_limit;
use crate::entities::{DocumentStatus, VerificationDocument};
use crate::error::StoreResult;
use crate::schema::Validate;

/// Insert a new document. It always starts out pending.
pub fn create_verification_document(
    conn: &Connection,
    mut document: VerificationDocument,
) -> StoreResult<VerificationDocument> {
    document.status = DocumentStatus::Pending;
    document.verified_at = None;
    document.verified_by_admin_uid = None;
    document.rejection_reason = None;
    document.created_at = Utc::now();

    super::insert(conn, &document)?;
    info!(
        document_id = %document.document_id,
        owner = %document.user_firebase_uid,
        document_type = %document.document_type,
        "verification document submitted"
    );
    Ok(document)
}

pub fn get_verification_document(
    conn: &Connection,
    document_id: &str,
) -> StoreResult<Option<VerificationDocument>> {
    super::find(conn, document_id)
}

pub fn get_verification_documents_for_user(
    conn: &Connection,
    firebase_uid: &str,
) -> StoreResult<Vec<VerificationDocument>> {
    super::find_where(
        conn,
        "WHERE user_firebase_uid = ?1 ORDER BY rowid",
        [firebase_uid],
    )
}

/// Pending documents ordered by id, for stable pagination.
pub fn get_pending_documents(conn: &Connection, limit: usize) -> StoreResult<Vec<VerificationDocument>> {
    super::find_where(
        conn,
        "WHERE status = ?1 ORDER BY document_id LIMIT ?2",
        rusqlite::params![DocumentStatus::Pending.as_str(), sql_limit(limit)],
    )
}

pub fn count_pending_documents(conn: &Connection) -> StoreResult<i64> {
    super::count::<VerificationDocument, _>(
        conn,
        "WHERE status = ?1",
        [DocumentStatus::Pending.as_str()],
    )
}

/// Rewrite `document` only if the stored copy is still pending.
///
/// Returns rows changed: 0 means someone else already reviewed it.
pub(crate) fn replace_if_pending(conn: &Connection, document: &VerificationDocument) -> StoreResult<usize> {
    document.ensure_valid()?;
    let body = serde_json::to_string(document)?;
    let changed = conn.execute(
        "UPDATE verification_documents SET doc = ?1 WHERE document_id = ?2 AND status = ?3",
        rusqlite::params![body, document.document_id, DocumentStatus::Pending.as_str()],
    )?;
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::DocumentType;
    use crate::store::test_support::memory_db;

    fn id_proof(id: &str, owner: &str) -> VerificationDocument {
        VerificationDocument::new(owner, DocumentType::IdentityProof, "https://storage/id.pdf")
            .with_id(id)
    }

    #[test]
    fn test_create_forces_pending() {
        let conn = memory_db();
        let mut doc = id_proof("doc_1", "user_9");
        doc.status = DocumentStatus::Verified;
        doc.verified_by_admin_uid = Some("admin_1".to_string());

        let created = create_verification_document(&conn, doc).unwrap();
        assert!(created.is_pending());
        assert!(created.verified_by_admin_uid.is_none());

        let stored = get_verification_document(&conn, "doc_1").unwrap().unwrap();
        assert_eq!(stored, created);
    }

    #[test]
    fn test_documents_for_user() {
        let conn = memory_db();
        create_verification_document(&conn, id_proof("doc_1", "user_9")).unwrap();
        create_verification_document(
            &conn,
            VerificationDocument::new("user_9", DocumentType::BusinessLicense, "https://storage/bl.pdf")
                .with_id("doc_2"),
        )
        .unwrap();
        create_verification_document(&conn, id_proof("doc_3", "user_10")).unwrap();

        let docs = get_verification_documents_for_user(&conn, "user_9").unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.document_id.as_str()).collect();
        assert_eq!(ids, vec!["doc_1", "doc_2"]);
    }

    #[test]
    fn test_pending_ordered_by_id() {
        let conn = memory_db();
        for id in ["doc_c", "doc_a", "doc_b"] {
            create_verification_document(&conn, id_proof(id, "user_9")).unwrap();
        }

        let pending = get_pending_documents(&conn, 2).unwrap();
        let ids: Vec<&str> = pending.iter().map(|d| d.document_id.as_str()).collect();
        assert_eq!(ids, vec!["doc_a", "doc_b"]);
        assert_eq!(count_pending_documents(&conn).unwrap(), 3);
    }
}
