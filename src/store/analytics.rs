// Dashboard counters across collections

use rusqlite::Connection;
use serde::Serialize;

use crate::error::StoreResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analytics {
    pub total_users: i64,
    pub total_properties: i64,
    pub total_listings: i64,
    pub active_listings: i64,
    pub pending_verifications: i64,
}

/// One consistent snapshot of the platform counters.
pub fn get_analytics(conn: &Connection) -> StoreResult<Analytics> {
    let analytics = conn.query_row(
        "SELECT
            (SELECT COUNT(*) FROM users),
            (SELECT COUNT(*) FROM properties),
            (SELECT COUNT(*) FROM listings),
            (SELECT COUNT(*) FROM listings WHERE status = 'active'),
            (SELECT COUNT(*) FROM verification_documents WHERE status = 'pending')",
        [],
        |row| {
            Ok(Analytics {
                total_users: row.get(0)?,
                total_properties: row.get(1)?,
                total_listings: row.get(2)?,
                active_listings: row.get(3)?,
                pending_verifications: row.get(4)?,
            })
        },
    )?;

    Ok(analytics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        DocumentType, Listing, ListingStatus, User, UserRole, VerificationDocument,
    };
    use crate::store::listings::create_listing;
    use crate::store::test_support::memory_db;
    use crate::store::users::create_user;
    use crate::store::verification_documents::create_verification_document;

    #[test]
    fn test_empty_store() {
        let conn = memory_db();
        let stats = get_analytics(&conn).unwrap();
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.pending_verifications, 0);
    }

    #[test]
    fn test_counts() {
        let conn = memory_db();
        create_user(&conn, User::new("u1", "a@example.com", "A", UserRole::Buyer)).unwrap();
        create_user(&conn, User::new("u2", "b@example.com", "B", UserRole::Lister)).unwrap();
        create_listing(
            &conn,
            Listing::new("prop_001", "u2").with_status(ListingStatus::Active),
        )
        .unwrap();
        create_listing(&conn, Listing::new("prop_002", "u2")).unwrap();
        create_verification_document(
            &conn,
            VerificationDocument::new("u2", DocumentType::BusinessLicense, "https://storage/bl.pdf"),
        )
        .unwrap();

        assert_eq!(
            get_analytics(&conn).unwrap(),
            Analytics {
                total_users: 2,
                total_properties: 0,
                total_listings: 2,
                active_listings: 1,
                pending_verifications: 1,
            }
        );
    }
}
