// 🔎 Secondary indexes over the generated filter columns
//
// Uniqueness indexes belong to collection setup (`db::setup_database`);
// everything here only speeds up lookups and can be rebuilt at any time.

use rusqlite::Connection;
use tracing::info;

use crate::error::StoreResult;

/// `(index name, table, columns)`.
const INDEXES: &[(&str, &str, &str)] = &[
    ("idx_users_email", "users", "email"),
    ("idx_users_role", "users", "role"),
    ("idx_users_verification_status", "users", "verification_status"),
    ("idx_properties_type", "properties", "property_type"),
    ("idx_properties_price", "properties", "current_price"),
    ("idx_properties_city_state", "properties", "city, state"),
    ("idx_properties_bedrooms", "properties", "bedrooms"),
    ("idx_properties_coordinates", "properties", "latitude, longitude"),
    ("idx_listings_property", "listings", "property_id"),
    ("idx_listings_lister", "listings", "lister_firebase_uid"),
    ("idx_listings_status", "listings", "status"),
    ("idx_verification_documents_user", "verification_documents", "user_firebase_uid"),
    ("idx_verification_documents_status", "verification_documents", "status, document_id"),
    ("idx_saved_listings_user", "saved_listings", "user_firebase_uid"),
    ("idx_property_comparisons_user", "property_comparisons", "user_firebase_uid"),
    ("idx_reviews_target", "reviews", "target_type, target_id"),
    ("idx_reviews_reviewer", "reviews", "reviewer_firebase_uid"),
    ("idx_messages_receiver", "messages", "receiver_firebase_uid, status"),
    ("idx_messages_sender", "messages", "sender_firebase_uid"),
    ("idx_messages_listing", "messages", "listing_id"),
    ("idx_notifications_user", "notifications", "user_firebase_uid, is_read"),
    ("idx_audit_logs_user", "audit_logs", "user_firebase_uid"),
    ("idx_audit_logs_action", "audit_logs", "action"),
    ("idx_audit_logs_resource", "audit_logs", "resource_type, resource_id"),
];

/// Create every secondary index. Safe to run repeatedly. Returns how many
/// index definitions were applied.
pub fn create_indexes(conn: &Connection) -> StoreResult<usize> {
    for (name, table, columns) in INDEXES {
        conn.execute(
            &format!("CREATE INDEX IF NOT EXISTS {name} ON {table}({columns})"),
            [],
        )?;
    }

    info!(indexes = INDEXES.len(), "secondary indexes ready");
    Ok(INDEXES.len())
}
