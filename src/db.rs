// 🗄️ Database bootstrap - connection, pragmas and collection tables
//
// Every collection is a table with a single JSON `doc` column. Keys and
// filter fields are VIRTUAL generated columns extracted from `doc`, so the
// document stays the only source of truth while lookups can use indexes.

use rusqlite::Connection;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::StoreResult;

/// Every collection, in creation order.
pub const COLLECTIONS: &[&str] = &[
    "users",
    "properties",
    "listings",
    "verification_documents",
    "saved_listings",
    "property_comparisons",
    "reviews",
    "messages",
    "notifications",
    "audit_logs",
];

/// Open (or create) the database described by `config` and make sure every
/// collection exists.
pub fn open(config: &Config) -> StoreResult<Connection> {
    let conn = match config.database_path() {
        Some(path) => {
            if let Some(dir) = path.parent() {
                if !dir.as_os_str().is_empty() {
                    std::fs::create_dir_all(dir)?;
                }
            }
            info!(path = %path.display(), "opening database");
            Connection::open(&path)?
        }
        None => {
            info!("opening in-memory database");
            Connection::open_in_memory()?
        }
    };

    configure(&conn, config.busy_timeout)?;
    setup_database(&conn)?;
    Ok(conn)
}

/// Connection-level settings; must run on every new connection.
pub fn configure(conn: &Connection, busy_timeout: Duration) -> StoreResult<()> {
    conn.busy_timeout(busy_timeout)?;

    // WAL keeps readers on the last committed state while a writer works
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    debug!(journal_mode = %mode, "journal mode set");
    Ok(())
}

pub fn setup_database(conn: &Connection) -> StoreResult<()> {
    // ==========================================================================
    // Users (keyed by external identity)
    // ==========================================================================
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            doc TEXT NOT NULL CHECK (json_valid(doc)),
            firebase_uid TEXT GENERATED ALWAYS AS (json_extract(doc, '$.firebase_uid')) VIRTUAL NOT NULL,
            email TEXT GENERATED ALWAYS AS (json_extract(doc, '$.email')) VIRTUAL,
            role TEXT GENERATED ALWAYS AS (json_extract(doc, '$.role')) VIRTUAL,
            verification_status TEXT GENERATED ALWAYS AS (json_extract(doc, '$.verification_status')) VIRTUAL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS ux_users_firebase_uid ON users(firebase_uid);",
    )?;

    // ==========================================================================
    // Properties
    // ==========================================================================
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS properties (
            doc TEXT NOT NULL CHECK (json_valid(doc)),
            property_id TEXT GENERATED ALWAYS AS (json_extract(doc, '$.property_id')) VIRTUAL NOT NULL,
            property_type TEXT GENERATED ALWAYS AS (json_extract(doc, '$.property_type')) VIRTUAL,
            current_price REAL GENERATED ALWAYS AS (json_extract(doc, '$.current_price')) VIRTUAL,
            city TEXT GENERATED ALWAYS AS (json_extract(doc, '$.location.city')) VIRTUAL,
            state TEXT GENERATED ALWAYS AS (json_extract(doc, '$.location.state')) VIRTUAL,
            bedrooms INTEGER GENERATED ALWAYS AS (json_extract(doc, '$.bedrooms')) VIRTUAL,
            latitude REAL GENERATED ALWAYS AS (json_extract(doc, '$.location.latitude')) VIRTUAL,
            longitude REAL GENERATED ALWAYS AS (json_extract(doc, '$.location.longitude')) VIRTUAL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS ux_properties_property_id ON properties(property_id);",
    )?;

    // ==========================================================================
    // Listings
    // ==========================================================================
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS listings (
            doc TEXT NOT NULL CHECK (json_valid(doc)),
            listing_id TEXT GENERATED ALWAYS AS (json_extract(doc, '$.listing_id')) VIRTUAL NOT NULL,
            property_id TEXT GENERATED ALWAYS AS (json_extract(doc, '$.property_id')) VIRTUAL,
            lister_firebase_uid TEXT GENERATED ALWAYS AS (json_extract(doc, '$.lister_firebase_uid')) VIRTUAL,
            status TEXT GENERATED ALWAYS AS (json_extract(doc, '$.status')) VIRTUAL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS ux_listings_listing_id ON listings(listing_id);",
    )?;

    // ==========================================================================
    // Verification documents
    // ==========================================================================
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS verification_documents (
            doc TEXT NOT NULL CHECK (json_valid(doc)),
            document_id TEXT GENERATED ALWAYS AS (json_extract(doc, '$.document_id')) VIRTUAL NOT NULL,
            user_firebase_uid TEXT GENERATED ALWAYS AS (json_extract(doc, '$.user_firebase_uid')) VIRTUAL,
            document_type TEXT GENERATED ALWAYS AS (json_extract(doc, '$.document_type')) VIRTUAL,
            status TEXT GENERATED ALWAYS AS (json_extract(doc, '$.status')) VIRTUAL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS ux_verification_documents_document_id
            ON verification_documents(document_id);",
    )?;

    // ==========================================================================
    // Saved listings (one per user + listing)
    // ==========================================================================
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS saved_listings (
            doc TEXT NOT NULL CHECK (json_valid(doc)),
            saved_id TEXT GENERATED ALWAYS AS (json_extract(doc, '$.saved_id')) VIRTUAL NOT NULL,
            user_firebase_uid TEXT GENERATED ALWAYS AS (json_extract(doc, '$.user_firebase_uid')) VIRTUAL,
            listing_id TEXT GENERATED ALWAYS AS (json_extract(doc, '$.listing_id')) VIRTUAL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS ux_saved_listings_saved_id ON saved_listings(saved_id);
        CREATE UNIQUE INDEX IF NOT EXISTS ux_saved_listings_user_listing
            ON saved_listings(user_firebase_uid, listing_id);",
    )?;

    // ==========================================================================
    // Property comparisons
    // ==========================================================================
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS property_comparisons (
            doc TEXT NOT NULL CHECK (json_valid(doc)),
            comparison_id TEXT GENERATED ALWAYS AS (json_extract(doc, '$.comparison_id')) VIRTUAL NOT NULL,
            user_firebase_uid TEXT GENERATED ALWAYS AS (json_extract(doc, '$.user_firebase_uid')) VIRTUAL,
            created_at TEXT GENERATED ALWAYS AS (json_extract(doc, '$.created_at')) VIRTUAL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS ux_property_comparisons_comparison_id
            ON property_comparisons(comparison_id);",
    )?;

    // ==========================================================================
    // Reviews
    // ==========================================================================
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS reviews (
            doc TEXT NOT NULL CHECK (json_valid(doc)),
            review_id TEXT GENERATED ALWAYS AS (json_extract(doc, '$.review_id')) VIRTUAL NOT NULL,
            reviewer_firebase_uid TEXT GENERATED ALWAYS AS (json_extract(doc, '$.reviewer_firebase_uid')) VIRTUAL,
            target_type TEXT GENERATED ALWAYS AS (json_extract(doc, '$.target_type')) VIRTUAL,
            target_id TEXT GENERATED ALWAYS AS (json_extract(doc, '$.target_id')) VIRTUAL,
            rating INTEGER GENERATED ALWAYS AS (json_extract(doc, '$.rating')) VIRTUAL,
            created_at TEXT GENERATED ALWAYS AS (json_extract(doc, '$.created_at')) VIRTUAL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS ux_reviews_review_id ON reviews(review_id);",
    )?;

    // ==========================================================================
    // Messages
    // ==========================================================================
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS messages (
            doc TEXT NOT NULL CHECK (json_valid(doc)),
            message_id TEXT GENERATED ALWAYS AS (json_extract(doc, '$.message_id')) VIRTUAL NOT NULL,
            sender_firebase_uid TEXT GENERATED ALWAYS AS (json_extract(doc, '$.sender_firebase_uid')) VIRTUAL,
            receiver_firebase_uid TEXT GENERATED ALWAYS AS (json_extract(doc, '$.receiver_firebase_uid')) VIRTUAL,
            listing_id TEXT GENERATED ALWAYS AS (json_extract(doc, '$.listing_id')) VIRTUAL,
            status TEXT GENERATED ALWAYS AS (json_extract(doc, '$.status')) VIRTUAL,
            sent_at TEXT GENERATED ALWAYS AS (json_extract(doc, '$.sent_at')) VIRTUAL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS ux_messages_message_id ON messages(message_id);",
    )?;

    // ==========================================================================
    // Notifications (NULL user = broadcast)
    // ==========================================================================
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS notifications (
            doc TEXT NOT NULL CHECK (json_valid(doc)),
            notification_id TEXT GENERATED ALWAYS AS (json_extract(doc, '$.notification_id')) VIRTUAL NOT NULL,
            user_firebase_uid TEXT GENERATED ALWAYS AS (json_extract(doc, '$.user_firebase_uid')) VIRTUAL,
            is_read INTEGER GENERATED ALWAYS AS (json_extract(doc, '$.is_read')) VIRTUAL,
            created_at TEXT GENERATED ALWAYS AS (json_extract(doc, '$.created_at')) VIRTUAL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS ux_notifications_notification_id
            ON notifications(notification_id);",
    )?;

    // ==========================================================================
    // Audit logs
    // ==========================================================================
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS audit_logs (
            doc TEXT NOT NULL CHECK (json_valid(doc)),
            log_id TEXT GENERATED ALWAYS AS (json_extract(doc, '$.log_id')) VIRTUAL NOT NULL,
            user_firebase_uid TEXT GENERATED ALWAYS AS (json_extract(doc, '$.user_firebase_uid')) VIRTUAL,
            action TEXT GENERATED ALWAYS AS (json_extract(doc, '$.action')) VIRTUAL,
            resource_type TEXT GENERATED ALWAYS AS (json_extract(doc, '$.resource_type')) VIRTUAL,
            resource_id TEXT GENERATED ALWAYS AS (json_extract(doc, '$.resource_id')) VIRTUAL,
            timestamp TEXT GENERATED ALWAYS AS (json_extract(doc, '$.timestamp')) VIRTUAL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS ux_audit_logs_log_id ON audit_logs(log_id);",
    )?;

    debug!(collections = COLLECTIONS.len(), "collections ready");
    Ok(())
}

/// Document count per collection.
pub fn list_collections(conn: &Connection) -> StoreResult<Vec<(String, i64)>> {
    let mut counts = Vec::with_capacity(COLLECTIONS.len());
    for name in COLLECTIONS {
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", name), [], |row| row.get(0))?;
        counts.push((name.to_string(), count));
    }
    Ok(counts)
}
