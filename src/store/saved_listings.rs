// Saved listings collection (one bookmark per user and listing)

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::entities::SavedListing;
use crate::error::StoreResult;
use crate::unit_of_work::{self, RetryPolicy};

fn find_pair(conn: &Connection, firebase_uid: &str, listing_id: &str) -> StoreResult<Option<SavedListing>> {
    let body: Option<String> = conn
        .query_row(
            "SELECT doc FROM saved_listings WHERE user_firebase_uid = ?1 AND listing_id = ?2",
            [firebase_uid, listing_id],
            |row| row.get(0),
        )
        .optional()?;

    match body {
        Some(body) => Ok(Some(serde_json::from_str(&body)?)),
        None => Ok(None),
    }
}

/// Bookmark a listing. Saving the same listing twice returns the first record.
pub fn save_listing(
    conn: &Connection,
    policy: &RetryPolicy,
    firebase_uid: &str,
    listing_id: &str,
    notes: Option<String>,
) -> StoreResult<SavedListing> {
    unit_of_work::run(conn, policy, "save_listing", |tx| {
        if let Some(existing) = find_pair(tx, firebase_uid, listing_id)? {
            debug!(firebase_uid, listing_id, "listing already saved");
            return Ok(existing);
        }

        let saved = SavedListing::new(firebase_uid, listing_id, notes.clone());
        super::insert(tx, &saved)?;
        info!(saved_id = %saved.saved_id, "listing saved");
        Ok(saved)
    })
}

/// A user's bookmarks, most recent first.
pub fn get_saved_listings(conn: &Connection, firebase_uid: &str) -> StoreResult<Vec<SavedListing>> {
    super::find_where(
        conn,
        "WHERE user_firebase_uid = ?1 ORDER BY julianday(json_extract(doc, '$.saved_at')) DESC, rowid DESC",
        [firebase_uid],
    )
}

pub fn remove_saved_listing(conn: &Connection, firebase_uid: &str, listing_id: &str) -> StoreResult<bool> {
    let removed = conn.execute(
        "DELETE FROM saved_listings WHERE user_firebase_uid = ?1 AND listing_id = ?2",
        [firebase_uid, listing_id],
    )?;
    debug!(firebase_uid, listing_id, removed, "saved listing removed");
    Ok(removed > 0)
}
