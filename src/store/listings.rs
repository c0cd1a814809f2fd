// Listings collection

use chrono::Utc;
use rusqlite::Connection;
use tracing::{debug, info};

use super::sql_limit;
use crate::entities::{Listing, ListingPatch, ListingStatus};
use crate::error::StoreResult;
use crate::unit_of_work::{self, RetryPolicy};

/// Insert a new listing. Views start at zero.
pub fn create_listing(conn: &Connection, mut listing: Listing) -> StoreResult<Listing> {
    let now = Utc::now();
    listing.views_count = 0;
    listing.created_at = now;
    listing.updated_at = now;

    super::insert(conn, &listing)?;
    info!(
        listing_id = %listing.listing_id,
        property_id = %listing.property_id,
        status = %listing.status,
        "listing created"
    );
    Ok(listing)
}

/// Fetch a listing, optionally counting the fetch as a view.
///
/// The counter is bumped inside SQLite in one statement, so concurrent
/// viewers never lose an increment.
pub fn get_listing_by_id(
    conn: &Connection,
    listing_id: &str,
    increment_view: bool,
) -> StoreResult<Option<Listing>> {
    if increment_view {
        let bumped = conn.execute(
            "UPDATE listings
             SET doc = json_set(doc, '$.views_count', COALESCE(json_extract(doc, '$.views_count'), 0) + 1)
             WHERE listing_id = ?1",
            [listing_id],
        )?;
        debug!(listing_id, bumped, "listing view counted");
    }
    super::find(conn, listing_id)
}

pub fn get_listings_by_status(
    conn: &Connection,
    status: ListingStatus,
    limit: usize,
) -> StoreResult<Vec<Listing>> {
    super::find_where(
        conn,
        "WHERE status = ?1 ORDER BY rowid LIMIT ?2",
        rusqlite::params![status.as_str(), sql_limit(limit)],
    )
}

pub fn get_listings_by_lister(
    conn: &Connection,
    lister_firebase_uid: &str,
    limit: usize,
) -> StoreResult<Vec<Listing>> {
    super::find_where(
        conn,
        "WHERE lister_firebase_uid = ?1 ORDER BY rowid LIMIT ?2",
        rusqlite::params![lister_firebase_uid, sql_limit(limit)],
    )
}

/// Apply `patch` to an existing listing. `NotFound` if the id is unknown.
pub fn update_listing(
    conn: &Connection,
    policy: &RetryPolicy,
    listing_id: &str,
    patch: ListingPatch,
) -> StoreResult<Listing> {
    unit_of_work::run(conn, policy, "update_listing", |tx| {
        let mut listing: Listing = super::get(tx, listing_id)?;
        let now = Utc::now();
        patch.clone().apply(&mut listing, now);
        listing.updated_at = now;

        super::replace_existing(tx, &listing)?;
        Ok(listing)
    })
}

pub fn delete_listing(conn: &Connection, listing_id: &str) -> StoreResult<bool> {
    super::delete::<Listing>(conn, listing_id)
}

pub fn count_listings(conn: &Connection) -> StoreResult<i64> {
    super::count::<Listing, _>(conn, "", [])
}

pub fn count_listings_with_status(conn: &Connection, status: ListingStatus) -> StoreResult<i64> {
    super::count::<Listing, _>(conn, "WHERE status = ?1", [status.as_str()])
}
