// Property comparisons collection

use chrono::Utc;
use rusqlite::Connection;
use tracing::info;

use crate::entities::PropertyComparison;
use crate::error::StoreResult;

pub fn create_comparison(
    conn: &Connection,
    mut comparison: PropertyComparison,
) -> StoreResult<PropertyComparison> {
    comparison.created_at = Utc::now();
    super::insert(conn, &comparison)?;
    info!(
        comparison_id = %comparison.comparison_id,
        properties = comparison.property_ids.len(),
        "comparison created"
    );
    Ok(comparison)
}

/// A user's comparisons, newest first.
pub fn get_comparisons_for_user(
    conn: &Connection,
    firebase_uid: &str,
) -> StoreResult<Vec<PropertyComparison>> {
    super::find_where(
        conn,
        "WHERE user_firebase_uid = ?1 ORDER BY julianday(created_at) DESC, rowid DESC",
        [firebase_uid],
    )
}

pub fn delete_comparison(conn: &Connection, comparison_id: &str) -> StoreResult<bool> {
    super::delete::<PropertyComparison>(conn, comparison_id)
}
