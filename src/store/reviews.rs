// Reviews collection

use chrono::Utc;
use rusqlite::Connection;
use tracing::info;

use crate::entities::{Review, ReviewTarget};
use crate::error::StoreResult;

pub fn create_review(conn: &Connection, mut review: Review) -> StoreResult<Review> {
    let now = Utc::now();
    review.created_at = now;
    review.updated_at = now;

    super::insert(conn, &review)?;
    info!(
        review_id = %review.review_id,
        target = %review.target_type,
        target_id = %review.target_id,
        rating = review.rating,
        "review created"
    );
    Ok(review)
}

/// Reviews of one property or lister, newest first.
pub fn get_reviews_for_target(
    conn: &Connection,
    target_type: ReviewTarget,
    target_id: &str,
) -> StoreResult<Vec<Review>> {
    super::find_where(
        conn,
        "WHERE target_type = ?1 AND target_id = ?2 ORDER BY julianday(created_at) DESC, rowid DESC",
        [target_type.as_str(), target_id],
    )
}

/// Mean rating, or `None` when the target has no reviews.
pub fn average_rating(
    conn: &Connection,
    target_type: ReviewTarget,
    target_id: &str,
) -> StoreResult<Option<f64>> {
    let avg: Option<f64> = conn.query_row(
        "SELECT AVG(rating) FROM reviews WHERE target_type = ?1 AND target_id = ?2",
        [target_type.as_str(), target_id],
        |row| row.get(0),
    )?;
    Ok(avg)
}
