// Notifications collection
//
// A notification with no `user_firebase_uid` is a broadcast and shows up in
// every user's feed.

use chrono::Utc;
use rusqlite::Connection;
use tracing::info;

use super::sql_limit;
use crate::entities::Notification;
use crate::error::StoreResult;
use crate::unit_of_work::{self, RetryPolicy};

pub fn create_notification(conn: &Connection, mut notification: Notification) -> StoreResult<Notification> {
    notification.is_read = false;
    notification.created_at = Utc::now();

    super::insert(conn, &notification)?;
    info!(
        notification_id = %notification.notification_id,
        broadcast = notification.is_broadcast(),
        kind = %notification.notification_type,
        "notification created"
    );
    Ok(notification)
}

/// A user's own notifications plus broadcasts, newest first.
pub fn get_notifications(
    conn: &Connection,
    firebase_uid: &str,
    unread_only: bool,
    limit: usize,
) -> StoreResult<Vec<Notification>> {
    let clause = if unread_only {
        "WHERE (user_firebase_uid = ?1 OR user_firebase_uid IS NULL) AND is_read = 0 \
         ORDER BY julianday(created_at) DESC, rowid DESC LIMIT ?2"
    } else {
        "WHERE user_firebase_uid = ?1 OR user_firebase_uid IS NULL \
         ORDER BY julianday(created_at) DESC, rowid DESC LIMIT ?2"
    };
    super::find_where(conn, clause, rusqlite::params![firebase_uid, sql_limit(limit)])
}

/// Mark a notification read. `NotFound` if the id is unknown.
pub fn mark_notification_read(
    conn: &Connection,
    policy: &RetryPolicy,
    notification_id: &str,
) -> StoreResult<Notification> {
    unit_of_work::run(conn, policy, "mark_notification_read", |tx| {
        let mut notification: Notification = super::get(tx, notification_id)?;
        if !notification.is_read {
            notification.is_read = true;
            super::replace_existing(tx, &notification)?;
        }
        Ok(notification)
    })
}
