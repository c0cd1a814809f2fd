// Users collection

use chrono::Utc;
use rusqlite::Connection;
use tracing::info;

use super::sql_limit;
use crate::entities::{User, UserPatch, UserRole};
use crate::error::StoreResult;
use crate::unit_of_work::{self, RetryPolicy};

/// Insert a user; timestamps are set here.
pub fn create_user(conn: &Connection, mut user: User) -> StoreResult<User> {
    let now = Utc::now();
    user.created_at = now;
    user.updated_at = now;

    super::insert(conn, &user)?;
    info!(firebase_uid = %user.firebase_uid, role = %user.role, "user created");
    Ok(user)
}

pub fn get_user_by_firebase_uid(conn: &Connection, firebase_uid: &str) -> StoreResult<Option<User>> {
    super::find(conn, firebase_uid)
}

pub fn get_users_by_role(conn: &Connection, role: UserRole, limit: usize) -> StoreResult<Vec<User>> {
    super::find_where(
        conn,
        "WHERE role = ?1 ORDER BY rowid LIMIT ?2",
        rusqlite::params![role.as_str(), sql_limit(limit)],
    )
}

/// Apply `patch` to an existing user. `NotFound` if the uid is unknown.
pub fn update_user(
    conn: &Connection,
    policy: &RetryPolicy,
    firebase_uid: &str,
    patch: UserPatch,
) -> StoreResult<User> {
    unit_of_work::run(conn, policy, "update_user", |tx| {
        let mut user: User = super::get(tx, firebase_uid)?;
        patch.clone().apply(&mut user);
        user.updated_at = Utc::now();
        super::replace_existing(tx, &user)?;
        Ok(user)
    })
}

pub fn delete_user(conn: &Connection, firebase_uid: &str) -> StoreResult<bool> {
    super::delete::<User>(conn, firebase_uid)
}

pub fn count_users(conn: &Connection) -> StoreResult<i64> {
    super::count::<User, _>(conn, "", [])
}
