//! Collection access: generic document helpers plus one module per collection.
//!
//! Every function takes `&Connection`; a `rusqlite::Transaction` derefs to a
//! connection, so the same helpers run inside a unit of work.

use rusqlite::{Connection, OptionalExtension, Params};
use tracing::debug;

use crate::entities::Document;
use crate::error::{StoreError, StoreResult};

pub mod analytics;
pub mod audit_logs;
pub mod comparisons;
pub mod listings;
pub mod messages;
pub mod notifications;
pub mod properties;
pub mod reviews;
pub mod saved_listings;
pub mod users;
pub mod verification_documents;

/// Validate and insert a new document.
pub fn insert<D: Document>(conn: &Connection, doc: &D) -> StoreResult<()> {
    doc.ensure_valid()?;
    let body = serde_json::to_string(doc)?;

    let sql = format!("INSERT INTO {} (doc) VALUES (?1)", D::COLLECTION);
    match conn.execute(&sql, [body]) {
        Ok(_) => {
            debug!(collection = D::COLLECTION, key = doc.key(), "inserted");
            Ok(())
        }
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Err(StoreError::Duplicate {
                collection: D::COLLECTION,
                id: doc.key().to_string(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Point lookup by domain id.
pub fn find<D: Document>(conn: &Connection, key: &str) -> StoreResult<Option<D>> {
    let sql = format!(
        "SELECT doc FROM {} WHERE {} = ?1",
        D::COLLECTION,
        D::KEY
    );
    let body: Option<String> = conn
        .query_row(&sql, [key], |row| row.get(0))
        .optional()?;

    match body {
        Some(body) => Ok(Some(serde_json::from_str(&body)?)),
        None => Ok(None),
    }
}

/// Point lookup that fails with `NotFound`.
pub fn get<D: Document>(conn: &Connection, key: &str) -> StoreResult<D> {
    find(conn, key)?.ok_or_else(|| StoreError::not_found(D::COLLECTION, key))
}

/// Filtered scan. `clause` is everything after `FROM <collection>`.
pub fn find_where<D: Document, P: Params>(
    conn: &Connection,
    clause: &str,
    params: P,
) -> StoreResult<Vec<D>> {
    let sql = format!("SELECT doc FROM {} {}", D::COLLECTION, clause);
    let mut stmt = conn.prepare(&sql)?;
    let bodies = stmt
        .query_map(params, |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    bodies
        .iter()
        .map(|body| serde_json::from_str(body).map_err(StoreError::from))
        .collect()
}

/// Rewrite a stored document in one statement. Returns rows changed.
pub fn replace<D: Document>(conn: &Connection, doc: &D) -> StoreResult<usize> {
    doc.ensure_valid()?;
    let body = serde_json::to_string(doc)?;

    let sql = format!(
        "UPDATE {} SET doc = ?1 WHERE {} = ?2",
        D::COLLECTION,
        D::KEY
    );
    let changed = conn.execute(&sql, [body.as_str(), doc.key()])?;
    debug!(collection = D::COLLECTION, key = doc.key(), changed, "replaced");
    Ok(changed)
}

/// Like `replace`, but fails with `NotFound` when nothing matched.
pub fn replace_existing<D: Document>(conn: &Connection, doc: &D) -> StoreResult<()> {
    match replace(conn, doc)? {
        0 => Err(StoreError::not_found(D::COLLECTION, doc.key())),
        _ => Ok(()),
    }
}

pub fn delete<D: Document>(conn: &Connection, key: &str) -> StoreResult<bool> {
    let sql = format!("DELETE FROM {} WHERE {} = ?1", D::COLLECTION, D::KEY);
    let deleted = conn.execute(&sql, [key])?;
    debug!(collection = D::COLLECTION, key, deleted, "deleted");
    Ok(deleted > 0)
}

pub fn count<D: Document, P: Params>(conn: &Connection, clause: &str, params: P) -> StoreResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {} {}", D::COLLECTION, clause);
    Ok(conn.query_row(&sql, params, |row| row.get(0))?)
}

/// SQLite's `LIMIT` takes a signed integer.
pub(crate) fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
pub(crate) mod test_support {
    use rusqlite::Connection;

    use crate::db::setup_database;

    /// Fresh in-memory database with every collection.
    pub fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::memory_db;
    use super::*;
    use crate::entities::{User, UserRole};

    #[test]
    fn test_insert_find_delete() {
        let conn = memory_db();
        let user = User::new("uid_1", "a@example.com", "Alice", UserRole::Buyer);

        insert(&conn, &user).unwrap();
        let found: User = get(&conn, "uid_1").unwrap();
        assert_eq!(found, user);

        assert!(delete::<User>(&conn, "uid_1").unwrap());
        assert!(!delete::<User>(&conn, "uid_1").unwrap());
        assert!(find::<User>(&conn, "uid_1").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_key() {
        let conn = memory_db();
        let user = User::new("uid_1", "a@example.com", "Alice", UserRole::Buyer);
        insert(&conn, &user).unwrap();

        let err = insert(&conn, &user).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { collection: "users", .. }));
    }

    #[test]
    fn test_invalid_document_never_written() {
        let conn = memory_db();
        let user = User::new("uid_1", "", "Alice", UserRole::Buyer);

        assert!(matches!(
            insert(&conn, &user),
            Err(StoreError::ValidationFailed(_))
        ));
        assert_eq!(count::<User, _>(&conn, "", []).unwrap(), 0);
    }

    #[test]
    fn test_replace_missing_is_not_found() {
        let conn = memory_db();
        let user = User::new("ghost", "g@example.com", "Ghost", UserRole::Visitor);

        assert_eq!(replace(&conn, &user).unwrap(), 0);
        assert!(matches!(
            replace_existing(&conn, &user),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("pool"), "%pool%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
