// Audit logs collection (append-only)

use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::Connection;
use tracing::debug;

use super::sql_limit;
use crate::entities::{AuditLog, AuditLogFilter};
use crate::error::StoreResult;

/// Append an entry stamped with the current time.
pub fn create_audit_log(conn: &Connection, mut log: AuditLog) -> StoreResult<AuditLog> {
    log.timestamp = Utc::now();
    super::insert(conn, &log)?;
    debug!(log_id = %log.log_id, action = %log.action, "audit log written");
    Ok(log)
}

/// Entries matching every set field of `filter`, newest first.
pub fn get_audit_logs(
    conn: &Connection,
    filter: &AuditLogFilter,
    limit: usize,
) -> StoreResult<Vec<AuditLog>> {
    let mut conditions = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    let columns = [
        ("user_firebase_uid", &filter.user_firebase_uid),
        ("action", &filter.action),
        ("resource_type", &filter.resource_type),
        ("resource_id", &filter.resource_id),
    ];
    for (column, value) in columns {
        if let Some(value) = value {
            params.push(Value::Text(value.clone()));
            conditions.push(format!("{column} = ?{}", params.len()));
        }
    }

    let mut clause = String::new();
    if !conditions.is_empty() {
        clause = format!("WHERE {} ", conditions.join(" AND "));
    }
    params.push(Value::Integer(sql_limit(limit)));
    clause.push_str(&format!(
        "ORDER BY julianday(timestamp) DESC, rowid DESC LIMIT ?{}",
        params.len()
    ));

    super::find_where(conn, &clause, rusqlite::params_from_iter(params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::memory_db;

    #[test]
    fn test_filter_and_order() {
        let conn = memory_db();
        let submitted = create_audit_log(
            &conn,
            AuditLog::new("submit_document").by("user_9").on("verification_document", "doc_77"),
        )
        .unwrap();
        let verified = create_audit_log(
            &conn,
            AuditLog::new("verify_document")
                .by("admin_1")
                .on("verification_document", "doc_77")
                .with_metadata(serde_json::json!({"status": "verified"})),
        )
        .unwrap();
        create_audit_log(&conn, AuditLog::new("login").by("admin_1")).unwrap();

        let history = get_audit_logs(
            &conn,
            &AuditLogFilter::for_resource("verification_document", "doc_77"),
            10,
        )
        .unwrap();
        assert_eq!(history, vec![verified, submitted]);

        let by_admin = AuditLogFilter {
            user_firebase_uid: Some("admin_1".to_string()),
            ..AuditLogFilter::default()
        };
        assert_eq!(get_audit_logs(&conn, &by_admin, 10).unwrap().len(), 2);

        let latest = get_audit_logs(&conn, &AuditLogFilter::default(), 1).unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].action, "login");
    }
}
