// Messages collection

use chrono::Utc;
use rusqlite::Connection;
use tracing::{debug, info};

use super::sql_limit;
use crate::entities::{Message, MessageStatus};
use crate::error::StoreResult;
use crate::unit_of_work::{self, RetryPolicy};

/// Store a new, unread message.
pub fn send_message(conn: &Connection, mut message: Message) -> StoreResult<Message> {
    message.status = MessageStatus::Unread;
    message.sent_at = Utc::now();
    message.read_at = None;

    super::insert(conn, &message)?;
    info!(
        message_id = %message.message_id,
        from = %message.sender_firebase_uid,
        to = %message.receiver_firebase_uid,
        "message sent"
    );
    Ok(message)
}

/// Messages received by `firebase_uid`, newest first.
pub fn get_inbox(
    conn: &Connection,
    firebase_uid: &str,
    unread_only: bool,
    limit: usize,
) -> StoreResult<Vec<Message>> {
    let clause = if unread_only {
        "WHERE receiver_firebase_uid = ?1 AND status = 'unread' \
         ORDER BY julianday(sent_at) DESC, rowid DESC LIMIT ?2"
    } else {
        "WHERE receiver_firebase_uid = ?1 ORDER BY julianday(sent_at) DESC, rowid DESC LIMIT ?2"
    };
    super::find_where(conn, clause, rusqlite::params![firebase_uid, sql_limit(limit)])
}

/// Every message exchanged between two users, oldest first.
pub fn get_conversation(conn: &Connection, user_a: &str, user_b: &str) -> StoreResult<Vec<Message>> {
    super::find_where(
        conn,
        "WHERE (sender_firebase_uid = ?1 AND receiver_firebase_uid = ?2)
            OR (sender_firebase_uid = ?2 AND receiver_firebase_uid = ?1)
         ORDER BY julianday(sent_at), rowid",
        [user_a, user_b],
    )
}

/// Mark a message read. Reading it again keeps the first `read_at`.
pub fn mark_message_read(conn: &Connection, policy: &RetryPolicy, message_id: &str) -> StoreResult<Message> {
    unit_of_work::run(conn, policy, "mark_message_read", |tx| {
        let mut message: Message = super::get(tx, message_id)?;
        if message.status == MessageStatus::Read {
            debug!(message_id, "message already read");
            return Ok(message);
        }

        message.status = MessageStatus::Read;
        message.read_at = Some(Utc::now());
        super::replace_existing(tx, &message)?;
        Ok(message)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::test_support::memory_db;

    #[test]
    fn test_conversation_is_chronological() {
        let conn = memory_db();
        let q = send_message(&conn, Message::new("buyer_1", "lister_1", "Is it available?")).unwrap();
        let a = send_message(&conn, Message::new("lister_1", "buyer_1", "Yes, come by Saturday")).unwrap();
        send_message(&conn, Message::new("buyer_2", "lister_1", "Price negotiable?")).unwrap();

        let thread = get_conversation(&conn, "lister_1", "buyer_1").unwrap();
        assert_eq!(thread, vec![q, a]);
    }

    #[test]
    fn test_inbox_and_mark_read() {
        let conn = memory_db();
        let first = send_message(&conn, Message::new("buyer_1", "lister_1", "Hello")).unwrap();
        let second = send_message(&conn, Message::new("buyer_2", "lister_1", "Hi there")).unwrap();

        let inbox = get_inbox(&conn, "lister_1", false, 10).unwrap();
        assert_eq!(inbox, vec![second.clone(), first.clone()]);

        let read = mark_message_read(&conn, &RetryPolicy::default(), &first.message_id).unwrap();
        assert_eq!(read.status, MessageStatus::Read);
        assert!(read.read_at.is_some());

        let again = mark_message_read(&conn, &RetryPolicy::default(), &first.message_id).unwrap();
        assert_eq!(again.read_at, read.read_at);

        let unread = get_inbox(&conn, "lister_1", true, 10).unwrap();
        assert_eq!(unread, vec![second]);
    }

    #[test]
    fn test_mark_missing_message() {
        let conn = memory_db();
        let result = mark_message_read(&conn, &RetryPolicy::default(), "msg_missing");
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_message_to_self_rejected() {
        let conn = memory_db();
        let result = send_message(&conn, Message::new("buyer_1", "buyer_1", "note to self"));
        assert!(matches!(result, Err(StoreError::ValidationFailed(_))));
    }
}
