// ✉️ Message - direct message between two users, optionally about a listing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{generate_id, Document};
use crate::schema::{Checker, Validate, ValidationResult};

string_enum! {
    pub enum MessageStatus {
        Unread => "unread",
        Read => "read",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: String,
    pub sender_firebase_uid: String,
    pub receiver_firebase_uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub content: String,
    pub status: MessageStatus,
    pub sent_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn new(
        sender_firebase_uid: impl Into<String>,
        receiver_firebase_uid: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Message {
            message_id: generate_id("msg"),
            sender_firebase_uid: sender_firebase_uid.into(),
            receiver_firebase_uid: receiver_firebase_uid.into(),
            listing_id: None,
            subject: None,
            content: content.into(),
            status: MessageStatus::Unread,
            sent_at: Utc::now(),
            read_at: None,
        }
    }

    pub fn about_listing(mut self, listing_id: impl Into<String>) -> Self {
        self.listing_id = Some(listing_id.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

impl Validate for Message {
    fn validate(&self) -> ValidationResult {
        Checker::new(Self::COLLECTION)
            .required("message_id", &self.message_id)
            .required("sender_firebase_uid", &self.sender_firebase_uid)
            .required("receiver_firebase_uid", &self.receiver_firebase_uid)
            .check(
                self.sender_firebase_uid != self.receiver_firebase_uid,
                "receiver_firebase_uid",
                "Sender and receiver must differ",
            )
            .required("content", &self.content)
            .check(
                (self.status == MessageStatus::Read) == self.read_at.is_some(),
                "read_at",
                "Set exactly when the message is read",
            )
            .finish()
    }
}

impl Document for Message {
    const COLLECTION: &'static str = "messages";
    const KEY: &'static str = "message_id";

    fn key(&self) -> &str {
        &self.message_id
    }
}
