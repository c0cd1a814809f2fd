// 🔔 Notification - addressed to one user, or broadcast when the user is None

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{generate_id, Document};
use crate::schema::{Checker, Validate, ValidationResult};

string_enum! {
    pub enum NotificationType {
        System => "system",
        ListingUpdate => "listing_update",
        Message => "message",
        Verification => "verification",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: String,
    #[serde(default)]
    pub user_firebase_uid: Option<String>,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn to_user(
        user_firebase_uid: impl Into<String>,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Notification {
            user_firebase_uid: Some(user_firebase_uid.into()),
            ..Notification::broadcast(notification_type, title, message)
        }
    }

    pub fn broadcast(
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Notification {
            notification_id: generate_id("notif"),
            user_firebase_uid: None,
            title: title.into(),
            message: message.into(),
            notification_type,
            is_read: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_broadcast(&self) -> bool {
        self.user_firebase_uid.is_none()
    }
}

impl Validate for Notification {
    fn validate(&self) -> ValidationResult {
        Checker::new(Self::COLLECTION)
            .required("notification_id", &self.notification_id)
            .not_blank("user_firebase_uid", self.user_firebase_uid.as_deref())
            .required("title", &self.title)
            .required("message", &self.message)
            .finish()
    }
}

impl Document for Notification {
    const COLLECTION: &'static str = "notifications";
    const KEY: &'static str = "notification_id";

    fn key(&self) -> &str {
        &self.notification_id
    }
}
