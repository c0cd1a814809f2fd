// 👤 User Entity - keyed by the external identity id (`firebase_uid`)
//
// Authentication happens upstream; this store only trusts the uid it is given.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Document;
use crate::schema::{Checker, Validate, ValidationResult};

// ============================================================================
// ENUMS
// ============================================================================

string_enum! {
    pub enum UserRole {
        Visitor => "visitor",
        Buyer => "buyer",
        Renter => "renter",
        Lister => "lister",
        Admin => "admin",
    }
}

string_enum! {
    /// Mutated only by document verification or a direct admin update.
    pub enum VerificationStatus {
        Pending => "pending",
        Verified => "verified",
        Rejected => "rejected",
        NotSubmitted => "not_submitted",
    }
}

impl Default for VerificationStatus {
    fn default() -> Self {
        VerificationStatus::NotSubmitted
    }
}

// ============================================================================
// USER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub firebase_uid: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,

    #[serde(default)]
    pub verification_status: VerificationStatus,
    #[serde(default)]
    pub two_factor_enabled: bool,
    #[serde(default)]
    pub is_suspended: bool,
    #[serde(default)]
    pub is_banned: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New user with the platform defaults (not verified, not suspended).
    pub fn new(
        firebase_uid: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        role: UserRole,
    ) -> Self {
        let now = Utc::now();
        User {
            firebase_uid: firebase_uid.into(),
            email: email.into(),
            name: name.into(),
            role,
            phone: None,
            profile_picture: None,
            verification_status: VerificationStatus::default(),
            two_factor_enabled: false,
            is_suspended: false,
            is_banned: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn is_verified(&self) -> bool {
        self.verification_status == VerificationStatus::Verified
    }

    pub fn can_act(&self) -> bool {
        !self.is_suspended && !self.is_banned
    }
}

impl Validate for User {
    fn validate(&self) -> ValidationResult {
        Checker::new(Self::COLLECTION)
            .required("firebase_uid", &self.firebase_uid)
            .required("email", &self.email)
            .check(self.email.contains('@'), "email", "Must contain '@'")
            .required("name", &self.name)
            .not_blank("phone", self.phone.as_deref())
            .finish()
    }
}

impl Document for User {
    const COLLECTION: &'static str = "users";
    const KEY: &'static str = "firebase_uid";

    fn key(&self) -> &str {
        &self.firebase_uid
    }
}

// ============================================================================
// PATCH
// ============================================================================

/// Fields a caller may change on an existing user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub verification_status: Option<VerificationStatus>,
    pub two_factor_enabled: Option<bool>,
    pub is_suspended: Option<bool>,
    pub is_banned: Option<bool>,
}

impl UserPatch {
    pub fn apply(self, user: &mut User) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(phone) = self.phone {
            user.phone = Some(phone);
        }
        if let Some(picture) = self.profile_picture {
            user.profile_picture = Some(picture);
        }
        if let Some(status) = self.verification_status {
            user.verification_status = status;
        }
        if let Some(flag) = self.two_factor_enabled {
            user.two_factor_enabled = flag;
        }
        if let Some(flag) = self.is_suspended {
            user.is_suspended = flag;
        }
        if let Some(flag) = self.is_banned {
            user.is_banned = flag;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_defaults() {
        let user = User::new("uid_1", "a@example.com", "Alice", UserRole::Buyer);

        assert_eq!(user.verification_status, VerificationStatus::NotSubmitted);
        assert!(!user.two_factor_enabled);
        assert!(user.can_act());
        assert!(!user.is_verified());
        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_user_missing_fields() {
        let user = User::new("", "not-an-email", "", UserRole::Buyer);
        let errors = user.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();

        assert_eq!(fields, vec!["firebase_uid", "email", "name"]);
    }

    #[test]
    fn test_defaults_fill_missing_json_fields() {
        let json = serde_json::json!({
            "firebase_uid": "uid_2",
            "email": "b@example.com",
            "name": "Bob",
            "role": "lister",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        });
        let user: User = serde_json::from_value(json).unwrap();

        assert_eq!(user.role, UserRole::Lister);
        assert_eq!(user.verification_status, VerificationStatus::NotSubmitted);
        assert!(!user.is_banned);
    }

    #[test]
    fn test_patch_only_touches_given_fields() {
        let mut user = User::new("uid_3", "c@example.com", "Carol", UserRole::Renter);
        UserPatch {
            phone: Some("+9876543210".to_string()),
            is_suspended: Some(true),
            ..UserPatch::default()
        }
        .apply(&mut user);

        assert_eq!(user.phone.as_deref(), Some("+9876543210"));
        assert!(user.is_suspended);
        assert_eq!(user.name, "Carol");
        assert!(!user.can_act());
    }
}
