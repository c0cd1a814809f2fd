// Entity Models - one document type per collection
//
// Each entity has:
// - A domain id (never a storage-assigned rowid) that is unique in its collection
// - Closed enums for every constrained string field
// - A `Validate` impl checked before every write
//
// Cross-collection references are plain string ids (`firebase_uid`,
// `property_id`, `listing_id`). The store does not enforce them; the
// operations that depend on a reference check it themselves.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::schema::Validate;

/// Closed set of string tags, stored in snake_case.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:tt ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $( $text => Ok($name::$variant), )+
                    other => Err(format!(
                        "invalid {} {:?}, expected one of: {}",
                        stringify!($name),
                        other,
                        [$( $text ),+].join(", ")
                    )),
                }
            }
        }
    };
}

pub mod audit_log;
pub mod comparison;
pub mod listing;
pub mod message;
pub mod notification;
pub mod property;
pub mod review;
pub mod saved_listing;
pub mod user;
pub mod verification;

pub use audit_log::{AuditLog, AuditLogFilter};
pub use comparison::PropertyComparison;
pub use listing::{Listing, ListingPatch, ListingStatus};
pub use message::{Message, MessageStatus};
pub use notification::{Notification, NotificationType};
pub use property::{Location, PriceChange, Property, PropertyPatch, PropertyType};
pub use review::{Review, ReviewTarget};
pub use saved_listing::SavedListing;
pub use user::{User, UserPatch, UserRole, VerificationStatus};
pub use verification::{DocumentStatus, DocumentType, VerificationDocument};

/// A document stored in its own named collection.
pub trait Document: Serialize + DeserializeOwned + Validate {
    /// Table name of the collection.
    const COLLECTION: &'static str;
    /// Generated column holding the domain id.
    const KEY: &'static str;

    fn key(&self) -> &str;
}

/// `<prefix>_<8 hex chars>`, for documents created without an explicit id.
pub fn generate_id(prefix: &str) -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &hex[..8])
}
