// Real Estate Store - Core Library
// Document collections on SQLite, exposed for the CLI and for tests

pub mod config;
pub mod db;
pub mod entities;      // Document types, one per collection
pub mod error;
pub mod facade;        // EstateDb: connection + retry policy
pub mod indexes;
pub mod logging;
pub mod price_history; // Append-only price log rules
pub mod schema;        // Validate trait + Checker
pub mod seed;
pub mod store;         // Per-collection operations
pub mod unit_of_work;  // Transaction + retry policy
pub mod verification;  // Document review coordinator

// Re-export commonly used types
pub use config::Config;
pub use entities::{
    AuditLog, AuditLogFilter, Document, DocumentStatus, DocumentType, Listing, ListingPatch,
    ListingStatus, Location, Message, MessageStatus, Notification, NotificationType, PriceChange,
    Property, PropertyComparison, PropertyPatch, PropertyType, Review, ReviewTarget, SavedListing,
    User, UserPatch, UserRole, VerificationDocument, VerificationStatus,
};
pub use error::{StoreError, StoreResult};
pub use facade::EstateDb;
pub use schema::{Validate, ValidationError, ValidationResult};
pub use seed::SeedReport;
pub use store::analytics::Analytics;
pub use store::properties::PropertySearch;
pub use unit_of_work::RetryPolicy;
pub use verification::{VerificationDecision, VerificationOutcome};
