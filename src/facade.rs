// 🏢 EstateDb - one connection plus its retry policy
//
// Thin pass-through over the collection modules. Each thread that needs the
// store opens its own `EstateDb`; the handle is `Send` but not shared.

use rusqlite::Connection;

use crate::config::Config;
use crate::db;
use crate::entities::{
    AuditLog, AuditLogFilter, Listing, ListingPatch, ListingStatus, Message, Notification,
    Property, PropertyComparison, PropertyPatch, Review, ReviewTarget, SavedListing, User,
    UserPatch, UserRole, VerificationDocument,
};
use crate::error::StoreResult;
use crate::indexes;
use crate::seed::{self, SeedReport};
use crate::store::analytics::{self, Analytics};
use crate::store::properties::PropertySearch;
use crate::store::{
    audit_logs, comparisons, listings, messages, notifications, properties, reviews,
    saved_listings, users, verification_documents,
};
use crate::unit_of_work::RetryPolicy;
use crate::verification::{self, VerificationDecision, VerificationOutcome};

pub struct EstateDb {
    conn: Connection,
    retry: RetryPolicy,
}

impl EstateDb {
    /// Open the configured database and make sure every collection exists.
    pub fn open(config: &Config) -> StoreResult<Self> {
        Ok(EstateDb {
            conn: db::open(config)?,
            retry: config.retry.clone(),
        })
    }

    pub fn in_memory() -> StoreResult<Self> {
        Self::open(&Config::in_memory())
    }

    /// Raw connection, for callers composing their own statements.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn create_indexes(&self) -> StoreResult<usize> {
        indexes::create_indexes(&self.conn)
    }

    pub fn list_collections(&self) -> StoreResult<Vec<(String, i64)>> {
        db::list_collections(&self.conn)
    }

    pub fn seed_sample_data(&self) -> StoreResult<SeedReport> {
        seed::seed_sample_data(&self.conn, &self.retry)
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub fn create_user(&self, user: User) -> StoreResult<User> {
        users::create_user(&self.conn, user)
    }

    pub fn get_user_by_firebase_uid(&self, firebase_uid: &str) -> StoreResult<Option<User>> {
        users::get_user_by_firebase_uid(&self.conn, firebase_uid)
    }

    pub fn get_users_by_role(&self, role: UserRole, limit: usize) -> StoreResult<Vec<User>> {
        users::get_users_by_role(&self.conn, role, limit)
    }

    pub fn update_user(&self, firebase_uid: &str, patch: UserPatch) -> StoreResult<User> {
        users::update_user(&self.conn, &self.retry, firebase_uid, patch)
    }

    pub fn delete_user(&self, firebase_uid: &str) -> StoreResult<bool> {
        users::delete_user(&self.conn, firebase_uid)
    }

    // ========================================================================
    // Properties
    // ========================================================================

    pub fn create_property(&self, property: Property) -> StoreResult<Property> {
        properties::create_property(&self.conn, property)
    }

    pub fn get_property_by_id(&self, property_id: &str) -> StoreResult<Option<Property>> {
        properties::get_property_by_id(&self.conn, property_id)
    }

    pub fn search_properties(&self, search: &PropertySearch) -> StoreResult<Vec<Property>> {
        properties::search_properties(&self.conn, search)
    }

    pub fn update_property(&self, property_id: &str, patch: PropertyPatch) -> StoreResult<bool> {
        properties::update_property(&self.conn, &self.retry, property_id, patch)
    }

    pub fn delete_property(&self, property_id: &str) -> StoreResult<bool> {
        properties::delete_property(&self.conn, property_id)
    }

    // ========================================================================
    // Listings
    // ========================================================================

    pub fn create_listing(&self, listing: Listing) -> StoreResult<Listing> {
        listings::create_listing(&self.conn, listing)
    }

    pub fn get_listing_by_id(&self, listing_id: &str, increment_view: bool) -> StoreResult<Option<Listing>> {
        listings::get_listing_by_id(&self.conn, listing_id, increment_view)
    }

    pub fn get_listings_by_status(&self, status: ListingStatus, limit: usize) -> StoreResult<Vec<Listing>> {
        listings::get_listings_by_status(&self.conn, status, limit)
    }

    pub fn get_listings_by_lister(&self, lister_firebase_uid: &str, limit: usize) -> StoreResult<Vec<Listing>> {
        listings::get_listings_by_lister(&self.conn, lister_firebase_uid, limit)
    }

    pub fn update_listing(&self, listing_id: &str, patch: ListingPatch) -> StoreResult<Listing> {
        listings::update_listing(&self.conn, &self.retry, listing_id, patch)
    }

    pub fn delete_listing(&self, listing_id: &str) -> StoreResult<bool> {
        listings::delete_listing(&self.conn, listing_id)
    }

    // ========================================================================
    // Verification
    // ========================================================================

    pub fn create_verification_document(
        &self,
        document: VerificationDocument,
    ) -> StoreResult<VerificationDocument> {
        verification_documents::create_verification_document(&self.conn, document)
    }

    pub fn get_verification_document(&self, document_id: &str) -> StoreResult<Option<VerificationDocument>> {
        verification_documents::get_verification_document(&self.conn, document_id)
    }

    pub fn get_verification_documents_for_user(
        &self,
        firebase_uid: &str,
    ) -> StoreResult<Vec<VerificationDocument>> {
        verification_documents::get_verification_documents_for_user(&self.conn, firebase_uid)
    }

    pub fn verify_document(
        &self,
        document_id: &str,
        admin_id: &str,
        decision: VerificationDecision,
    ) -> StoreResult<VerificationOutcome> {
        verification::verify_document(&self.conn, &self.retry, document_id, admin_id, decision)
    }

    pub fn get_pending_verifications(&self, limit: usize) -> StoreResult<Vec<VerificationDocument>> {
        verification::get_pending_verifications(&self.conn, limit)
    }

    // ========================================================================
    // Saved listings and comparisons
    // ========================================================================

    pub fn save_listing(
        &self,
        firebase_uid: &str,
        listing_id: &str,
        notes: Option<String>,
    ) -> StoreResult<SavedListing> {
        saved_listings::save_listing(&self.conn, &self.retry, firebase_uid, listing_id, notes)
    }

    pub fn get_saved_listings(&self, firebase_uid: &str) -> StoreResult<Vec<SavedListing>> {
        saved_listings::get_saved_listings(&self.conn, firebase_uid)
    }

    pub fn remove_saved_listing(&self, firebase_uid: &str, listing_id: &str) -> StoreResult<bool> {
        saved_listings::remove_saved_listing(&self.conn, firebase_uid, listing_id)
    }

    pub fn create_comparison(&self, comparison: PropertyComparison) -> StoreResult<PropertyComparison> {
        comparisons::create_comparison(&self.conn, comparison)
    }

    pub fn get_comparisons_for_user(&self, firebase_uid: &str) -> StoreResult<Vec<PropertyComparison>> {
        comparisons::get_comparisons_for_user(&self.conn, firebase_uid)
    }

    pub fn delete_comparison(&self, comparison_id: &str) -> StoreResult<bool> {
        comparisons::delete_comparison(&self.conn, comparison_id)
    }

    // ========================================================================
    // Reviews, messages, notifications
    // ========================================================================

    pub fn create_review(&self, review: Review) -> StoreResult<Review> {
        reviews::create_review(&self.conn, review)
    }

    pub fn get_reviews_for_target(&self, target_type: ReviewTarget, target_id: &str) -> StoreResult<Vec<Review>> {
        reviews::get_reviews_for_target(&self.conn, target_type, target_id)
    }

    pub fn average_rating(&self, target_type: ReviewTarget, target_id: &str) -> StoreResult<Option<f64>> {
        reviews::average_rating(&self.conn, target_type, target_id)
    }

    pub fn send_message(&self, message: Message) -> StoreResult<Message> {
        messages::send_message(&self.conn, message)
    }

    pub fn get_inbox(&self, firebase_uid: &str, unread_only: bool, limit: usize) -> StoreResult<Vec<Message>> {
        messages::get_inbox(&self.conn, firebase_uid, unread_only, limit)
    }

    pub fn get_conversation(&self, user_a: &str, user_b: &str) -> StoreResult<Vec<Message>> {
        messages::get_conversation(&self.conn, user_a, user_b)
    }

    pub fn mark_message_read(&self, message_id: &str) -> StoreResult<Message> {
        messages::mark_message_read(&self.conn, &self.retry, message_id)
    }

    pub fn create_notification(&self, notification: Notification) -> StoreResult<Notification> {
        notifications::create_notification(&self.conn, notification)
    }

    pub fn get_notifications(
        &self,
        firebase_uid: &str,
        unread_only: bool,
        limit: usize,
    ) -> StoreResult<Vec<Notification>> {
        notifications::get_notifications(&self.conn, firebase_uid, unread_only, limit)
    }

    pub fn mark_notification_read(&self, notification_id: &str) -> StoreResult<Notification> {
        notifications::mark_notification_read(&self.conn, &self.retry, notification_id)
    }

    // ========================================================================
    // Audit and analytics
    // ========================================================================

    pub fn create_audit_log(&self, log: AuditLog) -> StoreResult<AuditLog> {
        audit_logs::create_audit_log(&self.conn, log)
    }

    pub fn get_audit_logs(&self, filter: &AuditLogFilter, limit: usize) -> StoreResult<Vec<AuditLog>> {
        audit_logs::get_audit_logs(&self.conn, filter, limit)
    }

    pub fn get_analytics(&self) -> StoreResult<Analytics> {
        analytics::get_analytics(&self.conn)
    }
}
