// 🌱 Sample data - users, properties, listings and pending documents
//
// The CSV files under `data/` are compiled in. Seeding skips any document
// whose id already exists, so running it twice changes nothing.

use csv::Reader;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::entities::{
    Document, DocumentType, Listing, ListingStatus, Location, Property, PropertyType, User,
    UserRole, VerificationDocument, VerificationStatus,
};
use crate::error::StoreResult;
use crate::store::{self, listings, properties, users, verification_documents};
use crate::unit_of_work::{self, RetryPolicy};

const USERS_CSV: &str = include_str!("../data/users.csv");
const PROPERTIES_CSV: &str = include_str!("../data/properties.csv");
const LISTINGS_CSV: &str = include_str!("../data/listings.csv");
const DOCUMENTS_CSV: &str = include_str!("../data/verification_documents.csv");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
}

impl SeedReport {
    fn merge(&mut self, other: SeedReport) {
        self.inserted += other.inserted;
        self.skipped += other.skipped;
    }
}

// ============================================================================
// CSV ROWS
// ============================================================================

#[derive(Debug, Deserialize)]
struct UserRow {
    firebase_uid: String,
    email: String,
    name: String,
    role: UserRole,
    phone: Option<String>,
    verification_status: VerificationStatus,
}

#[derive(Debug, Deserialize)]
struct PropertyRow {
    property_id: String,
    title: String,
    description: String,
    property_type: PropertyType,
    current_price: f64,
    street: String,
    city: String,
    state: String,
    zip_code: String,
    country: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    bedrooms: Option<u32>,
    bathrooms: Option<f64>,
    area_sqft: Option<f64>,
    year_built: Option<i32>,
    /// `;`-separated
    amenities: String,
}

#[derive(Debug, Deserialize)]
struct ListingRow {
    listing_id: String,
    property_id: String,
    lister_firebase_uid: String,
    status: ListingStatus,
}

#[derive(Debug, Deserialize)]
struct DocumentRow {
    document_id: String,
    user_firebase_uid: String,
    document_type: DocumentType,
    document_url: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let mut user = User::new(row.firebase_uid, row.email, row.name, row.role);
        user.phone = row.phone;
        user.verification_status = row.verification_status;
        user
    }
}

impl From<PropertyRow> for Property {
    fn from(row: PropertyRow) -> Self {
        let mut location = Location::new(row.street, row.city, row.state, row.zip_code, row.country);
        location.latitude = row.latitude;
        location.longitude = row.longitude;

        let mut property = Property::new(
            row.title,
            row.description,
            row.property_type,
            row.current_price,
            location,
        )
        .with_id(row.property_id)
        .with_amenities(row.amenities.split(';').map(str::trim).filter(|a| !a.is_empty()));
        property.bedrooms = row.bedrooms;
        property.bathrooms = row.bathrooms;
        property.area_sqft = row.area_sqft;
        property.year_built = row.year_built;
        property
    }
}

impl From<ListingRow> for Listing {
    fn from(row: ListingRow) -> Self {
        Listing::new(row.property_id, row.lister_firebase_uid)
            .with_id(row.listing_id)
            .with_status(row.status)
    }
}

impl From<DocumentRow> for VerificationDocument {
    fn from(row: DocumentRow) -> Self {
        VerificationDocument::new(row.user_firebase_uid, row.document_type, row.document_url)
            .with_id(row.document_id)
    }
}

// ============================================================================
// LOADING
// ============================================================================

fn parse_rows<R: DeserializeOwned>(data: &str) -> StoreResult<Vec<R>> {
    let mut rdr = Reader::from_reader(data.as_bytes());
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Insert each document not already present, using `create` for new ones.
fn seed_collection<D, F>(conn: &Connection, docs: Vec<D>, create: F) -> StoreResult<SeedReport>
where
    D: Document,
    F: Fn(&Connection, D) -> StoreResult<D>,
{
    let mut report = SeedReport::default();
    for doc in docs {
        if store::find::<D>(conn, doc.key())?.is_some() {
            debug!(collection = D::COLLECTION, key = doc.key(), "already seeded");
            report.skipped += 1;
            continue;
        }
        create(conn, doc)?;
        report.inserted += 1;
    }

    info!(
        collection = D::COLLECTION,
        inserted = report.inserted,
        skipped = report.skipped,
        "seeded"
    );
    Ok(report)
}

fn rows_into<R, D>(data: &str) -> StoreResult<Vec<D>>
where
    R: DeserializeOwned + Into<D>,
{
    Ok(parse_rows::<R>(data)?.into_iter().map(Into::into).collect())
}

/// Load the bundled sample data in one transaction.
pub fn seed_sample_data(conn: &Connection, policy: &RetryPolicy) -> StoreResult<SeedReport> {
    let sample_users: Vec<User> = rows_into::<UserRow, _>(USERS_CSV)?;
    let sample_properties: Vec<Property> = rows_into::<PropertyRow, _>(PROPERTIES_CSV)?;
    let sample_listings: Vec<Listing> = rows_into::<ListingRow, _>(LISTINGS_CSV)?;
    let sample_documents: Vec<VerificationDocument> = rows_into::<DocumentRow, _>(DOCUMENTS_CSV)?;

    unit_of_work::run(conn, policy, "seed_sample_data", |tx| {
        let mut report = SeedReport::default();
        report.merge(seed_collection(tx, sample_users.clone(), users::create_user)?);
        report.merge(seed_collection(
            tx,
            sample_properties.clone(),
            properties::create_property,
        )?);
        report.merge(seed_collection(tx, sample_listings.clone(), listings::create_listing)?);
        report.merge(seed_collection(
            tx,
            sample_documents.clone(),
            verification_documents::create_verification_document,
        )?);
        Ok(report)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::analytics::get_analytics;
    use crate::store::test_support::memory_db;

    #[test]
    fn test_bundled_csv_parses() {
        let props: Vec<Property> = rows_into::<PropertyRow, _>(PROPERTIES_CSV).unwrap();
        assert_eq!(props.len(), 3);
        assert_eq!(props[0].amenities, vec!["pool", "garage", "central_ac", "hardwood_floors"]);
        assert_eq!(props[0].location.coordinates(), Some((30.2672, -97.7431)));

        let users: Vec<User> = rows_into::<UserRow, _>(USERS_CSV).unwrap();
        let admin = users.iter().find(|u| u.role == UserRole::Admin).unwrap();
        assert!(admin.phone.is_none());
    }

    #[test]
    fn test_seed_is_idempotent() {
        let conn = memory_db();

        let first = seed_sample_data(&conn, &RetryPolicy::default()).unwrap();
        assert_eq!(first, SeedReport { inserted: 14, skipped: 0 });

        let second = seed_sample_data(&conn, &RetryPolicy::default()).unwrap();
        assert_eq!(second, SeedReport { inserted: 0, skipped: 14 });

        let stats = get_analytics(&conn).unwrap();
        assert_eq!(stats.total_users, 5);
        assert_eq!(stats.total_properties, 3);
        assert_eq!(stats.active_listings, 3);
        assert_eq!(stats.pending_verifications, 3);
    }

    #[test]
    fn test_seeded_properties_have_history() {
        let conn = memory_db();
        seed_sample_data(&conn, &RetryPolicy::default()).unwrap();

        let austin = properties::get_property_by_id(&conn, "prop_austin_001")
            .unwrap()
            .unwrap();
        assert_eq!(austin.price_history.len(), 1);
        assert_eq!(austin.current_price, 525_000.0);
    }
}
