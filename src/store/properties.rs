// Properties collection
//
// Create and update go through `price_history` so the price log and the
// current price are always written by the same statement.

use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::Connection;
use tracing::{debug, info};

use super::{like_pattern, sql_limit};
use crate::entities::{generate_id, Property, PropertyPatch, PropertyType};
use crate::error::StoreResult;
use crate::price_history;
use crate::unit_of_work::{self, RetryPolicy};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Filters for `search_properties`. Unset fields do not constrain.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySearch {
    pub property_type: Option<PropertyType>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Case-insensitive substring of the city.
    pub city: Option<String>,
    /// Case-insensitive substring of the state.
    pub state: Option<String>,
    pub bedrooms: Option<u32>,
    pub min_bedrooms: Option<u32>,
    /// Free text over title, description and amenities.
    pub search_term: Option<String>,
    /// `(latitude, longitude, radius in metres)`.
    pub near: Option<(f64, f64, f64)>,
    pub limit: usize,
}

impl Default for PropertySearch {
    fn default() -> Self {
        PropertySearch {
            property_type: None,
            min_price: None,
            max_price: None,
            city: None,
            state: None,
            bedrooms: None,
            min_bedrooms: None,
            search_term: None,
            near: None,
            limit: 50,
        }
    }
}

impl PropertySearch {
    /// Build the `WHERE ...` clause (without ordering or limit) and its
    /// positional parameters.
    fn where_clause(&self) -> (String, Vec<Value>) {
        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(kind) = self.property_type {
            let p = bind(&mut params, Value::Text(kind.as_str().to_string()));
            conditions.push(format!("property_type = {p}"));
        }
        if let Some(min) = self.min_price {
            let p = bind(&mut params, Value::Real(min));
            conditions.push(format!("current_price >= {p}"));
        }
        if let Some(max) = self.max_price {
            let p = bind(&mut params, Value::Real(max));
            conditions.push(format!("current_price <= {p}"));
        }
        if let Some(city) = &self.city {
            let p = bind(&mut params, Value::Text(like_pattern(city)));
            conditions.push(format!("city LIKE {p} ESCAPE '\\'"));
        }
        if let Some(state) = &self.state {
            let p = bind(&mut params, Value::Text(like_pattern(state)));
            conditions.push(format!("state LIKE {p} ESCAPE '\\'"));
        }
        if let Some(bedrooms) = self.bedrooms {
            let p = bind(&mut params, Value::Integer(i64::from(bedrooms)));
            conditions.push(format!("bedrooms = {p}"));
        }
        if let Some(min) = self.min_bedrooms {
            let p = bind(&mut params, Value::Integer(i64::from(min)));
            conditions.push(format!("bedrooms >= {p}"));
        }
        if let Some(term) = &self.search_term {
            let p = bind(&mut params, Value::Text(like_pattern(term)));
            conditions.push(format!(
                "(json_extract(doc, '$.title') LIKE {p} ESCAPE '\\' \
                 OR json_extract(doc, '$.description') LIKE {p} ESCAPE '\\' \
                 OR json_extract(doc, '$.amenities') LIKE {p} ESCAPE '\\')"
            ));
        }
        if self.near.is_some() {
            conditions.push("latitude IS NOT NULL AND longitude IS NOT NULL".to_string());
        }

        if conditions.is_empty() {
            (String::new(), params)
        } else {
            (format!("WHERE {}", conditions.join(" AND ")), params)
        }
    }
}

/// Push a parameter and return its `?N` placeholder.
fn bind(params: &mut Vec<Value>, value: Value) -> String {
    params.push(value);
    format!("?{}", params.len())
}

/// Great-circle distance in metres.
pub fn haversine_m(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Insert a new property, assigning an id and seeding its price history.
pub fn create_property(conn: &Connection, mut property: Property) -> StoreResult<Property> {
    if property.property_id.is_empty() {
        property.property_id = generate_id("prop");
    }
    let now = Utc::now();
    property.created_at = now;
    property.updated_at = now;
    price_history::seed_initial_price(&mut property, now);

    super::insert(conn, &property)?;
    info!(
        property_id = %property.property_id,
        price = property.current_price,
        "property created"
    );
    Ok(property)
}

pub fn get_property_by_id(conn: &Connection, property_id: &str) -> StoreResult<Option<Property>> {
    super::find(conn, property_id)
}

pub fn search_properties(conn: &Connection, search: &PropertySearch) -> StoreResult<Vec<Property>> {
    let (clause, mut params) = search.where_clause();

    let properties: Vec<Property> = match search.near {
        // Radius filtering happens after the scan, so the limit must too
        Some((lat, lon, radius_m)) => {
            let candidates: Vec<Property> = super::find_where(
                conn,
                &format!("{clause} ORDER BY rowid"),
                rusqlite::params_from_iter(params),
            )?;
            candidates
                .into_iter()
                .filter(|p| {
                    p.location
                        .coordinates()
                        .map_or(false, |point| haversine_m((lat, lon), point) <= radius_m)
                })
                .take(search.limit)
                .collect()
        }
        None => {
            params.push(Value::Integer(sql_limit(search.limit)));
            let sql = format!("{clause} ORDER BY rowid LIMIT ?{}", params.len());
            super::find_where(conn, &sql, rusqlite::params_from_iter(params))?
        }
    };

    debug!(found = properties.len(), "property search");
    Ok(properties)
}

/// Apply `patch`, recording a history entry when the price moves.
///
/// Returns `true` once the document is rewritten. `NotFound` if the id is
/// unknown.
pub fn update_property(
    conn: &Connection,
    policy: &RetryPolicy,
    property_id: &str,
    patch: PropertyPatch,
) -> StoreResult<bool> {
    unit_of_work::run(conn, policy, "update_property", |tx| {
        let mut property: Property = super::get(tx, property_id)?;
        let mut patch = patch.clone();
        let now = Utc::now();

        patch.apply_fields(&mut property);
        let price_changed = match patch.current_price {
            Some(price) => price_history::apply_price_change(
                &mut property,
                price,
                patch.price_change_reason.take(),
                now,
            ),
            None => false,
        };
        property.updated_at = now;

        super::replace_existing(tx, &property)?;
        if price_changed {
            info!(property_id, price = property.current_price, "price changed");
        }
        Ok(true)
    })
}

pub fn delete_property(conn: &Connection, property_id: &str) -> StoreResult<bool> {
    super::delete::<Property>(conn, property_id)
}

pub fn count_properties(conn: &Connection) -> StoreResult<i64> {
    super::count::<Property, _>(conn, "", [])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Location;
    use crate::error::StoreError;
    use crate::price_history::{DEFAULT_CHANGE_REASON, INITIAL_LISTING_REASON};
    use crate::store::test_support::memory_db;
    use proptest::prelude::*;

    fn austin_house() -> Property {
        Property::new(
            "Beautiful 3BR House in Austin",
            "Spacious family home with a large backyard",
            PropertyType::Residential,
            450_000.0,
            Location::new("123 Main Street", "Austin", "TX", "78701", "USA").at(30.2672, -97.7431),
        )
        .with_id("prop_001")
        .with_rooms(3, 2.5)
        .with_amenities(["Pool", "Garage", "Garden"])
    }

    fn dallas_office() -> Property {
        Property::new(
            "Downtown Office Space",
            "Open plan office near the river",
            PropertyType::Commercial,
            1_200_000.0,
            Location::new("500 Elm Street", "Dallas", "TX", "75201", "USA").at(32.7767, -96.7970),
        )
        .with_id("prop_002")
    }

    #[test]
    fn test_create_seeds_history() {
        let conn = memory_db();
        let created = create_property(&conn, austin_house()).unwrap();

        assert_eq!(created.price_history.len(), 1);
        assert_eq!(created.price_history[0].price, 450_000.0);
        assert_eq!(
            created.price_history[0].reason.as_deref(),
            Some(INITIAL_LISTING_REASON)
        );

        let stored = get_property_by_id(&conn, "prop_001").unwrap().unwrap();
        assert_eq!(stored, created);
    }

    #[test]
    fn test_create_generates_id() {
        let conn = memory_db();
        let created = create_property(&conn, austin_house().with_id("")).unwrap();

        assert!(created.property_id.starts_with("prop_"));
        assert!(get_property_by_id(&conn, &created.property_id).unwrap().is_some());
    }

    #[test]
    fn test_create_rejects_invalid_before_write() {
        let conn = memory_db();
        let mut bad = austin_house();
        bad.title.clear();

        assert!(matches!(
            create_property(&conn, bad),
            Err(StoreError::ValidationFailed(_))
        ));
        assert_eq!(count_properties(&conn).unwrap(), 0);
    }

    #[test]
    fn test_price_reduction_scenario() {
        let conn = memory_db();
        create_property(&conn, austin_house()).unwrap();

        let updated = update_property(
            &conn,
            &RetryPolicy::default(),
            "prop_001",
            PropertyPatch::price(425_000.0, "Price reduced"),
        )
        .unwrap();
        assert!(updated);

        let stored = get_property_by_id(&conn, "prop_001").unwrap().unwrap();
        assert_eq!(stored.current_price, 425_000.0);
        assert_eq!(price_history::price_trail(&stored), vec![450_000.0, 425_000.0]);
        assert_eq!(stored.price_history[1].reason.as_deref(), Some("Price reduced"));
    }

    #[test]
    fn test_update_without_price_keeps_history() {
        let conn = memory_db();
        create_property(&conn, austin_house()).unwrap();

        let patch = PropertyPatch {
            bedrooms: Some(4),
            ..PropertyPatch::default()
        };
        update_property(&conn, &RetryPolicy::default(), "prop_001", patch).unwrap();

        let stored = get_property_by_id(&conn, "prop_001").unwrap().unwrap();
        assert_eq!(stored.bedrooms, Some(4));
        assert_eq!(stored.price_history.len(), 1);
    }

    #[test]
    fn test_same_price_update_keeps_history() {
        let conn = memory_db();
        let created = create_property(&conn, austin_house()).unwrap();

        let updated = update_property(
            &conn,
            &RetryPolicy::default(),
            "prop_001",
            PropertyPatch::price(450_000.0, "No change"),
        )
        .unwrap();
        assert!(updated);

        let stored = get_property_by_id(&conn, "prop_001").unwrap().unwrap();
        assert_eq!(stored.current_price, 450_000.0);
        assert_eq!(stored.price_history, created.price_history);
        assert!(stored.updated_at >= created.updated_at);
    }

    #[test]
    fn test_default_reason_when_none_given() {
        let conn = memory_db();
        create_property(&conn, austin_house()).unwrap();

        let patch = PropertyPatch {
            current_price: Some(470_000.0),
            ..PropertyPatch::default()
        };
        update_property(&conn, &RetryPolicy::default(), "prop_001", patch).unwrap();

        let stored = get_property_by_id(&conn, "prop_001").unwrap().unwrap();
        assert_eq!(
            stored.price_history[1].reason.as_deref(),
            Some(DEFAULT_CHANGE_REASON)
        );
    }

    #[test]
    fn test_update_missing_property() {
        let conn = memory_db();
        let result = update_property(
            &conn,
            &RetryPolicy::default(),
            "prop_missing",
            PropertyPatch::price(1.0, "x"),
        );
        assert!(matches!(result, Err(StoreError::NotFound { collection: "properties", .. })));
    }

    #[test]
    fn test_invalid_price_update_is_rolled_back() {
        let conn = memory_db();
        create_property(&conn, austin_house()).unwrap();

        let result = update_property(
            &conn,
            &RetryPolicy::default(),
            "prop_001",
            PropertyPatch::price(-5.0, "typo"),
        );
        assert!(matches!(result, Err(StoreError::ValidationFailed(_))));

        let stored = get_property_by_id(&conn, "prop_001").unwrap().unwrap();
        assert_eq!(stored.current_price, 450_000.0);
        assert_eq!(stored.price_history.len(), 1);
    }

    #[test]
    fn test_search_filters() {
        let conn = memory_db();
        create_property(&conn, austin_house()).unwrap();
        create_property(&conn, dallas_office()).unwrap();

        let residential = search_properties(
            &conn,
            &PropertySearch {
                property_type: Some(PropertyType::Residential),
                ..PropertySearch::default()
            },
        )
        .unwrap();
        assert_eq!(residential.len(), 1);
        assert_eq!(residential[0].property_id, "prop_001");

        let by_city = search_properties(
            &conn,
            &PropertySearch {
                city: Some("dall".to_string()),
                ..PropertySearch::default()
            },
        )
        .unwrap();
        assert_eq!(by_city.len(), 1);
        assert_eq!(by_city[0].property_id, "prop_002");

        let price_band = search_properties(
            &conn,
            &PropertySearch {
                min_price: Some(400_000.0),
                max_price: Some(500_000.0),
                min_bedrooms: Some(3),
                ..PropertySearch::default()
            },
        )
        .unwrap();
        assert_eq!(price_band.len(), 1);

        let all_texas = search_properties(
            &conn,
            &PropertySearch {
                state: Some("tx".to_string()),
                limit: 1,
                ..PropertySearch::default()
            },
        )
        .unwrap();
        assert_eq!(all_texas.len(), 1);
    }

    #[test]
    fn test_search_text_covers_amenities() {
        let conn = memory_db();
        create_property(&conn, austin_house()).unwrap();
        create_property(&conn, dallas_office()).unwrap();

        let pool = search_properties(
            &conn,
            &PropertySearch {
                search_term: Some("pool".to_string()),
                ..PropertySearch::default()
            },
        )
        .unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].property_id, "prop_001");

        let wildcard = search_properties(
            &conn,
            &PropertySearch {
                search_term: Some("%".to_string()),
                ..PropertySearch::default()
            },
        )
        .unwrap();
        assert!(wildcard.is_empty());
    }

    #[test]
    fn test_search_near() {
        let conn = memory_db();
        create_property(&conn, austin_house()).unwrap();
        create_property(&conn, dallas_office()).unwrap();

        // Texas Capitol, about 1km from the Austin house and 300km from Dallas
        let near_capitol = search_properties(
            &conn,
            &PropertySearch {
                near: Some((30.2747, -97.7404, 5_000.0)),
                ..PropertySearch::default()
            },
        )
        .unwrap();
        assert_eq!(near_capitol.len(), 1);
        assert_eq!(near_capitol[0].property_id, "prop_001");
    }

    #[test]
    fn test_haversine() {
        let austin = (30.2672, -97.7431);
        let dallas = (32.7767, -96.7970);
        let d = haversine_m(austin, dallas);
        assert!((d - 293_000.0).abs() < 5_000.0, "got {d}");
        assert_eq!(haversine_m(austin, austin), 0.0);
    }

    #[test]
    fn test_delete_property() {
        let conn = memory_db();
        create_property(&conn, austin_house()).unwrap();

        assert!(delete_property(&conn, "prop_001").unwrap());
        assert!(!delete_property(&conn, "prop_001").unwrap());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_every_distinct_price_is_logged(
            prices in prop::collection::vec(1u32..2_000_000, 1..12)
        ) {
            let conn = memory_db();
            create_property(&conn, austin_house()).unwrap();

            let mut expected = vec![450_000.0];
            for price in &prices {
                let price = f64::from(*price);
                update_property(
                    &conn,
                    &RetryPolicy::default(),
                    "prop_001",
                    PropertyPatch::price(price, "move"),
                )
                .unwrap();
                if expected.last() != Some(&price) {
                    expected.push(price);
                }
            }

            let stored = get_property_by_id(&conn, "prop_001").unwrap().unwrap();
            prop_assert_eq!(price_history::price_trail(&stored), expected.clone());
            prop_assert_eq!(Some(stored.current_price), expected.last().copied());
        }
    }
}
