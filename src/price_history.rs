// ⏰ Price History - append-only log of every distinct price a property held
//
// Invariant: the last history entry always carries `current_price`, and a
// new entry is appended exactly when the price changes. The store persists
// both fields in the same document write, so no reader can see one
// without the other.

use chrono::{DateTime, Utc};

use crate::entities::{PriceChange, Property};

pub const INITIAL_LISTING_REASON: &str = "Initial listing";
pub const DEFAULT_CHANGE_REASON: &str = "Price updated";

/// Seed the history of a new property with its initial price.
///
/// Leaves an explicitly supplied history alone. Returns whether an entry was
/// added.
pub fn seed_initial_price(property: &mut Property, now: DateTime<Utc>) -> bool {
    if !property.price_history.is_empty() {
        return false;
    }
    property.price_history.push(PriceChange {
        price: property.current_price,
        changed_at: now,
        reason: Some(INITIAL_LISTING_REASON.to_string()),
    });
    true
}

/// Move the property to `new_price`, appending a history entry if it differs
/// from the current one. Returns whether the price changed.
pub fn apply_price_change(
    property: &mut Property,
    new_price: f64,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> bool {
    if new_price == property.current_price {
        return false;
    }
    property.price_history.push(PriceChange {
        price: new_price,
        changed_at: now,
        reason: Some(reason.unwrap_or_else(|| DEFAULT_CHANGE_REASON.to_string())),
    });
    property.current_price = new_price;
    true
}

/// Distinct prices in the order the property held them.
pub fn price_trail(property: &Property) -> Vec<f64> {
    property.price_history.iter().map(|c| c.price).collect()
}

/// Net change from the first recorded price to the current one.
pub fn total_change(property: &Property) -> Option<f64> {
    let first = property.price_history.first()?.price;
    Some(property.current_price - first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Location, PropertyType};

    fn property(price: f64) -> Property {
        Property::new(
            "Beautiful 3BR House in Austin",
            "Spacious family home",
            PropertyType::Residential,
            price,
            Location::new("123 Main Street", "Austin", "TX", "78701", "USA"),
        )
        .with_id("prop_001")
    }

    #[test]
    fn test_seed_initial_price() {
        let mut p = property(450_000.0);
        assert!(seed_initial_price(&mut p, Utc::now()));
        assert_eq!(p.price_history.len(), 1);
        assert_eq!(p.price_history[0].price, 450_000.0);
        assert_eq!(p.price_history[0].reason.as_deref(), Some(INITIAL_LISTING_REASON));

        // Second call is a no-op
        assert!(!seed_initial_price(&mut p, Utc::now()));
        assert_eq!(p.price_history.len(), 1);
    }

    #[test]
    fn test_explicit_history_is_kept() {
        let mut p = property(450_000.0);
        let earlier = PriceChange {
            price: 450_000.0,
            changed_at: Utc::now(),
            reason: Some("Imported".to_string()),
        };
        p.price_history.push(earlier.clone());

        assert!(!seed_initial_price(&mut p, Utc::now()));
        assert_eq!(p.price_history, vec![earlier]);
    }

    #[test]
    fn test_price_change_appends() {
        let mut p = property(450_000.0);
        seed_initial_price(&mut p, Utc::now());

        assert!(apply_price_change(
            &mut p,
            425_000.0,
            Some("Price reduced".to_string()),
            Utc::now()
        ));
        assert_eq!(p.current_price, 425_000.0);
        assert_eq!(price_trail(&p), vec![450_000.0, 425_000.0]);
        assert_eq!(p.price_history[1].reason.as_deref(), Some("Price reduced"));
        assert_eq!(total_change(&p), Some(-25_000.0));
    }

    #[test]
    fn test_default_reason() {
        let mut p = property(450_000.0);
        seed_initial_price(&mut p, Utc::now());
        apply_price_change(&mut p, 460_000.0, None, Utc::now());

        assert_eq!(p.price_history[1].reason.as_deref(), Some(DEFAULT_CHANGE_REASON));
    }

    #[test]
    fn test_same_price_is_idempotent() {
        let mut p = property(450_000.0);
        seed_initial_price(&mut p, Utc::now());

        assert!(!apply_price_change(&mut p, 450_000.0, Some("noise".to_string()), Utc::now()));
        assert_eq!(p.price_history.len(), 1);
    }
}
