//! Turn the model's loosely typed answer into a dated shelf-life result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::grocery::{saturating_add_days, Category};

/// Used when the model leaves out the shelf life or sends something unusable.
pub const DEFAULT_SHELF_LIFE_DAYS: u32 = 7;

/// Longest shelf life taken from the model, about a hundred years.
pub const MAX_SHELF_LIFE_DAYS: u32 = 36_500;

/// One item as the model describes it. Every field is optional and loosely
/// typed; [`enrich`] decides what to keep.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawShelfLife {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<Value>,
    #[serde(default, alias = "shelf_life_days", alias = "days")]
    pub shelf_life_days: Option<Value>,
    #[serde(default)]
    pub answer: Option<Value>,
    #[serde(default)]
    pub details: Option<Value>,
    #[serde(default, alias = "storage_recommendations", alias = "storage")]
    pub storage_recommendations: Option<Value>,
}

/// `{"items": [...]}` as returned for batch and receipt prompts.
#[derive(Debug, Clone, Deserialize)]
pub struct RawItems {
    pub items: Vec<RawShelfLife>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfLifeResult {
    pub name: String,
    pub category: Category,
    pub shelf_life_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_recommendations: Option<String>,
    pub purchase_date: NaiveDate,
    pub expiry_date: NaiveDate,
}

/// Read a whole number of days in `0..=MAX_SHELF_LIFE_DAYS` out of whatever
/// the model sent. Numbers, floats and numeric strings are accepted; anything
/// else is `None`.
pub fn parse_days(value: &Value) -> Option<u32> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() || number < 0.0 || number > f64::from(MAX_SHELF_LIFE_DAYS) {
        return None;
    }
    Some(number.round() as u32)
}

/// Strings pass through, lists of strings are joined, blanks become `None`.
fn text(value: Option<&Value>) -> Option<String> {
    let joined = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Value::Null => return None,
        other => other.to_string(),
    };
    (!joined.is_empty()).then_some(joined)
}

/// Fill in dates and defaults. `purchaseDate` is `today` and `expiryDate` is
/// `today + shelfLifeDays` in calendar days.
pub fn enrich(raw: RawShelfLife, requested_name: &str, today: NaiveDate) -> ShelfLifeResult {
    let shelf_life_days = match raw.shelf_life_days.as_ref().map(parse_days) {
        Some(Some(days)) => days,
        Some(None) => {
            warn!(value = ?raw.shelf_life_days, "unusable shelf life from AI, using default");
            DEFAULT_SHELF_LIFE_DAYS
        }
        None => {
            debug!(item = requested_name, "AI omitted shelf life, using default");
            DEFAULT_SHELF_LIFE_DAYS
        }
    };
    let category = raw
        .category
        .as_ref()
        .and_then(Value::as_str)
        .map(Category::parse)
        .unwrap_or_default();
    let name = raw
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(requested_name)
        .to_string();

    ShelfLifeResult {
        name,
        category,
        shelf_life_days,
        answer: text(raw.answer.as_ref()),
        details: text(raw.details.as_ref()),
        storage_recommendations: text(raw.storage_recommendations.as_ref()),
        purchase_date: today,
        expiry_date: saturating_add_days(today, shelf_life_days),
    }
}

/// Enrich a list, taking fallback names from `requested` by position.
pub fn enrich_all(
    raw: Vec<RawShelfLife>,
    requested: &[String],
    today: NaiveDate,
) -> Vec<ShelfLifeResult> {
    raw.into_iter()
        .enumerate()
        .map(|(i, item)| {
            let fallback = requested.get(i).map(String::as_str).unwrap_or("Unknown item");
            enrich(item, fallback, today)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 30).unwrap()
    }

    fn raw(value: Value) -> RawShelfLife {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn expiry_is_purchase_plus_days() {
        for days in [0u32, 1, 7, 365] {
            let result = enrich(raw(json!({ "shelfLifeDays": days })), "x", today());
            assert_eq!(result.purchase_date, today());
            assert_eq!(
                (result.expiry_date - result.purchase_date).num_days(),
                i64::from(days)
            );
        }
    }

    #[test]
    fn crosses_year_boundary() {
        let result = enrich(raw(json!({ "shelfLifeDays": 3 })), "x", today());
        assert_eq!(result.expiry_date, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
    }

    #[test]
    fn missing_or_bad_days_use_default() {
        for value in [json!({}), json!({ "shelfLifeDays": -2 }), json!({ "shelfLifeDays": "soon" })] {
            let result = enrich(raw(value), "x", today());
            assert_eq!(result.shelf_life_days, DEFAULT_SHELF_LIFE_DAYS);
        }
    }

    #[test]
    fn lenient_day_formats() {
        assert_eq!(parse_days(&json!(4.6)), Some(5));
        assert_eq!(parse_days(&json!(" 10 ")), Some(10));
        assert_eq!(parse_days(&json!(null)), None);
        assert_eq!(parse_days(&json!(true)), None);
    }

    #[test]
    fn implausible_shelf_life_uses_default() {
        assert_eq!(parse_days(&json!(MAX_SHELF_LIFE_DAYS)), Some(MAX_SHELF_LIFE_DAYS));
        assert_eq!(parse_days(&json!(MAX_SHELF_LIFE_DAYS + 1)), None);
        let result = enrich(raw(json!({ "shelfLifeDays": 1_000_000_000u64 })), "Honey", today());
        assert_eq!(result.shelf_life_days, DEFAULT_SHELF_LIFE_DAYS);
        assert_eq!(result.expiry_date, NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());

        let last = enrich(raw(json!({ "shelfLifeDays": 30 })), "x", NaiveDate::MAX);
        assert_eq!(last.expiry_date, NaiveDate::MAX);
    }

    #[test]
    fn category_is_coerced_and_name_falls_back() {
        let result = enrich(
            raw(json!({ "category": "Seafood", "shelfLifeDays": 2 })),
            "Salmon",
            today(),
        );
        assert_eq!(result.category, Category::Other);
        assert_eq!(result.name, "Salmon");
    }

    #[test]
    fn storage_list_is_joined() {
        let result = enrich(
            raw(json!({ "storage_recommendations": ["Keep cold.", "Seal tightly."] })),
            "x",
            today(),
        );
        assert_eq!(
            result.storage_recommendations.as_deref(),
            Some("Keep cold. Seal tightly.")
        );
    }

    #[test]
    fn enrich_all_uses_positional_names() {
        let items = vec![raw(json!({ "shelfLifeDays": 1 })), raw(json!({ "name": "Rice" }))];
        let requested = vec!["Fish".to_string(), "rice".to_string()];
        let results = enrich_all(items, &requested, today());
        assert_eq!(results[0].name, "Fish");
        assert_eq!(results[1].name, "Rice");
    }

    #[test]
    fn serializes_dates_as_calendar_days() {
        let result = enrich(raw(json!({ "shelfLifeDays": 7, "category": "dairy" })), "Milk", today());
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["purchaseDate"], "2024-12-30");
        assert_eq!(value["expiryDate"], "2025-01-06");
        assert_eq!(value["category"], "dairy");
        assert!(value.get("answer").is_none());
    }
}
