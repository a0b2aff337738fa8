//! Validation of incoming AI request bodies.
//!
//! Handlers take the raw headers and bytes so every rejection, including a
//! wrong content type, comes back as the same JSON error body.

use axum::http::{header::CONTENT_TYPE, HeaderMap};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ApiError;
use crate::grocery::GroceryRecord;

/// Longest receipt text accepted, in characters.
pub const MAX_RECEIPT_CHARS: usize = 20_000;

pub const MSG_ITEM_REQUIRED: &str = "Item name is required";
pub const MSG_ITEM_EMPTY: &str = "Item name cannot be empty";
pub const MSG_AT_LEAST_ONE: &str = "At least one item is required";
pub const MSG_EITHER_NOT_BOTH: &str = "Provide either itemName or itemNames, not both";
pub const MSG_NEITHER: &str = "itemName or itemNames is required";
pub const MSG_GROCERIES_REQUIRED: &str = "At least one grocery item is required";
pub const MSG_RECEIPT_REQUIRED: &str = "Receipt text is required";
pub const MSG_RECEIPT_TOO_LONG: &str = "Receipt text is too long";
pub const MSG_INVALID_JSON: &str = "Invalid JSON body";

/// A request body reduced to the input a prompt is built from.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedInput {
    Single(String),
    Batch(Vec<String>),
    Groceries(Vec<GroceryRecord>),
    Receipt(String),
}

/// Reject anything not declared as `application/json`.
pub fn require_json(headers: &HeaderMap) -> Result<(), ApiError> {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false);
    if is_json {
        Ok(())
    } else {
        debug!("Rejecting request with non-JSON content type");
        Err(ApiError::UnsupportedMediaType)
    }
}

fn parse_object(headers: &HeaderMap, body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    require_json(headers)?;
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) | Err(_) => Err(ApiError::validation(MSG_INVALID_JSON)),
    }
}

/// Present and not `null`.
fn field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

fn clean_name(value: &Value, key: &str) -> Result<String, ApiError> {
    let text = value
        .as_str()
        .ok_or_else(|| ApiError::validation(format!("{key} must be a string")))?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(MSG_ITEM_EMPTY));
    }
    Ok(trimmed.to_string())
}

/// Body `{itemName}` for the quick single-item answer.
pub fn normalize_quick(headers: &HeaderMap, body: &[u8]) -> Result<String, ApiError> {
    let map = parse_object(headers, body)?;
    let name = field(&map, "itemName")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::validation(MSG_ITEM_REQUIRED))?;
    Ok(name.to_string())
}

/// Body `{itemName}` or `{itemNames: [...]}`, exactly one of them.
pub fn normalize_shelf_life(
    headers: &HeaderMap,
    body: &[u8],
) -> Result<NormalizedInput, ApiError> {
    let map = parse_object(headers, body)?;
    match (field(&map, "itemName"), field(&map, "itemNames")) {
        (Some(_), Some(_)) => Err(ApiError::validation(MSG_EITHER_NOT_BOTH)),
        (None, None) => Err(ApiError::validation(MSG_NEITHER)),
        (Some(name), None) => Ok(NormalizedInput::Single(clean_name(name, "itemName")?)),
        (None, Some(names)) => {
            let list = names
                .as_array()
                .ok_or_else(|| ApiError::validation("itemNames must be an array"))?;
            if list.is_empty() {
                return Err(ApiError::validation(MSG_AT_LEAST_ONE));
            }
            let names = list
                .iter()
                .map(|value| clean_name(value, "itemNames"))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(NormalizedInput::Batch(names))
        }
    }
}

/// Body `{groceries: [...]}` of grocery records.
pub fn normalize_freshness(
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Vec<GroceryRecord>, ApiError> {
    let map = parse_object(headers, body)?;
    let list = field(&map, "groceries")
        .and_then(Value::as_array)
        .filter(|list| !list.is_empty())
        .ok_or_else(|| ApiError::validation(MSG_GROCERIES_REQUIRED))?;

    let mut records = Vec::with_capacity(list.len());
    for value in list {
        let mut record: GroceryRecord = serde_json::from_value(value.clone())
            .map_err(|err| ApiError::validation(format!("Invalid grocery record: {err}")))?;
        record.name = record.name.trim().to_string();
        if record.name.is_empty() {
            return Err(ApiError::validation(MSG_ITEM_EMPTY));
        }
        records.push(record);
    }
    Ok(records)
}

/// Body `{receiptText}` with the raw text of a shopping receipt.
pub fn normalize_receipt(headers: &HeaderMap, body: &[u8]) -> Result<String, ApiError> {
    let map = parse_object(headers, body)?;
    let text = field(&map, "receiptText")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ApiError::validation(MSG_RECEIPT_REQUIRED))?;
    if text.chars().count() > MAX_RECEIPT_CHARS {
        return Err(ApiError::validation(MSG_RECEIPT_TOO_LONG));
    }
    Ok(text.to_string())
}
