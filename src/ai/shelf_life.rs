use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::ai::common::ChatClient;
use crate::ai::enrich::{enrich, enrich_all, RawItems, RawShelfLife, ShelfLifeResult};
use crate::ai::extract::extract_as;
use crate::ai::prompts::{build_prompt, Intent};
use crate::error::ApiError;
use crate::grocery::GroceryRecord;
use crate::normalize::NormalizedInput;

/// Answer for `/api/get-shelf-life`: one object, or `{items}` for a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ShelfLifeResponse {
    Single(ShelfLifeResult),
    Batch { items: Vec<ShelfLifeResult> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshnessDetail {
    pub item_name: String,
    #[serde(default)]
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshnessResponse {
    pub freshness_info: Vec<FreshnessDetail>,
    #[serde(default)]
    pub overall_tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptResponse {
    pub items: Vec<ShelfLifeResult>,
}

/// Quick answer for one item. Always carries an `answer` sentence.
#[instrument(level = "trace", skip(client))]
pub async fn quick_shelf_life(
    client: &ChatClient,
    name: &str,
    today: NaiveDate,
) -> Result<ShelfLifeResult, ApiError> {
    let prompt = build_prompt(Intent::QuickAnswer, &NormalizedInput::Single(name.to_string()))?;
    let content = client.complete(&prompt, Intent::QuickAnswer).await?;
    let raw: RawShelfLife = extract_as(&content)?;
    let mut result = enrich(raw, name, today);
    if result.answer.is_none() {
        result.answer = Some(format!(
            "{} usually stays fresh for about {} days.",
            result.name, result.shelf_life_days
        ));
    }
    debug!(item = %result.name, days = result.shelf_life_days, "quick shelf life ready");
    Ok(result)
}

/// Shelf life for a single name or a batch of names.
#[instrument(level = "trace", skip(client, input))]
pub async fn get_shelf_life(
    client: &ChatClient,
    input: &NormalizedInput,
    today: NaiveDate,
) -> Result<ShelfLifeResponse, ApiError> {
    let prompt = build_prompt(Intent::BatchShelfLife, input)?;
    match input {
        NormalizedInput::Single(name) => {
            let content = client.complete(&prompt, Intent::BatchShelfLife).await?;
            let raw: RawShelfLife = extract_as(&content)?;
            Ok(ShelfLifeResponse::Single(enrich(raw, name, today)))
        }
        NormalizedInput::Batch(names) => {
            let content = client.complete(&prompt, Intent::BatchShelfLife).await?;
            let raw: RawItems = extract_as(&content)?;
            // one entry per requested name, in order
            if raw.items.len() != names.len() {
                warn!(
                    requested = names.len(),
                    returned = raw.items.len(),
                    "batch answer does not match requested items"
                );
                return Err(ApiError::malformed(content));
            }
            let items = enrich_all(raw.items, names, today);
            debug!(requested = names.len(), returned = items.len(), "batch shelf life ready");
            Ok(ShelfLifeResponse::Batch { items })
        }
        NormalizedInput::Groceries(_) | NormalizedInput::Receipt(_) => Err(ApiError::validation(
            "Shelf life lookup needs item names",
        )),
    }
}

/// Freshness details for grocery records the client already tracks.
#[instrument(level = "trace", skip(client, records), fields(count = records.len()))]
pub async fn freshness_info(
    client: &ChatClient,
    records: &[GroceryRecord],
) -> Result<FreshnessResponse, ApiError> {
    let prompt = build_prompt(
        Intent::FreshnessDetail,
        &NormalizedInput::Groceries(records.to_vec()),
    )?;
    let content = client.complete(&prompt, Intent::FreshnessDetail).await?;
    let response: FreshnessResponse = extract_as(&content)?;
    debug!(
        details = response.freshness_info.len(),
        tips = response.overall_tips.len(),
        "freshness info ready"
    );
    Ok(response)
}

/// Items found in receipt text, each with dates filled in.
#[instrument(level = "trace", skip(client, text), fields(len = text.len()))]
pub async fn parse_receipt(
    client: &ChatClient,
    text: &str,
    today: NaiveDate,
) -> Result<ReceiptResponse, ApiError> {
    let prompt = build_prompt(
        Intent::ReceiptExtraction,
        &NormalizedInput::Receipt(text.to_string()),
    )?;
    let content = client.complete(&prompt, Intent::ReceiptExtraction).await?;
    let raw: RawItems = extract_as(&content)?;
    let items = enrich_all(raw.items, &[], today);
    debug!(count = items.len(), "receipt items extracted");
    Ok(ReceiptResponse { items })
}
