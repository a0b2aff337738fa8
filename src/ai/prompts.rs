//! Prompts sent to the completion service.
//!
//! Every prompt states the task, embeds the input as JSON, spells out the
//! JSON shape to answer with and shows a worked example.

use crate::error::ApiError;
use crate::grocery::Category;
use crate::normalize::NormalizedInput;

/// What the caller wants from the model. Also decides the output budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    QuickAnswer,
    BatchShelfLife,
    FreshnessDetail,
    ReceiptExtraction,
}

impl Intent {
    pub fn max_tokens(self) -> u32 {
        match self {
            Intent::QuickAnswer => 300,
            Intent::BatchShelfLife | Intent::FreshnessDetail | Intent::ReceiptExtraction => 1000,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::QuickAnswer => "quick_answer",
            Intent::BatchShelfLife => "shelf_life",
            Intent::FreshnessDetail => "freshness",
            Intent::ReceiptExtraction => "receipt",
        }
    }
}

const QUICK_EXAMPLE: &str = r#"{"name": "Milk", "category": "dairy", "answer": "Unopened milk keeps about a week in the fridge; once opened use it within 5 days.", "storageRecommendations": "Keep refrigerated at or below 4°C, away from the door.", "shelfLifeDays": 7}"#;

const SINGLE_EXAMPLE: &str = r#"{"name": "Bananas", "category": "fruits", "shelfLifeDays": 5, "storageRecommendations": "Store at room temperature away from other fruit."}"#;

const BATCH_EXAMPLE: &str = r#"{"items": [{"name": "Chicken breast", "category": "meat", "shelfLifeDays": 2, "storageRecommendations": "Refrigerate and cook within two days or freeze."}, {"name": "Rice", "category": "pantry", "shelfLifeDays": 365, "storageRecommendations": "Keep in an airtight container in a cool, dry place."}]}"#;

const FRESHNESS_EXAMPLE: &str = r#"{"freshnessInfo": [{"itemName": "Spinach", "details": "Leaves wilt within a few days. Discard if slimy or dark."}], "overallTips": ["Eat the items expiring soonest first.", "Freeze meat you will not cook in time."]}"#;

const RECEIPT_EXAMPLE: &str = r#"{"items": [{"name": "Greek yogurt", "category": "dairy", "shelfLifeDays": 14}, {"name": "Sourdough bread", "category": "bakery", "shelfLifeDays": 4}]}"#;

fn input_json(input: &NormalizedInput) -> Result<String, serde_json::Error> {
    match input {
        NormalizedInput::Single(name) | NormalizedInput::Receipt(name) => {
            serde_json::to_string(name)
        }
        NormalizedInput::Batch(names) => serde_json::to_string(names),
        NormalizedInput::Groceries(records) => serde_json::to_string(records),
    }
}

fn quick_prompt(input: &str, categories: &str) -> String {
    format!(
        "You are a food safety assistant. Answer how long the grocery item below stays fresh after purchase and how to store it.\n\
         Item (JSON): {input}\n\n\
         Respond with a single JSON object and nothing else, with these fields:\n\
         - \"name\": the item name, cleaned up\n\
         - \"category\": one of {categories}\n\
         - \"answer\": one or two sentences answering how long it lasts\n\
         - \"storageRecommendations\": a short storage tip\n\
         - \"shelfLifeDays\": a whole number of days, 0 or more\n\n\
         Example:\n{QUICK_EXAMPLE}"
    )
}

fn single_shelf_life_prompt(input: &str, categories: &str) -> String {
    format!(
        "Estimate the typical shelf life of this grocery item when stored properly after purchase.\n\
         Item (JSON): {input}\n\n\
         Respond with a single JSON object and nothing else: \
         {{\"name\": string, \"category\": one of {categories}, \"shelfLifeDays\": whole number >= 0, \"storageRecommendations\": string}}\n\n\
         Example:\n{SINGLE_EXAMPLE}"
    )
}

fn batch_shelf_life_prompt(input: &str, categories: &str) -> String {
    format!(
        "Estimate the typical shelf life of each grocery item below when stored properly after purchase. \
         Keep the items in the order given and return one entry per item.\n\
         Items (JSON array): {input}\n\n\
         Respond with a single JSON object and nothing else: \
         {{\"items\": [{{\"name\": string, \"category\": one of {categories}, \"shelfLifeDays\": whole number >= 0, \"storageRecommendations\": string}}]}}\n\n\
         Example for [\"chicken breast\", \"rice\"]:\n{BATCH_EXAMPLE}"
    )
}

fn freshness_prompt(input: &str) -> String {
    format!(
        "You help people use their groceries before they go bad. For each grocery record below, \
         describe how to tell whether it is still good and how best to use or store it given the days left.\n\
         Groceries (JSON array of records with name, category, purchaseDate, expiryDate, daysUntilExpiry, status): {input}\n\n\
         Respond with a single JSON object and nothing else: \
         {{\"freshnessInfo\": [{{\"itemName\": string, \"details\": string}}], \"overallTips\": [string]}}\n\
         Include one freshnessInfo entry per record, using the record name as itemName.\n\n\
         Example:\n{FRESHNESS_EXAMPLE}"
    )
}

fn receipt_prompt(input: &str, categories: &str) -> String {
    format!(
        "Extract the grocery items from this shopping receipt text. Ignore prices, totals, taxes, \
         store details and non-food lines. Expand abbreviations into plain item names.\n\
         Receipt text (JSON string): {input}\n\n\
         Respond with a single JSON object and nothing else: \
         {{\"items\": [{{\"name\": string, \"category\": one of {categories}, \"shelfLifeDays\": whole number >= 0}}]}}\n\n\
         Example for \"GRK YOGURT 4.99\\nSOURDOUGH 3.50\\nTOTAL 8.49\":\n{RECEIPT_EXAMPLE}"
    )
}

/// Build the instruction for `intent` around `input`. Deterministic.
pub fn build_prompt(intent: Intent, input: &NormalizedInput) -> Result<String, ApiError> {
    let json = input_json(input).map_err(|err| {
        ApiError::upstream("Failed to build AI request", Some(err.to_string()))
    })?;
    let categories = Category::allowed_values();
    let prompt = match intent {
        Intent::QuickAnswer => quick_prompt(&json, &categories),
        Intent::BatchShelfLife => match input {
            NormalizedInput::Batch(_) => batch_shelf_life_prompt(&json, &categories),
            _ => single_shelf_life_prompt(&json, &categories),
        },
        Intent::FreshnessDetail => freshness_prompt(&json),
        Intent::ReceiptExtraction => receipt_prompt(&json, &categories),
    };
    Ok(prompt)
}
