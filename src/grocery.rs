//! Grocery records and the freshness rules derived from them.
//!
//! The browser owns the list; these types mirror its layout so requests can
//! carry records and so status and statistics are computed the same way on
//! both sides.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Days left at or below which an item counts as expiring soon.
pub const EXPIRING_SOON_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Category {
    Vegetables,
    Fruits,
    Meat,
    Dairy,
    Pantry,
    Beverages,
    Leftovers,
    Bakery,
    Frozen,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Vegetables,
        Category::Fruits,
        Category::Meat,
        Category::Dairy,
        Category::Pantry,
        Category::Beverages,
        Category::Leftovers,
        Category::Bakery,
        Category::Frozen,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Vegetables => "vegetables",
            Category::Fruits => "fruits",
            Category::Meat => "meat",
            Category::Dairy => "dairy",
            Category::Pantry => "pantry",
            Category::Beverages => "beverages",
            Category::Leftovers => "leftovers",
            Category::Bakery => "bakery",
            Category::Frozen => "frozen",
            Category::Other => "other",
        }
    }

    /// Map free text onto the fixed enumeration. Unknown values become `Other`.
    pub fn parse(text: &str) -> Category {
        let lowered = text.trim().to_lowercase();
        let category = match lowered.as_str() {
            "vegetables" | "vegetable" | "veggies" => Category::Vegetables,
            "fruits" | "fruit" => Category::Fruits,
            "meat" | "meats" => Category::Meat,
            "dairy" => Category::Dairy,
            "pantry" => Category::Pantry,
            "beverages" | "beverage" | "drinks" => Category::Beverages,
            "leftovers" | "leftover" => Category::Leftovers,
            "bakery" => Category::Bakery,
            "frozen" => Category::Frozen,
            _ => Category::Other,
        };
        trace!(input = %text, category = category.as_str(), "Parsed category");
        category
    }

    /// Category values joined for use inside a prompt.
    pub fn allowed_values() -> String {
        Category::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::parse(&value)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessStatus {
    Fresh,
    ExpiringSoon,
    Expired,
}

/// Status for an item with `days_left` calendar days until expiry.
pub fn status_for_days(days_left: i64) -> FreshnessStatus {
    if days_left < 0 {
        FreshnessStatus::Expired
    } else if days_left <= EXPIRING_SOON_DAYS {
        FreshnessStatus::ExpiringSoon
    } else {
        FreshnessStatus::Fresh
    }
}

/// `start + days` in calendar days, `None` past the last representable date.
pub fn add_days(start: NaiveDate, days: u32) -> Option<NaiveDate> {
    start.checked_add_days(Days::new(days.into()))
}

/// Like [`add_days`], clamped to `NaiveDate::MAX`.
pub fn saturating_add_days(start: NaiveDate, days: u32) -> NaiveDate {
    add_days(start, days).unwrap_or(NaiveDate::MAX)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub category: Category,
    pub purchase_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub estimated_shelf_life_days: u32,
    #[serde(default)]
    pub eaten: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eaten_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub marked_expired: bool,
}

impl GroceryItem {
    pub fn new(
        name: impl Into<String>,
        category: Category,
        purchase_date: NaiveDate,
        shelf_life_days: u32,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            category,
            purchase_date,
            expiry_date: saturating_add_days(purchase_date, shelf_life_days),
            estimated_shelf_life_days: shelf_life_days,
            eaten: false,
            eaten_at: None,
            marked_expired: false,
        }
    }

    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.expiry_date - today).num_days()
    }

    pub fn status(&self, today: NaiveDate) -> FreshnessStatus {
        if self.marked_expired {
            return FreshnessStatus::Expired;
        }
        status_for_days(self.days_until_expiry(today))
    }

    pub fn mark_eaten(&mut self, at: DateTime<Utc>) {
        self.eaten = true;
        self.eaten_at = Some(at);
    }

    pub fn mark_expired(&mut self) {
        self.marked_expired = true;
    }

    pub fn update_shelf_life(&mut self, days: u32) {
        self.estimated_shelf_life_days = days;
        self.expiry_date = saturating_add_days(self.purchase_date, days);
    }

    pub fn to_record(&self, today: NaiveDate) -> GroceryRecord {
        GroceryRecord {
            name: self.name.clone(),
            category: Some(self.category),
            purchase_date: Some(self.purchase_date),
            expiry_date: Some(self.expiry_date),
            days_until_expiry: Some(self.days_until_expiry(today)),
            status: Some(self.status(today)),
        }
    }
}

/// A grocery item as sent to the freshness endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_until_expiry: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FreshnessStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryStats {
    pub total: usize,
    pub fresh: usize,
    pub expiring_soon: usize,
    pub expired: usize,
    pub eaten: usize,
    pub wasted: usize,
    pub waste_rate: f64,
}

impl GroceryStats {
    /// Summarise a list. Eaten items are counted apart from the status buckets.
    pub fn compute(items: &[GroceryItem], today: NaiveDate) -> Self {
        let mut stats = GroceryStats {
            total: items.len(),
            ..Default::default()
        };
        for item in items {
            if item.eaten {
                stats.eaten += 1;
                continue;
            }
            match item.status(today) {
                FreshnessStatus::Fresh => stats.fresh += 1,
                FreshnessStatus::ExpiringSoon => stats.expiring_soon += 1,
                FreshnessStatus::Expired => {
                    stats.expired += 1;
                    stats.wasted += 1;
                }
            }
        }
        let consumed = stats.eaten + stats.wasted;
        if consumed > 0 {
            stats.waste_rate = stats.wasted as f64 / consumed as f64;
        }
        stats
    }
}
