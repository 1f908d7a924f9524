use chrono::Local;
use serde::{Deserialize, Serialize};

/// Timestamp format used in the expense file's `Date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of a chat's expense file.
///
/// Field names map to the file's header columns, in order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "User")]
    pub user: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Comment", default)]
    pub comment: String,
}

impl ExpenseRecord {
    /// A record stamped with the current local time.
    pub fn now(user: &str, category: &str, price: f64, comment: &str) -> Self {
        Self {
            date: Local::now().format(DATE_FORMAT).to_string(),
            user: user.to_string(),
            category: category.to_string(),
            price,
            comment: comment.to_string(),
        }
    }

    /// The calendar date part of [`ExpenseRecord::date`].
    pub fn day(&self) -> Option<chrono::NaiveDate> {
        let day = self.date.split_whitespace().next()?;
        chrono::NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPrice {
    #[error("not a number")]
    NotANumber,
    #[error("price cannot be negative")]
    Negative,
}

/// Parse a user-entered price. A comma is accepted as the decimal separator.
pub fn parse_price(text: &str) -> Result<f64, InvalidPrice> {
    let normalized = text.trim().replace(',', ".");
    let price: f64 = normalized.parse().map_err(|_| InvalidPrice::NotANumber)?;
    if !price.is_finite() {
        return Err(InvalidPrice::NotANumber);
    }
    if price < 0.0 {
        return Err(InvalidPrice::Negative);
    }
    // Normalize `-0` so it is written as `0`.
    Ok(price.abs())
}
