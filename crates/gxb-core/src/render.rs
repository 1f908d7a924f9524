//! Prompt text and menus shown at each dialog step.
//!
//! Everything here returns Telegram HTML; user-provided text is escaped.

use crate::{
    dialog::Reprompt,
    expense::{ExpenseRecord, InvalidPrice},
    formatting::escape_html,
    messaging::types::{InlineButton, InlineKeyboard},
    periods::Period,
};

/// Buttons per row in the category menu.
pub const MENU_COLUMNS: usize = 2;

/// Callback data prefix for category menu buttons (`cat:<index>`).
pub const CATEGORY_CALLBACK_PREFIX: &str = "cat:";

const CATEGORY_EXAMPLE: &str = "🍽️ Restaurants, 🏠 Apartment, 👶 Kids, 🎁 Gifts, 🛒 Supermarket";

pub fn category_keyboard(categories: &[String]) -> InlineKeyboard {
    let buttons = categories
        .iter()
        .enumerate()
        .map(|(idx, name)| InlineButton {
            label: name.clone(),
            callback_data: format!("{CATEGORY_CALLBACK_PREFIX}{idx}"),
        })
        .collect();
    InlineKeyboard::grid(buttons, MENU_COLUMNS)
}

/// Inverse of the callback data built by [`category_keyboard`].
pub fn parse_category_callback(data: &str) -> Option<usize> {
    data.strip_prefix(CATEGORY_CALLBACK_PREFIX)?.parse().ok()
}

pub fn choose_category() -> &'static str {
    "📊 Choose expense category:"
}

pub fn choose_category_again() -> &'static str {
    "👆 Please pick one of the categories using the buttons:"
}

pub fn first_setup_prompt() -> String {
    format!(
        "👋 Hello! I'm your Group Expenses Bot.\n\n\
         Let's set up your expense categories.\n\n\
         Enter the most popular categories of your group expenses, separated by commas.\n\n\
         For example:\n{CATEGORY_EXAMPLE}"
    )
}

pub fn update_categories_prompt() -> String {
    format!(
        "📝 Let's update your expense categories.\n\n\
         Enter the categories separated by commas.\n\n\
         For example:\n{CATEGORY_EXAMPLE}"
    )
}

pub fn welcome_back(categories: &[String]) -> String {
    format!(
        "👋 Welcome back!\n\n\
         Your categories are already set up:\n📋 {}\n\n\
         Use /expense to add a new expense.\n\
         Use /setcategories to change categories.",
        join_escaped(categories)
    )
}

pub fn categories_saved(categories: &[String]) -> String {
    format!(
        "✅ Categories saved!\n\n📋 Your categories:\n{}\n\n\
         Now you can use /expense to add expenses.",
        join_escaped(categories)
    )
}

pub fn categories_required() -> &'static str {
    "⚠️ Categories are not set up yet.\n\nPlease use /start to set up expense categories first."
}

pub fn price_prompt(category: &str) -> String {
    format!(
        "📁 Category: {}\n\n💰 Enter the price:",
        escape_html(category)
    )
}

pub fn comment_prompt(price: f64) -> String {
    format!("💰 Price: {price}\n\n📝 Enter a comment (or send /skip to skip):")
}

pub fn reprompt(reason: &Reprompt) -> &'static str {
    match reason {
        Reprompt::NoCategories => {
            "❌ No valid categories found. Please enter at least one category, separated by commas."
        }
        Reprompt::UnknownSelection => choose_category_again(),
        Reprompt::InvalidPrice(InvalidPrice::Negative) => {
            "❌ The price cannot be negative.\n\nFor example: 25.50 or 100"
        }
        Reprompt::InvalidPrice(InvalidPrice::NotANumber) => {
            "❌ Invalid price. Please enter a valid number.\n\nFor example: 25.50 or 100"
        }
    }
}

pub fn expense_saved(record: &ExpenseRecord) -> String {
    let mut out = format!(
        "✅ Expense saved!\n\n📁 Category: {}\n💰 Price: {}\n",
        escape_html(&record.category),
        record.price
    );
    if !record.comment.is_empty() {
        out.push_str(&format!("📝 Comment: {}\n", escape_html(&record.comment)));
    }
    out.push_str(&format!(
        "👤 User: {}\n\nUse /expense to add another expense.",
        escape_html(&record.user)
    ));
    out
}

pub fn cancelled() -> &'static str {
    "❌ Operation cancelled.\n\nUse /expense to start again."
}

pub fn nothing_to_cancel() -> &'static str {
    "Nothing to cancel."
}

pub fn stale_menu() -> &'static str {
    "This menu is no longer active."
}

pub fn step_failed() -> &'static str {
    "⚠️ Something went wrong. The current operation was cancelled, please try again."
}

pub fn command_failed() -> &'static str {
    "⚠️ Something went wrong, please try again."
}

pub fn help() -> &'static str {
    "🤖 <b>Group Expenses Bot Help</b>\n\n\
     <b>Commands:</b>\n\
     /start - Set up categories for the group\n\
     /expense - Add a new expense\n\
     /setcategories - Change expense categories\n\
     /periods - Show spending by period\n\
     /cancel - Cancel current operation\n\
     /skip - Skip the comment when adding an expense\n\
     /help - Show this help message\n\n\
     <b>How to use:</b>\n\
     1. Add the bot to your group\n\
     2. Use /start to set up expense categories\n\
     3. Use /expense to add expenses\n\
     4. Each group has its own categories and expense file"
}

pub fn periods(periods: &[Period]) -> String {
    if periods.is_empty() {
        return "📭 No expenses recorded yet.".to_string();
    }

    let mut out = String::from("📅 <b>Spending by period</b>\n");
    for p in periods {
        out.push_str(&format!(
            "\n<b>{}</b> ({} – {}): {}",
            escape_html(&p.label),
            p.from.format("%Y-%m-%d"),
            p.to.format("%Y-%m-%d"),
            format_total(p.total)
        ));
    }
    out
}

fn format_total(total: f64) -> String {
    format!("{:.2}", total)
}

fn join_escaped(names: &[String]) -> String {
    names
        .iter()
        .map(|n| escape_html(n))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn keyboard_keeps_insertion_order_two_per_row() {
        let cats: Vec<String> = ["Food", "Rent", "Kids", "Other"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let kb = category_keyboard(&cats);
        assert_eq!(kb.rows.len(), 2);
        let labels: Vec<&str> = kb.buttons().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Food", "Rent", "Kids", "Other"]);
        let data: Vec<Option<usize>> = kb
            .buttons()
            .map(|b| parse_category_callback(&b.callback_data))
            .collect();
        assert_eq!(data, vec![Some(0), Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn callback_parsing_rejects_foreign_data() {
        assert_eq!(parse_category_callback("cat:12"), Some(12));
        assert_eq!(parse_category_callback("cat:"), None);
        assert_eq!(parse_category_callback("askuser:1:2"), None);
    }

    #[test]
    fn user_text_is_escaped() {
        assert_eq!(
            price_prompt("<Food & Drinks>"),
            "📁 Category: &lt;Food &amp; Drinks&gt;\n\n💰 Enter the price:"
        );
    }

    #[test]
    fn saved_message_omits_empty_comment() {
        let mut r = ExpenseRecord {
            date: "2026-10-18 12:00:00".to_string(),
            user: "Ann".to_string(),
            category: "Food".to_string(),
            price: 12.5,
            comment: String::new(),
        };
        assert!(!expense_saved(&r).contains("Comment"));
        r.comment = "lunch".to_string();
        assert!(expense_saved(&r).contains("📝 Comment: lunch"));
        assert!(expense_saved(&r).contains("💰 Price: 12.5"));
    }

    #[test]
    fn periods_render_dates_and_totals() {
        let day = |m, d| NaiveDate::from_ymd_opt(2026, m, d).unwrap();
        let txt = periods(&[Period {
            label: "March".to_string(),
            from: day(3, 1),
            to: day(3, 31),
            total: 40.0,
        }]);
        assert!(txt.contains("<b>March</b> (2026-03-01 – 2026-03-31): 40.00"));
        assert_eq!(periods(&[]), "📭 No expenses recorded yet.");
    }
}
