//! Per-chat conversation state machine.
//!
//! ```text
//! setup:   Idle -> AwaitingCategories -> Idle
//! expense: Idle -> AwaitingExpenseCategory -> AwaitingExpensePrice
//!               -> AwaitingExpenseComment -> Idle
//! ```
//!
//! [`Dialog::advance`] is pure: it decides what an input means for the current
//! state. Side effects (persistence, replies) belong to the dispatcher.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::{
    categories::split_categories,
    domain::{ChatId, MessageRef},
    expense::{parse_price, InvalidPrice},
};

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Dialog {
    #[default]
    Idle,
    AwaitingCategories,
    AwaitingExpenseCategory {
        /// Snapshot of the category set the menu was rendered from.
        categories: Vec<String>,
        /// The message carrying the live menu; selections from older menus are stale.
        menu: MessageRef,
    },
    AwaitingExpensePrice {
        category: String,
    },
    AwaitingExpenseComment {
        category: String,
        price: f64,
    },
}

/// Dialog-relevant input, already stripped of transport details.
#[derive(Clone, Copy, Debug)]
pub enum Input<'a> {
    Text(&'a str),
    Selection { menu: Option<MessageRef>, index: usize },
    Skip,
}

/// Why the current step asks again without changing state.
#[derive(Clone, Debug, PartialEq)]
pub enum Reprompt {
    NoCategories,
    UnknownSelection,
    InvalidPrice(InvalidPrice),
}

/// What an input means for the current dialog.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// Input does not belong to the current step; nothing happens.
    Ignore,
    /// Input was rejected; state unchanged, prompt repeated.
    Reprompt(Reprompt),
    /// Move on to the next step.
    Next(Dialog),
    /// Setup finished: persist these names, then go idle.
    SaveCategories(Vec<String>),
    /// Expense finished: persist the record, then go idle.
    RecordExpense {
        category: String,
        price: f64,
        comment: String,
    },
}

impl Dialog {
    pub fn is_idle(&self) -> bool {
        matches!(self, Dialog::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialog::Idle => "idle",
            Dialog::AwaitingCategories => "awaiting_categories",
            Dialog::AwaitingExpenseCategory { .. } => "awaiting_expense_category",
            Dialog::AwaitingExpensePrice { .. } => "awaiting_expense_price",
            Dialog::AwaitingExpenseComment { .. } => "awaiting_expense_comment",
        }
    }

    pub fn advance(&self, input: Input<'_>) -> Step {
        match (self, input) {
            (Dialog::AwaitingCategories, Input::Text(text)) => {
                let names = split_categories(text);
                if names.is_empty() {
                    Step::Reprompt(Reprompt::NoCategories)
                } else {
                    Step::SaveCategories(names)
                }
            }

            (
                Dialog::AwaitingExpenseCategory { categories, menu },
                Input::Selection { menu: from, index },
            ) => {
                if from.is_some_and(|m| m != *menu) {
                    return Step::Ignore;
                }
                match categories.get(index) {
                    Some(category) => Step::Next(Dialog::AwaitingExpensePrice {
                        category: category.clone(),
                    }),
                    None => Step::Reprompt(Reprompt::UnknownSelection),
                }
            }
            (Dialog::AwaitingExpenseCategory { .. }, Input::Text(_)) => {
                Step::Reprompt(Reprompt::UnknownSelection)
            }

            (Dialog::AwaitingExpensePrice { category }, Input::Text(text)) => {
                match parse_price(text) {
                    Ok(price) => Step::Next(Dialog::AwaitingExpenseComment {
                        category: category.clone(),
                        price,
                    }),
                    Err(e) => Step::Reprompt(Reprompt::InvalidPrice(e)),
                }
            }

            (Dialog::AwaitingExpenseComment { category, price }, Input::Text(text)) => {
                Step::RecordExpense {
                    category: category.clone(),
                    price: *price,
                    comment: text.trim().to_string(),
                }
            }
            (Dialog::AwaitingExpenseComment { category, price }, Input::Skip) => {
                Step::RecordExpense {
                    category: category.clone(),
                    price: *price,
                    comment: String::new(),
                }
            }

            _ => Step::Ignore,
        }
    }
}

/// Conversation state per chat. Absent entries are [`Dialog::Idle`].
#[derive(Default)]
pub struct DialogTable {
    inner: Mutex<HashMap<ChatId, Dialog>>,
}

impl DialogTable {
    #[cfg(test)]
    pub async fn get(&self, chat_id: ChatId) -> Dialog {
        self.inner
            .lock()
            .await
            .get(&chat_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Remove and return the chat's dialog, leaving it idle.
    pub async fn take(&self, chat_id: ChatId) -> Dialog {
        self.inner
            .lock()
            .await
            .remove(&chat_id)
            .unwrap_or_default()
    }

    pub async fn put(&self, chat_id: ChatId, dialog: Dialog) {
        let mut map = self.inner.lock().await;
        if dialog.is_idle() {
            map.remove(&chat_id);
        } else {
            map.insert(chat_id, dialog);
        }
    }

    #[cfg(test)]
    pub async fn active(&self) -> usize {
        self.inner.lock().await.len()
    }
}
