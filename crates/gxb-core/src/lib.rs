//! Core domain + application logic for the group expenses bot.
//!
//! This crate is framework-agnostic. Telegram lives behind the messaging port
//! (trait) implemented in the adapter crate.

pub mod categories;
pub mod config;
pub mod dialog;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod expense;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod periods;
pub mod render;
pub mod storage;

pub use errors::{Error, Result};
