/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric). Groups have negative ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Name shown in the expense file for the user who logged an expense.
///
/// Full name first, then `@username`, then the numeric id.
pub fn display_name(full_name: Option<&str>, username: Option<&str>, user_id: UserId) -> String {
    if let Some(name) = full_name.map(str::trim).filter(|s| !s.is_empty()) {
        return name.to_string();
    }
    if let Some(u) = username.map(str::trim).filter(|s| !s.is_empty()) {
        return format!("@{u}");
    }
    user_id.0.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_in_order() {
        assert_eq!(display_name(Some("Ann Lee"), Some("ann"), UserId(7)), "Ann Lee");
        assert_eq!(display_name(Some("  "), Some("ann"), UserId(7)), "@ann");
        assert_eq!(display_name(None, None, UserId(7)), "7");
    }
}
