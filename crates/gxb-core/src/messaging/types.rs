use crate::domain::{ChatId, MessageRef};

/// Messenger-agnostic incoming update model.
///
/// Telegram-specific fields stay in the Telegram adapter.
#[derive(Clone, Debug)]
pub enum IncomingUpdate {
    Command(Command),
    Text(TextMessage),
    Callback(CallbackQuery),
}

impl IncomingUpdate {
    pub fn chat_id(&self) -> ChatId {
        match self {
            IncomingUpdate::Command(c) => c.sender.chat_id,
            IncomingUpdate::Text(t) => t.sender.chat_id,
            IncomingUpdate::Callback(q) => q.sender.chat_id,
        }
    }
}

/// Who sent an update, and where.
#[derive(Clone, Debug)]
pub struct Sender {
    pub chat_id: ChatId,
    pub display_name: String,
}

#[derive(Clone, Debug)]
pub struct Command {
    pub sender: Sender,
    /// Lowercased command name without the leading slash or `@botname`.
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct TextMessage {
    pub sender: Sender,
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct CallbackQuery {
    pub sender: Sender,
    pub callback_id: String,
    pub data: String,
    pub message: Option<MessageRef>,
}

/// Inline keyboard laid out in rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineKeyboard {
    /// Lay `buttons` out left to right, `per_row` per row.
    pub fn grid(buttons: Vec<InlineButton>, per_row: usize) -> Self {
        let per_row = per_row.max(1);
        let mut rows = Vec::new();
        let mut row = Vec::with_capacity(per_row);
        for b in buttons {
            row.push(b);
            if row.len() == per_row {
                rows.push(std::mem::replace(&mut row, Vec::with_capacity(per_row)));
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
        Self { rows }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }
}

/// Command name of `/cmd@botname arg1 ...`, lowercased. Arguments are dropped.
pub fn parse_command(text: &str) -> Option<String> {
    let text = text.trim();
    if !text.starts_with('/') {
        return None;
    }

    let first = text.split(char::is_whitespace).next().unwrap_or("");

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    if cmd.is_empty() {
        return None;
    }
    Some(cmd)
}
