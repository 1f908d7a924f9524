//! Telegram update handlers.
//!
//! Each handler converts a teloxide update into a core `IncomingUpdate` and
//! runs it through the dispatcher while holding the chat's lock.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message, User},
};

use gxb_core::{
    domain::{display_name, ChatId, MessageId, MessageRef, UserId},
    messaging::types::{self, parse_command, IncomingUpdate, Sender},
};

use crate::router::AppState;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(update) = message_update(&msg) else {
        return Ok(());
    };
    dispatch(&state, update).await;
    Ok(())
}

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let Some(update) = callback_update(&q) else {
        // Always answer callback queries so the client stops spinning.
        let _ = bot.answer_callback_query(q.id).await;
        return Ok(());
    };
    dispatch(&state, update).await;
    Ok(())
}

async fn dispatch(state: &AppState, update: IncomingUpdate) {
    let chat_id = update.chat_id();
    let guard = state.chat_locks.lock_chat(chat_id.0).await;
    if let Err(e) = state.dispatcher.handle(update).await {
        tracing::error!(chat_id = chat_id.0, error = %e, "update failed");
    }
    drop(guard);
    state.chat_locks.release(chat_id.0).await;
}

fn sender(chat_id: teloxide::types::ChatId, user: &User) -> Sender {
    let user_id = UserId(user.id.0 as i64);
    let full_name = user.full_name();
    Sender {
        chat_id: ChatId(chat_id.0),
        display_name: display_name(Some(&full_name), user.username.as_deref(), user_id),
    }
}

/// Text messages only; commands are split off here. Other content is ignored.
fn message_update(msg: &Message) -> Option<IncomingUpdate> {
    let user = msg.from()?;
    let text = msg.text()?;
    let sender = sender(msg.chat.id, user);

    Some(match parse_command(text) {
        Some(name) => IncomingUpdate::Command(types::Command { sender, name }),
        None => IncomingUpdate::Text(types::TextMessage {
            sender,
            text: text.to_string(),
        }),
    })
}

fn callback_update(q: &CallbackQuery) -> Option<IncomingUpdate> {
    let message = q.message.as_ref()?;
    let data = q.data.clone().filter(|d| !d.is_empty())?;

    Some(IncomingUpdate::Callback(types::CallbackQuery {
        sender: sender(message.chat.id, &q.from),
        callback_id: q.id.clone(),
        data,
        message: Some(MessageRef {
            chat_id: ChatId(message.chat.id.0),
            message_id: MessageId(message.id.0),
        }),
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn group_message(text: &str) -> serde_json::Value {
        json!({
            "message_id": 7,
            "date": 1_760_000_000,
            "chat": { "id": -1001, "type": "group", "title": "Flatmates" },
            "from": {
                "id": 42,
                "is_bot": false,
                "first_name": "Ann",
                "last_name": "Lee",
                "username": "ann"
            },
            "text": text
        })
    }

    #[test]
    fn commands_are_split_from_text() {
        let msg: Message = serde_json::from_value(group_message("/Expense@gxb_bot")).unwrap();
        match message_update(&msg) {
            Some(IncomingUpdate::Command(c)) => {
                assert_eq!(c.name, "expense");
                assert_eq!(c.sender.chat_id, ChatId(-1001));
                assert_eq!(c.sender.display_name, "Ann Lee");
            }
            other => panic!("unexpected update: {other:?}"),
        }

        let msg: Message = serde_json::from_value(group_message("lunch")).unwrap();
        match message_update(&msg) {
            Some(IncomingUpdate::Text(t)) => assert_eq!(t.text, "lunch"),
            other => panic!("unexpected update: {other:?}"),
        }
    }

    #[test]
    fn callback_carries_menu_reference() {
        let q: CallbackQuery = serde_json::from_value(json!({
            "id": "cb-1",
            "from": { "id": 42, "is_bot": false, "first_name": "Ann" },
            "message": group_message("📊 Choose expense category:"),
            "chat_instance": "ci",
            "data": "cat:1"
        }))
        .unwrap();

        match callback_update(&q) {
            Some(IncomingUpdate::Callback(cb)) => {
                assert_eq!(cb.data, "cat:1");
                assert_eq!(cb.callback_id, "cb-1");
                assert_eq!(
                    cb.message,
                    Some(MessageRef {
                        chat_id: ChatId(-1001),
                        message_id: MessageId(7),
                    })
                );
                assert_eq!(cb.sender.display_name, "Ann");
            }
            other => panic!("unexpected update: {other:?}"),
        }
    }
}
