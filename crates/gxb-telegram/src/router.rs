use std::{collections::HashMap, sync::Arc};

use anyhow::Context;
use teloxide::{dptree, prelude::*};
use tokio::sync::{Mutex, OwnedMutexGuard};

use gxb_core::{
    config::Config, dispatch::Dispatcher, messaging::port::MessagingPort, storage::Storage,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub chat_locks: Arc<ChatLocks>,
}

/// One async lock per chat, so a chat's updates are handled one at a time
/// while different chats proceed in parallel.
#[derive(Default)]
pub struct ChatLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub async fn lock_chat(&self, chat_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Drop the chat's lock entry once nobody holds or waits on it.
    ///
    /// Call after releasing the guard from [`ChatLocks::lock_chat`].
    pub async fn release(&self, chat_id: i64) {
        let mut map = self.inner.lock().await;
        if map
            .get(&chat_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            map.remove(&chat_id);
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    // A token Telegram rejects is a startup failure, not something to retry.
    let me = bot
        .get_me()
        .await
        .context("telegram rejected the bot token (getMe failed)")?;
    tracing::info!(
        bot = %me.username(),
        data_dir = %cfg.data_dir.display(),
        "group expenses bot started"
    );

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let dispatcher = Arc::new(Dispatcher::new(Storage::new(&cfg), messenger));

    let state = Arc::new(AppState {
        dispatcher,
        chat_locks: Arc::new(ChatLocks::default()),
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    teloxide::dispatching::Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    tracing::info!("group expenses bot stopped");
    Ok(())
}
