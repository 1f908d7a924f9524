//! Routes incoming updates to dialog handlers.
//!
//! The dispatcher owns the per-chat [`DialogTable`]. Each update takes the
//! chat's dialog out of the table, runs exactly one handler against it, and
//! puts back whatever state the handler returns. A failing handler leaves
//! the chat idle.

use std::sync::Arc;

use crate::{
    dialog::{Dialog, DialogTable, Input, Step},
    domain::ChatId,
    expense::ExpenseRecord,
    messaging::{
        port::MessagingPort,
        types::{CallbackQuery, IncomingUpdate, Sender},
    },
    periods::expense_periods,
    render,
    storage::Storage,
    Result,
};

/// Recognized slash commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    SetCategories,
    Expense,
    Cancel,
    Help,
    Skip,
    Periods,
}

/// Command name -> command. Anything not listed is ignored.
pub const COMMANDS: &[(&str, BotCommand)] = &[
    ("start", BotCommand::Start),
    ("setcategories", BotCommand::SetCategories),
    ("expense", BotCommand::Expense),
    ("cancel", BotCommand::Cancel),
    ("help", BotCommand::Help),
    ("skip", BotCommand::Skip),
    ("periods", BotCommand::Periods),
];

impl BotCommand {
    pub fn lookup(name: &str) -> Option<Self> {
        COMMANDS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, c)| *c)
    }

    /// Commands that answer without touching the dialog.
    pub fn is_stateless(self) -> bool {
        matches!(self, BotCommand::Help | BotCommand::Periods)
    }
}

fn is_stateless(update: &IncomingUpdate) -> bool {
    match update {
        IncomingUpdate::Command(cmd) => {
            BotCommand::lookup(&cmd.name).is_some_and(BotCommand::is_stateless)
        }
        _ => false,
    }
}

pub struct Dispatcher {
    storage: Storage,
    messenger: Arc<dyn MessagingPort>,
    dialogs: DialogTable,
}

impl Dispatcher {
    pub fn new(storage: Storage, messenger: Arc<dyn MessagingPort>) -> Self {
        Self {
            storage,
            messenger,
            dialogs: DialogTable::default(),
        }
    }

    #[cfg(test)]
    pub(crate) fn dialogs(&self) -> &DialogTable {
        &self.dialogs
    }

    /// Handle one update to completion.
    ///
    /// Callers must not handle two updates for the same chat concurrently.
    /// A failing dialog step leaves the chat idle; a failing stateless command
    /// (`/help`, `/periods`) leaves the dialog as it was.
    pub async fn handle(&self, update: IncomingUpdate) -> Result<()> {
        let chat_id = update.chat_id();
        let current = self.dialogs.take(chat_id).await;
        let from = current.name();
        let restore = is_stateless(&update).then(|| current.clone());

        match self.route(&update, current).await {
            Ok(next) => {
                if next.name() != from {
                    tracing::debug!(
                        chat_id = chat_id.0,
                        from,
                        to = next.name(),
                        "dialog transition"
                    );
                }
                self.dialogs.put(chat_id, next).await;
                Ok(())
            }
            Err(e) => {
                let notice = match restore {
                    Some(previous) => {
                        self.dialogs.put(chat_id, previous).await;
                        render::command_failed()
                    }
                    None => render::step_failed(),
                };
                if let Err(notice_err) = self.messenger.send_html(chat_id, notice).await {
                    tracing::warn!(
                        chat_id = chat_id.0,
                        error = %notice_err,
                        "failed to send failure notice"
                    );
                }
                Err(e)
            }
        }
    }

    async fn route(&self, update: &IncomingUpdate, dialog: Dialog) -> Result<Dialog> {
        match update {
            IncomingUpdate::Command(cmd) => match BotCommand::lookup(&cmd.name) {
                Some(BotCommand::Start) => self.start(&cmd.sender).await,
                Some(BotCommand::SetCategories) => self.set_categories(&cmd.sender).await,
                Some(BotCommand::Expense) => self.expense(&cmd.sender).await,
                Some(BotCommand::Cancel) => self.cancel(&cmd.sender, dialog).await,
                Some(BotCommand::Help) => self.help(&cmd.sender, dialog).await,
                Some(BotCommand::Periods) => self.periods(&cmd.sender, dialog).await,
                Some(BotCommand::Skip) => self.step(&cmd.sender, dialog, Input::Skip).await,
                None => Ok(dialog),
            },
            IncomingUpdate::Text(msg) => {
                self.step(&msg.sender, dialog, Input::Text(&msg.text)).await
            }
            IncomingUpdate::Callback(q) => self.select(q, dialog).await,
        }
    }

    async fn start(&self, sender: &Sender) -> Result<Dialog> {
        match self.existing_categories(sender.chat_id)? {
            Some(categories) => {
                self.reply(sender, &render::welcome_back(&categories)).await?;
                Ok(Dialog::Idle)
            }
            None => {
                self.reply(sender, &render::first_setup_prompt()).await?;
                Ok(Dialog::AwaitingCategories)
            }
        }
    }

    async fn set_categories(&self, sender: &Sender) -> Result<Dialog> {
        self.reply(sender, &render::update_categories_prompt()).await?;
        Ok(Dialog::AwaitingCategories)
    }

    async fn expense(&self, sender: &Sender) -> Result<Dialog> {
        let Some(categories) = self.existing_categories(sender.chat_id)? else {
            self.reply(sender, render::categories_required()).await?;
            return Ok(Dialog::Idle);
        };
        self.show_menu(sender, categories, render::choose_category()).await
    }

    async fn cancel(&self, sender: &Sender, dialog: Dialog) -> Result<Dialog> {
        let text = if dialog.is_idle() {
            render::nothing_to_cancel()
        } else {
            render::cancelled()
        };
        self.reply(sender, text).await?;
        Ok(Dialog::Idle)
    }

    async fn help(&self, sender: &Sender, dialog: Dialog) -> Result<Dialog> {
        self.reply(sender, render::help()).await?;
        Ok(dialog)
    }

    async fn periods(&self, sender: &Sender, dialog: Dialog) -> Result<Dialog> {
        let records = self.storage.load_expenses(sender.chat_id)?;
        self.reply(sender, &render::periods(&expense_periods(&records)))
            .await?;
        Ok(dialog)
    }

    async fn select(&self, q: &CallbackQuery, dialog: Dialog) -> Result<Dialog> {
        let Some(index) = render::parse_category_callback(&q.data) else {
            self.messenger.answer_callback_query(&q.callback_id, None).await?;
            return Ok(dialog);
        };

        let input = Input::Selection {
            menu: q.message,
            index,
        };
        match dialog.advance(input) {
            Step::Next(Dialog::AwaitingExpensePrice { category }) => {
                self.messenger.answer_callback_query(&q.callback_id, None).await?;
                let prompt = render::price_prompt(&category);
                match q.message {
                    Some(menu) => self.messenger.edit_html(menu, &prompt).await?,
                    None => self.reply(&q.sender, &prompt).await?,
                }
                Ok(Dialog::AwaitingExpensePrice { category })
            }
            Step::Reprompt(reason) => {
                self.messenger
                    .answer_callback_query(&q.callback_id, Some(render::reprompt(&reason)))
                    .await?;
                Ok(dialog)
            }
            _ => {
                self.messenger
                    .answer_callback_query(&q.callback_id, Some(render::stale_menu()))
                    .await?;
                Ok(dialog)
            }
        }
    }

    /// Feed free text or `/skip` to the current step.
    async fn step(&self, sender: &Sender, dialog: Dialog, input: Input<'_>) -> Result<Dialog> {
        match dialog.advance(input) {
            Step::Ignore => Ok(dialog),

            Step::Reprompt(reason) => match dialog {
                Dialog::AwaitingExpenseCategory { categories, .. } => {
                    self.show_menu(sender, categories, render::reprompt(&reason))
                        .await
                }
                other => {
                    self.reply(sender, render::reprompt(&reason)).await?;
                    Ok(other)
                }
            },

            Step::Next(next) => {
                if let Dialog::AwaitingExpenseComment { price, .. } = &next {
                    self.reply(sender, &render::comment_prompt(*price)).await?;
                }
                Ok(next)
            }

            Step::SaveCategories(names) => {
                let stored = self.storage.save_categories(sender.chat_id, &names)?;
                self.reply(sender, &render::categories_saved(&stored)).await?;
                Ok(Dialog::Idle)
            }

            Step::RecordExpense {
                category,
                price,
                comment,
            } => {
                let record = ExpenseRecord::now(&sender.display_name, &category, price, &comment);
                self.storage.append_expense(sender.chat_id, &record)?;
                self.reply(sender, &render::expense_saved(&record)).await?;
                Ok(Dialog::Idle)
            }
        }
    }

    async fn show_menu(
        &self,
        sender: &Sender,
        categories: Vec<String>,
        text: &str,
    ) -> Result<Dialog> {
        let keyboard = render::category_keyboard(&categories);
        let menu = self
            .messenger
            .send_inline_keyboard(sender.chat_id, text, keyboard)
            .await?;
        Ok(Dialog::AwaitingExpenseCategory { categories, menu })
    }

    fn existing_categories(&self, chat_id: ChatId) -> Result<Option<Vec<String>>> {
        Ok(self
            .storage
            .load_categories(chat_id)?
            .filter(|c| !c.is_empty()))
    }

    async fn reply(&self, sender: &Sender, html: &str) -> Result<()> {
        self.messenger.send_html(sender.chat_id, html).await?;
        Ok(())
    }
}
