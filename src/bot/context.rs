//! Shared handler dependencies and the message helpers every handler uses.

use std::time::Duration;

use anyhow::Result;
use sqlx::SqlitePool;
use teloxide::prelude::*;
use teloxide::types::MessageId;
use tracing::debug;

use crate::dialogue::MenuState;
use crate::janitor::MessageJanitor;
use crate::query_parser::QueryParser;
use crate::session::{self, MenuDialogue, Session};
use crate::sports_api::SportsApiClient;

use super::ui_builder::Screen;

/// Everything a handler needs besides the bot, the update and its dialogue.
/// Injected once into the dispatcher as `Arc<AppContext>`.
pub struct AppContext {
    pub pool: SqlitePool,
    pub janitor: MessageJanitor,
    pub sports: SportsApiClient,
    /// Absent when no LLM key is configured
    pub parser: Option<QueryParser>,
    pub ephemeral_ttl: Duration,
}

impl AppContext {
    /// Send `text` and schedule its deletion.
    pub async fn send_ephemeral(&self, bot: &Bot, chat_id: ChatId, text: String) -> Result<Message> {
        let sent = bot.send_message(chat_id, text).await?;
        self.janitor.schedule_deletion(chat_id, sent.id, self.ephemeral_ttl).await;
        Ok(sent)
    }

    /// Replace the chat's main menu: the tracked one is deleted, `screen` is
    /// sent and tracked in its place, and the dialogue moves to `state`.
    pub async fn show_main_menu(
        &self,
        bot: &Bot,
        dialogue: &MenuDialogue,
        screen: Screen,
        state: MenuState,
    ) -> Result<Message> {
        let chat_id = dialogue.chat_id();
        let session = session::load(dialogue).await?;
        if let Some(old) = session.main_menu {
            self.delete_quietly(bot, chat_id, old).await;
        }

        let sent = bot
            .send_message(chat_id, screen.text)
            .reply_markup(screen.keyboard)
            .await?;
        dialogue
            .update(Session {
                state,
                main_menu: Some(sent.id),
            })
            .await?;
        self.janitor.cancel(chat_id, sent.id);
        Ok(sent)
    }

    /// Make `message_id`, an existing menu message the user is looking at,
    /// the chat's main menu. The previously tracked one is deleted.
    pub async fn adopt_main_menu(&self, bot: &Bot, chat_id: ChatId, session: &mut Session, message_id: MessageId) {
        if session.is_main_menu(message_id) {
            return;
        }
        if let Some(old) = session.main_menu.replace(message_id) {
            self.delete_quietly(bot, chat_id, old).await;
        }
        self.janitor.cancel(chat_id, message_id);
        debug!(chat_id = %chat_id, message_id = message_id.0, "Menu message adopted as main menu");
    }

    /// Delete a transient message right away instead of waiting for its timer.
    pub async fn discard(&self, bot: &Bot, message: &Message) {
        self.janitor.cancel(message.chat.id, message.id);
        self.delete_quietly(bot, message.chat.id, message.id).await;
    }

    async fn delete_quietly(&self, bot: &Bot, chat_id: ChatId, message_id: MessageId) {
        if let Err(e) = bot.delete_message(chat_id, message_id).await {
            debug!(chat_id = %chat_id, message_id = message_id.0, error = %e, "Could not delete message");
        }
    }
}
