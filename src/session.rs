//! Per-chat dialogue state: where the user is in the menu and which message
//! is the chat's main menu. Kept in teloxide's in-memory dialogue storage, so
//! it is lost on restart. The dispatcher hands each handler a [`MenuDialogue`];
//! the message janitor reads the same storage directly.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage, Storage};
use teloxide::types::{ChatId, MessageId};
use tracing::debug;

use crate::dialogue::MenuState;

/// Dialogue state of one chat
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub state: MenuState,
    pub main_menu: Option<MessageId>,
}

impl Session {
    pub fn is_main_menu(&self, message_id: MessageId) -> bool {
        self.main_menu == Some(message_id)
    }
}

pub type SessionStorage = InMemStorage<Session>;

/// Type alias for the menu dialogue
pub type MenuDialogue = Dialogue<Session, SessionStorage>;

/// Session of the dialogue's chat; a chat never seen starts at the sport menu.
pub async fn load(dialogue: &MenuDialogue) -> Result<Session> {
    Ok(dialogue.get_or_default().await?)
}

/// Move the dialogue to `state`, keeping the tracked main menu.
pub async fn set_state(dialogue: &MenuDialogue, state: MenuState) -> Result<()> {
    let mut session = load(dialogue).await?;
    session.state = state;
    dialogue.update(session).await?;
    Ok(())
}

/// Track `message_id` as the main menu, returning the one it replaces.
pub async fn replace_main_menu(dialogue: &MenuDialogue, message_id: MessageId) -> Result<Option<MessageId>> {
    let mut session = load(dialogue).await?;
    let previous = session.main_menu.replace(message_id);
    dialogue.update(session).await?;
    Ok(previous)
}

/// Tracked main menu of `chat_id`, read from the storage outside any handler.
pub async fn main_menu(storage: &Arc<SessionStorage>, chat_id: ChatId) -> Option<MessageId> {
    match Arc::clone(storage).get_dialogue(chat_id).await {
        Ok(session) => session.and_then(|s| s.main_menu),
        Err(e) => {
            debug!(chat_id = %chat_id, error = %e, "Could not read session");
            None
        }
    }
}
