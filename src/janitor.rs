//! # Ephemeral Message Janitor
//!
//! Deletes transient bot messages ("searching…", "nothing found", …) after a
//! delay. Each pending deletion is a tokio task keyed by (chat, message) and
//! can be cancelled; pending deletions do not survive a restart.
//!
//! The chat's tracked main-menu message is never deleted: scheduling it is a
//! no-op, and a message that became the main menu while its timer was
//! running is spared when the timer fires.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::MessageId;
use tokio::task::{AbortHandle, Id};
use tracing::debug;

use crate::session::{main_menu, SessionStorage};

/// Something that can remove a chat message
pub trait MessageDeleter: Clone + Send + Sync + 'static {
    fn delete(&self, chat_id: ChatId, message_id: MessageId) -> impl Future<Output = anyhow::Result<()>> + Send;
}

impl MessageDeleter for Bot {
    async fn delete(&self, chat_id: ChatId, message_id: MessageId) -> anyhow::Result<()> {
        self.delete_message(chat_id, message_id).await?;
        Ok(())
    }
}

type PendingKey = (ChatId, MessageId);
type PendingMap = HashMap<PendingKey, AbortHandle>;

fn lock(pending: &Mutex<PendingMap>) -> MutexGuard<'_, PendingMap> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Drop the entry for `key` only while it still belongs to task `owner`;
/// a rescheduled deletion has replaced it otherwise.
fn release(pending: &Mutex<PendingMap>, key: &PendingKey, owner: Id) {
    let mut map = lock(pending);
    if map.get(key).is_some_and(|handle| handle.id() == owner) {
        map.remove(key);
    }
}

#[derive(Clone)]
pub struct MessageJanitor<D: MessageDeleter = Bot> {
    deleter: D,
    sessions: Arc<SessionStorage>,
    pending: Arc<Mutex<PendingMap>>,
}

impl<D: MessageDeleter> MessageJanitor<D> {
    pub fn new(deleter: D, sessions: Arc<SessionStorage>) -> Self {
        Self {
            deleter,
            sessions,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Arm a one-shot deletion of `message_id` after `delay`, replacing any
    /// deletion already pending for it.
    ///
    /// Returns `false` without arming anything when the message is the chat's
    /// main menu.
    pub async fn schedule_deletion(&self, chat_id: ChatId, message_id: MessageId, delay: Duration) -> bool {
        if main_menu(&self.sessions, chat_id).await == Some(message_id) {
            debug!(chat_id = %chat_id, message_id = message_id.0, "Main menu is exempt from deletion");
            return false;
        }

        let key = (chat_id, message_id);
        let deleter = self.deleter.clone();
        let sessions = Arc::clone(&self.sessions);
        let pending = Arc::clone(&self.pending);

        {
            // Held across the spawn so the task cannot look up its entry before it exists.
            let mut guard = lock(&self.pending);
            let task = tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                release(&pending, &key, tokio::task::id());

                if main_menu(&sessions, chat_id).await == Some(message_id) {
                    debug!(chat_id = %chat_id, message_id = message_id.0, "Message became the main menu, keeping it");
                    return;
                }
                match deleter.delete(chat_id, message_id).await {
                    Ok(()) => debug!(chat_id = %chat_id, message_id = message_id.0, "Ephemeral message deleted"),
                    Err(e) => debug!(chat_id = %chat_id, message_id = message_id.0, error = %e, "Could not delete ephemeral message"),
                }
            });
            if let Some(previous) = guard.insert(key, task.abort_handle()) {
                previous.abort();
            }
        }

        debug!(chat_id = %chat_id, message_id = message_id.0, delay_secs = delay.as_secs(), "Deletion scheduled");
        true
    }

    /// Cancel a pending deletion. Returns whether one was pending.
    pub fn cancel(&self, chat_id: ChatId, message_id: MessageId) -> bool {
        match lock(&self.pending).remove(&(chat_id, message_id)) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }
}
