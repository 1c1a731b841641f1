//! Callback Handler module for processing inline keyboard callback queries

use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use tracing::{debug, error, warn};

// Import localization
use crate::localization::t_lang;

// Import dialogue types
use crate::dialogue::{transition, Effect, MenuEvent};
use crate::session::{self, MenuDialogue};

use super::context::AppContext;
use super::dialogue_manager::render_effect;

/// Handle callback queries from inline keyboards
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    ctx: Arc<AppContext>,
    dialogue: MenuDialogue,
) -> Result<()> {
    let data = q.data.as_deref().unwrap_or("");
    let event = match data.parse::<MenuEvent>() {
        Ok(event) => event,
        Err(never) => match never {},
    };
    let language_code = q.from.language_code.as_deref();

    debug!(user_id = %q.from.id, data, event = ?event, "Received callback query");

    if let Some(msg) = &q.message {
        let chat_id = msg.chat().id;
        let mut session = session::load(&dialogue).await?;
        let step = transition(session.state, &event);
        debug!(chat_id = %chat_id, from = ?session.state, to = ?step.next, effect = ?step.effect, "Menu transition");

        match &step.effect {
            Effect::ShowAbout => {
                if let Err(e) = ctx
                    .send_ephemeral(&bot, chat_id, t_lang("about-text", language_code))
                    .await
                {
                    warn!(chat_id = %chat_id, error = %e, "Failed to send about text");
                }
            }
            effect => {
                if let Some(screen) = render_effect(&ctx, chat_id, effect, language_code).await {
                    // Edit the message the button belongs to
                    if let Err(e) = bot
                        .edit_message_text(chat_id, msg.id(), screen.text)
                        .reply_markup(screen.keyboard)
                        .await
                    {
                        error!(user_id = %q.from.id, error = %e, "Failed to edit menu message");
                    }
                }
                // A start menu drawn over a search result becomes the one main menu
                if *effect == Effect::ShowSports {
                    ctx.adopt_main_menu(&bot, chat_id, &mut session, msg.id()).await;
                }
            }
        }

        session.state = step.next;
        if let Err(e) = dialogue.update(session).await {
            error!(chat_id = %chat_id, error = %e, "Failed to store menu state");
        }
    }

    // Answer the callback query to remove the loading state
    bot.answer_callback_query(q.id).await?;

    Ok(())
}
