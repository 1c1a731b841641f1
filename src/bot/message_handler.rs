//! Message Handler module for processing incoming Telegram messages

use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use tracing::{debug, info, warn};

// Import localization
use crate::localization::{t_args_lang, t_lang};

// Import database functions
use crate::db::get_user_preference;

use crate::catalog::match_sport_keyword;
use crate::dialogue::{validate_search_query, Effect, MenuState};
use crate::session::{self, MenuDialogue};

use super::context::AppContext;
use super::dialogue_manager::render_effect;
use super::search::{resolve_sport, run_search};
use super::ui_builder::{start_screen, welcome_text};

pub async fn message_handler(bot: Bot, msg: Message, ctx: Arc<AppContext>, dialogue: MenuDialogue) -> Result<()> {
    let chat_id = msg.chat.id;
    let Some(text) = msg.text() else {
        debug!(chat_id = %chat_id, "Ignoring non-text message");
        return Ok(());
    };

    // Extract user's language code from Telegram
    let language_code = msg
        .from
        .as_ref()
        .and_then(|user| user.language_code.as_ref())
        .map(|s| s.as_str());

    debug!(chat_id = %chat_id, message_length = text.len(), "Received text message");

    if let Some(command) = parse_command(text) {
        return handle_command(&bot, &ctx, &dialogue, command, language_code).await;
    }

    if let Some(sport) = match_sport_keyword(text) {
        // Same as pressing the sport button, but in a fresh menu message
        let effect = Effect::ChooseSport(sport.to_string());
        if let Some(screen) = render_effect(&ctx, chat_id, &effect, language_code).await {
            ctx.show_main_menu(&bot, &dialogue, screen, MenuState::SportChosen)
                .await?;
        }
        return Ok(());
    }

    handle_search(&bot, &ctx, &dialogue, text, language_code).await
}

/// `"/start@PulseForgeBot now"` → `"start"`
fn parse_command(text: &str) -> Option<&str> {
    let word = text.trim_start().strip_prefix('/')?.split_whitespace().next()?;
    word.split('@').next()
}

async fn handle_command(
    bot: &Bot,
    ctx: &AppContext,
    dialogue: &MenuDialogue,
    command: &str,
    language_code: Option<&str>,
) -> Result<()> {
    let chat_id = dialogue.chat_id();
    let text = match command {
        "start" => welcome_text(language_code),
        "help" => format!(
            "{}\n\n{}",
            t_lang("help-text", language_code),
            t_lang("welcome-choose-sport", language_code)
        ),
        other => {
            debug!(chat_id = %chat_id, command = other, "Unknown command");
            ctx.send_ephemeral(bot, chat_id, t_lang("help-text", language_code)).await?;
            return Ok(());
        }
    };

    // The preference record is left as is; only the menu is reset.
    ctx.show_main_menu(bot, dialogue, start_screen(text, language_code), MenuState::Start)
        .await?;
    info!(chat_id = %chat_id, command, "Main menu sent");
    Ok(())
}

async fn handle_search(
    bot: &Bot,
    ctx: &AppContext,
    dialogue: &MenuDialogue,
    text: &str,
    language_code: Option<&str>,
) -> Result<()> {
    let chat_id = dialogue.chat_id();
    let query = match validate_search_query(text) {
        Ok(query) => query,
        Err(reason) => {
            let key = if reason == "too_long" {
                "search-too-long"
            } else {
                "search-too-short"
            };
            ctx.send_ephemeral(bot, chat_id, t_lang(key, language_code)).await?;
            return Ok(());
        }
    };

    let Some(parser) = &ctx.parser else {
        ctx.send_ephemeral(bot, chat_id, t_lang("search-disabled", language_code))
            .await?;
        return Ok(());
    };

    let placeholder = ctx
        .send_ephemeral(bot, chat_id, t_lang("searching", language_code))
        .await?;

    let pref = get_user_preference(&ctx.pool, chat_id.0).await;
    let outcome = parser.parse(&query, pref.sport.as_deref()).await;
    if outcome.failed {
        warn!(chat_id = %chat_id, "Query could not be parsed");
        ctx.discard(bot, &placeholder).await;
        ctx.send_ephemeral(bot, chat_id, t_lang("search-failed", language_code))
            .await?;
        return Ok(());
    }

    let sport = resolve_sport(&outcome.query, pref.sport.as_deref());
    info!(chat_id = %chat_id, sport, parsed = ?outcome.query, "Running search");
    let result = run_search(&ctx.sports, &outcome.query, &query, sport, language_code).await;
    ctx.discard(bot, &placeholder).await;

    match result {
        Some((screen, state)) => {
            bot.send_message(chat_id, screen.text)
                .reply_markup(screen.keyboard)
                .await?;
            session::set_state(dialogue, state).await?;
        }
        None => {
            info!(chat_id = %chat_id, "Search found nothing");
            ctx.send_ephemeral(
                bot,
                chat_id,
                t_args_lang("search-not-found", &[("query", &query)], language_code),
            )
            .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("/start"), Some("start"));
        assert_eq!(parse_command("/help@PulseForgeBot"), Some("help"));
        assert_eq!(parse_command("  /start now"), Some("start"));
        assert_eq!(parse_command("Barcelona"), None);
    }
}
