use std::env;
use std::sync::Arc;

use anyhow::Result;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pulseforge::bot::{callback_handler, message_handler, AppContext};
use pulseforge::config::BotConfig;
use pulseforge::db;
use pulseforge::janitor::MessageJanitor;
use pulseforge::localization::init_localization;
use pulseforge::query_parser::QueryParser;
use pulseforge::session::{Session, SessionStorage};
use pulseforge::sports_api::SportsApiClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();

    info!("Starting PulseForge bot");

    init_localization()?;

    // Missing credentials stop the process here
    let config = BotConfig::from_env()?;

    info!(path = %config.database_path.display(), "Initializing database");
    let pool = db::connect(&config.database_path).await?;
    db::init_database_schema(&pool).await?;

    let sports = SportsApiClient::new(config.sports_api_key.clone(), config.sports_api_timeout)?;
    let parser = match &config.llm {
        Some(llm) => {
            info!(model = %llm.model, "Free-text search enabled");
            Some(QueryParser::new(llm.clone())?)
        }
        None => {
            warn!("LLM_API_KEY not set, free-text search disabled");
            None
        }
    };

    let bot = Bot::new(&config.telegram_token);
    let sessions = SessionStorage::new();
    let janitor = MessageJanitor::new(bot.clone(), sessions.clone());

    let ctx = Arc::new(AppContext {
        pool,
        janitor,
        sports,
        parser,
        ephemeral_ttl: config.ephemeral_ttl,
    });

    // A leftover webhook would block long polling
    match bot.delete_webhook().drop_pending_updates(true).await {
        Ok(_) => info!("Webhook removed, starting long polling"),
        Err(e) => warn!(error = %e, "Failed to remove webhook"),
    }

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .enter_dialogue::<Message, InMemStorage<Session>, Session>()
                .endpoint(message_handler),
        )
        .branch(
            Update::filter_callback_query()
                .enter_dialogue::<CallbackQuery, InMemStorage<Session>, Session>()
                .endpoint(callback_handler),
        );

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![ctx, sessions])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// `RUST_LOG` filters (default `info`); `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
