//! Bot module for handling Telegram interactions
//!
//! - `message_handler`: commands, typed sport names and free-text search
//! - `callback_handler`: inline keyboard callback queries
//! - `dialogue_manager`: carries out menu transitions
//! - `search`: resolves parsed queries against the sports API
//! - `ui_builder`: keyboards and message formatting
//! - `context`: dependencies shared by the handlers

pub mod callback_handler;
pub mod context;
pub mod dialogue_manager;
pub mod message_handler;
pub mod search;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use context::AppContext;
pub use message_handler::message_handler;
