//! # PulseForge Telegram Bot
//!
//! A Telegram bot serving sports results, fixtures and simple form-based
//! predictions from API-Sports. Users navigate an inline menu
//! (sport → region → country → league) or type free-text queries that a
//! hosted language model turns into structured searches.

pub mod bot;
pub mod catalog;
pub mod config;
pub mod db;
pub mod dialogue;
pub mod janitor;
pub mod localization;
pub mod prognosis;
pub mod query_parser;
pub mod session;
pub mod sports_api;
pub mod sports_model;
