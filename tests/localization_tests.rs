//! # Localization Tests
//!
//! Message retrieval, argument substitution and language fallback.

use pulseforge::localization::{resolve_language, t_args_lang, t_lang, LocalizationManager};
use std::collections::HashMap;

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_localization() -> LocalizationManager {
        // Create a new localization manager for each test
        LocalizationManager::new().expect("Failed to create localization manager")
    }

    #[test]
    fn test_get_message_existing_key() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("back-button", "en", None);
        assert_eq!(message, "⬅️ Back");
        let message = manager.get_message_in_language("back-button", "ru", None);
        assert_eq!(message, "⬅️ Назад");
    }

    #[test]
    fn test_get_message_nonexistent_key() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("nonexistent-key", "en", None);
        assert!(message.starts_with("Missing translation:"));
    }

    #[test]
    fn test_get_message_unsupported_language() {
        let manager = setup_localization();

        // Unknown bundles fall back to Russian
        let message = manager.get_message_in_language("back-button", "de", None);
        assert_eq!(message, "⬅️ Назад");
    }

    #[test]
    fn test_get_message_with_args() {
        let manager = setup_localization();

        let mut args = HashMap::new();
        args.insert("query", "Quidditch");
        let message = manager.get_message_in_language("search-not-found", "en", Some(&args));
        assert_eq!(message, "Nothing found for \"Quidditch\".");
    }

    #[test]
    fn test_language_resolution() {
        assert_eq!(resolve_language(None), "ru");
        assert_eq!(resolve_language(Some("be")), "ru");
        assert_eq!(resolve_language(Some("kk")), "ru");
        assert_eq!(resolve_language(Some("fr")), "en");
    }

    #[test]
    fn test_user_language_helpers() {
        assert_eq!(t_lang("no-fixtures", Some("en-US")), "No matches found.");
        assert_eq!(
            t_args_lang("choose-region", &[("sport", "Football")], Some("en")),
            "Pick a region for Football:"
        );
        // No language reported by Telegram means Russian
        assert_ne!(t_lang("no-fixtures", None), t_lang("no-fixtures", Some("en")));
    }
}
