//! # Localization Module
//!
//! User-facing text lives in Fluent files under `locales/`, embedded at
//! compile time. Russian is the bot's primary language; English is served to
//! users whose Telegram client reports another language.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use anyhow::{anyhow, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use tracing::warn;
use unic_langid::LanguageIdentifier;

pub const DEFAULT_LANGUAGE: &str = "ru";

const RESOURCES: &[(&str, &str)] = &[
    ("ru", include_str!("../locales/ru/main.ftl")),
    ("en", include_str!("../locales/en/main.ftl")),
];

/// Localization manager for the bot
pub struct LocalizationManager {
    bundles: HashMap<String, Arc<FluentBundle<FluentResource>>>,
}

impl LocalizationManager {
    /// Create a new localization manager, failing on any syntax error in the
    /// embedded resources.
    pub fn new() -> Result<Self> {
        Self::build(true)
    }

    /// Like [`Self::new`] but keeps whatever parsed, logging the errors.
    fn lenient() -> Self {
        match Self::build(false) {
            Ok(manager) => manager,
            Err(e) => {
                warn!(error = %e, "Localization unavailable");
                Self {
                    bundles: HashMap::new(),
                }
            }
        }
    }

    fn build(strict: bool) -> Result<Self> {
        let mut bundles = HashMap::new();

        for (lang, source) in RESOURCES {
            let locale: LanguageIdentifier = lang.parse()?;
            let mut bundle = FluentBundle::new_concurrent(vec![locale]);
            bundle.set_use_isolating(false);

            let resource = match FluentResource::try_new(source.to_string()) {
                Ok(resource) => resource,
                Err((resource, errors)) => {
                    if strict {
                        return Err(anyhow!("Syntax errors in {lang} locale: {errors:?}"));
                    }
                    warn!(lang, ?errors, "Syntax errors in locale, keeping valid messages");
                    resource
                }
            };
            if let Err(errors) = bundle.add_resource(resource) {
                if strict {
                    return Err(anyhow!("Duplicate messages in {lang} locale: {errors:?}"));
                }
                warn!(lang, ?errors, "Duplicate messages in locale");
            }

            bundles.insert(lang.to_string(), Arc::new(bundle));
        }

        Ok(Self { bundles })
    }

    /// Get a localized message in the given language, falling back to the
    /// default language for unsupported codes.
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let bundle = match self
            .bundles
            .get(language)
            .or_else(|| self.bundles.get(DEFAULT_LANGUAGE))
        {
            Some(bundle) => bundle,
            None => return format!("Missing translation: {key}"),
        };

        let pattern = match bundle.get_message(key).and_then(|msg| msg.value()) {
            Some(pattern) => pattern,
            None => return format!("Missing translation: {key}"),
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (k, v) in args {
                fluent_args.set(*k, FluentValue::from(*v));
            }
            fluent_args
        });

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, fluent_args.as_ref(), &mut errors);
        if !errors.is_empty() {
            warn!(key, ?errors, "Errors while formatting message");
        }
        value.into_owned()
    }
}

static LOCALIZATION_MANAGER: LazyLock<LocalizationManager> = LazyLock::new(LocalizationManager::lenient);

/// Force the embedded resources to load now instead of on first use.
pub fn init_localization() -> Result<()> {
    LocalizationManager::new()?;
    LazyLock::force(&LOCALIZATION_MANAGER);
    Ok(())
}

pub fn get_localization_manager() -> &'static LocalizationManager {
    &LOCALIZATION_MANAGER
}

/// Map a Telegram `language_code` to a supported bundle.
pub fn resolve_language(language_code: Option<&str>) -> &'static str {
    match language_code {
        None => DEFAULT_LANGUAGE,
        Some(code) => {
            let primary = code.split(['-', '_']).next().unwrap_or("").to_lowercase();
            match primary.as_str() {
                "ru" | "uk" | "be" | "kk" => "ru",
                _ => "en",
            }
        }
    }
}

/// Localized message for the user's language
pub fn t_lang(key: &str, language_code: Option<&str>) -> String {
    get_localization_manager().get_message_in_language(key, resolve_language(language_code), None)
}

/// Localized message with arguments for the user's language
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language_code: Option<&str>) -> String {
    let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
    get_localization_manager().get_message_in_language(key, resolve_language(language_code), Some(&args_map))
}
