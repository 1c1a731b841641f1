//! # Catalog Module
//!
//! Static lookup tables: supported sports with their API-Sports base URLs,
//! the fixed region set and the region → country table used by the menus.

use lazy_static::lazy_static;
use regex::Regex;

/// A sport the bot knows how to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SportInfo {
    /// Code stored in the preference record and used in callback data
    pub code: &'static str,
    /// API-Sports base URL, always ending with `/`
    pub base_url: &'static str,
    pub emoji: &'static str,
    /// Localization key for the button label
    pub label_key: &'static str,
}

pub const SPORTS: &[SportInfo] = &[
    SportInfo {
        code: "football",
        base_url: "https://v3.football.api-sports.io/",
        emoji: "⚽",
        label_key: "sport-football",
    },
    SportInfo {
        code: "basketball",
        base_url: "https://v1.basketball.api-sports.io/",
        emoji: "🏀",
        label_key: "sport-basketball",
    },
    SportInfo {
        code: "ice-hockey",
        base_url: "https://v1.hockey.api-sports.io/",
        emoji: "🏒",
        label_key: "sport-ice-hockey",
    },
    SportInfo {
        code: "tennis",
        base_url: "https://v1.tennis.api-sports.io/",
        emoji: "🎾",
        label_key: "sport-tennis",
    },
];

/// Sport used for free-text search when neither the query nor the stored
/// preference names one.
pub const DEFAULT_SPORT: &str = "football";

pub const REGIONS: &[&str] = &["europe", "america", "asia", "africa", "international"];

const REGION_COUNTRIES: &[(&str, &[&str])] = &[
    ("europe", &["england", "spain", "germany", "italy", "france"]),
    ("america", &["usa", "brazil", "argentina"]),
    ("asia", &["japan", "south korea", "china"]),
    ("africa", &["egypt", "south africa"]),
    ("international", &["world"]),
];

lazy_static! {
    static ref SPORT_KEYWORD: Regex = Regex::new(
        r"(?i)^\s*(?:(football|soccer|футбол)|(basketball|баскетбол)|(ice[- ]?hockey|hockey|хоккей)|(tennis|теннис))\s*[!.]?\s*$"
    )
    .expect("sport keyword pattern is valid");
}

pub fn sport(code: &str) -> Option<&'static SportInfo> {
    SPORTS.iter().find(|s| s.code == code)
}

pub fn base_url(code: &str) -> Option<&'static str> {
    sport(code).map(|s| s.base_url)
}

/// Emoji for a sport, falling back to a trophy for free-form sports.
pub fn sport_emoji(code: &str) -> &'static str {
    sport(code).map(|s| s.emoji).unwrap_or("🏆")
}

pub fn is_region(code: &str) -> bool {
    REGIONS.contains(&code)
}

/// Countries offered for a region. Unknown regions have none.
pub fn countries_for_region(region: &str) -> &'static [&'static str] {
    REGION_COUNTRIES
        .iter()
        .find(|(r, _)| *r == region)
        .map(|(_, countries)| *countries)
        .unwrap_or(&[])
}

/// Recognizes a message that consists only of a sport name.
///
/// Returns the sport code, e.g. `"Хоккей"` → `"ice-hockey"`.
pub fn match_sport_keyword(text: &str) -> Option<&'static str> {
    let caps = SPORT_KEYWORD.captures(text)?;
    (1..=SPORTS.len())
        .find(|i| caps.get(*i).is_some())
        .map(|i| SPORTS[i - 1].code)
}

/// Capitalizes the first letter of each word, for button labels.
pub fn display_name(code: &str) -> String {
    code.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_sport_has_no_base_url() {
        assert_eq!(base_url("curling"), None);
        assert_eq!(base_url("football"), Some("https://v3.football.api-sports.io/"));
    }

    #[test]
    fn test_countries_for_region() {
        assert_eq!(countries_for_region("africa"), &["egypt", "south africa"]);
        assert!(countries_for_region("antarctica").is_empty());
    }

    #[test]
    fn test_sport_keywords() {
        assert_eq!(match_sport_keyword("Football"), Some("football"));
        assert_eq!(match_sport_keyword("  хоккей "), Some("ice-hockey"));
        assert_eq!(match_sport_keyword("ice-hockey"), Some("ice-hockey"));
        assert_eq!(match_sport_keyword("Теннис!"), Some("tennis"));
        assert_eq!(match_sport_keyword("Barcelona football results"), None);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("south korea"), "South Korea");
        assert_eq!(display_name("usa"), "Usa");
    }
}
