//! Form-based match prediction.
//!
//! The estimate is deliberately simple: the home side's share of wins in its
//! recent form string, plus the last few head-to-head results.

use crate::localization::{t_args_lang, t_lang};
use crate::sports_api::SportsApiClient;
use crate::sports_model::Fixture;

/// Head-to-head results shown under a prediction
pub const H2H_SHOWN: usize = 3;

/// Percentage of wins in a form string such as `"WWDLW"`; 50 for no form.
pub fn win_rate(form: &str) -> u32 {
    let results: Vec<char> = form.chars().filter(|c| matches!(c, 'W' | 'D' | 'L')).collect();
    if results.is_empty() {
        return 50;
    }
    let wins = results.iter().filter(|c| **c == 'W').count();
    ((wins as f64 / results.len() as f64) * 100.0).round() as u32
}

/// `Home 2–1 Away` lines for the most recent meetings.
pub fn format_h2h(meetings: &[Fixture], language_code: Option<&str>) -> String {
    if meetings.is_empty() {
        return t_lang("h2h-unavailable", language_code);
    }
    let mut text = t_lang("h2h-title", language_code);
    for m in meetings.iter().take(H2H_SHOWN) {
        text.push('\n');
        text.push_str(&format!("{} {} {}", m.home.name, m.score(), m.away.name));
    }
    text
}

/// Prediction text for `fixture`: form estimate followed by head-to-head.
pub async fn simple_prognosis(
    client: &SportsApiClient,
    sport: &str,
    fixture: &Fixture,
    language_code: Option<&str>,
) -> String {
    let (Some(home_id), Some(away_id)) = (fixture.home.id, fixture.away.id) else {
        return t_lang("prognosis-unavailable", language_code);
    };

    let form = match fixture.league_id {
        Some(league_id) => client.team_form(sport, home_id, league_id).await,
        None => None,
    };

    let estimate = match form {
        Some(form) => t_args_lang(
            "prognosis-form",
            &[("team", &fixture.home.name), ("rate", &win_rate(&form).to_string())],
            language_code,
        ),
        None => t_args_lang("prognosis-favorite", &[("team", &fixture.home.name)], language_code),
    };

    let meetings = client.head_to_head(sport, home_id, away_id).await;
    format!("{estimate}\n\n{}", format_h2h(&meetings, language_code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sports_model::TeamRef;

    fn meeting(home: &str, away: &str, score: (Option<i64>, Option<i64>)) -> Fixture {
        Fixture {
            id: 1,
            date: "2024-04-21T19:00:00+00:00".into(),
            status: "FT".into(),
            league_id: Some(140),
            league_name: "La Liga".into(),
            home: TeamRef { id: Some(1), name: home.into() },
            away: TeamRef { id: Some(2), name: away.into() },
            home_score: score.0,
            away_score: score.1,
        }
    }

    #[test]
    fn test_win_rate() {
        assert_eq!(win_rate("WWDLW"), 60);
        assert_eq!(win_rate("LLL"), 0);
        assert_eq!(win_rate(""), 50);
        assert_eq!(win_rate("W?W"), 100);
    }

    #[test]
    fn test_format_h2h_limits_lines() {
        let meetings = vec![
            meeting("Real Madrid", "Barcelona", (Some(3), Some(2))),
            meeting("Barcelona", "Real Madrid", (Some(4), Some(0))),
            meeting("Real Madrid", "Barcelona", (None, None)),
            meeting("Barcelona", "Real Madrid", (Some(1), Some(1))),
        ];
        let text = format_h2h(&meetings, Some("en"));
        assert!(text.starts_with("Recent meetings:"));
        assert!(text.contains("Real Madrid 3–2 Barcelona"));
        assert!(text.contains("Real Madrid ? Barcelona"));
        assert_eq!(text.lines().count(), 1 + H2H_SHOWN);
    }

    #[test]
    fn test_format_h2h_empty() {
        assert_eq!(format_h2h(&[], Some("en")), "Head-to-head history unavailable");
    }
}
