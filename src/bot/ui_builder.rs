//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

// Import localization
use crate::localization::{t_args_lang, t_lang};

use crate::catalog::{self, SPORTS};
use crate::dialogue::{MenuEvent, MenuState};
use crate::sports_api::FIXTURE_WINDOW;
use crate::sports_model::{Fixture, League, Team};

/// Buttons per list screen
pub const MAX_LIST_BUTTONS: usize = 10;
const MAX_BUTTON_LABEL: usize = 40;

/// Text plus keyboard of one menu message
#[derive(Debug, Clone)]
pub struct Screen {
    pub text: String,
    pub keyboard: InlineKeyboardMarkup,
}

impl Screen {
    fn new(text: String, rows: Vec<Vec<InlineKeyboardButton>>) -> Self {
        Self {
            text,
            keyboard: InlineKeyboardMarkup::new(rows),
        }
    }
}

fn button(label: impl Into<String>, event: MenuEvent) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(truncate_label(&label.into()), event.to_string())
}

fn back_row(target: MenuEvent, language_code: Option<&str>) -> Vec<InlineKeyboardButton> {
    vec![button(t_lang("back-button", language_code), target)]
}

fn in_pairs(buttons: Vec<InlineKeyboardButton>) -> Vec<Vec<InlineKeyboardButton>> {
    buttons.chunks(2).map(<[InlineKeyboardButton]>::to_vec).collect()
}

fn truncate_label(label: &str) -> String {
    if label.chars().count() > MAX_BUTTON_LABEL {
        let cut: String = label.chars().take(MAX_BUTTON_LABEL - 3).collect();
        format!("{cut}...")
    } else {
        label.to_string()
    }
}

/// Main menu: one button per sport plus "about"
pub fn start_screen(text: String, language_code: Option<&str>) -> Screen {
    let sports = SPORTS
        .iter()
        .map(|s| {
            button(
                t_lang(s.label_key, language_code),
                MenuEvent::SportSelected {
                    sport: s.code.to_string(),
                },
            )
        })
        .collect();
    let mut rows = in_pairs(sports);
    rows.push(vec![button(t_lang("about-button", language_code), MenuEvent::About)]);
    Screen::new(text, rows)
}

/// Welcome text shown with the main menu
pub fn welcome_text(language_code: Option<&str>) -> String {
    format!(
        "{}\n\n{}\n\n{}",
        t_lang("welcome-title", language_code),
        t_lang("welcome-description", language_code),
        t_lang("welcome-choose-sport", language_code)
    )
}

pub fn regions_screen(sport: &str, language_code: Option<&str>) -> Screen {
    let regions = catalog::REGIONS
        .iter()
        .map(|r| {
            button(
                catalog::display_name(r),
                MenuEvent::RegionSelected { region: r.to_string() },
            )
        })
        .collect();
    let mut rows = in_pairs(regions);
    rows.push(back_row(MenuEvent::BackTo(MenuState::Start), language_code));

    let text = t_args_lang("choose-region", &[("sport", &catalog::display_name(sport))], language_code);
    Screen::new(text, rows)
}

pub fn countries_screen(region: &str, language_code: Option<&str>) -> Screen {
    let countries = catalog::countries_for_region(region)
        .iter()
        .map(|c| {
            button(
                catalog::display_name(c),
                MenuEvent::CountrySelected { country: c.to_string() },
            )
        })
        .collect();
    let mut rows = in_pairs(countries);
    rows.push(back_row(MenuEvent::BackTo(MenuState::SportChosen), language_code));

    let text = t_args_lang("choose-country", &[("region", &catalog::display_name(region))], language_code);
    Screen::new(text, rows)
}

pub fn leagues_screen(country: &str, leagues: &[League], language_code: Option<&str>) -> Screen {
    let country_name = catalog::display_name(country);
    let text = if leagues.is_empty() {
        t_args_lang("no-leagues", &[("country", &country_name)], language_code)
    } else {
        t_args_lang("choose-league", &[("country", &country_name)], language_code)
    };

    let mut rows: Vec<Vec<InlineKeyboardButton>> = leagues
        .iter()
        .take(MAX_LIST_BUTTONS)
        .map(|l| vec![button(&l.name, MenuEvent::LeagueSelected { league_id: l.id })])
        .collect();
    rows.push(back_row(MenuEvent::BackTo(MenuState::RegionChosen), language_code));
    Screen::new(text, rows)
}

/// `2024-04-21 19:00 | Real Madrid 3–2 Barcelona (FT)`
pub fn format_fixture_line(fixture: &Fixture) -> String {
    format!(
        "{} {} | {} {} {} ({})",
        fixture.date_part(),
        fixture.time_part(),
        fixture.home.name,
        fixture.score(),
        fixture.away.name,
        fixture.status
    )
}

/// Title followed by at most [`FIXTURE_WINDOW`] fixture lines.
pub fn format_fixture_list(title: &str, fixtures: &[Fixture], language_code: Option<&str>) -> String {
    if fixtures.is_empty() {
        return format!("{title}\n\n{}", t_lang("no-fixtures", language_code));
    }
    let lines: Vec<String> = fixtures
        .iter()
        .take(FIXTURE_WINDOW as usize)
        .map(format_fixture_line)
        .collect();
    format!("{title}\n\n{}", lines.join("\n"))
}

/// Fixture list with a detail button per shown fixture.
///
/// `extra` rows go between the fixture buttons and the back button.
pub fn fixture_list_screen(
    title: &str,
    fixtures: &[Fixture],
    extra: Vec<Vec<InlineKeyboardButton>>,
    back: MenuEvent,
    language_code: Option<&str>,
) -> Screen {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = fixtures
        .iter()
        .take(FIXTURE_WINDOW as usize)
        .map(|f| {
            vec![button(
                format!("{} – {}", f.home.name, f.away.name),
                MenuEvent::MatchSelected { fixture_id: f.id },
            )]
        })
        .collect();
    rows.extend(extra);
    rows.push(back_row(back, language_code));
    Screen::new(format_fixture_list(title, fixtures, language_code), rows)
}

/// Upcoming fixtures of a league with a link to its teams
pub fn league_fixtures_screen(league_id: i64, fixtures: &[Fixture], language_code: Option<&str>) -> Screen {
    let league_name = fixtures
        .iter()
        .map(|f| f.league_name.as_str())
        .find(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{league_id}"));
    let title = t_args_lang("league-fixtures-title", &[("league", &league_name)], language_code);
    let teams = vec![vec![button(t_lang("teams-button", language_code), MenuEvent::LeagueTeams { league_id })]];
    fixture_list_screen(
        &title,
        fixtures,
        teams,
        MenuEvent::BackTo(MenuState::CountryChosen),
        language_code,
    )
}

pub fn team_list_screen(title: &str, teams: &[Team], back: MenuEvent, language_code: Option<&str>) -> Screen {
    let text = if teams.is_empty() {
        format!("{title}\n\n{}", t_lang("no-teams", language_code))
    } else {
        title.to_string()
    };
    let mut rows: Vec<Vec<InlineKeyboardButton>> = teams
        .iter()
        .take(MAX_LIST_BUTTONS)
        .map(|t| {
            let label = match &t.country {
                Some(country) => format!("{} ({country})", t.name),
                None => t.name.clone(),
            };
            vec![button(label, MenuEvent::TeamSelected { team_id: t.id })]
        })
        .collect();
    rows.push(back_row(back, language_code));
    Screen::new(text, rows)
}

pub fn league_list_screen(title: &str, leagues: &[League], back: MenuEvent, language_code: Option<&str>) -> Screen {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = leagues
        .iter()
        .take(MAX_LIST_BUTTONS)
        .map(|l| {
            let label = match &l.country {
                Some(country) => format!("{} ({country})", l.name),
                None => l.name.clone(),
            };
            vec![button(label, MenuEvent::LeagueSelected { league_id: l.id })]
        })
        .collect();
    rows.push(back_row(back, language_code));
    Screen::new(title.to_string(), rows)
}

/// Header block of a match card
pub fn format_match(fixture: &Fixture, sport: &str, language_code: Option<&str>) -> String {
    format!(
        "{} {} vs {}\n\n{}\n{}\n{}",
        catalog::sport_emoji(sport),
        fixture.home.name,
        fixture.away.name,
        t_args_lang(
            "match-league",
            &[("league", &fixture.league_name), ("status", &fixture.status)],
            language_code
        ),
        t_args_lang(
            "match-date",
            &[("date", fixture.date_part()), ("time", fixture.time_part())],
            language_code
        ),
        t_args_lang("match-score", &[("score", &fixture.score())], language_code),
    )
}

pub fn match_screen(fixture: &Fixture, sport: &str, prognosis: &str, language_code: Option<&str>) -> Screen {
    let text = format!(
        "{}\n\n{}\n{prognosis}",
        format_match(fixture, sport, language_code),
        t_lang("prognosis-title", language_code)
    );
    Screen::new(text, vec![back_row(MenuEvent::Back, language_code)])
}

pub fn match_not_found_screen(language_code: Option<&str>) -> Screen {
    Screen::new(
        t_lang("match-not-found", language_code),
        vec![back_row(MenuEvent::Back, language_code)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sports_model::TeamRef;

    fn fixture(id: i64, home: &str, away: &str) -> Fixture {
        Fixture {
            id,
            date: "2024-04-21T19:00:00+00:00".into(),
            status: "FT".into(),
            league_id: Some(140),
            league_name: "La Liga".into(),
            home: TeamRef { id: Some(541), name: home.into() },
            away: TeamRef { id: Some(529), name: away.into() },
            home_score: Some(3),
            away_score: Some(2),
        }
    }

    fn callback_data(screen: &Screen) -> Vec<String> {
        screen
            .keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|b| match &b.kind {
                teloxide::types::InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_fixture_line_format() {
        let line = format_fixture_line(&fixture(1, "Real Madrid", "Barcelona"));
        assert_eq!(line, "2024-04-21 19:00 | Real Madrid 3–2 Barcelona (FT)");
    }

    #[test]
    fn test_fixture_line_without_score() {
        let mut f = fixture(1, "Lakers", "Celtics");
        f.status = "NS".into();
        f.home_score = None;
        assert_eq!(format_fixture_line(&f), "2024-04-21 19:00 | Lakers ? Celtics (NS)");
    }

    #[test]
    fn test_fixture_list_is_capped() {
        let fixtures: Vec<Fixture> = (0..8).map(|i| fixture(i, "Home", "Away")).collect();
        let text = format_fixture_list("Matches", &fixtures, Some("en"));
        assert_eq!(text.lines().filter(|l| l.contains(" | ")).count(), FIXTURE_WINDOW as usize);

        let screen = fixture_list_screen("Matches", &fixtures, Vec::new(), MenuEvent::Back, Some("en"));
        let data = callback_data(&screen);
        assert_eq!(data.iter().filter(|d| d.starts_with("match_")).count(), FIXTURE_WINDOW as usize);
        assert_eq!(data.last().map(String::as_str), Some("back"));
    }

    #[test]
    fn test_empty_fixture_list() {
        let text = format_fixture_list("Matches", &[], Some("en"));
        assert_eq!(text, "Matches\n\nNo matches found.");
    }

    #[test]
    fn test_start_screen_has_sports_and_about() {
        let screen = start_screen(welcome_text(Some("ru")), Some("ru"));
        let data = callback_data(&screen);
        assert_eq!(
            data,
            vec![
                "sport_football",
                "sport_basketball",
                "sport_ice-hockey",
                "sport_tennis",
                "about_bot"
            ]
        );
    }

    #[test]
    fn test_menu_back_buttons() {
        let regions = callback_data(&regions_screen("football", None));
        assert_eq!(regions.len(), catalog::REGIONS.len() + 1);
        assert_eq!(regions.last().map(String::as_str), Some("back_to_start"));

        let countries = callback_data(&countries_screen("europe", None));
        assert!(countries.contains(&"country_england".to_string()));
        assert_eq!(countries.last().map(String::as_str), Some("back_to_sport"));

        let leagues = callback_data(&leagues_screen("england", &[], None));
        assert_eq!(leagues, vec!["back_to_region"]);
    }

    #[test]
    fn test_league_fixtures_screen_title_and_teams_button() {
        let screen = league_fixtures_screen(140, &[fixture(7, "Real Madrid", "Barcelona")], Some("en"));
        assert!(screen.text.starts_with("Upcoming matches: La Liga"));
        let data = callback_data(&screen);
        assert_eq!(data, vec!["match_7", "teams_140", "back_to_country"]);
    }

    #[test]
    fn test_long_labels_are_truncated() {
        let label = truncate_label(&"x".repeat(100));
        assert_eq!(label.chars().count(), MAX_BUTTON_LABEL);
        assert!(label.ends_with("..."));
    }

    #[test]
    fn test_match_card() {
        let text = format_match(&fixture(1, "Real Madrid", "Barcelona"), "football", Some("en"));
        assert!(text.starts_with("⚽ Real Madrid vs Barcelona"));
        assert!(text.contains("League: La Liga | Status: FT"));
        assert!(text.contains("Date: 2024-04-21 at 19:00"));
        assert!(text.contains("Score: 3–2"));
    }
}
