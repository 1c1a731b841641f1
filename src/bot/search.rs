//! Free-text search: resolves a parsed query against the sports API.
//!
//! Lookups run in priority order and the first non-empty result wins:
//! teams, then leagues, then a text search over the day's fixtures.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

// Import localization
use crate::localization::{t_args_lang, t_lang};

use crate::catalog::DEFAULT_SPORT;
use crate::dialogue::{MenuEvent, MenuState};
use crate::query_parser::{DateFilter, FixtureType, ParsedQuery};
use crate::sports_api::{FixtureWindow, SportsApiClient};
use crate::sports_model::Fixture;

use super::ui_builder::{fixture_list_screen, league_list_screen, team_list_screen, Screen};

/// What to fetch once the first named team is found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamLookup {
    /// Meetings between the first two named teams
    HeadToHead,
    Fixtures(FixtureWindow),
    /// Just list the matching teams
    List,
}

/// Pick the team lookup for a query.
///
/// An explicit fixture type wins; two teams without one mean head-to-head;
/// a lone date filter selects that day.
pub fn plan_team_lookup(query: &ParsedQuery, today: NaiveDate) -> TeamLookup {
    match query.fixture_type {
        Some(FixtureType::Last) => TeamLookup::Fixtures(FixtureWindow::Last),
        Some(FixtureType::Next) => TeamLookup::Fixtures(FixtureWindow::Next),
        Some(FixtureType::Today) => TeamLookup::Fixtures(FixtureWindow::On(today)),
        Some(FixtureType::Live) => TeamLookup::Fixtures(FixtureWindow::Live),
        None if query.teams.len() >= 2 => TeamLookup::HeadToHead,
        None => match query.date_filter {
            Some(DateFilter::Live) => TeamLookup::Fixtures(FixtureWindow::Live),
            Some(filter) => TeamLookup::Fixtures(FixtureWindow::On(date_for(filter, today))),
            None => TeamLookup::List,
        },
    }
}

/// Calendar day a date filter refers to. `Live` maps to today.
pub fn date_for(filter: DateFilter, today: NaiveDate) -> NaiveDate {
    match filter {
        DateFilter::Today | DateFilter::Live => today,
        DateFilter::Tomorrow => today.succ_opt().unwrap_or(today),
        DateFilter::Yesterday => today.pred_opt().unwrap_or(today),
    }
}

/// Sport to search in: the parsed one, else the stored one, else football.
pub fn resolve_sport<'a>(query: &'a ParsedQuery, stored: Option<&'a str>) -> &'a str {
    query.sport.as_deref().or(stored).unwrap_or(DEFAULT_SPORT)
}

/// Text to look for in fixture team names
pub fn fixture_needle<'a>(query: &'a ParsedQuery, raw_text: &'a str) -> &'a str {
    query.match_query.as_deref().unwrap_or(raw_text)
}

/// Screen for the first non-empty result set, and the state it puts the chat in.
pub async fn run_search(
    client: &SportsApiClient,
    query: &ParsedQuery,
    raw_text: &str,
    sport: &str,
    language_code: Option<&str>,
) -> Option<(Screen, MenuState)> {
    let today = Utc::now().date_naive();
    let back = || MenuEvent::BackTo(MenuState::Start);

    if let Some(first) = query.teams.first() {
        let teams = client.search_teams(sport, first).await;
        debug!(sport, team = %first, found = teams.len(), "Team search");

        if let Some(team) = teams.first() {
            match plan_team_lookup(query, today) {
                TeamLookup::HeadToHead => {
                    let rivals = client.search_teams(sport, &query.teams[1]).await;
                    if let Some(rival) = rivals.first() {
                        let meetings = client.head_to_head(sport, team.id, rival.id).await;
                        if !meetings.is_empty() {
                            let title = t_args_lang(
                                "h2h-list-title",
                                &[("home", &team.name), ("away", &rival.name)],
                                language_code,
                            );
                            info!(sport, home = team.id, away = rival.id, "Head-to-head found");
                            return Some((
                                fixture_list_screen(&title, &meetings, Vec::new(), back(), language_code),
                                MenuState::MatchList,
                            ));
                        }
                    }
                    let title = t_lang("search-teams-title", language_code);
                    return Some((team_list_screen(&title, &teams, back(), language_code), MenuState::TeamList));
                }
                TeamLookup::Fixtures(window) => {
                    let fixtures = client.team_fixtures(sport, team.id, window).await;
                    if !fixtures.is_empty() {
                        let title = t_args_lang("team-fixtures-title", &[("team", &team.name)], language_code);
                        return Some((
                            fixture_list_screen(&title, &fixtures, Vec::new(), back(), language_code),
                            MenuState::MatchList,
                        ));
                    }
                }
                TeamLookup::List => {
                    let title = t_lang("search-teams-title", language_code);
                    return Some((team_list_screen(&title, &teams, back(), language_code), MenuState::TeamList));
                }
            }
        }
    }

    for name in &query.leagues {
        let leagues = client.search_leagues(sport, name).await;
        debug!(sport, league = %name, found = leagues.len(), "League search");
        if !leagues.is_empty() {
            let title = t_lang("search-leagues-title", language_code);
            return Some((league_list_screen(&title, &leagues, back(), language_code), MenuState::LeagueList));
        }
    }

    let fixtures = match query.date_filter {
        Some(DateFilter::Live) => client.live_fixtures(sport).await,
        filter => {
            let day = date_for(filter.unwrap_or(DateFilter::Today), today);
            client.fixtures_by_date(sport, day).await
        }
    };
    let matching = filter_fixtures(fixtures, fixture_needle(query, raw_text));
    if matching.is_empty() {
        return None;
    }
    let title = t_lang("search-fixtures-title", language_code);
    Some((
        fixture_list_screen(&title, &matching, Vec::new(), back(), language_code),
        MenuState::MatchList,
    ))
}

/// Words that describe a match rather than name a team
const STOP_WORDS: &[&str] = &[
    "vs", "the", "and", "match", "game", "today", "tomorrow", "yesterday", "live", "против", "матч", "игра",
    "сегодня", "завтра", "вчера",
];

/// Team-name fragments in a match description: `"Milan vs Inter"` → `["milan", "inter"]`.
/// Short words and stop words are dropped.
pub fn needle_tokens(needle: &str) -> Vec<String> {
    needle
        .split(|c: char| c.is_whitespace() || c == '-' || c == '–' || c == ',')
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|word| word.chars().count() >= 3 && !STOP_WORDS.contains(&word.as_str()))
        .collect()
}

/// Fixtures whose team names contain the most tokens of `needle`,
/// case-insensitively. Fixtures matching no token are dropped.
pub fn filter_fixtures(fixtures: Vec<Fixture>, needle: &str) -> Vec<Fixture> {
    let tokens = needle_tokens(needle);
    if tokens.is_empty() {
        return Vec::new();
    }
    let scored: Vec<(usize, Fixture)> = fixtures
        .into_iter()
        .map(|f| (tokens.iter().filter(|t| f.involves(t)).count(), f))
        .filter(|(hits, _)| *hits > 0)
        .collect();
    let best = scored.iter().map(|(hits, _)| *hits).max().unwrap_or(0);
    scored
        .into_iter()
        .filter(|(hits, _)| *hits == best)
        .map(|(_, f)| f)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sports_model::TeamRef;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn query(teams: &[&str]) -> ParsedQuery {
        ParsedQuery {
            teams: teams.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_two_teams_mean_head_to_head() {
        let today = day(2025, 3, 1);
        assert_eq!(plan_team_lookup(&query(&["Arsenal", "Chelsea"]), today), TeamLookup::HeadToHead);
        assert_eq!(plan_team_lookup(&query(&["Arsenal"]), today), TeamLookup::List);
    }

    #[test]
    fn test_fixture_type_overrides_head_to_head() {
        let mut q = query(&["Arsenal", "Chelsea"]);
        q.fixture_type = Some(FixtureType::Last);
        assert_eq!(
            plan_team_lookup(&q, day(2025, 3, 1)),
            TeamLookup::Fixtures(FixtureWindow::Last)
        );
    }

    #[test]
    fn test_date_filter_selects_day() {
        let mut q = query(&["Lakers"]);
        q.date_filter = Some(DateFilter::Tomorrow);
        assert_eq!(
            plan_team_lookup(&q, day(2024, 12, 31)),
            TeamLookup::Fixtures(FixtureWindow::On(day(2025, 1, 1)))
        );
        q.date_filter = Some(DateFilter::Live);
        assert_eq!(plan_team_lookup(&q, day(2024, 12, 31)), TeamLookup::Fixtures(FixtureWindow::Live));
    }

    #[test]
    fn test_date_for() {
        assert_eq!(date_for(DateFilter::Yesterday, day(2025, 3, 1)), day(2025, 2, 28));
        assert_eq!(date_for(DateFilter::Today, day(2025, 3, 1)), day(2025, 3, 1));
    }

    #[test]
    fn test_resolve_sport_order() {
        let mut q = ParsedQuery::default();
        assert_eq!(resolve_sport(&q, None), "football");
        assert_eq!(resolve_sport(&q, Some("basketball")), "basketball");
        q.sport = Some("tennis".into());
        assert_eq!(resolve_sport(&q, Some("basketball")), "tennis");
    }

    #[test]
    fn test_filter_fixtures_by_team_name() {
        let fixture = |home: &str, away: &str| Fixture {
            id: 1,
            date: "2025-03-01T20:00:00+00:00".into(),
            status: "NS".into(),
            league_id: None,
            league_name: String::new(),
            home: TeamRef { id: None, name: home.into() },
            away: TeamRef { id: None, name: away.into() },
            home_score: None,
            away_score: None,
        };
        let fixtures = vec![fixture("Arsenal", "Chelsea"), fixture("Milan", "Inter")];

        let found = filter_fixtures(fixtures.clone(), "chelsea");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].home.name, "Arsenal");
        assert!(filter_fixtures(fixtures, "   ").is_empty());
    }

    #[test]
    fn test_filter_fixtures_by_match_description() {
        let fixture = |home: &str, away: &str| Fixture {
            id: 1,
            date: "2025-03-01T20:00:00+00:00".into(),
            status: "NS".into(),
            league_id: None,
            league_name: String::new(),
            home: TeamRef { id: None, name: home.into() },
            away: TeamRef { id: None, name: away.into() },
            home_score: None,
            away_score: None,
        };
        let fixtures = vec![
            fixture("AC Milan", "Inter"),
            fixture("Inter Miami", "Orlando City"),
            fixture("Arsenal", "Chelsea"),
        ];

        for needle in ["Milan vs Inter", "Milan Inter today", "milan - inter"] {
            let found = filter_fixtures(fixtures.clone(), needle);
            assert_eq!(found.len(), 1, "needle: {needle}");
            assert_eq!(found[0].home.name, "AC Milan", "needle: {needle}");
        }
        assert!(filter_fixtures(fixtures, "vs today").is_empty());
    }

    #[test]
    fn test_needle_tokens() {
        assert_eq!(needle_tokens("Milan vs Inter"), vec!["milan", "inter"]);
        assert_eq!(needle_tokens("Спартак - ЦСКА сегодня"), vec!["спартак", "цска"]);
        assert_eq!(needle_tokens("PSG v. OM"), vec!["psg"]);
        assert!(needle_tokens("vs").is_empty());
    }

    #[test]
    fn test_fixture_needle_prefers_match_query() {
        let mut q = ParsedQuery::default();
        assert_eq!(fixture_needle(&q, "milan inter"), "milan inter");
        q.match_query = Some("Inter".into());
        assert_eq!(fixture_needle(&q, "milan inter"), "Inter");
    }
}
