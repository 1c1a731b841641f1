//! Dialogue Manager module: carries out the effect of a menu transition.
//!
//! Effects that pick something write it to the preference store first
//! (read-modify-write of the whole record). Menus reached by going back are
//! rebuilt from whatever the store holds now.

use teloxide::types::ChatId;
use tracing::{debug, info, warn};

// Import localization
use crate::localization::{t_args_lang, t_lang};

// Import database functions
use crate::db::{get_user_preference, save_user_preference, UserPreference};

use crate::catalog::{self, DEFAULT_SPORT};
use crate::dialogue::{Effect, MenuEvent};
use crate::prognosis::simple_prognosis;
use crate::sports_api::FixtureWindow;

use super::context::AppContext;
use super::ui_builder::{
    countries_screen, fixture_list_screen, league_fixtures_screen, leagues_screen, match_not_found_screen,
    match_screen, regions_screen, start_screen, team_list_screen, welcome_text, Screen,
};

/// Screen to show for `effect`, or `None` when the current message stays as is.
///
/// [`Effect::ShowAbout`] is not a screen: the about text goes out as a
/// separate transient message, so it yields `None` here as well.
pub async fn render_effect(
    ctx: &AppContext,
    chat_id: ChatId,
    effect: &Effect,
    language_code: Option<&str>,
) -> Option<Screen> {
    let screen = match effect {
        Effect::Ignore | Effect::ShowAbout => return None,
        Effect::ShowSports => start_screen(welcome_text(language_code), language_code),
        Effect::ChooseSport(sport) => {
            let mut pref = get_user_preference(&ctx.pool, chat_id.0).await;
            pref.sport = Some(sport.clone());
            save_user_preference(&ctx.pool, &pref).await;
            info!(chat_id = %chat_id, sport = %sport, "Sport selected");
            regions_screen(sport, language_code)
        }
        Effect::ChooseRegion(region) => {
            let mut pref = get_user_preference(&ctx.pool, chat_id.0).await;
            if !catalog::is_region(region) {
                warn!(chat_id = %chat_id, region = %region, "Unknown region in callback data");
                return Some(regions_screen(sport_of(&pref), language_code));
            }
            pref.region = Some(region.clone());
            save_user_preference(&ctx.pool, &pref).await;
            info!(chat_id = %chat_id, region = %region, "Region selected");
            countries_screen(region, language_code)
        }
        Effect::ChooseCountry(country) => {
            let mut pref = get_user_preference(&ctx.pool, chat_id.0).await;
            pref.country = Some(country.clone());
            save_user_preference(&ctx.pool, &pref).await;
            info!(chat_id = %chat_id, country = %country, "Country selected");
            let leagues = ctx.sports.leagues_by_country(sport_of(&pref), country).await;
            leagues_screen(country, &leagues, language_code)
        }
        Effect::ChooseLeague(league_id) => {
            let mut pref = get_user_preference(&ctx.pool, chat_id.0).await;
            pref.league_id = Some(league_id.to_string());
            save_user_preference(&ctx.pool, &pref).await;
            info!(chat_id = %chat_id, league_id, "League selected");
            let fixtures = ctx.sports.league_fixtures(sport_of(&pref), *league_id).await;
            league_fixtures_screen(*league_id, &fixtures, language_code)
        }
        Effect::ShowRegions => {
            let pref = get_user_preference(&ctx.pool, chat_id.0).await;
            regions_screen(sport_of(&pref), language_code)
        }
        Effect::ShowCountries => {
            let pref = get_user_preference(&ctx.pool, chat_id.0).await;
            match &pref.region {
                Some(region) => countries_screen(region, language_code),
                None => regions_screen(sport_of(&pref), language_code),
            }
        }
        Effect::ShowLeagues => {
            let pref = get_user_preference(&ctx.pool, chat_id.0).await;
            match (&pref.country, &pref.region) {
                (Some(country), _) => {
                    let leagues = ctx.sports.leagues_by_country(sport_of(&pref), country).await;
                    leagues_screen(country, &leagues, language_code)
                }
                (None, Some(region)) => countries_screen(region, language_code),
                (None, None) => regions_screen(sport_of(&pref), language_code),
            }
        }
        Effect::ShowLeagueTeams(league_id) => {
            let pref = get_user_preference(&ctx.pool, chat_id.0).await;
            let teams = ctx.sports.league_teams(sport_of(&pref), *league_id).await;
            team_list_screen(
                &t_lang("league-teams-title", language_code),
                &teams,
                MenuEvent::LeagueSelected { league_id: *league_id },
                language_code,
            )
        }
        Effect::ShowTeamFixtures(team_id) => {
            let pref = get_user_preference(&ctx.pool, chat_id.0).await;
            let sport = sport_of(&pref);
            let mut fixtures = ctx.sports.team_fixtures(sport, *team_id, FixtureWindow::Next).await;
            if fixtures.is_empty() {
                debug!(chat_id = %chat_id, team_id, "No upcoming fixtures, showing recent ones");
                fixtures = ctx.sports.team_fixtures(sport, *team_id, FixtureWindow::Last).await;
            }
            let team_name = fixtures
                .iter()
                .flat_map(|f| [&f.home, &f.away])
                .find(|t| t.id == Some(*team_id))
                .map(|t| t.name.clone())
                .unwrap_or_else(|| format!("#{team_id}"));
            let title = t_args_lang("team-fixtures-title", &[("team", &team_name)], language_code);
            fixture_list_screen(&title, &fixtures, Vec::new(), MenuEvent::Back, language_code)
        }
        Effect::ShowMatch(fixture_id) => {
            let pref = get_user_preference(&ctx.pool, chat_id.0).await;
            let sport = sport_of(&pref);
            match ctx.sports.fixture_by_id(sport, *fixture_id).await {
                Some(fixture) => {
                    let prognosis = simple_prognosis(&ctx.sports, sport, &fixture, language_code).await;
                    match_screen(&fixture, sport, &prognosis, language_code)
                }
                None => match_not_found_screen(language_code),
            }
        }
    };
    Some(screen)
}

/// Stored sport, or the default one.
pub fn sport_of(pref: &UserPreference) -> &str {
    pref.sport.as_deref().unwrap_or(DEFAULT_SPORT)
}
