//! Menu dialogue: states, the events encoded in inline-button callback data
//! and the transition table between them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Minimum length of a free-text search
pub const MIN_QUERY_LEN: usize = 3;
/// Maximum length of a free-text search sent to the parser
pub const MAX_QUERY_LEN: usize = 200;

/// Where the user is in the menu
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuState {
    /// Sport selection
    #[default]
    Start,
    /// Region selection
    SportChosen,
    /// Country selection
    RegionChosen,
    /// League selection
    CountryChosen,
    MatchList,
    TeamList,
    LeagueList,
    MatchDetail,
    About,
}

impl MenuState {
    /// Menu a generic "back" button leads to.
    pub fn parent(self) -> MenuState {
        match self {
            MenuState::Start | MenuState::SportChosen | MenuState::About => MenuState::Start,
            MenuState::RegionChosen => MenuState::SportChosen,
            MenuState::CountryChosen => MenuState::RegionChosen,
            MenuState::MatchList | MenuState::TeamList | MenuState::LeagueList | MenuState::MatchDetail => {
                MenuState::CountryChosen
            }
        }
    }
}

/// Inline-button press, parsed from callback data
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuEvent {
    SportSelected { sport: String },
    RegionSelected { region: String },
    CountrySelected { country: String },
    LeagueSelected { league_id: i64 },
    LeagueTeams { league_id: i64 },
    TeamSelected { team_id: i64 },
    MatchSelected { fixture_id: i64 },
    About,
    /// `back_to_*`: rebuild a specific menu
    BackTo(MenuState),
    /// Return to the parent of the current state
    Back,
    NoOp,
}

impl fmt::Display for MenuEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuEvent::SportSelected { sport } => write!(f, "sport_{sport}"),
            MenuEvent::RegionSelected { region } => write!(f, "region_{region}"),
            MenuEvent::CountrySelected { country } => write!(f, "country_{country}"),
            MenuEvent::LeagueSelected { league_id } => write!(f, "league_{league_id}"),
            MenuEvent::LeagueTeams { league_id } => write!(f, "teams_{league_id}"),
            MenuEvent::TeamSelected { team_id } => write!(f, "team_{team_id}"),
            MenuEvent::MatchSelected { fixture_id } => write!(f, "match_{fixture_id}"),
            MenuEvent::About => f.write_str("about_bot"),
            MenuEvent::BackTo(MenuState::SportChosen) => f.write_str("back_to_sport"),
            MenuEvent::BackTo(MenuState::RegionChosen) => f.write_str("back_to_region"),
            MenuEvent::BackTo(MenuState::CountryChosen) => f.write_str("back_to_country"),
            MenuEvent::BackTo(_) => f.write_str("back_to_start"),
            MenuEvent::Back => f.write_str("back"),
            MenuEvent::NoOp => f.write_str("noop"),
        }
    }
}

impl FromStr for MenuEvent {
    type Err = std::convert::Infallible;

    /// Unknown data parses as [`MenuEvent::NoOp`].
    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let event = match data {
            "about_bot" => MenuEvent::About,
            "back" => MenuEvent::Back,
            "back_to_start" => MenuEvent::BackTo(MenuState::Start),
            "back_to_sport" => MenuEvent::BackTo(MenuState::SportChosen),
            "back_to_region" => MenuEvent::BackTo(MenuState::RegionChosen),
            "back_to_country" => MenuEvent::BackTo(MenuState::CountryChosen),
            _ => match data.split_once('_') {
                Some(("sport", sport)) if !sport.is_empty() => MenuEvent::SportSelected {
                    sport: sport.to_string(),
                },
                Some(("region", region)) if !region.is_empty() => MenuEvent::RegionSelected {
                    region: region.to_string(),
                },
                Some(("country", country)) if !country.is_empty() => MenuEvent::CountrySelected {
                    country: country.to_string(),
                },
                Some(("league", id)) => id.parse().map_or(MenuEvent::NoOp, |league_id| MenuEvent::LeagueSelected { league_id }),
                Some(("teams", id)) => id.parse().map_or(MenuEvent::NoOp, |league_id| MenuEvent::LeagueTeams { league_id }),
                Some(("team", id)) => id.parse().map_or(MenuEvent::NoOp, |team_id| MenuEvent::TeamSelected { team_id }),
                Some(("match", id)) => id.parse().map_or(MenuEvent::NoOp, |fixture_id| MenuEvent::MatchSelected { fixture_id }),
                _ => MenuEvent::NoOp,
            },
        };
        Ok(event)
    }
}

/// Work a transition asks the handler to do
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    ShowSports,
    /// Store the sport, then show regions
    ChooseSport(String),
    /// Store the region, then show its countries
    ChooseRegion(String),
    /// Store the country, then fetch and show its leagues
    ChooseCountry(String),
    /// Store the league, then show its upcoming fixtures
    ChooseLeague(i64),
    ShowRegions,
    ShowCountries,
    ShowLeagues,
    ShowLeagueTeams(i64),
    ShowTeamFixtures(i64),
    ShowMatch(i64),
    ShowAbout,
    Ignore,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub next: MenuState,
    pub effect: Effect,
}

impl Transition {
    fn to(next: MenuState, effect: Effect) -> Self {
        Self { next, effect }
    }
}

/// Transition table. Buttons of older messages stay clickable, so every
/// event is accepted in every state; only `Back` depends on where the user is.
pub fn transition(from: MenuState, event: &MenuEvent) -> Transition {
    match event {
        MenuEvent::SportSelected { sport } => Transition::to(MenuState::SportChosen, Effect::ChooseSport(sport.clone())),
        MenuEvent::RegionSelected { region } => {
            Transition::to(MenuState::RegionChosen, Effect::ChooseRegion(region.clone()))
        }
        MenuEvent::CountrySelected { country } => {
            Transition::to(MenuState::CountryChosen, Effect::ChooseCountry(country.clone()))
        }
        MenuEvent::LeagueSelected { league_id } => Transition::to(MenuState::MatchList, Effect::ChooseLeague(*league_id)),
        MenuEvent::LeagueTeams { league_id } => Transition::to(MenuState::TeamList, Effect::ShowLeagueTeams(*league_id)),
        MenuEvent::TeamSelected { team_id } => Transition::to(MenuState::MatchList, Effect::ShowTeamFixtures(*team_id)),
        MenuEvent::MatchSelected { fixture_id } => Transition::to(MenuState::MatchDetail, Effect::ShowMatch(*fixture_id)),
        MenuEvent::About => Transition::to(from, Effect::ShowAbout),
        MenuEvent::BackTo(target) => back_to(*target),
        MenuEvent::Back => back_to(from.parent()),
        MenuEvent::NoOp => Transition::to(from, Effect::Ignore),
    }
}

fn back_to(target: MenuState) -> Transition {
    match target {
        MenuState::SportChosen => Transition::to(MenuState::SportChosen, Effect::ShowRegions),
        MenuState::RegionChosen => Transition::to(MenuState::RegionChosen, Effect::ShowCountries),
        MenuState::CountryChosen => Transition::to(MenuState::CountryChosen, Effect::ShowLeagues),
        _ => Transition::to(MenuState::Start, Effect::ShowSports),
    }
}

/// Validates free-text search input, returning the trimmed query
pub fn validate_search_query(text: &str) -> Result<String, &'static str> {
    let trimmed = text.trim();

    if trimmed.chars().count() < MIN_QUERY_LEN {
        return Err("too_short");
    }

    if trimmed.chars().count() > MAX_QUERY_LEN {
        return Err("too_long");
    }

    Ok(trimmed.to_string())
}
