//! # Sports Data Client
//!
//! Thin client over the API-Sports REST endpoints. Every sport has its own
//! base URL (see [`crate::catalog`]); all requests are `GET`s authenticated
//! with the `x-apisports-key` header and answered with a JSON body whose
//! `response` field holds the records.

use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::catalog;
use crate::sports_model::{decode_all, form_from_statistics, Fixture, League, Team};

/// Number of fixtures requested for "last"/"next" lookups
pub const FIXTURE_WINDOW: u32 = 5;

#[derive(Debug, Error)]
pub enum SportsApiError {
    #[error("API returned status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Which fixtures of a team to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureWindow {
    /// Most recent finished matches
    Last,
    /// Upcoming matches
    Next,
    /// Matches on a given day
    On(NaiveDate),
    /// Matches in progress
    Live,
}

#[derive(Debug, Clone)]
pub struct SportsApiClient {
    http: Client,
    api_key: String,
    base_url_override: Option<String>,
}

impl SportsApiClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pulseforge/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url_override: None,
        })
    }

    /// Send every known sport to `base_url` instead of API-Sports.
    pub fn with_base_url_override(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    fn base_url(&self, sport: &str) -> Option<String> {
        let base = catalog::base_url(sport)?;
        Some(self.base_url_override.clone().unwrap_or_else(|| base.to_string()))
    }

    /// Issue `GET {base}{endpoint}?params` for `sport`.
    ///
    /// An unknown sport yields `Ok` with no records. A `response` object (as
    /// sent by `teams/statistics`) comes back as a single record.
    pub async fn request(
        &self,
        sport: &str,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<Value>, SportsApiError> {
        let Some(base) = self.base_url(sport) else {
            warn!(sport, "No API for sport");
            return Ok(Vec::new());
        };

        let url = format!("{base}{endpoint}");
        debug!(%url, ?params, "Sports API request");

        let response = self
            .http
            .get(&url)
            .query(params)
            .header("x-apisports-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(SportsApiError::Status { status, body });
        }

        let json: Value = serde_json::from_str(&body)?;
        Ok(match json.get("response") {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::Object(_)) => vec![json["response"].clone()],
            _ => Vec::new(),
        })
    }

    /// [`Self::request`] with failures logged and turned into "no records".
    pub async fn request_or_empty(&self, sport: &str, endpoint: &str, params: &[(&str, String)]) -> Vec<Value> {
        match self.request(sport, endpoint, params).await {
            Ok(items) => items,
            Err(e) => {
                error!(sport, endpoint, error = %e, "Sports API request failed");
                Vec::new()
            }
        }
    }

    pub async fn search_teams(&self, sport: &str, name: &str) -> Vec<Team> {
        let items = self
            .request_or_empty(sport, "teams", &[("search", name.to_string())])
            .await;
        decode_all(&items, Team::from_value)
    }

    pub async fn team_fixtures(&self, sport: &str, team_id: i64, window: FixtureWindow) -> Vec<Fixture> {
        let endpoint = fixtures_endpoint(sport);
        let mut params = vec![("team", team_id.to_string())];
        match window {
            FixtureWindow::Last => {
                params.push(("last", FIXTURE_WINDOW.to_string()));
                params.push(("status", "FT".to_string()));
            }
            FixtureWindow::Next => params.push(("next", FIXTURE_WINDOW.to_string())),
            FixtureWindow::On(date) => params.push(("date", date.format("%Y-%m-%d").to_string())),
            FixtureWindow::Live => {
                let live = self.live_fixtures(sport).await;
                return live
                    .into_iter()
                    .filter(|f| f.home.id == Some(team_id) || f.away.id == Some(team_id))
                    .collect();
            }
        }
        if sport != "football" && !matches!(window, FixtureWindow::On(_)) {
            // v1 APIs have no last/next; a season scan stands in for them.
            params.retain(|(k, _)| *k == "team");
            params.push(("season", current_season(sport).to_string()));
        }
        let items = self.request_or_empty(sport, endpoint, &params).await;
        let mut fixtures = decode_all(&items, Fixture::from_value);
        if sport != "football" {
            trim_window(&mut fixtures, window);
        }
        fixtures
    }

    pub async fn search_leagues(&self, sport: &str, name: &str) -> Vec<League> {
        let items = self
            .request_or_empty(sport, "leagues", &[("search", name.to_string())])
            .await;
        decode_all(&items, League::from_value)
    }

    pub async fn leagues_by_country(&self, sport: &str, country: &str) -> Vec<League> {
        let items = self
            .request_or_empty(sport, "leagues", &[("country", country.to_string())])
            .await;
        decode_all(&items, League::from_value)
    }

    pub async fn league_fixtures(&self, sport: &str, league_id: i64) -> Vec<Fixture> {
        let params = if sport == "football" {
            vec![
                ("league", league_id.to_string()),
                ("season", current_season(sport).to_string()),
                ("next", FIXTURE_WINDOW.to_string()),
            ]
        } else {
            vec![
                ("league", league_id.to_string()),
                ("date", Utc::now().date_naive().format("%Y-%m-%d").to_string()),
            ]
        };
        let items = self.request_or_empty(sport, fixtures_endpoint(sport), &params).await;
        decode_all(&items, Fixture::from_value)
    }

    pub async fn league_teams(&self, sport: &str, league_id: i64) -> Vec<Team> {
        let items = self
            .request_or_empty(
                sport,
                "teams",
                &[
                    ("league", league_id.to_string()),
                    ("season", current_season(sport).to_string()),
                ],
            )
            .await;
        decode_all(&items, Team::from_value)
    }

    pub async fn fixtures_by_date(&self, sport: &str, date: NaiveDate) -> Vec<Fixture> {
        let items = self
            .request_or_empty(sport, fixtures_endpoint(sport), &[("date", date.format("%Y-%m-%d").to_string())])
            .await;
        decode_all(&items, Fixture::from_value)
    }

    pub async fn live_fixtures(&self, sport: &str) -> Vec<Fixture> {
        let items = self
            .request_or_empty(sport, fixtures_endpoint(sport), &[("live", "all".to_string())])
            .await;
        decode_all(&items, Fixture::from_value)
    }

    pub async fn fixture_by_id(&self, sport: &str, fixture_id: i64) -> Option<Fixture> {
        let items = self
            .request_or_empty(sport, fixtures_endpoint(sport), &[("id", fixture_id.to_string())])
            .await;
        decode_all(&items, Fixture::from_value).into_iter().next()
    }

    pub async fn head_to_head(&self, sport: &str, home_id: i64, away_id: i64) -> Vec<Fixture> {
        let endpoint = if sport == "football" { "fixtures/headtohead" } else { "games/h2h" };
        let items = self
            .request_or_empty(
                sport,
                endpoint,
                &[
                    ("h2h", format!("{home_id}-{away_id}")),
                    ("last", FIXTURE_WINDOW.to_string()),
                ],
            )
            .await;
        decode_all(&items, Fixture::from_value)
    }

    /// Recent form (`"WWDLW"`) of a team in a league; football only.
    pub async fn team_form(&self, sport: &str, team_id: i64, league_id: i64) -> Option<String> {
        if sport != "football" {
            return None;
        }
        let items = self
            .request_or_empty(
                sport,
                "teams/statistics",
                &[
                    ("team", team_id.to_string()),
                    ("league", league_id.to_string()),
                    ("season", current_season(sport).to_string()),
                ],
            )
            .await;
        form_from_statistics(&items)
    }
}

/// Football calls matches "fixtures", the v1 APIs call them "games".
pub fn fixtures_endpoint(sport: &str) -> &'static str {
    if sport == "football" {
        "fixtures"
    } else {
        "games"
    }
}

/// Season year the API files current matches under.
///
/// Football and hockey seasons straddle the new year and are named after the
/// year they start in (July onwards); the other sports use the calendar year.
pub fn season_for(sport: &str, today: NaiveDate) -> i32 {
    match sport {
        "football" | "ice-hockey" | "basketball" if today.month() < 7 => today.year() - 1,
        _ => today.year(),
    }
}

fn current_season(sport: &str) -> i32 {
    season_for(sport, Utc::now().date_naive())
}

fn trim_window(fixtures: &mut Vec<Fixture>, window: FixtureWindow) {
    let now = Utc::now();
    let kickoff = |f: &Fixture| DateTime::parse_from_rfc3339(&f.date).ok().map(|d| d.with_timezone(&Utc));
    match window {
        FixtureWindow::Last => {
            fixtures.retain(|f| f.status != "NS" && kickoff(f).is_some_and(|d| d < now));
            fixtures.sort_by_key(|f| std::cmp::Reverse(kickoff(f)));
        }
        FixtureWindow::Next => {
            fixtures.retain(|f| kickoff(f).is_some_and(|d| d >= now));
            fixtures.sort_by_key(kickoff);
        }
        FixtureWindow::On(_) | FixtureWindow::Live => {}
    }
    fixtures.truncate(FIXTURE_WINDOW as usize);
}
