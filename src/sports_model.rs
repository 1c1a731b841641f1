//! # Sports API Response Schemas
//!
//! API-Sports serves two shapes: the football v3 API nests each record
//! (`{"fixture": {...}, "teams": {...}, "goals": {...}}`) while the v1 APIs for
//! basketball, hockey and tennis are flat (`{"id", "date", "scores", ...}`).
//! Records are decoded defensively: anything that does not fit is skipped
//! instead of failing the whole response.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// A match normalized across the API shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub id: i64,
    /// ISO-8601 kickoff as sent by the API
    pub date: String,
    pub status: String,
    pub league_id: Option<i64>,
    pub league_name: String,
    pub home: TeamRef,
    pub away: TeamRef,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TeamRef {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct League {
    pub id: i64,
    pub name: String,
    pub country: Option<String>,
}

impl Fixture {
    pub fn from_value(value: &Value) -> Option<Self> {
        match serde_json::from_value::<FixtureRecord>(value.clone()) {
            Ok(FixtureRecord::Nested(f)) => Some(f.into()),
            Ok(FixtureRecord::Flat(g)) => Some(g.into()),
            Err(e) => {
                debug!(error = %e, "Skipping undecodable fixture record");
                None
            }
        }
    }

    /// `YYYY-MM-DD` part of the kickoff, or `?`.
    pub fn date_part(&self) -> &str {
        self.date.get(..10).unwrap_or("?")
    }

    /// `HH:MM` part of the kickoff, or `?`.
    pub fn time_part(&self) -> &str {
        self.date.get(11..16).unwrap_or("?")
    }

    /// `2–1`, or `?` when either side has no score yet.
    pub fn score(&self) -> String {
        match (self.home_score, self.away_score) {
            (Some(h), Some(a)) => format!("{h}–{a}"),
            _ => "?".to_string(),
        }
    }

    pub fn involves(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.home.name.to_lowercase().contains(&needle) || self.away.name.to_lowercase().contains(&needle)
    }
}

impl Team {
    pub fn from_value(value: &Value) -> Option<Self> {
        let entry: TeamRecord = serde_json::from_value(value.clone()).ok()?;
        let info = match entry {
            TeamRecord::Nested { team } => team,
            TeamRecord::Flat(info) => info,
        };
        Some(Team {
            id: info.id?,
            name: info.name,
            country: info.country.and_then(CountryField::into_name),
        })
    }
}

impl League {
    pub fn from_value(value: &Value) -> Option<Self> {
        let entry: LeagueRecord = serde_json::from_value(value.clone()).ok()?;
        let (info, country) = match entry {
            LeagueRecord::Nested { league, country } => (league, country.and_then(CountryField::into_name)),
            LeagueRecord::Flat(info) => {
                let country = info.country.clone().and_then(CountryField::into_name);
                (info, country)
            }
        };
        Some(League {
            id: info.id?,
            name: info.name,
            country,
        })
    }
}

/// Decode every record of a response with `decode`, dropping the misfits.
pub fn decode_all<T>(items: &[Value], decode: fn(&Value) -> Option<T>) -> Vec<T> {
    items.iter().filter_map(decode).collect()
}

/// The `form` string (`"WWDLW"`) of a football team statistics response.
pub fn form_from_statistics(items: &[Value]) -> Option<String> {
    items
        .first()
        .and_then(|stats| stats.get("form"))
        .and_then(Value::as_str)
        .filter(|form| !form.is_empty())
        .map(str::to_string)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FixtureRecord {
    Nested(NestedFixture),
    Flat(FlatGame),
}

#[derive(Deserialize)]
struct NestedFixture {
    fixture: FixtureInfo,
    #[serde(default)]
    league: LeagueInfo,
    teams: Sides,
    #[serde(default)]
    goals: Goals,
}

#[derive(Deserialize)]
struct FixtureInfo {
    id: i64,
    #[serde(default)]
    date: String,
    #[serde(default)]
    status: Status,
}

#[derive(Deserialize)]
struct FlatGame {
    id: i64,
    #[serde(default)]
    date: String,
    #[serde(default)]
    status: Status,
    #[serde(default)]
    league: LeagueInfo,
    teams: Sides,
    #[serde(default)]
    scores: Scores,
}

#[derive(Deserialize, Default)]
struct Status {
    #[serde(default)]
    short: Option<String>,
}

#[derive(Deserialize, Default, Clone)]
struct LeagueInfo {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    country: Option<CountryField>,
}

#[derive(Deserialize)]
struct Sides {
    home: TeamRef,
    away: TeamRef,
}

#[derive(Deserialize, Default)]
struct Goals {
    #[serde(default)]
    home: Option<i64>,
    #[serde(default)]
    away: Option<i64>,
}

#[derive(Deserialize, Default)]
struct Scores {
    #[serde(default)]
    home: Option<ScoreValue>,
    #[serde(default)]
    away: Option<ScoreValue>,
}

/// Hockey sends a plain number, basketball an object with a `total`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScoreValue {
    Plain(i64),
    Detailed {
        #[serde(default)]
        total: Option<i64>,
    },
}

impl ScoreValue {
    fn total(self) -> Option<i64> {
        match self {
            ScoreValue::Plain(n) => Some(n),
            ScoreValue::Detailed { total } => total,
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(untagged)]
enum CountryField {
    Name(String),
    Object {
        #[serde(default)]
        name: Option<String>,
    },
}

impl CountryField {
    fn into_name(self) -> Option<String> {
        match self {
            CountryField::Name(name) => Some(name),
            CountryField::Object { name } => name,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TeamRecord {
    Nested { team: TeamInfo },
    Flat(TeamInfo),
}

#[derive(Deserialize)]
struct TeamInfo {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    country: Option<CountryField>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LeagueRecord {
    Nested {
        league: LeagueInfo,
        #[serde(default)]
        country: Option<CountryField>,
    },
    Flat(LeagueInfo),
}

impl From<NestedFixture> for Fixture {
    fn from(f: NestedFixture) -> Self {
        Fixture {
            id: f.fixture.id,
            date: f.fixture.date,
            status: f.fixture.status.short.unwrap_or_else(|| "?".to_string()),
            league_id: f.league.id,
            league_name: f.league.name,
            home: f.teams.home,
            away: f.teams.away,
            home_score: f.goals.home,
            away_score: f.goals.away,
        }
    }
}

impl From<FlatGame> for Fixture {
    fn from(g: FlatGame) -> Self {
        Fixture {
            id: g.id,
            date: g.date,
            status: g.status.short.unwrap_or_else(|| "?".to_string()),
            league_id: g.league.id,
            league_name: g.league.name,
            home: g.teams.home,
            away: g.teams.away,
            home_score: g.scores.home.and_then(ScoreValue::total),
            away_score: g.scores.away.and_then(ScoreValue::total),
        }
    }
}
