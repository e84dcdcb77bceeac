//! football-data.org v4 wire types: serde shapes for the competition
//! standings and matches endpoints. Mapped into the season document types in
//! client.rs.
use crate::{MatchStatus, ScoreLine, Winner};
use chrono::{DateTime, Utc};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Standings  (/v4/competitions/{code}/standings?season=YYYY)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct StandingsResponse {
    pub competition: Option<FdCompetition>,
    #[serde(default)]
    pub standings: Vec<FdStanding>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct FdCompetition {
    pub id: Option<u32>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub emblem: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct FdStanding {
    /// TOTAL, HOME or AWAY.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub table: Vec<FdTableRow>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct FdTableRow {
    pub position: u32,
    pub team: FdTeam,
    pub played_games: u32,
    pub won: u32,
    pub draw: u32,
    pub lost: u32,
    pub points: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: Option<i32>,
    pub form: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct FdTeam {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub tla: Option<String>,
    pub crest: Option<String>,
}

impl FdTeam {
    /// Provider id when present, else the best textual identifier.
    pub fn identifier(&self) -> String {
        self.id
            .map(|id| id.to_string())
            .or_else(|| self.tla.clone())
            .or_else(|| self.short_name.clone())
            .or_else(|| self.name.clone())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Matches  (/v4/competitions/{code}/matches?season=YYYY)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct MatchesResponse {
    #[serde(default)]
    pub matches: Vec<FdMatch>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct FdMatch {
    pub id: u64,
    pub utc_date: Option<DateTime<Utc>>,
    pub status: MatchStatus,
    pub matchday: Option<u32>,
    pub stage: Option<String>,
    pub home_team: FdTeam,
    pub away_team: FdTeam,
    pub score: FdScore,
    pub venue: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct FdScore {
    pub winner: Option<Winner>,
    pub full_time: Option<ScoreLine>,
    pub half_time: Option<ScoreLine>,
}
