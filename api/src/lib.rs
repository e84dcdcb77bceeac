pub mod client;
pub mod crest;
pub mod fetch;
pub mod football_data;
pub mod loader;
pub mod names;
pub mod reference;
pub mod standings;
pub mod storage;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Seasons
// ---------------------------------------------------------------------------

/// Seasons offered by the viewer, newest first.
pub const SEASONS: [&str; 10] = [
    "2025-2026",
    "2024-2025",
    "2023-2024",
    "2022-2023",
    "2021-2022",
    "2020-2021",
    "2019-2020",
    "2018-2019",
    "2017-2018",
    "2016-2017",
];

pub const CURRENT_SEASON: &str = "2025-2026";

/// `2024` -> `"2024-2025"`.
pub fn season_label(start_year: i32) -> String {
    format!("{}-{}", start_year, start_year + 1)
}

/// Start year of a `"YYYY-YYYY"` label. Rejects labels whose years are not consecutive.
pub fn parse_season_start(label: &str) -> Option<i32> {
    let (start, end) = label.split_once('-')?;
    if start.len() != 4 || end.len() != 4 {
        return None;
    }
    let start: i32 = start.parse().ok()?;
    let end: i32 = end.parse().ok()?;
    (end == start + 1).then_some(start)
}

/// The season that can still change day to day. LaLiga seasons kick off in
/// August, so before August the active season started last year.
pub fn active_season_start(now: DateTime<Utc>) -> i32 {
    if now.month() >= 8 { now.year() } else { now.year() - 1 }
}

// ---------------------------------------------------------------------------
// Domain types, also the on-disk and remote season document format
// ---------------------------------------------------------------------------

/// One team's cumulative record for a season.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamStanding {
    pub team_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tla: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crest: Option<String>,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_difference: Option<i32>,
    pub points: u32,
    pub position: u32,
    #[serde(alias = "recentForm", skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
    /// Synthesized to fill an incomplete table, not sourced from the API.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub placeholder: bool,
}

impl TeamStanding {
    /// Zero-stat synthetic row.
    pub fn placeholder(team_id: &str, name: &str) -> Self {
        Self {
            team_id: team_id.to_owned(),
            name: name.to_owned(),
            placeholder: true,
            ..Default::default()
        }
    }

    /// Goal difference as reported by the source, derived when absent.
    pub fn goal_difference(&self) -> i32 {
        self.goal_difference
            .unwrap_or_else(|| self.computed_goal_difference())
    }

    pub fn computed_goal_difference(&self) -> i32 {
        self.goals_for as i32 - self.goals_against as i32
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Timed,
    InPlay,
    Paused,
    Finished,
    Suspended,
    Postponed,
    Cancelled,
    Awarded,
    #[serde(other)]
    Unknown,
}

impl MatchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled | MatchStatus::Timed => "Scheduled",
            MatchStatus::InPlay => "Live",
            MatchStatus::Paused => "HT",
            MatchStatus::Finished => "FT",
            MatchStatus::Suspended => "Susp",
            MatchStatus::Postponed => "PPD",
            MatchStatus::Cancelled => "Canc",
            MatchStatus::Awarded => "Awd",
            MatchStatus::Unknown => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Winner {
    HomeTeam,
    AwayTeam,
    Draw,
}

/// Goal counts for one period; both sides are `None` before kickoff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreLine {
    pub home: Option<u32>,
    pub away: Option<u32>,
}

impl ScoreLine {
    pub fn pair(&self) -> Option<(u32, u32)> {
        self.home.zip(self.away)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub full_time: ScoreLine,
    pub half_time: ScoreLine,
    pub winner: Option<Winner>,
}

// Older season files store `score` as a flat `{home, away}` pair or `null`.
impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Detailed {
                #[serde(rename = "fullTime")]
                full_time: ScoreLine,
                #[serde(rename = "halfTime", default)]
                half_time: ScoreLine,
                #[serde(default)]
                winner: Option<Winner>,
            },
            Flat {
                home: Option<u32>,
                away: Option<u32>,
            },
        }

        Ok(match Option::<Wire>::deserialize(deserializer)? {
            Some(Wire::Detailed { full_time, half_time, winner }) => Score {
                full_time,
                half_time,
                winner,
            },
            Some(Wire::Flat { home, away }) => Score {
                full_time: ScoreLine { home, away },
                ..Default::default()
            },
            None => Score::default(),
        })
    }
}

/// Outcome of a played match from one team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormResult {
    Win,
    Draw,
    Loss,
}

impl FormResult {
    pub fn symbol(&self) -> char {
        match self {
            FormResult::Win => 'W',
            FormResult::Draw => 'D',
            FormResult::Loss => 'L',
        }
    }
}

/// One fixture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Match {
    pub id: String,
    pub season: String,
    pub utc_date: Option<DateTime<Utc>>,
    pub matchday: u32,
    pub status: MatchStatus,
    pub stage: Option<String>,
    pub home_team_id: Option<String>,
    pub away_team_id: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub score: Score,
    pub venue: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Match {
    pub fn involves(&self, team_id: &str) -> bool {
        self.is_home(team_id) || self.away_team_id.as_deref() == Some(team_id)
    }

    fn is_home(&self, team_id: &str) -> bool {
        self.home_team_id.as_deref() == Some(team_id)
    }

    /// `(goals for, goals against)` at full time, `None` until played.
    pub fn goals_for_against(&self, team_id: &str) -> Option<(u32, u32)> {
        if !self.involves(team_id) {
            return None;
        }
        let (home, away) = self.score.full_time.pair()?;
        Some(if self.is_home(team_id) { (home, away) } else { (away, home) })
    }

    pub fn result_for(&self, team_id: &str) -> Option<FormResult> {
        let (gf, ga) = self.goals_for_against(team_id)?;
        Some(match gf.cmp(&ga) {
            std::cmp::Ordering::Greater => FormResult::Win,
            std::cmp::Ordering::Equal => FormResult::Draw,
            std::cmp::Ordering::Less => FormResult::Loss,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Competition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emblem: Option<String>,
}

/// No source populates injuries yet; kept so documents round-trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Injury {
    pub id: String,
    pub team_id: String,
    pub player: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub expected_return: Option<String>,
    pub season: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalsTrendPoint {
    pub matchday: u32,
    pub goals_for: u32,
    pub goals_against: u32,
}

/// Everything known about one season. The loader hands these out behind an
/// `Arc` and never mutates them afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeasonSnapshot {
    pub season: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competition: Option<Competition>,
    /// Kept verbatim: compared as a string against the manifest.
    pub generated_at: String,
    pub source: String,
    pub table: Vec<TeamStanding>,
    pub matches: Vec<Match>,
    pub injuries: Vec<Injury>,
}

impl SeasonSnapshot {
    pub fn team(&self, team_id: &str) -> Option<&TeamStanding> {
        self.table.iter().find(|t| t.team_id == team_id)
    }

    /// Matches involving the team, by matchday.
    pub fn team_matches(&self, team_id: &str) -> Vec<&Match> {
        let mut matches: Vec<&Match> =
            self.matches.iter().filter(|m| m.involves(team_id)).collect();
        matches.sort_by_key(|m| m.matchday);
        matches
    }

    /// Results of the team's last `n` played matches, oldest first.
    pub fn recent_form(&self, team_id: &str, n: usize) -> Vec<FormResult> {
        let results: Vec<FormResult> = self
            .team_matches(team_id)
            .into_iter()
            .filter_map(|m| m.result_for(team_id))
            .collect();
        let skip = results.len().saturating_sub(n);
        results.into_iter().skip(skip).collect()
    }

    pub fn goals_trend(&self, team_id: &str) -> Vec<GoalsTrendPoint> {
        self.team_matches(team_id)
            .into_iter()
            .filter_map(|m| {
                let (goals_for, goals_against) = m.goals_for_against(team_id)?;
                Some(GoalsTrendPoint { matchday: m.matchday, goals_for, goals_against })
            })
            .collect()
    }
}

/// Per-season staleness marker published next to the season documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub generated_at: String,
    pub hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub seasons: BTreeMap<String, ManifestEntry>,
}
