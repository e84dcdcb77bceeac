use crate::football_data::{FdMatch, FdTableRow, MatchesResponse, StandingsResponse};
use crate::{Competition, Manifest, Match, Score, SeasonSnapshot, TeamStanding, season_label};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const USER_AGENT: &str = "ligatui/0.2 (terminal standings viewer)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const FOOTBALL_DATA_V4: &str = "https://api.football-data.org/v4";
pub const COMPETITION_CODE: &str = "PD";
pub const FOOTBALL_DATA_SOURCE: &str = "football-data.org";
const AUTH_HEADER: &str = "X-Auth-Token";

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

fn http_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_default()
}

fn is_remote(base: &str) -> bool {
    base.starts_with("http://") || base.starts_with("https://")
}

/// `<base>data/<file>`, tolerating a base without a trailing slash.
pub fn data_url(base: &str, file: &str) -> String {
    if base.is_empty() {
        format!("data/{file}")
    } else if base.ends_with('/') {
        format!("{base}data/{file}")
    } else {
        format!("{base}/data/{file}")
    }
}

pub fn season_file(label: &str) -> String {
    format!("{label}.json")
}

/// Send a request and decode its JSON body. 404s map to `NotFound`.
async fn send_json<T: DeserializeOwned>(request: RequestBuilder, url: &str) -> ApiResult<T> {
    let response = request
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await
        .map_err(|e| ApiError::Network(e, url.to_owned()))?;

    match response.error_for_status() {
        Ok(res) => res
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned())),
        Err(e) if e.status() == Some(StatusCode::NOT_FOUND) => Err(ApiError::NotFound(url.to_owned())),
        Err(e) => Err(ApiError::Api(e, url.to_owned())),
    }
}

// ---------------------------------------------------------------------------
// Published season data (what the fetcher writes)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum DataSource {
    Remote(String),
    Local(PathBuf),
}

/// Reads season documents and the manifest, either over HTTP or straight from
/// the directory the fetcher writes to.
#[derive(Debug, Clone)]
pub struct DataClient {
    client: Client,
    source: DataSource,
}

impl DataClient {
    /// Bases that are not `http(s)://` URLs are treated as local directories.
    pub fn new(base_url: &str) -> Self {
        let source = if is_remote(base_url) {
            DataSource::Remote(base_url.to_owned())
        } else {
            DataSource::Local(PathBuf::from(base_url).join("data"))
        };
        Self { client: http_client(), source }
    }

    pub fn is_local(&self) -> bool {
        matches!(self.source, DataSource::Local(_))
    }

    pub async fn fetch_manifest(&self) -> ApiResult<Manifest> {
        self.get(MANIFEST_FILE, None).await
    }

    /// Fetch one season document. `hash` is appended as `?v=` so HTTP caches
    /// see a new URL whenever the published file changes.
    pub async fn fetch_season(&self, label: &str, hash: Option<&str>) -> ApiResult<SeasonSnapshot> {
        self.get(&season_file(label), hash).await
    }

    async fn get<T: DeserializeOwned>(&self, file: &str, version: Option<&str>) -> ApiResult<T> {
        match &self.source {
            DataSource::Remote(base) => {
                let url = match version {
                    Some(v) => format!("{}?v={v}", data_url(base, file)),
                    None => data_url(base, file),
                };
                send_json(self.client.get(&url), &url).await
            }
            DataSource::Local(dir) => {
                let path = dir.join(file);
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| ApiError::NotFound(format!("could not read {}: {e}", path.display())))?;
                serde_json::from_str(&content)
                    .map_err(|e| ApiError::Other(format!("invalid json at {}: {e}", path.display())))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// football-data.org
// ---------------------------------------------------------------------------

/// football-data.org v4 client used by the season fetcher.
#[derive(Debug, Clone)]
pub struct FootballDataApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl FootballDataApi {
    pub fn new(token: Option<String>) -> Self {
        Self::with_base_url(FOOTBALL_DATA_V4, token)
    }

    pub fn with_base_url(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            token,
        }
    }

    pub async fn fetch_standings(&self, season_start: i32) -> ApiResult<StandingsResponse> {
        self.get("standings", season_start).await
    }

    pub async fn fetch_matches(&self, season_start: i32) -> ApiResult<MatchesResponse> {
        self.get("matches", season_start).await
    }

    /// Standings and matches for one season, fetched concurrently and mapped
    /// into a season document stamped with `generated_at`.
    pub async fn fetch_season(&self, season_start: i32, generated_at: DateTime<Utc>) -> ApiResult<SeasonSnapshot> {
        let (standings, matches) = futures_util::future::try_join(
            self.fetch_standings(season_start),
            self.fetch_matches(season_start),
        )
        .await?;
        Ok(map_season(season_start, standings, matches, generated_at))
    }

    async fn get<T: DeserializeOwned>(&self, resource: &str, season_start: i32) -> ApiResult<T> {
        let url = format!(
            "{}/competitions/{COMPETITION_CODE}/{resource}?season={season_start}",
            self.base_url
        );
        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.header(AUTH_HEADER, token);
        }
        send_json(request, &url).await
    }
}

// ---------------------------------------------------------------------------
// Mapping: football-data wire types → season document
// ---------------------------------------------------------------------------

fn map_season(
    season_start: i32,
    standings: StandingsResponse,
    matches: MatchesResponse,
    generated_at: DateTime<Utc>,
) -> SeasonSnapshot {
    let label = season_label(season_start);
    let competition = match standings.competition {
        Some(c) => Competition {
            id: c.id,
            code: c.code.unwrap_or_else(|| COMPETITION_CODE.to_owned()),
            name: c.name,
            emblem: c.emblem,
        },
        None => Competition {
            code: COMPETITION_CODE.to_owned(),
            ..Default::default()
        },
    };
    let table = standings
        .standings
        .into_iter()
        .find(|s| s.kind == "TOTAL")
        .map(|s| s.table.into_iter().map(map_table_row).collect())
        .unwrap_or_default();
    let matches = matches
        .matches
        .into_iter()
        .map(|m| map_match(m, &label))
        .collect();

    SeasonSnapshot {
        season: label,
        competition: Some(competition),
        generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        source: FOOTBALL_DATA_SOURCE.to_owned(),
        table,
        matches,
        injuries: Vec::new(),
    }
}

fn map_table_row(row: FdTableRow) -> TeamStanding {
    TeamStanding {
        team_id: row.team.identifier(),
        name: row.team.name.unwrap_or_default(),
        short_name: row.team.short_name,
        tla: row.team.tla,
        crest: row.team.crest,
        played: row.played_games,
        wins: row.won,
        draws: row.draw,
        losses: row.lost,
        goals_for: row.goals_for,
        goals_against: row.goals_against,
        goal_difference: row.goal_difference,
        points: row.points,
        position: row.position,
        form: row.form.filter(|f| !f.is_empty()),
        placeholder: false,
    }
}

fn map_match(m: FdMatch, label: &str) -> Match {
    Match {
        id: m.id.to_string(),
        season: label.to_owned(),
        utc_date: m.utc_date,
        matchday: m.matchday.unwrap_or(0),
        status: m.status,
        stage: m.stage,
        home_team_id: m.home_team.id.map(|id| id.to_string()),
        away_team_id: m.away_team.id.map(|id| id.to_string()),
        home_team: m.home_team.name.unwrap_or_default(),
        away_team: m.away_team.name.unwrap_or_default(),
        score: Score {
            full_time: m.score.full_time.unwrap_or_default(),
            half_time: m.score.half_time.unwrap_or_default(),
            winner: m.score.winner,
        },
        venue: m.venue,
        last_updated: m.last_updated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MatchStatus, Winner};
    use chrono::TimeZone;
    use mockito::Matcher;

    const STANDINGS_BODY: &str = r#"{
        "competition": {"id": 2014, "name": "Primera Division", "code": "PD",
                        "emblem": "https://crests.football-data.org/PD.png"},
        "standings": [
            {"type": "HOME", "table": []},
            {"type": "TOTAL", "table": [
                {"position": 1, "team": {"id": 81, "name": "FC Barcelona", "shortName": "Barça",
                 "tla": "FCB", "crest": "https://crests.football-data.org/81.png"},
                 "playedGames": 38, "form": "W,W,D", "won": 28, "draw": 4, "lost": 6,
                 "points": 88, "goalsFor": 102, "goalsAgainst": 39, "goalDifference": 63},
                {"position": 2, "team": {"id": null, "name": "Mystery CF", "tla": "MYS"},
                 "playedGames": 38, "won": 1, "draw": 1, "lost": 36, "points": 4,
                 "goalsFor": 10, "goalsAgainst": 90, "goalDifference": -80, "form": ""}
            ]}
        ]
    }"#;

    const MATCHES_BODY: &str = r#"{
        "matches": [
            {"id": 497410, "utcDate": "2024-08-17T17:00:00Z", "status": "FINISHED",
             "matchday": 1, "stage": "REGULAR_SEASON",
             "homeTeam": {"id": 89, "name": "RCD Mallorca"}, "awayTeam": {"id": 86, "name": "Real Madrid CF"},
             "score": {"winner": "DRAW", "duration": "REGULAR",
                       "fullTime": {"home": 1, "away": 1}, "halfTime": {"home": 0, "away": 1}},
             "lastUpdated": "2025-05-26T00:20:46Z"},
            {"id": 497999, "utcDate": "2025-05-25T19:00:00Z", "status": "TIMED", "matchday": null,
             "homeTeam": {"id": 81, "name": "FC Barcelona"}, "awayTeam": {"id": 95, "name": "Valencia CF"},
             "score": {"winner": null, "fullTime": null, "halfTime": {"home": null, "away": null}}}
        ]
    }"#;

    #[test]
    fn data_urls_join_base_and_file() {
        assert_eq!(data_url("https://x.test/app/", "manifest.json"), "https://x.test/app/data/manifest.json");
        assert_eq!(data_url("http://127.0.0.1:1234", "a.json"), "http://127.0.0.1:1234/data/a.json");
        assert_eq!(data_url("", "a.json"), "data/a.json");
        assert!(DataClient::new("public/").is_local());
        assert!(!DataClient::new("https://x.test/").is_local());
    }

    #[test]
    fn provider_payloads_map_into_season_document() {
        let standings: StandingsResponse = serde_json::from_str(STANDINGS_BODY).unwrap();
        let matches: MatchesResponse = serde_json::from_str(MATCHES_BODY).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let season = map_season(2024, standings, matches, at);

        assert_eq!(season.season, "2024-2025");
        assert_eq!(season.generated_at, "2025-06-01T10:00:00.000Z");
        assert_eq!(season.source, "football-data.org");
        assert_eq!(season.competition.as_ref().map(|c| c.code.as_str()), Some("PD"));

        assert_eq!(season.table.len(), 2);
        let barca = &season.table[0];
        assert_eq!(barca.team_id, "81");
        assert_eq!(barca.short_name.as_deref(), Some("Barça"));
        assert_eq!((barca.played, barca.wins, barca.points), (38, 28, 88));
        assert_eq!(barca.form.as_deref(), Some("W,W,D"));
        // No provider id: tla stands in.
        assert_eq!(season.table[1].team_id, "MYS");
        assert_eq!(season.table[1].form, None);

        let first = &season.matches[0];
        assert_eq!(first.id, "497410");
        assert_eq!(first.season, "2024-2025");
        assert_eq!(first.status, MatchStatus::Finished);
        assert_eq!(first.home_team_id.as_deref(), Some("89"));
        assert_eq!(first.score.winner, Some(Winner::Draw));
        assert_eq!(first.score.full_time.pair(), Some((1, 1)));

        let pending = &season.matches[1];
        assert_eq!(pending.matchday, 0);
        assert_eq!(pending.status, MatchStatus::Timed);
        assert_eq!(pending.score, Score::default());
    }

    #[test]
    fn missing_competition_defaults_to_league_code() {
        let at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let season = map_season(2019, StandingsResponse::default(), MatchesResponse::default(), at);
        assert_eq!(season.competition.map(|c| c.code), Some("PD".to_string()));
        assert!(season.table.is_empty());
    }

    #[tokio::test]
    async fn fetch_season_appends_version_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Regex(r"^/data/2024-2025\.json".into()))
            .match_query(Matcher::UrlEncoded("v".into(), "abc123def456".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"season": "2024-2025", "generatedAt": "2025-06-01T10:00:00.000Z", "table": []}"#)
            .expect(1)
            .create_async()
            .await;

        let client = DataClient::new(&server.url());
        let season = client.fetch_season("2024-2025", Some("abc123def456")).await.unwrap();
        assert_eq!(season.generated_at, "2025-06-01T10:00:00.000Z");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_documents_are_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/data/manifest.json")
            .with_status(404)
            .create_async()
            .await;
        let client = DataClient::new(&format!("{}/", server.url()));
        assert!(matches!(client.fetch_manifest().await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn server_errors_surface_as_api_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/data/manifest.json")
            .with_status(503)
            .create_async()
            .await;
        let client = DataClient::new(&server.url());
        assert!(matches!(client.fetch_manifest().await, Err(ApiError::Api(_, _))));
    }

    #[tokio::test]
    async fn local_directory_reads_fetcher_output() {
        let dir = std::env::temp_dir().join(format!("ligatui-client-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("data")).unwrap();
        std::fs::write(
            dir.join("data").join("manifest.json"),
            r#"{"seasons": {"2023-2024": {"generatedAt": "t", "hash": "h"}}}"#,
        )
        .unwrap();

        let client = DataClient::new(dir.to_str().unwrap());
        let manifest = client.fetch_manifest().await.unwrap();
        assert_eq!(manifest.seasons["2023-2024"].hash, "h");
        assert!(matches!(
            client.fetch_season("2010-2011", None).await,
            Err(ApiError::NotFound(_))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn football_data_sends_token_and_season() {
        let mut server = mockito::Server::new_async().await;
        let standings = server
            .mock("GET", Matcher::Regex(r"^/competitions/PD/standings(\?|$)".into()))
            .match_query(Matcher::UrlEncoded("season".into(), "2024".into()))
            .match_header("X-Auth-Token", "secret")
            .with_status(200)
            .with_body(STANDINGS_BODY)
            .expect(1)
            .create_async()
            .await;
        let matches = server
            .mock("GET", Matcher::Regex(r"^/competitions/PD/matches(\?|$)".into()))
            .match_query(Matcher::UrlEncoded("season".into(), "2024".into()))
            .match_header("X-Auth-Token", "secret")
            .with_status(200)
            .with_body(MATCHES_BODY)
            .expect(1)
            .create_async()
            .await;

        let api = FootballDataApi::with_base_url(&server.url(), Some("secret".into()));
        let season = api.fetch_season(2024, Utc::now()).await.unwrap();
        assert_eq!(season.table.len(), 2);
        assert_eq!(season.matches.len(), 2);
        standings.assert_async().await;
        matches.assert_async().await;
    }
}
