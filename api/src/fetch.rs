//! Season fetcher: downloads standings and fixtures from football-data.org
//! into one JSON document per season, then rebuilds `manifest.json` with a
//! content hash and timestamp for each document.
//!
//! Historical seasons that already hold real data are skipped unless a
//! refresh is forced, so reruns spend API quota only on the active season.

use crate::client::{ApiError, FootballDataApi, MANIFEST_FILE, season_file};
use crate::{Manifest, ManifestEntry, SeasonSnapshot, active_season_start, season_label, standings};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "public/data";
const DEFAULT_FIRST_SEASON: i32 = 2016;
const DEFAULT_SEASON_COUNT: i32 = 10;
const HASH_LEN: usize = 12;

#[derive(Debug)]
pub enum FetchError {
    Io(std::io::Error, PathBuf),
    Api(ApiError),
    Encode(serde_json::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Io(e, path) => write!(f, "I/O error at {}: {e}", path.display()),
            FetchError::Api(e) => write!(f, "{e}"),
            FetchError::Encode(e) => write!(f, "could not encode season data: {e}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<ApiError> for FetchError {
    fn from(e: ApiError) -> Self {
        FetchError::Api(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Which seasons to fetch, as written in `FETCH_SEASONS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeasonSelection {
    /// 2016-2017 through 2025-2026.
    Default,
    /// `"2019,2020"`: explicit start years.
    Explicit(Vec<i32>),
    /// `"recent:N"`: the last N seasons ending at the active one.
    Recent(u32),
}

impl SeasonSelection {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return SeasonSelection::Default;
        };
        if let Some(count) = raw.strip_prefix("recent:") {
            let n = count.trim().parse::<u32>().ok().filter(|n| *n > 0).unwrap_or(1);
            return SeasonSelection::Recent(n);
        }
        SeasonSelection::Explicit(
            raw.split(',')
                .filter_map(|year| year.trim().parse::<i32>().ok())
                .filter(|year| *year != 0)
                .collect(),
        )
    }

    /// Start years in ascending order.
    pub fn start_years(&self, active_start: i32) -> Vec<i32> {
        let mut years: Vec<i32> = match self {
            SeasonSelection::Default => {
                (DEFAULT_FIRST_SEASON..DEFAULT_FIRST_SEASON + DEFAULT_SEASON_COUNT).collect()
            }
            SeasonSelection::Explicit(years) => years.clone(),
            SeasonSelection::Recent(n) => {
                let n = i32::try_from(*n).unwrap_or(i32::MAX);
                (active_start.saturating_sub(n - 1)..=active_start).collect()
            }
        };
        years.sort_unstable();
        years
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub token: Option<String>,
    pub seasons: Vec<i32>,
    pub force_refresh: bool,
    pub data_dir: PathBuf,
    /// Start year of the season still in progress; always refetched.
    pub active_start: i32,
}

impl FetchConfig {
    /// Read `FOOTBALL_DATA_TOKEN`, `FETCH_SEASONS`, `FORCE_REFRESH` and
    /// `LIGATUI_DATA_DIR`.
    pub fn from_env(now: DateTime<Utc>) -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let active_start = active_season_start(now);
        Self {
            token: var("FOOTBALL_DATA_TOKEN"),
            seasons: SeasonSelection::parse(var("FETCH_SEASONS").as_deref()).start_years(active_start),
            force_refresh: var("FORCE_REFRESH").is_some(),
            data_dir: var("LIGATUI_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            active_start,
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeasonOutcome {
    Fetched { rows: usize, matches: usize },
    /// Historical season already holding real data.
    UpToDate { rows: usize, points: u32 },
    /// No token; the existing file was left alone.
    KeptWithoutToken,
    /// No token and nothing on disk.
    MissingWithoutToken,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonReport {
    pub label: String,
    pub outcome: SeasonOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReport {
    pub seasons: Vec<SeasonReport>,
    pub manifest_entries: usize,
    pub manifest_changed: bool,
    pub had_token: bool,
}

impl FetchReport {
    pub fn failures(&self) -> usize {
        self.seasons
            .iter()
            .filter(|s| matches!(s.outcome, SeasonOutcome::Failed(_)))
            .count()
    }
}

impl fmt::Display for FetchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for season in &self.seasons {
            let label = &season.label;
            match &season.outcome {
                SeasonOutcome::Fetched { rows, matches } => {
                    writeln!(f, "fetched  {label}: {rows} teams, {matches} matches")?
                }
                SeasonOutcome::UpToDate { rows, points } => {
                    writeln!(f, "cached   {label}: {rows} teams, {points} total points")?
                }
                SeasonOutcome::KeptWithoutToken => writeln!(f, "kept     {label}: existing file (no token)")?,
                SeasonOutcome::MissingWithoutToken => writeln!(f, "missing  {label}: no token, no file")?,
                SeasonOutcome::Failed(msg) => writeln!(f, "failed   {label}: {msg}")?,
            }
        }
        let manifest = if self.manifest_changed { "updated" } else { "unchanged" };
        write!(f, "manifest {manifest} ({} seasons)", self.manifest_entries)?;
        if !self.had_token {
            write!(f, "\nset FOOTBALL_DATA_TOKEN to download real data")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Fetch every configured season and rebuild the manifest. Per-season
/// failures are recorded in the report; only manifest I/O aborts the run.
pub async fn run(config: &FetchConfig, api: &FootballDataApi, now: DateTime<Utc>) -> Result<FetchReport, FetchError> {
    fs::create_dir_all(&config.data_dir).map_err(|e| FetchError::Io(e, config.data_dir.clone()))?;

    let labels: Vec<String> = config.seasons.iter().map(|y| season_label(*y)).collect();
    info!("target seasons: {}", labels.join(", "));

    let mut seasons = Vec::with_capacity(config.seasons.len());
    for &start in &config.seasons {
        let label = season_label(start);
        let outcome = match process_season(config, api, start, now).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("season {label} failed: {e}");
                SeasonOutcome::Failed(e.to_string())
            }
        };
        seasons.push(SeasonReport { label, outcome });
    }

    let (manifest, manifest_changed) = build_manifest(&config.data_dir)?;
    Ok(FetchReport {
        seasons,
        manifest_entries: manifest.seasons.len(),
        manifest_changed,
        had_token: config.token.is_some(),
    })
}

async fn process_season(
    config: &FetchConfig,
    api: &FootballDataApi,
    start: i32,
    now: DateTime<Utc>,
) -> Result<SeasonOutcome, FetchError> {
    let label = season_label(start);
    let path = config.data_dir.join(season_file(&label));
    let exists = path.exists();

    if config.token.is_none() {
        return Ok(if exists {
            SeasonOutcome::KeptWithoutToken
        } else {
            SeasonOutcome::MissingWithoutToken
        });
    }

    if exists && start < config.active_start && !config.force_refresh {
        match existing_totals(&path) {
            Some((rows, points)) if rows >= standings::COMPLETE_TABLE_MIN && points > 0 => {
                return Ok(SeasonOutcome::UpToDate { rows, points });
            }
            Some((rows, points)) => info!("{label} looks like placeholder data ({rows} teams, {points} points)"),
            None => info!("{label} is unreadable; downloading again"),
        }
    }

    info!("downloading {label}{}", if start == config.active_start { " (active)" } else { "" });
    let season = api.fetch_season(start, now).await?;
    write_season(&path, &season)?;
    Ok(SeasonOutcome::Fetched {
        rows: season.table.len(),
        matches: season.matches.len(),
    })
}

/// `(rows, total points)` of a stored season document.
fn existing_totals(path: &Path) -> Option<(usize, u32)> {
    let raw = fs::read_to_string(path).ok()?;
    let season: SeasonSnapshot = serde_json::from_str(&raw).ok()?;
    Some((season.table.len(), season.table.iter().fold(0u32, |acc, t| acc.saturating_add(t.points))))
}

fn write_season(path: &Path, season: &SeasonSnapshot) -> Result<(), FetchError> {
    let json = serde_json::to_string_pretty(season).map_err(FetchError::Encode)?;
    fs::write(path, json).map_err(|e| FetchError::Io(e, path.to_path_buf()))
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SeasonStamp {
    season: String,
    generated_at: String,
}

/// `YYYY-YYYY.json`.
fn is_season_file(name: &str) -> bool {
    let Some(stem) = name.strip_suffix(".json") else {
        return false;
    };
    let bytes = stem.as_bytes();
    bytes.len() == 9
        && bytes[4] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || b.is_ascii_digit())
}

/// First 12 hex characters of the SHA-256 of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex = format!("{digest:x}");
    hex.truncate(HASH_LEN);
    hex
}

/// Rebuild `manifest.json` from the season documents in `dir`. The file is
/// only rewritten when its content changes; returns the manifest and whether
/// it was written.
pub fn build_manifest(dir: &Path) -> Result<(Manifest, bool), FetchError> {
    let entries = fs::read_dir(dir).map_err(|e| FetchError::Io(e, dir.to_path_buf()))?;
    let mut manifest = Manifest::default();

    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_season_file(&name) {
            continue;
        }
        let raw = match fs::read(entry.path()) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("manifest: could not read {name}: {e}");
                continue;
            }
        };
        let stamp: SeasonStamp = match serde_json::from_slice(&raw) {
            Ok(stamp) => stamp,
            Err(e) => {
                warn!("manifest: could not parse {name}: {e}");
                continue;
            }
        };
        let label = if stamp.season.is_empty() {
            name.trim_end_matches(".json").to_owned()
        } else {
            stamp.season
        };
        manifest.seasons.insert(
            label,
            ManifestEntry {
                generated_at: stamp.generated_at,
                hash: content_hash(&raw),
            },
        );
    }

    let path = dir.join(MANIFEST_FILE);
    let content = serde_json::to_string_pretty(&manifest).map_err(FetchError::Encode)?;
    let previous = fs::read_to_string(&path).unwrap_or_default();
    let changed = previous != content;
    if changed {
        fs::write(&path, &content).map_err(|e| FetchError::Io(e, path.clone()))?;
        info!("manifest updated ({} seasons)", manifest.seasons.len());
    } else {
        info!("manifest unchanged");
    }
    Ok((manifest, changed))
}
