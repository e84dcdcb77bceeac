//! Crest (team logo) resolution.
//!
//! Team names differ between the standings feed, the fixtures feed and older
//! hand-made season files, so a crest is found through a layered fallback:
//! an existing crest, the reference roster, the name cache, a numeric team
//! id, fixtures, the static name table, and finally substring matching.
//! The name cache is passed in and handed back so callers own its lifecycle.

use crate::names::name_keys;
use crate::reference::{roster_provider_id, static_name_index};
use crate::storage::{self, Storage};
use crate::{Match, TeamStanding};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const CREST_HOST: &str = "https://crests.football-data.org";
pub const PLACEHOLDER_CREST_FILE: &str = "crest-placeholder.svg";

/// Storage key of the persisted name cache.
pub const CREST_CACHE_KEY: &str = "crestMap.v1";
const CREST_CACHE_VERSION: u32 = 1;

/// Canonical crest URL for a provider id.
pub fn crest_url(provider_id: &str) -> String {
    format!("{CREST_HOST}/{provider_id}.png")
}

pub fn placeholder_crest(base_url: &str) -> String {
    crate::client::data_url(base_url, PLACEHOLDER_CREST_FILE)
}

pub fn is_placeholder_crest(url: &str) -> bool {
    url.contains(PLACEHOLDER_CREST_FILE)
}

/// Some provider crests only exist as SVG; viewers retry with this URL when
/// the PNG is missing.
pub fn svg_fallback(url: &str) -> Option<String> {
    if !url.starts_with(CREST_HOST) {
        return None;
    }
    url.strip_suffix(".png").map(|stem| format!("{stem}.svg"))
}

fn is_numeric_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// Name cache
// ---------------------------------------------------------------------------

/// Normalized team name -> crest URL. Entries are added or refreshed, never
/// removed, so lookups only get better over time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrestCache {
    entries: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize)]
struct CrestCacheFile {
    version: u32,
    entries: BTreeMap<String, String>,
}

impl CrestCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn lookup(&self, normalized: &str, simple: &str) -> Option<&str> {
        let usable = |url: &&str| !url.trim().is_empty();
        self.get(normalized)
            .filter(usable)
            .or_else(|| self.get(simple).filter(usable))
    }

    fn remember(&mut self, normalized: &str, simple: &str, url: &str) {
        if url.trim().is_empty() {
            return;
        }
        for key in [normalized, simple] {
            if !key.is_empty() {
                self.entries.insert(key.to_owned(), url.to_owned());
            }
        }
    }

    /// Fold in entries learned elsewhere; `other` wins on conflicts.
    pub fn merge(&mut self, other: CrestCache) {
        self.entries.extend(other.entries);
    }

    /// Load the persisted cache. Anything unreadable or from another cache
    /// format starts empty.
    pub fn load(storage: &dyn Storage) -> Self {
        match storage::read_json::<CrestCacheFile>(storage, CREST_CACHE_KEY) {
            Some(file) if file.version == CREST_CACHE_VERSION => Self { entries: file.entries },
            Some(file) => {
                debug!("discarding crest cache version {}", file.version);
                Self::default()
            }
            None => Self::default(),
        }
    }

    /// Persist the cache; failures are logged and otherwise ignored.
    pub fn save(&self, storage: &dyn Storage) {
        let file = CrestCacheFile {
            version: CREST_CACHE_VERSION,
            entries: self.entries.clone(),
        };
        if let Err(e) = storage::write_json(storage, CREST_CACHE_KEY, &file) {
            warn!("could not persist crest cache: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// Fixture-derived names
// ---------------------------------------------------------------------------

/// Team names seen in fixtures whose team id is numeric, in first-seen order.
#[derive(Debug, Default)]
struct MatchNameIndex {
    order: Vec<String>,
    ids: HashMap<String, String>,
}

impl MatchNameIndex {
    fn from_matches(matches: &[Match]) -> Self {
        let mut index = Self::default();
        for m in matches {
            for (id, name) in [(&m.home_team_id, &m.home_team), (&m.away_team_id, &m.away_team)] {
                let Some(id) = id.as_deref().filter(|id| is_numeric_id(id)) else {
                    continue;
                };
                let (normalized, simple) = name_keys(name);
                index.insert(normalized, id);
                index.insert(simple, id);
            }
        }
        index
    }

    fn insert(&mut self, key: String, id: &str) {
        if key.is_empty() {
            return;
        }
        if !self.ids.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.ids.insert(key, id.to_owned());
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.ids.get(key).map(String::as_str)
    }

    fn fuzzy(&self, simple: &str) -> Option<&str> {
        if simple.is_empty() {
            return None;
        }
        self.order
            .iter()
            .find(|key| key.contains(simple) || simple.contains(key.as_str()))
            .and_then(|key| self.get(key))
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Give every row a crest URL, returning the rows and the updated cache.
///
/// Rows with no resolvable identifier get the placeholder image under
/// `base_url`; this never fails.
pub fn resolve_crests(
    base_url: &str,
    table: Vec<TeamStanding>,
    matches: &[Match],
    mut cache: CrestCache,
) -> (Vec<TeamStanding>, CrestCache) {
    let index = MatchNameIndex::from_matches(matches);
    let placeholder = placeholder_crest(base_url);

    let resolved = table
        .into_iter()
        .map(|row| {
            let crest = match resolve_row(&row, &index, &mut cache) {
                Some(url) => url,
                None => {
                    debug!("no crest for {}", row.name);
                    placeholder.clone()
                }
            };
            TeamStanding { crest: Some(crest), ..row }
        })
        .collect();

    (resolved, cache)
}

fn resolve_row(row: &TeamStanding, index: &MatchNameIndex, cache: &mut CrestCache) -> Option<String> {
    let (normalized, simple) = name_keys(&row.name);

    let existing = row
        .crest
        .as_deref()
        .filter(|c| !c.trim().is_empty() && !is_placeholder_crest(c));

    let url = if let Some(existing) = existing {
        existing.to_owned()
    } else if let Some(id) = roster_provider_id(&row.team_id) {
        crest_url(id)
    } else if let Some(cached) = cache.lookup(&normalized, &simple) {
        cached.to_owned()
    } else if is_numeric_id(&row.team_id) {
        crest_url(&row.team_id)
    } else {
        let statics = static_name_index();
        let id = index
            .get(&normalized)
            .or_else(|| index.get(&simple))
            .or_else(|| statics.get(&normalized))
            .or_else(|| statics.get(&simple))
            .or_else(|| statics.fuzzy(&simple))
            .or_else(|| index.fuzzy(&simple))?;
        crest_url(id)
    };

    cache.remember(&normalized, &simple, &url);
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    const BASE: &str = "https://example.test/app/";

    fn row(team_id: &str, name: &str) -> TeamStanding {
        TeamStanding {
            team_id: team_id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    fn fixture(home_id: &str, home: &str, away_id: &str, away: &str) -> Match {
        Match {
            home_team_id: Some(home_id.into()),
            home_team: home.into(),
            away_team_id: Some(away_id.into()),
            away_team: away.into(),
            ..Default::default()
        }
    }

    fn crest_of(rows: &[TeamStanding], idx: usize) -> &str {
        rows[idx].crest.as_deref().unwrap_or_default()
    }

    #[test]
    fn urls_follow_provider_convention() {
        assert_eq!(crest_url("81"), "https://crests.football-data.org/81.png");
        assert_eq!(placeholder_crest(BASE), "https://example.test/app/data/crest-placeholder.svg");
        assert_eq!(
            svg_fallback("https://crests.football-data.org/81.png").as_deref(),
            Some("https://crests.football-data.org/81.svg")
        );
        assert_eq!(svg_fallback("https://elsewhere.test/81.png"), None);
        assert!(is_placeholder_crest("/data/crest-placeholder.svg"));
    }

    #[test]
    fn existing_crest_is_kept_and_cached() {
        let mut with_crest = row("zz", "Club Deportivo Leganés");
        with_crest.crest = Some("https://img.test/leganes.png".into());
        let (rows, cache) = resolve_crests(BASE, vec![with_crest], &[], CrestCache::new());
        assert_eq!(crest_of(&rows, 0), "https://img.test/leganes.png");
        assert_eq!(cache.get("club deportivo leganes"), Some("https://img.test/leganes.png"));
        assert_eq!(cache.get("deportivo leganes"), Some("https://img.test/leganes.png"));
    }

    #[test]
    fn placeholder_crest_is_not_trusted() {
        let mut stale = row("81", "FC Barcelona");
        stale.crest = Some(placeholder_crest(BASE));
        let (rows, _) = resolve_crests(BASE, vec![stale], &[], CrestCache::new());
        assert_eq!(crest_of(&rows, 0), crest_url("81"));
    }

    #[test]
    fn blank_crest_counts_as_missing() {
        let mut blank = row("745", "CD Leganés");
        blank.crest = Some("  ".into());
        let (rows, cache) = resolve_crests(BASE, vec![blank], &[], CrestCache::new());
        assert_eq!(crest_of(&rows, 0), crest_url("745"));
        assert_eq!(cache.get("leganes"), Some(crest_url("745").as_str()));

        let (second, _) = resolve_crests(BASE, vec![row("leg", "Leganés")], &[], cache);
        assert_eq!(crest_of(&second, 0), crest_url("745"));
    }

    #[test]
    fn blank_cache_entries_are_skipped() {
        let mut cache = CrestCache::new();
        cache.remember("leganes", "leganes", "");
        assert!(cache.is_empty());

        let poisoned = CrestCache {
            entries: BTreeMap::from([("cd leganes".to_owned(), String::new())]),
        };
        let (rows, cache) = resolve_crests(BASE, vec![row("745", "CD Leganés")], &[], poisoned);
        assert_eq!(crest_of(&rows, 0), crest_url("745"));
        assert_eq!(cache.get("cd leganes"), Some(crest_url("745").as_str()));
    }

    #[test]
    fn roster_id_beats_cache() {
        let mut cache = CrestCache::new();
        cache.remember("sevilla", "sevilla", "https://img.test/old.png");
        let (rows, cache) = resolve_crests(BASE, vec![row("sev", "Sevilla")], &[], cache);
        assert_eq!(crest_of(&rows, 0), crest_url("559"));
        assert_eq!(cache.get("sevilla"), Some(crest_url("559").as_str()));
    }

    #[test]
    fn cache_beats_numeric_team_id() {
        let mut cache = CrestCache::new();
        cache.remember("leganes", "leganes", "https://img.test/leganes.png");
        let (rows, _) = resolve_crests(BASE, vec![row("745", "Leganés")], &[], cache);
        assert_eq!(crest_of(&rows, 0), "https://img.test/leganes.png");
    }

    #[test]
    fn numeric_team_id_builds_url() {
        let (rows, cache) = resolve_crests(BASE, vec![row("745", "CD Leganés")], &[], CrestCache::new());
        assert_eq!(crest_of(&rows, 0), crest_url("745"));
        assert_eq!(cache.get("cd leganes"), Some(crest_url("745").as_str()));
        assert_eq!(cache.get("leganes"), Some(crest_url("745").as_str()));
    }

    #[test]
    fn fixtures_provide_ids_for_named_rows() {
        let matches = vec![
            fixture("745", "CD Leganés", "278", "SD Eibar"),
            fixture("abc", "Not Numeric", "745", "CD Leganés"),
        ];
        let rows = vec![row("leg", "Leganés"), row("eib", "SD Eibar"), row("nn", "Not Numeric")];
        let (rows, _) = resolve_crests(BASE, rows, &matches, CrestCache::new());
        assert_eq!(crest_of(&rows, 0), crest_url("745"));
        assert_eq!(crest_of(&rows, 1), crest_url("278"));
        assert_eq!(crest_of(&rows, 2), placeholder_crest(BASE));
    }

    #[test]
    fn fixtures_are_consulted_before_static_names() {
        let matches = vec![fixture("9999", "Real Betis", "1", "Other")];
        let (rows, _) = resolve_crests(BASE, vec![row("b", "Real Betis")], &matches, CrestCache::new());
        assert_eq!(crest_of(&rows, 0), crest_url("9999"));
    }

    #[test]
    fn static_table_covers_historical_names() {
        let (rows, _) = resolve_crests(
            BASE,
            vec![row("esp", "RCD Espanyol de Barcelona"), row("lev", "Levante")],
            &[],
            CrestCache::new(),
        );
        assert_eq!(crest_of(&rows, 0), crest_url("80"));
        assert_eq!(crest_of(&rows, 1), crest_url("88"));
    }

    #[test]
    fn accented_long_name_matches_simplified_form() {
        let (rows, _) = resolve_crests(BASE, vec![row("x", "Atlético de Madrid")], &[], CrestCache::new());
        assert_eq!(crest_of(&rows, 0), crest_url("78"));

        // Same folding against fixture names, with no static entry involved.
        let matches = vec![fixture("4321", "Atletico Madrid", "1", "Other")];
        let (rows, _) = resolve_crests(BASE, vec![row("x", "Atlético de Madrid")], &matches, CrestCache::new());
        assert_eq!(crest_of(&rows, 0), crest_url("4321"));
    }

    #[test]
    fn fuzzy_matching_scans_static_then_fixtures() {
        let matches = vec![fixture("3001", "Burgos Club de Fútbol", "1", "Other")];
        let rows = vec![row("v", "Villarreal CF B"), row("bu", "Burgos")];
        let (rows, _) = resolve_crests(BASE, rows, &matches, CrestCache::new());
        assert_eq!(crest_of(&rows, 0), crest_url("94"));
        // "burgos" is a fixture name exactly after simplification.
        assert_eq!(crest_of(&rows, 1), crest_url("3001"));

        let rows = vec![row("bu", "Burgos Promesas")];
        let (rows, _) = resolve_crests(BASE, rows, &matches, CrestCache::new());
        assert_eq!(crest_of(&rows, 0), crest_url("3001"));
    }

    #[test]
    fn boilerplate_only_names_fall_back_to_placeholder() {
        let matches = vec![fixture("1", "Somewhere", "2", "Elsewhere")];
        let (rows, cache) = resolve_crests(BASE, vec![row("q", "Club de Fútbol")], &matches, CrestCache::new());
        assert_eq!(crest_of(&rows, 0), placeholder_crest(BASE));
        assert!(cache.get("").is_none());
    }

    #[test]
    fn second_pass_resolves_from_cache_alone() {
        let matches = vec![
            fixture("745", "CD Leganés", "278", "SD Eibar"),
            fixture("264", "Cádiz CF", "745", "CD Leganés"),
        ];
        let table = vec![
            row("leg", "Leganés"),
            row("eib", "Eibar"),
            row("rm", "Real Madrid"),
            row("xx", "Nobody FC"),
        ];
        let (first, cache) = resolve_crests(BASE, table.clone(), &matches, CrestCache::new());
        let (second, cache_again) = resolve_crests(BASE, table, &[], cache.clone());
        let crests = |rows: &[TeamStanding]| rows.iter().map(|r| r.crest.clone()).collect::<Vec<_>>();
        assert_eq!(crests(&first), crests(&second));
        assert_eq!(cache, cache_again);
    }

    #[test]
    fn cache_survives_storage_round_trip() {
        let storage = MemoryStorage::new();
        let (_, cache) = resolve_crests(BASE, vec![row("745", "CD Leganés")], &[], CrestCache::new());
        cache.save(&storage);
        let loaded = CrestCache::load(&storage);
        assert_eq!(loaded, cache);
        assert!(!loaded.is_empty());
    }

    #[test]
    fn foreign_cache_versions_load_empty() {
        let storage = MemoryStorage::new();
        storage
            .write(CREST_CACHE_KEY, r#"{"version": 99, "entries": {"x": "y"}}"#)
            .unwrap();
        assert!(CrestCache::load(&storage).is_empty());
        storage.write(CREST_CACHE_KEY, "not json").unwrap();
        assert!(CrestCache::load(&storage).is_empty());
    }
}
