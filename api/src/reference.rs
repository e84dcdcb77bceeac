//! Static LaLiga reference data: the recurring-club roster used to pad
//! incomplete tables and the historical name variants used to find crests.
//! Extend these tables to teach the normalizer and resolver about new clubs;
//! neither needs code changes.

use crate::names::{name_keys, simplify_name};
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceTeam {
    /// Stable short id used for synthesized rows.
    pub team_id: &'static str,
    pub name: &'static str,
    /// football-data.org team id.
    pub provider_id: Option<&'static str>,
}

const fn team(team_id: &'static str, name: &'static str, provider_id: &'static str) -> ReferenceTeam {
    ReferenceTeam { team_id, name, provider_id: Some(provider_id) }
}

/// Clubs used to fill incomplete tables, in padding order.
pub const REFERENCE_ROSTER: [ReferenceTeam; 20] = [
    team("rm", "Real Madrid", "86"),
    team("fcb", "FC Barcelona", "81"),
    team("atm", "Atlético Madrid", "78"),
    team("sev", "Sevilla", "559"),
    team("rsoc", "Real Sociedad", "92"),
    team("vil", "Villarreal", "94"),
    team("ath", "Athletic Club", "77"),
    team("bet", "Real Betis", "90"),
    team("val", "Valencia", "95"),
    team("cel", "Celta Vigo", "558"),
    team("get", "Getafe", "82"),
    team("osa", "Osasuna", "79"),
    team("ray", "Rayo Vallecano", "87"),
    team("mai", "Mallorca", "89"),
    team("gir", "Girona", "298"),
    team("ala", "Alavés", "263"),
    team("udlp", "Las Palmas", "102"),
    team("gra", "Granada", "83"),
    team("cad", "Cádiz", "264"),
    team("alm", "Almería", "267"),
];

/// Club name variants -> football-data.org id. Order matters for fuzzy
/// matching: the first containing key wins.
pub const STATIC_NAME_IDS: &[(&str, &str)] = &[
    ("fc barcelona", "81"),
    ("barcelona", "81"),
    ("real madrid cf", "86"),
    ("real madrid", "86"),
    ("club atletico de madrid", "78"),
    ("atletico madrid", "78"),
    ("atlético de madrid", "78"),
    ("sevilla fc", "559"),
    ("sevilla", "559"),
    ("real sociedad de futbol", "92"),
    ("real sociedad", "92"),
    ("villarreal cf", "94"),
    ("villarreal", "94"),
    ("athletic club", "77"),
    ("athletic bilbao", "77"),
    ("real betis balompie", "90"),
    ("real betis", "90"),
    ("valencia cf", "95"),
    ("valencia", "95"),
    ("rc celta de vigo", "558"),
    ("celta vigo", "558"),
    ("celta", "558"),
    ("getafe cf", "82"),
    ("getafe", "82"),
    ("ca osasuna", "79"),
    ("osasuna", "79"),
    ("rayo vallecano de madrid", "87"),
    ("rayo vallecano", "87"),
    ("rayo", "87"),
    ("rcd mallorca", "89"),
    ("mallorca", "89"),
    ("girona fc", "298"),
    ("girona", "298"),
    ("deportivo alaves", "263"),
    ("alavés", "263"),
    ("ud las palmas", "102"),
    ("las palmas", "102"),
    ("granada cf", "83"),
    ("granada", "83"),
    ("cadiz cf", "264"),
    ("cádiz", "264"),
    ("ud almeria", "267"),
    ("almería", "267"),
    ("rcd espanyol de barcelona", "80"),
    ("rcd espanyol", "80"),
    ("espanyol", "80"),
    ("levante ud", "88"),
    ("levante", "88"),
    ("elche cf", "285"),
    ("elche", "285"),
];

pub fn reference_team(team_id: &str) -> Option<&'static ReferenceTeam> {
    REFERENCE_ROSTER.iter().find(|t| t.team_id == team_id)
}

/// Provider id for a roster short id (`"rm"` -> `"86"`).
pub fn roster_provider_id(team_id: &str) -> Option<&'static str> {
    reference_team(team_id).and_then(|t| t.provider_id)
}

/// Lookup structures over [`STATIC_NAME_IDS`], built once.
#[derive(Debug)]
pub struct StaticNameIndex {
    /// Normalized and simplified forms of every key.
    by_key: HashMap<String, &'static str>,
    /// Simplified keys in table order, for fuzzy scans.
    simplified: Vec<(String, &'static str)>,
}

impl StaticNameIndex {
    fn build() -> Self {
        let mut by_key = HashMap::new();
        let mut simplified = Vec::with_capacity(STATIC_NAME_IDS.len());
        for (name, id) in STATIC_NAME_IDS {
            let (normalized, simple) = name_keys(name);
            by_key.entry(normalized).or_insert(*id);
            by_key.entry(simple.clone()).or_insert(*id);
            simplified.push((simple, *id));
        }
        Self { by_key, simplified }
    }

    pub fn get(&self, key: &str) -> Option<&'static str> {
        self.by_key.get(key).copied()
    }

    /// First entry whose simplified key contains, or is contained in, `simple`.
    pub fn fuzzy(&self, simple: &str) -> Option<&'static str> {
        if simple.is_empty() {
            return None;
        }
        self.simplified
            .iter()
            .find(|(key, _)| !key.is_empty() && (key.contains(simple) || simple.contains(key.as_str())))
            .map(|(_, id)| *id)
    }
}

pub fn static_name_index() -> &'static StaticNameIndex {
    static INDEX: OnceLock<StaticNameIndex> = OnceLock::new();
    INDEX.get_or_init(StaticNameIndex::build)
}

/// Provider id for a club name via the static table, exact forms only.
pub fn static_provider_id(name: &str) -> Option<&'static str> {
    let (normalized, simple) = name_keys(name);
    let index = static_name_index();
    index.get(&normalized).or_else(|| index.get(&simple))
}

/// Like [`static_provider_id`], falling back to substring matching.
pub fn static_provider_id_fuzzy(name: &str) -> Option<&'static str> {
    static_provider_id(name).or_else(|| static_name_index().fuzzy(&simplify_name(name)))
}
