use laliga_api::CURRENT_SEASON;
use log::LevelFilter;

pub const DEFAULT_BASE_URL: &str = "public/";

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    /// Root of the published season data: an `http(s)://` URL or a directory.
    pub base_url: String,
    pub initial_season: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            initial_season: CURRENT_SEASON.to_string(),
        }
    }
}

impl AppSettings {
    /// Read `LIGATUI_BASE_URL`, `LIGATUI_SEASON` and `LIGATUI_LOG`.
    pub fn load() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();
        Self {
            full_screen: false,
            log_level: var("LIGATUI_LOG").and_then(|v| parse_level(&v)),
            base_url: var("LIGATUI_BASE_URL").unwrap_or(defaults.base_url),
            initial_season: var("LIGATUI_SEASON").unwrap_or(defaults.initial_season),
        }
    }
}

fn parse_level(raw: &str) -> Option<LevelFilter> {
    raw.parse::<LevelFilter>().ok()
}
