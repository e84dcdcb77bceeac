//! Season data loader: local snapshot → manifest freshness check → remote
//! fetch → normalize → crest resolution, memoized per season.
//!
//! Loads are memoized as shared futures, so concurrent callers for the same
//! season await one in-flight load and later callers get its settled result.

use crate::client::DataClient;
use crate::crest::{CrestCache, resolve_crests};
use crate::storage::{self, Storage};
use crate::{Manifest, SeasonSnapshot, standings};
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Bumped whenever the shape of a loaded snapshot changes.
pub const CACHE_VERSION: &str = "v3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// `http(s)://` root of the published data, or a local directory.
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The season could not be fetched and no local copy exists.
    Fetch { season: String, message: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Fetch { season, message } => write!(f, "could not load season {season}: {message}"),
        }
    }
}

impl std::error::Error for LoadError {}

pub type LoadResult = Result<Arc<SeasonSnapshot>, LoadError>;

type SharedLoad = Shared<BoxFuture<'static, LoadResult>>;
type SharedManifest = Shared<BoxFuture<'static, Option<Arc<Manifest>>>>;

/// Storage key of a season's last fetched document.
pub fn season_key(label: &str) -> String {
    format!("season:{label}")
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cheap to clone; clones share memo, manifest and crest cache.
#[derive(Clone)]
pub struct SeasonLoader {
    inner: Arc<Inner>,
}

struct Inner {
    base_url: String,
    client: DataClient,
    storage: Arc<dyn Storage>,
    crests: Mutex<CrestCache>,
    loads: Mutex<HashMap<String, SharedLoad>>,
    manifest: Mutex<Option<SharedManifest>>,
}

impl SeasonLoader {
    pub fn new(config: LoaderConfig, storage: Arc<dyn Storage>) -> Self {
        let crests = CrestCache::load(storage.as_ref());
        debug!("crest cache starts with {} names", crests.len());
        Self {
            inner: Arc::new(Inner {
                client: DataClient::new(&config.base_url),
                base_url: config.base_url,
                storage,
                crests: Mutex::new(crests),
                loads: Mutex::new(HashMap::new()),
                manifest: Mutex::new(None),
            }),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Load one season, sharing any load already started for it.
    pub async fn load_season(&self, label: &str) -> LoadResult {
        let pending = {
            let mut loads = lock(&self.inner.loads);
            loads
                .entry(memo_key(label))
                .or_insert_with(|| {
                    let inner = Arc::clone(&self.inner);
                    let label = label.to_owned();
                    async move { inner.load_uncached(label).await }.boxed().shared()
                })
                .clone()
        };
        pending.await
    }

    /// Forget the memoized result for `label` and the memoized manifest; the
    /// next load starts over and sees republished seasons.
    pub fn invalidate(&self, label: &str) {
        if lock(&self.inner.loads).remove(&memo_key(label)).is_some() {
            debug!("dropped memoized load for {label}");
        }
        lock(&self.inner.manifest).take();
    }

    /// Snapshot of the crest cache as it stands now.
    pub fn crest_cache(&self) -> CrestCache {
        lock(&self.inner.crests).clone()
    }
}

fn memo_key(label: &str) -> String {
    format!("{CACHE_VERSION}:{label}")
}

impl Inner {
    fn manifest(self: &Arc<Self>) -> SharedManifest {
        let mut slot = lock(&self.manifest);
        slot.get_or_insert_with(|| {
            let client = self.client.clone();
            async move {
                match client.fetch_manifest().await {
                    Ok(manifest) => Some(Arc::new(manifest)),
                    Err(e) => {
                        debug!("manifest unavailable: {e}");
                        None
                    }
                }
            }
            .boxed()
            .shared()
        })
        .clone()
    }

    async fn load_uncached(self: Arc<Self>, label: String) -> LoadResult {
        let key = season_key(&label);
        let stored: Option<SeasonSnapshot> = storage::read_json(self.storage.as_ref(), &key);
        let manifest = self.manifest().await;
        let entry = manifest.as_ref().and_then(|m| m.seasons.get(&label)).cloned();

        let up_to_date = match (&stored, &entry) {
            (Some(local), Some(entry)) => local.generated_at == entry.generated_at,
            _ => false,
        };

        let mut snapshot = match stored {
            Some(local) if up_to_date => {
                debug!("{label}: local copy matches manifest");
                local
            }
            stored => {
                let hash = entry.as_ref().map(|e| e.hash.as_str());
                match self.client.fetch_season(&label, hash).await {
                    Ok(fresh) => {
                        info!("{label}: fetched season data ({} rows)", fresh.table.len());
                        if let Err(e) = storage::write_json(self.storage.as_ref(), &key, &fresh) {
                            warn!("{label}: could not store season data: {e}");
                        }
                        fresh
                    }
                    Err(e) => match stored {
                        Some(local) => {
                            warn!("{label}: fetch failed, using local copy: {e}");
                            local
                        }
                        None => {
                            return Err(LoadError::Fetch {
                                season: label,
                                message: e.to_string(),
                            });
                        }
                    },
                }
            }
        };

        let table = standings::normalize(std::mem::take(&mut snapshot.table));
        let cache = lock(&self.crests).clone();
        let (table, cache) = resolve_crests(&self.base_url, table, &snapshot.matches, cache);
        {
            let mut shared = lock(&self.crests);
            shared.merge(cache);
            shared.save(self.storage.as_ref());
        }
        snapshot.table = table;
        Ok(Arc::new(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crest::{crest_url, placeholder_crest, resolve_crests};
    use crate::storage::{MemoryStorage, StorageError};
    use mockito::Matcher;

    const SEASON: &str = "2024-2025";

    fn season_body(generated_at: &str) -> String {
        serde_json::json!({
            "season": SEASON,
            "generatedAt": generated_at,
            "source": "football-data.org",
            "table": [
                {"teamId": "81", "name": "FC Barcelona", "points": 9, "goalsFor": 9, "goalsAgainst": 2, "position": 1},
                {"teamId": "86", "name": "Real Madrid CF", "points": 9, "goalsFor": 7, "goalsAgainst": 1, "position": 2}
            ],
            "matches": []
        })
        .to_string()
    }

    fn manifest_body(generated_at: &str) -> String {
        serde_json::json!({"seasons": {"2024-2025": {"generatedAt": generated_at, "hash": "0123456789ab"}}}).to_string()
    }

    fn loader(base_url: &str, storage: &MemoryStorage) -> SeasonLoader {
        SeasonLoader::new(LoaderConfig { base_url: base_url.to_owned() }, Arc::new(storage.clone()))
    }

    /// Storage that refuses every read and write.
    struct OfflineStorage;

    impl Storage for OfflineStorage {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("offline".into()))
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("offline".into()))
        }
    }

    fn store_local(storage: &MemoryStorage, generated_at: &str) {
        storage.write(&season_key(SEASON), &season_body(generated_at)).unwrap();
    }

    #[tokio::test]
    async fn concurrent_loads_share_one_fetch() {
        let mut server = mockito::Server::new_async().await;
        let manifest = server
            .mock("GET", "/data/manifest.json")
            .with_status(200)
            .with_body(manifest_body("2025-06-01T10:00:00.000Z"))
            .expect(1)
            .create_async()
            .await;
        let season = server
            .mock("GET", Matcher::Regex(r"^/data/2024-2025\.json".into()))
            .with_status(200)
            .with_body(season_body("2025-06-01T10:00:00.000Z"))
            .expect(1)
            .create_async()
            .await;

        let storage = MemoryStorage::new();
        let loader = loader(&server.url(), &storage);
        let (a, b) = tokio::join!(loader.load_season(SEASON), loader.load_season(SEASON));
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(Arc::ptr_eq(&a, &b));

        // Settled results are memoized as well.
        let c = loader.load_season(SEASON).await.unwrap();
        assert!(Arc::ptr_eq(&a, &c));

        season.assert_async().await;
        manifest.assert_async().await;
        assert!(storage.read(&season_key(SEASON)).unwrap().is_some());
    }

    #[tokio::test]
    async fn loaded_table_is_normalized_and_has_crests() {
        let mut server = mockito::Server::new_async().await;
        let _manifest = server.mock("GET", "/data/manifest.json").with_status(404).create_async().await;
        let _season = server
            .mock("GET", Matcher::Regex(r"^/data/2024-2025\.json".into()))
            .with_status(200)
            .with_body(season_body("x"))
            .create_async()
            .await;

        let storage = MemoryStorage::new();
        let loader = loader(&server.url(), &storage);
        let snapshot = loader.load_season(SEASON).await.unwrap();

        assert_eq!(snapshot.table.len(), 20);
        assert_eq!(snapshot.table[0].team_id, "81");
        assert_eq!(snapshot.table[1].team_id, "86");
        assert!(snapshot.table.iter().all(|row| row.crest.is_some()));
        assert_eq!(snapshot.table[0].crest.as_deref(), Some(crest_url("81").as_str()));
        let atm = snapshot.team("atm").unwrap();
        assert!(atm.placeholder);
        assert_eq!(atm.crest.as_deref(), Some(crest_url("78").as_str()));
        assert_ne!(atm.crest.as_deref(), Some(placeholder_crest(loader.base_url()).as_str()));

        // The crest cache was persisted for the next session.
        assert!(!CrestCache::load(&storage).is_empty());
    }

    #[tokio::test]
    async fn local_copy_is_reused_when_manifest_agrees() {
        let mut server = mockito::Server::new_async().await;
        let _manifest = server
            .mock("GET", "/data/manifest.json")
            .with_status(200)
            .with_body(manifest_body("2025-06-01T10:00:00.000Z"))
            .create_async()
            .await;
        let season = server
            .mock("GET", Matcher::Regex(r"^/data/2024-2025\.json".into()))
            .with_status(200)
            .with_body(season_body("2025-06-01T10:00:00.000Z"))
            .expect(0)
            .create_async()
            .await;

        let storage = MemoryStorage::new();
        store_local(&storage, "2025-06-01T10:00:00.000Z");
        let snapshot = loader(&server.url(), &storage).load_season(SEASON).await.unwrap();
        assert_eq!(snapshot.generated_at, "2025-06-01T10:00:00.000Z");
        season.assert_async().await;
    }

    #[tokio::test]
    async fn stale_local_copy_is_refetched_with_hash() {
        let mut server = mockito::Server::new_async().await;
        let _manifest = server
            .mock("GET", "/data/manifest.json")
            .with_status(200)
            .with_body(manifest_body("new"))
            .create_async()
            .await;
        let season = server
            .mock("GET", Matcher::Regex(r"^/data/2024-2025\.json".into()))
            .match_query(Matcher::UrlEncoded("v".into(), "0123456789ab".into()))
            .with_status(200)
            .with_body(season_body("new"))
            .expect(1)
            .create_async()
            .await;

        let storage = MemoryStorage::new();
        store_local(&storage, "old");
        let snapshot = loader(&server.url(), &storage).load_season(SEASON).await.unwrap();
        assert_eq!(snapshot.generated_at, "new");
        season.assert_async().await;
        let stored: SeasonSnapshot = storage::read_json(&storage, &season_key(SEASON)).unwrap();
        assert_eq!(stored.generated_at, "new");
    }

    #[tokio::test]
    async fn failed_fetch_falls_back_to_local_copy() {
        let mut server = mockito::Server::new_async().await;
        let _manifest = server.mock("GET", "/data/manifest.json").with_status(500).create_async().await;
        let _season = server
            .mock("GET", Matcher::Regex(r"^/data/2024-2025\.json".into()))
            .with_status(500)
            .create_async()
            .await;

        let storage = MemoryStorage::new();
        store_local(&storage, "old");
        let snapshot = loader(&server.url(), &storage).load_season(SEASON).await.unwrap();
        assert_eq!(snapshot.generated_at, "old");
        assert_eq!(snapshot.table.len(), 20);
    }

    #[tokio::test]
    async fn nothing_available_is_a_season_error() {
        let mut server = mockito::Server::new_async().await;
        let _manifest = server.mock("GET", "/data/manifest.json").with_status(404).create_async().await;
        let season = server
            .mock("GET", Matcher::Regex(r"^/data/2024-2025\.json".into()))
            .with_status(404)
            .expect(2)
            .create_async()
            .await;

        let storage = MemoryStorage::new();
        let loader = loader(&server.url(), &storage);
        let err = loader.load_season(SEASON).await.unwrap_err();
        let LoadError::Fetch { season: label, .. } = &err;
        assert_eq!(label, SEASON);
        assert!(err.to_string().contains(SEASON));

        // The failure is memoized until invalidated.
        assert_eq!(loader.load_season(SEASON).await.unwrap_err(), err);
        loader.invalidate(SEASON);
        assert!(loader.load_season(SEASON).await.is_err());
        season.assert_async().await;
    }

    #[tokio::test]
    async fn local_directory_base_reads_fetcher_output() {
        let dir = std::env::temp_dir().join(format!("ligatui-loader-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("data")).unwrap();
        std::fs::write(dir.join("data").join("2024-2025.json"), season_body("local")).unwrap();

        let storage = MemoryStorage::new();
        let loader = loader(dir.to_str().unwrap(), &storage);
        let snapshot = loader.load_season(SEASON).await.unwrap();
        assert_eq!(snapshot.generated_at, "local");
        assert!(loader.load_season("2010-2011").await.is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn reload_picks_up_republished_season() {
        let mut server = mockito::Server::new_async().await;
        let manifest = server
            .mock("GET", "/data/manifest.json")
            .with_status(200)
            .with_body(manifest_body("A"))
            .create_async()
            .await;
        let season = server
            .mock("GET", Matcher::Regex(r"^/data/2024-2025\.json".into()))
            .with_status(200)
            .with_body(season_body("A"))
            .create_async()
            .await;

        let storage = MemoryStorage::new();
        let loader = loader(&server.url(), &storage);
        assert_eq!(loader.load_season(SEASON).await.unwrap().generated_at, "A");

        manifest.remove_async().await;
        season.remove_async().await;
        let _manifest = server
            .mock("GET", "/data/manifest.json")
            .with_status(200)
            .with_body(manifest_body("B"))
            .create_async()
            .await;
        let republished = server
            .mock("GET", Matcher::Regex(r"^/data/2024-2025\.json".into()))
            .with_status(200)
            .with_body(season_body("B"))
            .expect(1)
            .create_async()
            .await;

        loader.invalidate(SEASON);
        assert_eq!(loader.load_season(SEASON).await.unwrap().generated_at, "B");
        republished.assert_async().await;
    }

    #[tokio::test]
    async fn unavailable_storage_is_absorbed() {
        let mut server = mockito::Server::new_async().await;
        let _manifest = server
            .mock("GET", "/data/manifest.json")
            .with_status(200)
            .with_body(manifest_body("x"))
            .create_async()
            .await;
        let season = server
            .mock("GET", Matcher::Regex(r"^/data/2024-2025\.json".into()))
            .with_status(200)
            .with_body(season_body("x"))
            .expect(2)
            .create_async()
            .await;

        let loader = SeasonLoader::new(
            LoaderConfig { base_url: server.url() },
            Arc::new(OfflineStorage),
        );
        let first = loader.load_season(SEASON).await.unwrap();
        assert_eq!(first.table.len(), 20);
        assert_eq!(first.table[0].crest.as_deref(), Some(crest_url("81").as_str()));
        assert!(first.table.iter().all(|row| row.crest.is_some()));

        // Crests learned in this session still apply with nothing persisted.
        let cache = loader.crest_cache();
        assert!(!cache.is_empty());
        let (again, _) = resolve_crests(loader.base_url(), first.table.clone(), &[], cache);
        assert_eq!(again, first.table);

        loader.invalidate(SEASON);
        let second = loader.load_season(SEASON).await.unwrap();
        assert_eq!(second.table, first.table);
        season.assert_async().await;
    }
}
