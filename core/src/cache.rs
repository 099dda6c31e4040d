//! Definition cache
//!
//! Resolves definition ids to definitions. The id -> definition map is loaded
//! from the host content pipeline on first use and dropped whenever the host
//! reports that the plugin's asset was invalidated.

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use hashbrown::HashMap;
use tas_types::Vec2;

use crate::context::SpawnContext;
use crate::definitions::TasDefinition;
use crate::host::{AssetEventRegistry, AssetRequest, ContentSource};
use crate::plugin_config::PluginConfig;

type LoadedDefinitions = HashMap<String, Arc<TasDefinition>>;

/// Load state of the cache
#[derive(Debug, Clone, Default)]
pub enum CacheState {
    #[default]
    Empty,
    Loaded(Arc<LoadedDefinitions>),
}

/// Lazily loaded id -> definition lookup for one plugin instance
#[derive(Debug)]
pub struct DefinitionCache<S> {
    /// Asset name this plugin provides and listens to
    asset_name: String,
    /// File the asset is loaded from, relative to the content root
    data_file: PathBuf,
    source: S,
    state: RefCell<CacheState>,
    /// Number of loads from the content source
    load_count: Cell<usize>,
}

impl<S: ContentSource> DefinitionCache<S> {
    pub fn new(asset_name: impl Into<String>, data_file: impl Into<PathBuf>, source: S) -> Self {
        Self {
            asset_name: asset_name.into(),
            data_file: data_file.into(),
            source,
            state: RefCell::new(CacheState::Empty),
            load_count: Cell::new(0),
        }
    }

    pub fn from_config(config: &PluginConfig, source: S) -> Self {
        Self::new(config.asset_name(), &config.data_file, source)
    }

    pub fn asset_name(&self) -> &str {
        &self.asset_name
    }

    pub fn load_count(&self) -> usize {
        self.load_count.get()
    }

    pub fn is_loaded(&self) -> bool {
        matches!(*self.state.borrow(), CacheState::Loaded(_))
    }

    /// Drop the loaded map; the next lookup reloads it
    pub fn invalidate(&self) {
        *self.state.borrow_mut() = CacheState::Empty;
    }

    /// Loaded map, loading synchronously from the content source when empty
    fn loaded(&self) -> Arc<LoadedDefinitions> {
        if let CacheState::Loaded(map) = &*self.state.borrow() {
            return Arc::clone(map);
        }

        self.load_count.set(self.load_count.get() + 1);
        let map: LoadedDefinitions = match self.source.load_definitions(&self.asset_name) {
            Ok(definitions) => {
                tracing::info!(
                    asset = %self.asset_name,
                    count = definitions.len(),
                    "Loaded sprite definitions"
                );
                definitions
                    .into_iter()
                    .map(|(id, def)| (id, Arc::new(def)))
                    .collect()
            }
            Err(e) => {
                tracing::warn!(
                    asset = %self.asset_name,
                    error = %e,
                    "Failed to load sprite definitions"
                );
                LoadedDefinitions::new()
            }
        };

        let map = Arc::new(map);
        *self.state.borrow_mut() = CacheState::Loaded(Arc::clone(&map));
        map
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Host notifications
    // ═══════════════════════════════════════════════════════════════════════

    /// "Asset requested": provide this plugin's asset from its data file
    pub fn handle_asset_requested(&self, request: &mut AssetRequest) {
        if request.is_for(&self.asset_name) {
            request.load_from_file(self.data_file.clone());
        }
    }

    /// "Assets invalidated": drop the cache if this plugin's asset is among `names`
    pub fn handle_assets_invalidated(&self, names: &[String]) {
        if names.iter().any(|name| name.eq_ignore_ascii_case(&self.asset_name)) {
            tracing::info!(asset = %self.asset_name, "Sprite definitions invalidated");
            self.invalidate();
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Lookup
    // ═══════════════════════════════════════════════════════════════════════

    /// Get a valid definition by id
    pub fn try_get_definition(&self, id: &str) -> Option<Arc<TasDefinition>> {
        lookup_valid(&self.loaded(), id)
    }

    /// Valid definitions for `ids`, skipping unknown and invalid ids
    pub fn definitions<I>(&self, ids: I) -> impl Iterator<Item = Arc<TasDefinition>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let map = self.loaded();
        ids.into_iter()
            .filter_map(move |id| lookup_valid(&map, id.as_ref()))
    }

    /// Wrap a valid definition in a fresh spawn context at `position`
    pub fn try_get_context(&self, id: &str, position: Vec2) -> Option<SpawnContext> {
        self.try_get_definition(id)
            .map(|def| SpawnContext::new(def, position))
    }
}

impl<S: ContentSource + 'static> DefinitionCache<S> {
    /// Subscribe the cache's two asset handlers with the host.
    ///
    /// Handlers hold a weak reference; they become no-ops once the cache is dropped.
    pub fn register<R: AssetEventRegistry + ?Sized>(cache: &Rc<Self>, registry: &R) {
        let weak: Weak<Self> = Rc::downgrade(cache);
        registry.subscribe_asset_requested(Box::new(move |request| {
            if let Some(cache) = weak.upgrade() {
                cache.handle_asset_requested(request);
            }
        }));

        let weak: Weak<Self> = Rc::downgrade(cache);
        registry.subscribe_assets_invalidated(Box::new(move |names| {
            if let Some(cache) = weak.upgrade() {
                cache.handle_assets_invalidated(names);
            }
        }));
    }
}

fn lookup_valid(map: &LoadedDefinitions, id: &str) -> Option<Arc<TasDefinition>> {
    let def = map.get(id)?;
    if def.is_valid() {
        Some(Arc::clone(def))
    } else {
        tracing::debug!(
            id,
            frames = def.frames,
            interval = def.interval,
            "Skipping invalid sprite definition"
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{ConfigError, DefinitionMap};

    const ASSET: &str = "Example.Mod/TAS";

    struct MapSource {
        map: DefinitionMap,
        loads: Cell<usize>,
        fail: Cell<bool>,
    }

    impl ContentSource for MapSource {
        fn load_definitions(&self, asset_name: &str) -> Result<DefinitionMap, ConfigError> {
            assert_eq!(asset_name, ASSET);
            self.loads.set(self.loads.get() + 1);
            if self.fail.get() {
                return Err(ConfigError::UnsupportedFormat {
                    path: PathBuf::from("broken.txt"),
                });
            }
            Ok(self.map.clone())
        }
    }

    fn make_def(frames: i32, interval: f32) -> TasDefinition {
        TasDefinition {
            frames,
            interval,
            ..Default::default()
        }
    }

    fn make_cache() -> DefinitionCache<MapSource> {
        let mut map = DefinitionMap::new();
        map.insert("good".to_string(), make_def(4, 100.0));
        map.insert("also_good".to_string(), make_def(1, 16.0));
        map.insert("no_frames".to_string(), make_def(0, 100.0));
        map.insert("no_interval".to_string(), make_def(4, 0.0));
        let source = MapSource {
            map,
            loads: Cell::new(0),
            fail: Cell::new(false),
        };
        DefinitionCache::new(ASSET, "assets/tas.json", source)
    }

    #[test]
    fn test_lazy_load_on_first_lookup() {
        let cache = make_cache();
        assert!(!cache.is_loaded());
        assert_eq!(cache.load_count(), 0);

        assert!(cache.try_get_definition("good").is_some());
        assert!(cache.try_get_definition("also_good").is_some());
        assert!(cache.is_loaded());
        assert_eq!(cache.load_count(), 1);
        assert_eq!(cache.source.loads.get(), 1);
    }

    #[test]
    fn test_invalid_definitions_never_returned() {
        let cache = make_cache();
        assert!(cache.try_get_definition("no_frames").is_none());
        assert!(cache.try_get_definition("no_interval").is_none());
        assert!(cache.try_get_definition("missing").is_none());
        assert!(cache.try_get_context("no_frames", Vec2::ZERO).is_none());

        let ids = ["good", "no_frames", "missing", "no_interval", "also_good"];
        let found: Vec<Arc<TasDefinition>> = cache.definitions(ids).collect();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|def| def.is_valid()));
    }

    #[test]
    fn test_matching_invalidation_forces_reload() {
        let cache = make_cache();
        cache.try_get_definition("good");

        cache.handle_assets_invalidated(&["example.mod/tas".to_string()]);
        assert!(!cache.is_loaded());
        assert_eq!(cache.load_count(), 1);

        cache.try_get_definition("good");
        assert_eq!(cache.load_count(), 2);
    }

    #[test]
    fn test_unrelated_invalidation_keeps_cache() {
        let cache = make_cache();
        cache.try_get_definition("good");

        cache.handle_assets_invalidated(&["Data/Objects".to_string(), "Other.Mod/TAS".to_string()]);
        cache.try_get_definition("good");
        assert_eq!(cache.load_count(), 1);
    }

    #[test]
    fn test_asset_request_only_claims_own_asset() {
        let cache = make_cache();

        let mut own = AssetRequest::new(ASSET);
        cache.handle_asset_requested(&mut own);
        assert_eq!(own.source_file(), Some(&PathBuf::from("assets/tas.json")));

        let mut other = AssetRequest::new("Data/Objects");
        cache.handle_asset_requested(&mut other);
        assert_eq!(other.source_file(), None);
    }

    #[test]
    fn test_failed_load_behaves_as_empty_until_invalidated() {
        let cache = make_cache();
        cache.source.fail.set(true);

        assert!(cache.try_get_definition("good").is_none());
        assert!(cache.try_get_definition("good").is_none());
        assert_eq!(cache.load_count(), 1);

        cache.source.fail.set(false);
        cache.handle_assets_invalidated(&[ASSET.to_string()]);
        assert!(cache.try_get_definition("good").is_some());
        assert_eq!(cache.load_count(), 2);
    }

    #[test]
    fn test_context_wraps_shared_definition() {
        let cache = make_cache();
        let a = cache.try_get_context("good", Vec2::new(64.0, 64.0)).unwrap();
        let b = cache.try_get_context("good", Vec2::ZERO).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.position(), Vec2::new(64.0, 64.0));
        assert_eq!(a.definition().frames, 4);
        assert_eq!(a.spawned_count(), 0);
    }
}
