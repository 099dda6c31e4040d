//! File-backed content pipeline
//!
//! Stand-in for the host's asset system when running outside the game:
//!
//! ```text
//! load_definitions("Mod/TAS")
//!        │
//!        ▼
//! asset-requested handlers ──► AssetRequest { source_file }
//!        │
//!        ▼
//! definitions::load_file(content_root / source_file)
//! ```
//!
//! [`FileContentPipeline::invalidate`] plays the role of the host's
//! "assets invalidated" broadcast.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use crate::definitions::{self, ConfigError, DefinitionMap};
use crate::host::{
    AssetEventRegistry, AssetRequest, AssetRequestedHandler, AssetsInvalidatedHandler,
    ContentSource,
};

pub struct FileContentPipeline {
    content_root: PathBuf,
    requested: RefCell<Vec<AssetRequestedHandler>>,
    invalidated: RefCell<Vec<AssetsInvalidatedHandler>>,
    loads: Cell<usize>,
}

impl FileContentPipeline {
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
            requested: RefCell::new(Vec::new()),
            invalidated: RefCell::new(Vec::new()),
            loads: Cell::new(0),
        }
    }

    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    /// Number of definition files read so far
    pub fn load_count(&self) -> usize {
        self.loads.get()
    }

    /// Broadcast that the named assets changed
    pub fn invalidate(&self, names: &[String]) {
        tracing::debug!(?names, "Invalidating assets");
        dispatch(&self.invalidated, |handler| handler(names));
    }

    /// Ask the subscribers which file provides `asset_name`
    fn resolve(&self, asset_name: &str) -> Option<PathBuf> {
        let mut request = AssetRequest::new(asset_name);
        dispatch(&self.requested, |handler| handler(&mut request));
        request
            .source_file()
            .map(|relative| self.content_root.join(relative))
    }
}

/// Call every handler in `slot` without holding its borrow.
///
/// Handlers may subscribe during dispatch; new handlers first run on the next
/// dispatch. A nested dispatch of the same list sees no handlers.
fn dispatch<H>(slot: &RefCell<Vec<H>>, mut call: impl FnMut(&H)) {
    let handlers = slot.take();
    for handler in &handlers {
        call(handler);
    }
    let mut slot = slot.borrow_mut();
    let added = std::mem::replace(&mut *slot, handlers);
    slot.extend(added);
}

impl std::fmt::Debug for FileContentPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileContentPipeline")
            .field("content_root", &self.content_root)
            .field("requested_handlers", &self.requested.borrow().len())
            .field("invalidated_handlers", &self.invalidated.borrow().len())
            .field("loads", &self.loads.get())
            .finish()
    }
}

impl AssetEventRegistry for FileContentPipeline {
    fn subscribe_asset_requested(&self, handler: AssetRequestedHandler) {
        self.requested.borrow_mut().push(handler);
    }

    fn subscribe_assets_invalidated(&self, handler: AssetsInvalidatedHandler) {
        self.invalidated.borrow_mut().push(handler);
    }
}

impl ContentSource for FileContentPipeline {
    fn load_definitions(&self, asset_name: &str) -> Result<DefinitionMap, ConfigError> {
        let path = self
            .resolve(asset_name)
            .ok_or_else(|| ConfigError::AssetNotProvided {
                name: asset_name.to_string(),
            })?;

        self.loads.set(self.loads.get() + 1);
        tracing::debug!(asset = asset_name, path = ?path, "Loading asset from file");
        definitions::load_file(&path)
    }
}
