//! Shared application state
//!
//! Built once at startup and cloned into every request. Only the store has
//! interior mutability.

use std::sync::Arc;

use jsondiff_core::errors::{ExError, ExResult};
use jsondiff_core::{DiffStore, IdGenerator, MemoryStore, OriginPolicy, PageRenderer};
use jsondiff_store::SqliteDiffStore;

use crate::config::{DatabaseTarget, ServerConfig, DEFAULT_MAX_BODY_BYTES};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DiffStore>,
    pub ids: IdGenerator,
    pub policy: Arc<dyn OriginPolicy>,
    pub renderer: Arc<PageRenderer>,
    /// Body limit applied to `/_save`
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DiffStore>,
        ids: IdGenerator,
        policy: Arc<dyn OriginPolicy>,
        renderer: PageRenderer,
    ) -> Self {
        Self {
            store,
            ids,
            policy,
            renderer: Arc::new(renderer),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Open the configured store and assemble the rest from settings
    ///
    /// # Errors
    ///
    /// Returns `Config` for a bad origin rule, or the store's error if the
    /// database cannot be opened or migrated.
    pub fn from_config(config: &ServerConfig) -> ExResult<Self> {
        let policy = config.origin_policy().map_err(ExError::from)?;

        let store: Arc<dyn DiffStore> = match config.database_target() {
            DatabaseTarget::Memory => {
                tracing::warn!("using in-memory store, saved diffs will not survive a restart");
                Arc::new(MemoryStore::new())
            }
            DatabaseTarget::File(path) => {
                tracing::info!(database = %path.display(), "opening sqlite store");
                Arc::new(SqliteDiffStore::open(&path)?)
            }
        };

        Ok(Self::new(
            store,
            IdGenerator::new(
                Arc::new(jsondiff_core::ThreadRngSource),
                config.max_id_attempts,
            ),
            Arc::new(policy),
            PageRenderer::new(config.page_context()),
        )
        .with_max_body_bytes(config.max_body_bytes))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("ids", &self.ids)
            .field("renderer", &self.renderer)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish_non_exhaustive()
    }
}
