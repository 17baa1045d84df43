//! services/client/src/pages/state.rs
//!
//! Defines the client's shared state.

use std::sync::Arc;

use podcast_muse_core::ports::{BackendService, KeyValueStore, MediaGenerator};

use crate::adapters::{FileStore, HttpGateway, SimulatedGenerator};
use crate::config::Config;
use crate::error::ClientError;

//=========================================================================================
// AppState (Shared Across All Pages)
//=========================================================================================

/// The shared client state, created once at startup and handed to every page.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn BackendService>,
    pub store: Arc<dyn KeyValueStore>,
    pub generator: Arc<dyn MediaGenerator>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the file store, the REST gateway and the simulated generator
    /// from `config`.
    pub fn from_config(config: Arc<Config>) -> Result<Self, ClientError> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.storage_path.clone()));
        let backend = Arc::new(HttpGateway::new(
            &config.api_base_url,
            config.request_timeout,
            store.clone(),
        )?);
        let generator = Arc::new(SimulatedGenerator::new(config.stage_timings));

        Ok(Self {
            backend,
            store,
            generator,
            config,
        })
    }
}
