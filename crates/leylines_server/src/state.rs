//! Shared handler state.
//!
//! # Responsibility
//! - Carry the process-wide store handle into every handler.
//! - Move blocking SQLite work off the async runtime.
//!
//! # Invariants
//! - Store closures run on tokio's blocking pool, never on a runtime worker.

use crate::error::ApiError;
use leylines_core::{ServiceResult, Store};
use log::error;
use rusqlite::Connection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Runs one use-case against the store on the blocking thread pool.
    pub async fn run<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> ServiceResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        match tokio::task::spawn_blocking(move || store.with_conn(op)).await {
            Ok(result) => result.map_err(ApiError::from),
            Err(err) => {
                error!(
                    "event=store_task module=api status=error error_code=join_failed error={}",
                    err
                );
                Err(ApiError::internal())
            }
        }
    }
}
