use std::sync::Arc;

use prospectflow_core::errors::{ExError, ExErrorKind, ExResult};
use prospectflow_core::EntityStore;

use crate::error::ApiError;

/// Shared handler state
///
/// The store is built once at startup and dropped at shutdown.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn EntityStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Run an engine command on the blocking pool
    ///
    /// Store calls take a mutex and may touch the disk, so they stay off
    /// the async workers.
    ///
    /// # Errors
    ///
    /// The command's own error, or `Internal` if the blocking task panicked.
    pub async fn run<T, F>(&self, command: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn EntityStore) -> ExResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let joined = tokio::task::spawn_blocking(move || command(store.as_ref())).await;
        match joined {
            Ok(result) => result.map_err(ApiError::from),
            Err(err) => Err(ApiError::from(
                ExError::new(ExErrorKind::Internal)
                    .with_message(format!("command task failed: {}", err)),
            )),
        }
    }
}
