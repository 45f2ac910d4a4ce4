use std::sync::Arc;

use rolodex_core::Flash;
use rolodex_store::Directory;

/// Shared handler state.
///
/// The flash slot is process-wide rather than per client: a notice posted by
/// one submission is delivered to whichever request reads the list next.
#[derive(Clone)]
pub(crate) struct AppState {
    directory: Arc<Directory>,
    flash: Arc<Flash>,
    endpoints: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(directory: Directory, endpoints: Vec<String>) -> Self {
        Self {
            directory: Arc::new(directory),
            flash: Arc::new(Flash::new()),
            endpoints: Arc::new(endpoints),
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn flash(&self) -> &Flash {
        &self.flash
    }

    pub fn endpoints(&self) -> Arc<Vec<String>> {
        self.endpoints.clone()
    }
}
