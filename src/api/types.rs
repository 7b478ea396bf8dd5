use std::sync::Arc;

use tokio::sync::Mutex;

use crate::controller::SessionController;
use crate::extraction::PagePreviewSource;

/// Shared handler state.
///
/// The controller sits behind a single async mutex: one user action runs to
/// completion at a time, including the blocking agent call, which matches
/// the request-per-action execution model. The preview renderer is a
/// stateless service and bypasses the session lock.
#[derive(Clone)]
pub struct ApiContext {
    pub controller: Arc<Mutex<SessionController>>,
    pub preview: Arc<dyn PagePreviewSource>,
}

impl ApiContext {
    pub fn new(controller: SessionController, preview: Arc<dyn PagePreviewSource>) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            preview,
        }
    }
}
