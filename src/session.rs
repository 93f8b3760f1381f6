use cdp_adapter::{same_location, Surface};
use tracing::{debug, info, warn};

use action_primitives::ActionError;

/// The single browser tab a controller drives.
///
/// Owned by the controller for the lifetime of a batch; there is no shared
/// or global handle.
pub struct Session<S> {
    surface: S,
}

impl<S: Surface> Session<S> {
    pub fn new(surface: S) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Navigate to `url` unless the tab is already there. Returns whether a
    /// navigation happened.
    pub async fn ensure_at(&self, url: &str) -> Result<bool, ActionError> {
        let current = self.surface.current_url().await?;
        if same_location(url, &current) {
            debug!(%url, "session already at target");
            return Ok(false);
        }
        info!(from = %current, to = %url, "navigating session");
        self.surface.navigate(url).await?;
        Ok(true)
    }

    pub async fn open(&self, url: &str) -> Result<(), ActionError> {
        self.surface.navigate(url).await.map_err(ActionError::from)
    }

    /// Discard cookies and reload. Recovery only.
    pub async fn reset(&self) -> Result<(), ActionError> {
        warn!("resetting browser session state");
        self.surface.clear_session().await.map_err(ActionError::from)
    }
}
