use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use cdp_adapter::ChromiumSurface;
use tracing::warn;

use crate::config::Config;
use crate::controller::ConversationController;
use crate::session::Session;

pub struct CliContext {
    config: Arc<Config>,
    config_path: PathBuf,
}

impl CliContext {
    pub fn new(config: Config, config_path: PathBuf) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
        }
    }

    /// Attach to the browser and build a controller around a fresh session.
    pub async fn controller(
        &self,
        new_thread_per_prompt: bool,
    ) -> Result<ConversationController<ChromiumSurface>> {
        let mut settings = self
            .config
            .controller_settings()
            .with_context(|| format!("Invalid settings in {}", self.config_path.display()))?;
        settings.new_thread_per_prompt = new_thread_per_prompt;

        let cdp = self.config.cdp_config();
        let hint = cdp.launch_hint();
        let surface = match ChromiumSurface::connect(cdp).await {
            Ok(surface) => surface,
            Err(err) => {
                warn!("Start the browser with remote debugging enabled, then log in:");
                warn!("  {}", hint);
                return Err(err).context("Failed to attach to the browser");
            }
        };

        Ok(ConversationController::new(Session::new(surface), settings))
    }
}
