//! URL-advance completion signal

use cdp_adapter::Surface;
use tracing::{debug, warn};

use crate::{
    errors::ActionError,
    waiting::{await_predicate, PollError, PollSpec},
};

/// Baseline URL captured immediately before a submission is triggered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlAdvance {
    baseline: String,
}

impl UrlAdvance {
    pub async fn capture(surface: &dyn Surface) -> Result<Self, ActionError> {
        let baseline = surface.current_url().await?;
        debug!(%baseline, "captured url baseline");
        Ok(Self { baseline })
    }

    pub fn baseline(&self) -> &str {
        &self.baseline
    }

    /// Wait until the surface reports a URL different from the baseline and
    /// return it. Fails with [`ActionError::WaitTimeout`] after `spec.timeout`.
    pub async fn wait(&self, surface: &dyn Surface, spec: PollSpec) -> Result<String, ActionError> {
        let baseline = self.baseline.as_str();
        let outcome = await_predicate(
            move || async move {
                let current = surface.current_url().await?;
                Ok::<_, ActionError>((current != baseline).then_some(current))
            },
            spec,
        )
        .await;

        match outcome {
            Ok(url) => {
                debug!(%url, "url advanced");
                Ok(url)
            }
            Err(PollError::Check(err)) => Err(err),
            Err(PollError::Timeout { waited }) => {
                warn!(baseline, ?waited, "url did not advance");
                Err(ActionError::WaitTimeout(format!(
                    "URL did not advance from {baseline} within {waited:?}"
                )))
            }
        }
    }
}
