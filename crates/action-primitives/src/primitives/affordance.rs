//! Affordance-present completion signal

use std::time::Duration;

use cdp_adapter::{Selector, Surface};
use tracing::{debug, info, instrument, warn};

use crate::{
    errors::ActionError,
    waiting::{await_predicate, PollError, PollSpec},
};

/// Wait for a generated reply to finish and return its text.
///
/// The reply `container` must appear within `container_timeout`, otherwise
/// [`ActionError::AnchorNotFound`] is returned. Completion is then detected by
/// polling for the `affordance` control (rendered only once generation ends)
/// inside or after the latest container; controls of earlier finished turns
/// do not count. Once it shows up the text of the latest container is
/// returned. A reply that never completes within `spec.timeout` yields
/// `Ok(None)`.
#[instrument(skip_all, fields(container = %container, affordance = %affordance))]
pub async fn await_affordance(
    surface: &dyn Surface,
    container: &Selector,
    affordance: &Selector,
    container_timeout: Duration,
    spec: PollSpec,
) -> Result<Option<String>, ActionError> {
    surface.find(container, container_timeout).await?;
    debug!("reply container present; waiting for completion affordance");

    let outcome = await_predicate(
        move || async move {
            let present = surface.exists_after_last(container, affordance).await?;
            Ok::<_, ActionError>(present.then_some(()))
        },
        spec,
    )
    .await;

    match outcome {
        Ok(()) => {
            let latest = surface.find(container, Duration::ZERO).await?;
            let text = surface.text(&latest).await?;
            info!(chars = text.chars().count(), "reply complete");
            Ok(Some(text))
        }
        Err(PollError::Timeout { waited }) => {
            warn!(?waited, "reply did not complete in time");
            Ok(None)
        }
        Err(PollError::Check(err)) => Err(err),
    }
}
