//! Deliver primitive - paste a prompt and trigger submission

use std::time::Duration;

use cdp_adapter::{Selector, Surface};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{errors::ActionError, primitives::UrlAdvance};

/// How a pasted prompt is submitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitVia {
    /// Newline on the input field.
    #[default]
    Enter,
    /// Click the submit control.
    Button,
}

/// Elements involved in delivering a prompt.
#[derive(Clone, Debug)]
pub struct DeliveryTargets {
    pub input: Selector,
    pub submit: Selector,
    pub via: SubmitVia,
    /// Bound for locating the input field and the submit control.
    pub find_timeout: Duration,
}

/// Paste `text` into the input field and trigger submission.
///
/// The page URL is captured right before the trigger, so the returned
/// [`UrlAdvance`] observes only the transition caused by this submission.
#[instrument(skip_all, fields(chars = text.chars().count(), via = ?targets.via))]
pub async fn deliver_prompt(
    surface: &dyn Surface,
    targets: &DeliveryTargets,
    text: &str,
) -> Result<UrlAdvance, ActionError> {
    if text.trim().is_empty() {
        return Err(ActionError::Internal("Prompt text cannot be empty".to_string()));
    }

    debug!(selector = %targets.input, "locating input field");
    let input = surface.find(&targets.input, targets.find_timeout).await?;
    surface.type_text(&input, text).await?;

    match targets.via {
        SubmitVia::Enter => {
            let advance = UrlAdvance::capture(surface).await?;
            surface.submit(&input).await?;
            Ok(advance)
        }
        SubmitVia::Button => {
            debug!(selector = %targets.submit, "locating submit control");
            let button = surface.find(&targets.submit, targets.find_timeout).await?;
            let advance = UrlAdvance::capture(surface).await?;
            surface.click(&button).await?;
            Ok(advance)
        }
    }
}
