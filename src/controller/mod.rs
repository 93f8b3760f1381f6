//! Conversation dispatch-and-collection controller
//!
//! Two phases over one owned [`Session`]:
//! - [`ConversationController::dispatch`] submits prompts in order into a
//!   thread and records the link each submission produced (fail-fast), with
//!   [`ConversationController::dispatch_fail_soft`] as the recovering variant;
//! - [`ConversationController::collect`] revisits every link and extracts the
//!   finished reply, recording per-record failures and moving on.
//!
//! Both phases go through a [`FingerprintCache`], so re-running a batch on
//! the same controller skips work that already succeeded.

mod cache;
mod collect;
mod dispatch;
mod fail_soft;

use std::time::Duration;

use action_primitives::{DeliveryTargets, PollSpec, SubmitVia};
use cdp_adapter::{Selector, Surface};

use crate::session::Session;

pub use cache::{CacheError, FingerprintCache};

pub(crate) const DISPATCH_OP: &str = "dispatch.submit";
pub(crate) const COLLECT_OP: &str = "collect.reply";

/// Selectors and time bounds used by both phases.
#[derive(Clone, Debug)]
pub struct ControllerSettings {
    pub input: Selector,
    pub submit: Selector,
    pub reply: Selector,
    pub affordance: Selector,
    pub submit_via: SubmitVia,
    /// Lookup bound for the input field and the submit control.
    pub default_wait: Duration,
    /// Lookup bound for the reply container.
    pub response_wait: Duration,
    /// Bound for the completion affordance to appear.
    pub completion: Duration,
    pub url_advance: Duration,
    pub poll_interval: Duration,
    /// Pause between consecutive submissions.
    pub dispatch_pause: Duration,
    /// Return to the thread URL before every prompt instead of only once.
    pub new_thread_per_prompt: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            input: Selector::xpath(r#"//*[@id="prompt-textarea"]"#),
            submit: Selector::xpath(r#"//button[@data-testid="send-button"]"#),
            reply: Selector::css(r#"div[data-message-author-role="assistant"] div.markdown"#),
            affordance: Selector::css(r#"button[data-testid="copy-turn-action-button"]"#),
            submit_via: SubmitVia::Enter,
            default_wait: Duration::from_secs(10),
            response_wait: Duration::from_secs(30),
            completion: Duration::from_secs(600),
            url_advance: Duration::from_secs(30),
            poll_interval: Duration::from_millis(500),
            dispatch_pause: Duration::from_secs(1),
            new_thread_per_prompt: false,
        }
    }
}

impl ControllerSettings {
    pub(crate) fn delivery_targets(&self) -> DeliveryTargets {
        DeliveryTargets {
            input: self.input.clone(),
            submit: self.submit.clone(),
            via: self.submit_via,
            find_timeout: self.default_wait,
        }
    }

    pub(crate) fn url_advance_spec(&self) -> PollSpec {
        PollSpec::new(self.poll_interval, self.url_advance)
    }

    pub(crate) fn completion_spec(&self) -> PollSpec {
        PollSpec::new(self.poll_interval, self.completion)
    }
}

pub struct ConversationController<S> {
    session: Session<S>,
    cache: FingerprintCache,
    settings: ControllerSettings,
}

impl<S: Surface> ConversationController<S> {
    pub fn new(session: Session<S>, settings: ControllerSettings) -> Self {
        Self {
            session,
            cache: FingerprintCache::new(),
            settings,
        }
    }

    pub fn cache(&self) -> &FingerprintCache {
        &self.cache
    }
}
