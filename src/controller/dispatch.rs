use std::collections::HashMap;

use action_primitives::{deliver_prompt, ActionError};
use cdp_adapter::Surface;
use chatrelay_core_types::ConversationRecord;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use super::{ConversationController, DISPATCH_OP};
use crate::errors::DispatchFailure;
use crate::metrics;

/// Outcome of one accepted submission, as stored in the fingerprint cache.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Submission {
    pub link: String,
    pub submitted_at: DateTime<Local>,
}

/// Per-batch dispatch state.
#[derive(Default)]
pub(crate) struct DispatchCursor<'a> {
    /// Whether the session has been brought to the thread URL in this batch.
    pub positioned: bool,
    /// Submissions actually sent to the remote interface in this batch.
    pub sent: usize,
    occurrences: HashMap<&'a str, usize>,
}

impl<'a> DispatchCursor<'a> {
    /// How many identical prompts came earlier in the batch.
    pub fn occurrence(&mut self, prompt: &'a str) -> usize {
        let seen = self.occurrences.entry(prompt).or_insert(0);
        let occurrence = *seen;
        *seen += 1;
        occurrence
    }
}

impl<S: Surface> ConversationController<S> {
    /// Submit `prompts` in order into the thread at `thread_url`.
    ///
    /// Fail-fast: the first prompt that cannot be submitted aborts the batch
    /// and the returned [`DispatchFailure`] carries every record completed
    /// before it. Prompts already dispatched by this controller with the same
    /// thread URL are answered from the fingerprint cache without touching
    /// the surface.
    #[instrument(skip_all, fields(thread_url = %thread_url, prompts = prompts.len()))]
    pub async fn dispatch<P>(
        &self,
        thread_url: &str,
        prompts: &[P],
    ) -> Result<Vec<ConversationRecord>, DispatchFailure>
    where
        P: AsRef<str>,
    {
        let mut cursor = DispatchCursor::default();
        let mut records = Vec::with_capacity(prompts.len());

        for (index, prompt) in prompts.iter().enumerate() {
            let prompt = prompt.as_ref();
            let occurrence = cursor.occurrence(prompt);

            let dispatched = self
                .submit_memoized(thread_url, prompt, occurrence, &mut cursor)
                .await
                .and_then(|submission| {
                    let mut record = ConversationRecord::new(prompt);
                    record
                        .mark_dispatched(submission.link, submission.submitted_at)
                        .map_err(|err| ActionError::Internal(err.to_string()))?;
                    Ok(record)
                });

            match dispatched {
                Ok(record) => records.push(record),
                Err(source) => {
                    metrics::record_dispatch_failure();
                    warn!(
                        index,
                        prompt = %preview(prompt),
                        error = %source,
                        "dispatch failed; abandoning remaining prompts"
                    );
                    return Err(DispatchFailure {
                        completed: records,
                        failed_index: index,
                        total: prompts.len(),
                        source,
                    });
                }
            }
        }

        info!(dispatched = records.len(), "dispatch complete");
        Ok(records)
    }

    pub(crate) async fn submit_memoized<'a>(
        &self,
        thread_url: &str,
        prompt: &'a str,
        occurrence: usize,
        cursor: &mut DispatchCursor<'a>,
    ) -> Result<Submission, ActionError> {
        let key = (thread_url, prompt, occurrence);
        let (submission, from_cache) = self
            .cache
            .memoized(DISPATCH_OP, &key, self.submit_live(thread_url, prompt, cursor))
            .await?;

        if from_cache {
            debug!(link = %submission.link, "prompt already dispatched; reusing link");
        } else {
            metrics::record_dispatched();
        }
        Ok(submission)
    }

    async fn submit_live(
        &self,
        thread_url: &str,
        prompt: &str,
        cursor: &mut DispatchCursor<'_>,
    ) -> Result<Submission, ActionError> {
        if !cursor.positioned || self.settings.new_thread_per_prompt {
            self.session.ensure_at(thread_url).await?;
            cursor.positioned = true;
        }
        if cursor.sent > 0 && !self.settings.dispatch_pause.is_zero() {
            sleep(self.settings.dispatch_pause).await;
        }

        let surface = self.session.surface();
        let targets = self.settings.delivery_targets();
        cursor.sent += 1;
        let advance = deliver_prompt(surface, &targets, prompt).await?;
        let link = advance
            .wait(surface, self.settings.url_advance_spec())
            .await?;

        info!(%link, prompt = %preview(prompt), "prompt accepted");
        Ok(Submission {
            link,
            submitted_at: Local::now(),
        })
    }
}

pub(crate) fn preview(prompt: &str) -> String {
    const LIMIT: usize = 20;
    let mut chars = prompt.chars();
    let head: String = chars.by_ref().take(LIMIT).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
