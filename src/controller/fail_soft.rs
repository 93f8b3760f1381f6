use cdp_adapter::Surface;
use chatrelay_core_types::ConversationRecord;
use tracing::{error, info, instrument, warn};

use super::dispatch::{preview, DispatchCursor};
use super::ConversationController;
use crate::metrics;

impl<S: Surface> ConversationController<S> {
    /// Recovering variant of [`dispatch`](Self::dispatch).
    ///
    /// A prompt that fails is recorded with its error and no link, the
    /// session is cleared and returned to `thread_url`, and the batch goes on.
    /// Always yields exactly one record per prompt.
    #[instrument(skip_all, fields(thread_url = %thread_url, prompts = prompts.len()))]
    pub async fn dispatch_fail_soft<P>(
        &self,
        thread_url: &str,
        prompts: &[P],
    ) -> Vec<ConversationRecord>
    where
        P: AsRef<str>,
    {
        let mut cursor = DispatchCursor::default();
        let mut records = Vec::with_capacity(prompts.len());
        let mut failures = 0usize;

        for (index, prompt) in prompts.iter().enumerate() {
            let prompt = prompt.as_ref();
            let occurrence = cursor.occurrence(prompt);
            let mut record = ConversationRecord::new(prompt);

            let outcome = self
                .submit_memoized(thread_url, prompt, occurrence, &mut cursor)
                .await;
            let failure = match outcome {
                Ok(submission) => record
                    .mark_dispatched(submission.link, submission.submitted_at)
                    .err()
                    .map(|err| err.to_string()),
                Err(err) => Some(err.to_string()),
            };

            if let Some(cause) = failure {
                failures += 1;
                metrics::record_dispatch_failure();
                warn!(index, prompt = %preview(prompt), error = %cause, "dispatch failed; recovering session");
                record.mark_failed(cause);

                if let Err(err) = self.session.reset().await {
                    error!(error = %err, "session reset failed");
                }
                cursor.positioned = false;
            }
            records.push(record);
        }

        info!(
            dispatched = records.len() - failures,
            failed = failures,
            "fail-soft dispatch complete"
        );
        records
    }
}
