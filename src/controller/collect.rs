use action_primitives::{await_affordance, ActionError};
use cdp_adapter::Surface;
use chatrelay_core_types::ConversationRecord;
use tracing::{debug, info, instrument, warn};

use super::{ConversationController, COLLECT_OP};
use crate::metrics;

impl<S: Surface> ConversationController<S> {
    /// Visit every dispatched link and extract its finished reply.
    ///
    /// Records without a link, or with a reply already set, are passed
    /// through untouched. A reply that never completes leaves `reply` absent;
    /// any other failure is stored in the record's `error` and the loop moves
    /// on to the next record.
    #[instrument(skip_all, fields(records = records.len()))]
    pub async fn collect(&self, mut records: Vec<ConversationRecord>) -> Vec<ConversationRecord> {
        let (mut collected, mut missing) = (0usize, 0usize);

        for (index, record) in records.iter_mut().enumerate() {
            let Some(link) = record.link().map(str::to_string) else {
                debug!(index, "no link; skipping");
                continue;
            };
            if record.reply().is_some() {
                debug!(index, %link, "reply already present; skipping");
                continue;
            }

            match self.collect_memoized(&link).await {
                Ok(Some(reply)) => match record.set_reply(reply) {
                    Ok(()) => {
                        collected += 1;
                        metrics::record_reply_collected();
                    }
                    Err(err) => {
                        missing += 1;
                        metrics::record_reply_missing();
                        record.mark_collect_failed(err.to_string());
                    }
                },
                Ok(None) => {
                    missing += 1;
                    metrics::record_reply_missing();
                    warn!(index, %link, "no completed reply before timeout");
                }
                Err(err) => {
                    missing += 1;
                    metrics::record_reply_missing();
                    warn!(index, %link, error = %err, "collection failed; continuing");
                    record.mark_collect_failed(err.to_string());
                }
            }
        }

        info!(collected, missing, "collection complete");
        records
    }

    async fn collect_memoized(&self, link: &str) -> Result<Option<String>, ActionError> {
        let (reply, _) = self
            .cache
            .memoized(COLLECT_OP, &(link,), self.collect_live(link))
            .await?;
        Ok(reply)
    }

    async fn collect_live(&self, link: &str) -> Result<Option<String>, ActionError> {
        self.session.open(link).await?;
        let settings = &self.settings;
        await_affordance(
            self.session.surface(),
            &settings.reply,
            &settings.affordance,
            settings.response_wait,
            settings.completion_spec(),
        )
        .await
    }
}
