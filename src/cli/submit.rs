use std::path::Path;

use anyhow::{bail, Context, Result};
use cdp_adapter::Surface;
use chatrelay_core_types::ConversationRecord;
use tracing::info;
use url::Url;

use super::commands::SubmitArgs;
use super::context::CliContext;
use crate::controller::ConversationController;
use crate::table;

pub async fn cmd_submit(args: SubmitArgs, ctx: &CliContext) -> Result<()> {
    validate_thread_url(&args.thread_url)?;
    let prompts = table::read_prompts(&args.csv, args.column.as_deref())?;
    info!(csv = %args.csv.display(), prompts = prompts.len(), "Loaded prompts");

    let controller = ctx.controller(args.new_thread_per_prompt).await?;
    submit_batch(&controller, &args, &prompts).await?;
    Ok(())
}

pub(crate) fn validate_thread_url(raw: &str) -> Result<()> {
    let url = Url::parse(raw).with_context(|| format!("Invalid thread URL '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Thread URL must be http(s): {raw}");
    }
    Ok(())
}

/// Dispatch `prompts` and write the submitted table.
///
/// In fail-fast mode the records completed before a failing prompt are
/// written before the failure is returned.
pub(crate) async fn submit_batch<S: Surface>(
    controller: &ConversationController<S>,
    args: &SubmitArgs,
    prompts: &[String],
) -> Result<Vec<ConversationRecord>> {
    let output = table::output_path(&args.csv, table::SUBMITTED_SUFFIX);

    if args.fail_soft {
        let records = controller
            .dispatch_fail_soft(&args.thread_url, prompts)
            .await;
        write_submitted(&output, &records)?;
        return Ok(records);
    }

    match controller.dispatch(&args.thread_url, prompts).await {
        Ok(records) => {
            write_submitted(&output, &records)?;
            Ok(records)
        }
        Err(failure) => {
            write_submitted(&output, &failure.completed)?;
            let written = failure.completed.len();
            Err(anyhow::Error::new(failure)
                .context(format!("{written} completed records written to {}", output.display())))
        }
    }
}

fn write_submitted(output: &Path, records: &[ConversationRecord]) -> Result<()> {
    table::write_submitted(output, records)?;
    info!(output = %output.display(), records = records.len(), "Submitted table written");
    Ok(())
}
