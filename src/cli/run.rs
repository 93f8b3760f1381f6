use anyhow::Result;
use tracing::info;

use super::collect::collect_batch;
use super::commands::SubmitArgs;
use super::context::CliContext;
use super::submit::{submit_batch, validate_thread_url};
use crate::table;

/// Dispatch the whole table, then collect every reply. The phases never
/// interleave; a fail-fast dispatch error ends the run before collection.
pub async fn cmd_run(args: SubmitArgs, ctx: &CliContext) -> Result<()> {
    validate_thread_url(&args.thread_url)?;
    let prompts = table::read_prompts(&args.csv, args.column.as_deref())?;
    info!(csv = %args.csv.display(), prompts = prompts.len(), "Loaded prompts");

    let controller = ctx.controller(args.new_thread_per_prompt).await?;
    let records = submit_batch(&controller, &args, &prompts).await?;
    collect_batch(&controller, &args.csv, records).await?;
    Ok(())
}
