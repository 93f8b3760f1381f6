use anyhow::Result;
use cdp_adapter::Surface;
use chatrelay_core_types::ConversationRecord;
use tracing::info;

use super::commands::CollectArgs;
use super::context::CliContext;
use crate::controller::ConversationController;
use crate::table;

pub async fn cmd_collect(args: CollectArgs, ctx: &CliContext) -> Result<()> {
    let records = table::read_records(&args.csv)?;
    info!(csv = %args.csv.display(), records = records.len(), "Loaded submitted records");

    let controller = ctx.controller(false).await?;
    collect_batch(&controller, &args.csv, records).await?;
    Ok(())
}

/// Collect replies for `records` and write the response table next to `csv`.
pub(crate) async fn collect_batch<S: Surface>(
    controller: &ConversationController<S>,
    csv: &std::path::Path,
    records: Vec<ConversationRecord>,
) -> Result<Vec<ConversationRecord>> {
    let records = controller.collect(records).await;
    let output = table::output_path(csv, table::RESPONSE_SUFFIX);
    table::write_responses(&output, &records)?;

    let answered = records.iter().filter(|r| r.reply().is_some()).count();
    info!(
        output = %output.display(),
        records = records.len(),
        answered,
        "Response table written"
    );
    Ok(records)
}
