use anyhow::{Context, Result};

use super::commands::ExportArgs;
use crate::archive;

pub async fn cmd_export(args: ExportArgs) -> Result<()> {
    let summary = archive::export_archive(&args.archive, args.output.as_deref(), &args.prefix)
        .await
        .with_context(|| format!("Failed to export {}", args.archive.display()))?;
    println!(
        "Extracted messages saved to {}, num of conversations: {}",
        summary.output.display(),
        summary.conversations
    );
    Ok(())
}
