use super::collect::cmd_collect;
use super::env::CliArgs;
use super::export::cmd_export;
use super::run::cmd_run;
use super::submit::cmd_submit;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Submit(args) => cmd_submit(args, ctx).await,
        Commands::Collect(args) => cmd_collect(args, ctx).await,
        Commands::Run(args) => cmd_run(args, ctx).await,
        Commands::Export(args) => cmd_export(args).await,
    }
}
