use anyhow::Result;
use clap::Parser;
use tracing::{debug, error, info};

use super::context::CliContext;
use super::dispatch::dispatch;
use super::env::CliArgs;
use super::runtime::{init_logging, load_config, load_local_env_overrides, LoadedConfig};
use crate::metrics;

pub async fn run() -> Result<()> {
    let env_report = load_local_env_overrides();
    let cli = CliArgs::parse();

    let loaded_config = load_config(cli.config.as_ref()).await?;
    let _log_guard = init_logging(&cli.log_level, cli.debug, &loaded_config.config.log_dir.0)?;
    if let Some(report) = &env_report {
        report.log();
    }
    loaded_config.log_origin();

    info!(
        git = env!("GIT_HASH"),
        built = env!("BUILD_DATE"),
        "Starting chatrelay v{}",
        env!("CARGO_PKG_VERSION")
    );
    metrics::register_metrics();

    let LoadedConfig { config, path, .. } = loaded_config;
    let cli_context = CliContext::new(config, path);

    let result = dispatch(&cli, &cli_context).await;
    let summary = metrics::snapshot();
    info!(
        dispatched = summary.prompts_dispatched,
        dispatch_failures = summary.dispatch_failures,
        replies = summary.replies_collected,
        missing_replies = summary.replies_missing,
        cache_hits = summary.cache_hits,
        "run summary"
    );
    debug!("metrics exposition:\n{}", metrics::render());

    match result {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {:#}", err);
            Err(err)
        }
    }
}
