use std::env;
use std::fs as stdfs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

pub fn load_local_env_overrides() -> Option<EnvFileReport> {
    load_env_file(Path::new("config/local.env"))
}

/// What reading a `KEY=value` file did. Produced before logging is set up,
/// so it is logged afterwards through [`EnvFileReport::log`].
#[derive(Debug)]
pub struct EnvFileReport {
    pub path: PathBuf,
    pub applied: usize,
    /// 1-based numbers of lines without a `KEY=value` shape.
    pub invalid_lines: Vec<usize>,
    pub read_error: Option<String>,
}

impl EnvFileReport {
    pub fn log(&self) {
        let path = self.path.display();
        if let Some(err) = &self.read_error {
            warn!(%path, %err, "failed to read local.env overrides");
            return;
        }
        for line in &self.invalid_lines {
            warn!(%path, line, "invalid local.env entry; skipping");
        }
        info!(%path, applied = self.applied, "Loaded environment overrides from local.env");
    }
}

/// Set `KEY=value` pairs from `path` without overriding variables that are
/// already present in the environment. `None` when the file does not exist.
pub fn load_env_file(path: &Path) -> Option<EnvFileReport> {
    if !path.exists() {
        return None;
    }

    let mut report = EnvFileReport {
        path: path.to_path_buf(),
        applied: 0,
        invalid_lines: Vec::new(),
        read_error: None,
    };
    match stdfs::read_to_string(path) {
        Ok(contents) => {
            for (idx, raw_line) in contents.lines().enumerate() {
                let line = raw_line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let Some((key, value)) = line.split_once('=') else {
                    report.invalid_lines.push(idx + 1);
                    continue;
                };
                let key = key.trim();
                if key.is_empty() {
                    report.invalid_lines.push(idx + 1);
                    continue;
                }
                if env::var(key).is_ok() {
                    continue;
                }
                env::set_var(key, unescape_value(value.trim()));
                report.applied += 1;
            }
        }
        Err(err) => report.read_error = Some(err.to_string()),
    }
    Some(report)
}

/// Stderr output plus a daily-rolling JSON log in `log_dir`. The returned
/// guard flushes the file writer when dropped.
pub fn init_logging(level: &str, debug: bool, log_dir: &Path) -> Result<WorkerGuard> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    stdfs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "chatrelay.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    Ok(guard)
}

pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
    pub found: bool,
}

impl LoadedConfig {
    /// Logging starts after the configuration is read, so the origin is
    /// reported separately.
    pub fn log_origin(&self) {
        if self.found {
            info!("Loaded configuration from: {}", self.path.display());
        } else {
            warn!(
                "Config file not found, using defaults: {}",
                self.path.display()
            );
        }
    }
}

pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => {
            // Priority: ./config/chatrelay.yaml > ~/.config/chatrelay/config.yaml
            let local_config = PathBuf::from("config/chatrelay.yaml");
            if local_config.exists() {
                local_config
            } else {
                let mut path = dirs::config_dir().context("Failed to get config directory")?;
                path.push("chatrelay");
                path.push("config.yaml");
                path
            }
        }
    };

    let found = config_path.exists();
    let mut config = if found {
        let content = fs::read_to_string(&config_path)
            .await
            .context("Failed to read config file")?;
        Config::from_yaml_str(&content).context("Failed to parse config file")?
    } else {
        Config::default()
    };
    config
        .apply_env_overrides()
        .context("Invalid CHATRELAY_* environment override")?;

    Ok(LoadedConfig {
        config,
        path: config_path,
        found,
    })
}

fn unescape_value(value: &str) -> String {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        let inner = &value[1..value.len() - 1];
        inner
            .replace("\\\"", "\"")
            .replace("\\n", "\n")
            .replace("\\r", "\r")
            .replace("\\t", "\t")
    } else {
        value.to_string()
    }
}
