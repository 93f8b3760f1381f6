//! Process configuration: browser attachment, timeouts, selectors, paths

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use action_primitives::SubmitVia;
use cdp_adapter::{CdpConfig, Selector};
use serde::{Deserialize, Serialize};

use crate::controller::ControllerSettings;
use crate::errors::RelayError;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserSettings,
    pub timeouts: TimeoutSettings,
    pub selectors: SelectorSettings,
    pub delivery: DeliverySettings,
    pub log_dir: LogDir,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Auto-detected when unset. Only used when no debug port is configured.
    pub executable: Option<PathBuf>,
    /// Remote-debugging port of an already running browser; `null` launches one.
    pub debug_port: Option<u16>,
    pub user_data_dir: PathBuf,
    pub headless: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            executable: None,
            debug_port: Some(9223),
            user_data_dir: PathBuf::from(".chatrelay-profile"),
            headless: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    pub default_wait_secs: u64,
    pub response_wait_secs: u64,
    pub completion_secs: u64,
    pub navigation_secs: u64,
    pub url_advance_secs: u64,
    pub poll_interval_ms: u64,
    pub dispatch_pause_ms: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            default_wait_secs: 10,
            response_wait_secs: 30,
            completion_secs: 600,
            navigation_secs: 3,
            url_advance_secs: 30,
            poll_interval_ms: 500,
            dispatch_pause_ms: 1_000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSettings {
    pub input: String,
    pub submit: String,
    pub reply: String,
    pub affordance: String,
}

impl Default for SelectorSettings {
    fn default() -> Self {
        Self {
            input: r#"//*[@id="prompt-textarea"]"#.to_string(),
            submit: r#"//button[@data-testid="send-button"]"#.to_string(),
            reply: r#"div[data-message-author-role="assistant"] div.markdown"#.to_string(),
            affordance: r#"button[data-testid="copy-turn-action-button"]"#.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliverySettings {
    pub submit_with: SubmitVia,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogDir(pub PathBuf);

impl Default for LogDir {
    fn default() -> Self {
        Self(PathBuf::from("data/logs"))
    }
}

impl Config {
    pub fn from_yaml_str(content: &str) -> Result<Self, RelayError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|err| RelayError::Config(err.to_string()))
    }

    /// Apply `CHATRELAY_*` variables from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), RelayError> {
        self.apply_overrides_with(|key| env::var(key).ok())
    }

    pub fn apply_overrides_with<F>(&mut self, lookup: F) -> Result<(), RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("CHATRELAY_DEBUG_PORT") {
            let raw = raw.trim();
            self.browser.debug_port = if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(raw.parse().map_err(|_| {
                    RelayError::Config(format!("CHATRELAY_DEBUG_PORT is not a port: '{raw}'"))
                })?)
            };
        }
        if let Some(raw) = lookup("CHATRELAY_BROWSER").filter(|v| !v.trim().is_empty()) {
            self.browser.executable = Some(PathBuf::from(raw.trim()));
        }
        if let Some(raw) = lookup("CHATRELAY_HEADLESS") {
            self.browser.headless =
                matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        if let Some(raw) = lookup("CHATRELAY_LOG_DIR").filter(|v| !v.trim().is_empty()) {
            self.log_dir = LogDir(PathBuf::from(raw.trim()));
        }
        Ok(())
    }

    pub fn cdp_config(&self) -> CdpConfig {
        let defaults = CdpConfig::default();
        CdpConfig {
            executable: self
                .browser
                .executable
                .clone()
                .unwrap_or(defaults.executable),
            user_data_dir: self.browser.user_data_dir.clone(),
            headless: self.browser.headless,
            debug_port: self.browser.debug_port,
            navigation_timeout_ms: self.timeouts.navigation_secs.saturating_mul(1_000),
            ..defaults
        }
    }

    pub fn controller_settings(&self) -> Result<ControllerSettings, RelayError> {
        let selector = |name: &str, raw: &str| {
            Selector::parse(raw)
                .map_err(|err| RelayError::Config(format!("selectors.{name}: {err}")))
        };
        let t = &self.timeouts;
        if t.poll_interval_ms == 0 {
            return Err(RelayError::Config(
                "timeouts.poll_interval_ms must be positive".to_string(),
            ));
        }

        Ok(ControllerSettings {
            input: selector("input", &self.selectors.input)?,
            submit: selector("submit", &self.selectors.submit)?,
            reply: selector("reply", &self.selectors.reply)?,
            affordance: selector("affordance", &self.selectors.affordance)?,
            submit_via: self.delivery.submit_with,
            default_wait: Duration::from_secs(t.default_wait_secs),
            response_wait: Duration::from_secs(t.response_wait_secs),
            completion: Duration::from_secs(t.completion_secs),
            url_advance: Duration::from_secs(t.url_advance_secs),
            poll_interval: Duration::from_millis(t.poll_interval_ms),
            dispatch_pause: Duration::from_millis(t.dispatch_pause_ms),
            new_thread_per_prompt: false,
        })
    }
}
