//! chatrelay L0 surface adapter.
//!
//! Everything above this crate talks to the browser through the [`Surface`]
//! trait: navigate, read the URL, locate elements, read text, deliver input,
//! and reset the session. [`ChromiumSurface`] is the real implementation on
//! top of chromiumoxide; tests substitute scripted surfaces.

use std::{env, path::PathBuf};

use which::which;

mod chromium;
mod scripts;
mod selector;
mod surface;
mod util;

pub use chromium::ChromiumSurface;
pub use selector::{ElementRef, Selector, SelectorKind};
pub use surface::Surface;
pub use util::{same_location, url_matches};

pub use config::CdpConfig;
pub use error::{AdapterError, AdapterErrorKind};

pub mod error {
    use serde::{Deserialize, Serialize};
    use std::fmt;
    use thiserror::Error;

    /// High-level error categories surfaced by the adapter.
    #[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
    pub enum AdapterErrorKind {
        #[error("navigation timed out")]
        NavTimeout,
        #[error("cdp i/o failure")]
        CdpIo,
        #[error("target element not found")]
        TargetNotFound,
        #[error("element not enabled")]
        NotEnabled,
        #[error("internal error")]
        Internal,
    }

    /// Enriched error metadata passed back to higher layers.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct AdapterError {
        pub kind: AdapterErrorKind,
        pub hint: Option<String>,
    }

    impl fmt::Display for AdapterError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.kind)?;
            if let Some(hint) = &self.hint {
                write!(f, ": {}", hint)?;
            }
            Ok(())
        }
    }

    impl std::error::Error for AdapterError {}

    impl AdapterError {
        pub fn new(kind: AdapterErrorKind) -> Self {
            Self {
                kind,
                hint: None,
            }
        }

        pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
            self.hint = Some(hint.into());
            self
        }
    }

    impl From<chromiumoxide::error::CdpError> for AdapterError {
        fn from(err: chromiumoxide::error::CdpError) -> Self {
            AdapterError::new(AdapterErrorKind::CdpIo).with_hint(err.to_string())
        }
    }
}

pub mod config {
    use crate::detect_chrome_executable;
    use serde::{Deserialize, Serialize};
    use std::{path::PathBuf, time::Duration};

    /// Configuration for attaching to (or launching) the browser.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct CdpConfig {
        /// Browser executable, used only when `debug_port` is `None`.
        pub executable: PathBuf,
        pub user_data_dir: PathBuf,
        pub headless: bool,
        /// Remote-debugging port of an already running browser to reuse.
        pub debug_port: Option<u16>,
        pub debug_host: String,
        /// Bound for confirming that a navigation reached its target.
        pub navigation_timeout_ms: u64,
        /// Interval between element lookups while waiting for a selector.
        pub lookup_interval_ms: u64,
    }

    impl Default for CdpConfig {
        fn default() -> Self {
            Self {
                executable: detect_chrome_executable().unwrap_or_default(),
                user_data_dir: PathBuf::from(".chatrelay-profile"),
                headless: false,
                debug_port: Some(9223),
                debug_host: "127.0.0.1".to_string(),
                navigation_timeout_ms: 3_000,
                lookup_interval_ms: 100,
            }
        }
    }

    impl CdpConfig {
        pub fn navigation_timeout(&self) -> Duration {
            Duration::from_millis(self.navigation_timeout_ms)
        }

        pub fn lookup_interval(&self) -> Duration {
            Duration::from_millis(self.lookup_interval_ms.max(10))
        }

        /// HTTP endpoint of the remote-debugging server, if one is configured.
        pub fn debugger_url(&self) -> Option<String> {
            self.debug_port
                .map(|port| format!("http://{}:{}", self.debug_host, port))
        }

        /// Command line a user can run to expose a reusable browser session.
        pub fn launch_hint(&self) -> String {
            let executable = if self.executable.as_os_str().is_empty() {
                "google-chrome".to_string()
            } else {
                self.executable.display().to_string()
            };
            format!(
                "\"{}\" --remote-debugging-port={} --user-data-dir={}",
                executable,
                self.debug_port.unwrap_or(9223),
                self.user_data_dir.display()
            )
        }
    }
}

pub(crate) fn detect_chrome_executable() -> Option<PathBuf> {
    if let Ok(raw) = env::var("CHATRELAY_BROWSER") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            let candidate = PathBuf::from(trimmed);
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    for name in chrome_executable_names() {
        if let Ok(path) = which(name) {
            return Some(path);
        }
    }

    os_specific_chrome_paths()
        .into_iter()
        .find(|candidate| candidate.exists())
}

fn chrome_executable_names() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["chrome.exe", "chromium.exe", "msedge.exe"]
    }

    #[cfg(not(target_os = "windows"))]
    {
        &[
            "google-chrome-stable",
            "google-chrome",
            "chromium",
            "chromium-browser",
        ]
    }
}

fn os_specific_chrome_paths() -> Vec<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        vec![
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ]
    }

    #[cfg(any(target_os = "linux", target_os = "freebsd"))]
    {
        vec![
            PathBuf::from("/usr/bin/google-chrome-stable"),
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/chromium-browser"),
            PathBuf::from("/usr/bin/chromium"),
        ]
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "freebsd")))]
    {
        Vec::new()
    }
}
