use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, InsertTextParams,
};
use chromiumoxide::cdp::browser_protocol::network::ClearBrowserCookiesParams;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::Page;
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::config::CdpConfig;
use crate::error::{AdapterError, AdapterErrorKind};
use crate::scripts;
use crate::selector::{ElementRef, Selector};
use crate::surface::Surface;
use crate::util::url_matches;

/// [`Surface`] backed by a Chromium tab driven over CDP.
pub struct ChromiumSurface {
    _browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    cfg: CdpConfig,
}

impl ChromiumSurface {
    /// Attach to the browser on `cfg.debug_port`, or launch `cfg.executable`
    /// when no port is configured, and open a dedicated tab.
    pub async fn connect(cfg: CdpConfig) -> Result<Self, AdapterError> {
        let (browser, mut handler) = match cfg.debugger_url() {
            Some(url) => {
                info!(target: "cdp-adapter", %url, "attaching to existing browser session");
                Browser::connect(url.clone()).await.map_err(|err| {
                    AdapterError::new(AdapterErrorKind::CdpIo).with_hint(format!(
                        "could not attach to {url}: {err}. Start the browser with: {}",
                        cfg.launch_hint()
                    ))
                })?
            }
            None => {
                info!(
                    target: "cdp-adapter",
                    executable = %cfg.executable.display(),
                    headless = cfg.headless,
                    "launching browser"
                );
                Browser::launch(launch_config(&cfg)?).await?
            }
        };

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(target: "cdp-adapter", %err, "handler event error");
                }
            }
            debug!(target: "cdp-adapter", "browser handler stopped");
        });

        let page = browser.new_page("about:blank").await?;
        info!(target: "cdp-adapter", "session tab ready");

        Ok(Self {
            _browser: browser,
            page,
            handler,
            cfg,
        })
    }

    async fn evaluate(&self, expression: String) -> Result<Value, AdapterError> {
        let params = EvaluateParams::builder()
            .expression(expression)
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(|err| AdapterError::new(AdapterErrorKind::Internal).with_hint(err))?;

        let response = self.page.execute(params).await?;
        if let Some(details) = response.result.exception_details.as_ref() {
            return Err(AdapterError::new(AdapterErrorKind::Internal)
                .with_hint(format!("evaluate raised exception: {}", details.text)));
        }

        Ok(response.result.result.value.clone().unwrap_or(Value::Null))
    }

    async fn count(&self, selector: &Selector) -> Result<usize, AdapterError> {
        let value = self.evaluate(scripts::count(selector)?).await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    async fn element_action(
        &self,
        element: &ElementRef,
        expression: String,
        expected: &str,
    ) -> Result<Value, AdapterError> {
        let value = self.evaluate(expression).await?;
        match value.get("status").and_then(Value::as_str).unwrap_or("unknown") {
            status if status == expected => Ok(value),
            "not-found" => Err(AdapterError::new(AdapterErrorKind::TargetNotFound)
                .with_hint(format!("element {element} is no longer present"))),
            "disabled" => Err(AdapterError::new(AdapterErrorKind::NotEnabled)
                .with_hint(format!("element {element} is disabled"))),
            other => Err(AdapterError::new(AdapterErrorKind::Internal)
                .with_hint(format!("element {element} rejected action (status: {other})"))),
        }
    }

    async fn press_enter(&self) -> Result<(), AdapterError> {
        for kind in [DispatchKeyEventType::KeyDown, DispatchKeyEventType::KeyUp] {
            let mut builder = DispatchKeyEventParams::builder()
                .r#type(kind.clone())
                .key("Enter")
                .code("Enter")
                .windows_virtual_key_code(13)
                .native_virtual_key_code(13);
            if matches!(kind, DispatchKeyEventType::KeyDown) {
                builder = builder.text("\r");
            }
            let params = builder
                .build()
                .map_err(|err| AdapterError::new(AdapterErrorKind::Internal).with_hint(err))?;
            self.page.execute(params).await?;
        }
        Ok(())
    }
}

impl Drop for ChromiumSurface {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

fn launch_config(cfg: &CdpConfig) -> Result<BrowserConfig, AdapterError> {
    if cfg.executable.as_os_str().is_empty() {
        return Err(AdapterError::new(AdapterErrorKind::Internal)
            .with_hint("no browser executable configured or detected"));
    }

    let mut builder = BrowserConfig::builder()
        .chrome_executable(&cfg.executable)
        .user_data_dir(&cfg.user_data_dir);
    if !cfg.headless {
        builder = builder.with_head();
    }
    builder
        .build()
        .map_err(|err| AdapterError::new(AdapterErrorKind::Internal).with_hint(err))
}

#[async_trait]
impl Surface for ChromiumSurface {
    async fn navigate(&self, url: &str) -> Result<(), AdapterError> {
        debug!(target: "cdp-adapter", %url, "navigate");
        self.page.goto(url).await.map_err(|err| {
            AdapterError::new(AdapterErrorKind::NavTimeout)
                .with_hint(format!("navigation to {url} failed: {err}"))
        })?;

        let deadline = Instant::now() + self.cfg.navigation_timeout();
        loop {
            let state = self.evaluate(scripts::LOCATION.to_string()).await?;
            let current = state.get("url").and_then(Value::as_str).unwrap_or_default();
            let ready = state.get("ready").and_then(Value::as_str) == Some("complete");
            if ready && url_matches(url, current) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                warn!(target: "cdp-adapter", %url, %current, "navigation not confirmed");
                return Err(AdapterError::new(AdapterErrorKind::NavTimeout).with_hint(format!(
                    "could not confirm {url} within {:?} (at {current})",
                    self.cfg.navigation_timeout()
                )));
            }
            sleep(self.cfg.lookup_interval()).await;
        }
    }

    async fn current_url(&self) -> Result<String, AdapterError> {
        let state = self.evaluate(scripts::LOCATION.to_string()).await?;
        Ok(state
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    async fn find(
        &self,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<ElementRef, AdapterError> {
        let deadline = Instant::now() + timeout;
        loop {
            let matches = self.count(selector).await?;
            if matches > 0 {
                return Ok(ElementRef::new(selector.clone(), matches - 1));
            }
            if Instant::now() >= deadline {
                return Err(AdapterError::new(AdapterErrorKind::TargetNotFound)
                    .with_hint(format!("selector '{selector}' not found within {timeout:?}")));
            }
            sleep(self.cfg.lookup_interval()).await;
        }
    }

    async fn exists(&self, selector: &Selector) -> Result<bool, AdapterError> {
        Ok(self.count(selector).await? > 0)
    }

    async fn exists_after_last(
        &self,
        anchor: &Selector,
        target: &Selector,
    ) -> Result<bool, AdapterError> {
        let value = self.evaluate(scripts::after_last(anchor, target)?).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn text(&self, element: &ElementRef) -> Result<String, AdapterError> {
        let value = self
            .element_action(
                element,
                scripts::inner_text(&element.selector, element.index)?,
                "ok",
            )
            .await?;
        Ok(value
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    async fn type_text(&self, element: &ElementRef, text: &str) -> Result<(), AdapterError> {
        self.element_action(
            element,
            scripts::focus(&element.selector, element.index)?,
            "focused",
        )
        .await?;
        self.page.execute(InsertTextParams::new(text)).await?;
        Ok(())
    }

    async fn submit(&self, element: &ElementRef) -> Result<(), AdapterError> {
        self.element_action(
            element,
            scripts::focus(&element.selector, element.index)?,
            "focused",
        )
        .await?;
        self.press_enter().await
    }

    async fn click(&self, element: &ElementRef) -> Result<(), AdapterError> {
        self.element_action(
            element,
            scripts::click(&element.selector, element.index)?,
            "clicked",
        )
        .await?;
        Ok(())
    }

    async fn clear_session(&self) -> Result<(), AdapterError> {
        warn!(target: "cdp-adapter", "clearing cookies and reloading");
        self.page.execute(ClearBrowserCookiesParams::default()).await?;
        self.page.reload().await?;
        Ok(())
    }
}
