//! Scripted surface for primitive unit tests.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use cdp_adapter::{AdapterError, AdapterErrorKind, ElementRef, Selector, Surface};
use parking_lot::Mutex;
use tokio::time::{sleep, Instant};

#[derive(Default)]
struct State {
    url: String,
    pending_url: Option<(Duration, String)>,
    appear_at: HashMap<String, Duration>,
    /// Selectors present only before the anchor (earlier turns).
    earlier: HashSet<String>,
    disabled: HashSet<String>,
    texts: HashMap<String, String>,
    actions: Vec<String>,
}

pub(crate) struct FakeSurface {
    start: Instant,
    state: Mutex<State>,
}

impl FakeSurface {
    pub(crate) fn new(url: &str) -> Self {
        Self {
            start: Instant::now(),
            state: Mutex::new(State {
                url: url.to_string(),
                ..State::default()
            }),
        }
    }

    pub(crate) fn set_url_after(&self, after: Duration, url: &str) {
        self.state.lock().pending_url = Some((after, url.to_string()));
    }

    pub(crate) fn appear_after(&self, selector: &str, after: Duration) {
        self.state.lock().appear_at.insert(selector.to_string(), after);
    }

    /// Put `selector` on the page from the start, but only ahead of every
    /// anchor, as a control left over from an earlier turn.
    pub(crate) fn present_earlier(&self, selector: &str) {
        self.state.lock().earlier.insert(selector.to_string());
    }

    pub(crate) fn disable(&self, selector: &str) {
        self.state.lock().disabled.insert(selector.to_string());
    }

    pub(crate) fn set_text(&self, selector: &str, text: &str) {
        self.state
            .lock()
            .texts
            .insert(selector.to_string(), text.to_string());
    }

    pub(crate) fn actions(&self) -> Vec<String> {
        self.state.lock().actions.clone()
    }

    fn present(&self, selector: &Selector) -> bool {
        let elapsed = self.start.elapsed();
        self.state
            .lock()
            .appear_at
            .get(&selector.value)
            .is_some_and(|at| elapsed >= *at)
    }
}

#[async_trait]
impl Surface for FakeSurface {
    async fn navigate(&self, url: &str) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        state.url = url.to_string();
        state.actions.push(format!("navigate:{url}"));
        Ok(())
    }

    async fn current_url(&self) -> Result<String, AdapterError> {
        let elapsed = self.start.elapsed();
        let mut state = self.state.lock();
        if let Some((at, _)) = &state.pending_url {
            if elapsed >= *at {
                if let Some((_, url)) = state.pending_url.take() {
                    state.url = url;
                }
            }
        }
        Ok(state.url.clone())
    }

    async fn find(&self, selector: &Selector, timeout: Duration) -> Result<ElementRef, AdapterError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.present(selector) {
                return Ok(ElementRef::new(selector.clone(), 0));
            }
            if Instant::now() >= deadline {
                return Err(AdapterError::new(AdapterErrorKind::TargetNotFound)
                    .with_hint(format!("selector '{selector}' not found")));
            }
            sleep(Duration::from_millis(100)).await;
        }
    }

    async fn exists(&self, selector: &Selector) -> Result<bool, AdapterError> {
        let earlier = self.state.lock().earlier.contains(&selector.value);
        Ok(earlier || self.present(selector))
    }

    async fn exists_after_last(
        &self,
        anchor: &Selector,
        target: &Selector,
    ) -> Result<bool, AdapterError> {
        Ok(self.present(anchor) && self.present(target))
    }

    async fn text(&self, element: &ElementRef) -> Result<String, AdapterError> {
        self.state
            .lock()
            .texts
            .get(&element.selector.value)
            .cloned()
            .ok_or_else(|| AdapterError::new(AdapterErrorKind::TargetNotFound))
    }

    async fn type_text(&self, _element: &ElementRef, text: &str) -> Result<(), AdapterError> {
        self.state.lock().actions.push(format!("type:{text}"));
        Ok(())
    }

    async fn submit(&self, _element: &ElementRef) -> Result<(), AdapterError> {
        self.state.lock().actions.push("enter".to_string());
        Ok(())
    }

    async fn click(&self, element: &ElementRef) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        if state.disabled.contains(&element.selector.value) {
            return Err(AdapterError::new(AdapterErrorKind::NotEnabled)
                .with_hint(format!("element {element} is disabled")));
        }
        state.actions.push(format!("click:{}", element.selector.value));
        Ok(())
    }

    async fn clear_session(&self) -> Result<(), AdapterError> {
        self.state.lock().actions.push("clear".to_string());
        Ok(())
    }
}
