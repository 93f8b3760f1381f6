use std::time::Duration;

use async_trait::async_trait;

use crate::error::AdapterError;
use crate::selector::{ElementRef, Selector};

/// Capability interface over the browser-control surface.
///
/// Implementations hold no dispatch or collection logic; everything above is
/// built from these calls.
#[async_trait]
pub trait Surface: Send + Sync {
    /// Load `url` and confirm the surface reached it within the configured bound.
    async fn navigate(&self, url: &str) -> Result<(), AdapterError>;

    async fn current_url(&self) -> Result<String, AdapterError>;

    /// Block until an element matching `selector` exists or `timeout` elapses.
    /// Returns the most recent (last) match.
    async fn find(&self, selector: &Selector, timeout: Duration)
        -> Result<ElementRef, AdapterError>;

    /// Single presence check; never waits.
    async fn exists(&self, selector: &Selector) -> Result<bool, AdapterError>;

    /// Single check for a `target` element inside or after the last match of
    /// `anchor`. Elements belonging to earlier matches do not count.
    async fn exists_after_last(
        &self,
        anchor: &Selector,
        target: &Selector,
    ) -> Result<bool, AdapterError>;

    async fn text(&self, element: &ElementRef) -> Result<String, AdapterError>;

    /// Focus the element and deliver `text` in one insertion.
    async fn type_text(&self, element: &ElementRef, text: &str) -> Result<(), AdapterError>;

    /// Press Enter on the element.
    async fn submit(&self, element: &ElementRef) -> Result<(), AdapterError>;

    async fn click(&self, element: &ElementRef) -> Result<(), AdapterError>;

    /// Drop cookies and reload the current page.
    async fn clear_session(&self) -> Result<(), AdapterError>;
}
