use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AdapterError, AdapterErrorKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    Css,
    XPath,
}

/// Element query understood by the surface.
///
/// Parsed from strings with an optional `css:` / `xpath:` prefix; without a
/// prefix, anything starting with `/` or `(` is treated as XPath.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Selector {
    pub kind: SelectorKind,
    pub value: String,
}

impl Selector {
    pub fn css(value: impl Into<String>) -> Self {
        Self {
            kind: SelectorKind::Css,
            value: value.into(),
        }
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self {
            kind: SelectorKind::XPath,
            value: value.into(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, AdapterError> {
        let trimmed = raw.trim();
        let (kind, value) = if let Some(rest) = trimmed.strip_prefix("css:") {
            (SelectorKind::Css, rest.trim())
        } else if let Some(rest) = trimmed.strip_prefix("xpath:") {
            (SelectorKind::XPath, rest.trim())
        } else if trimmed.starts_with('/') || trimmed.starts_with('(') {
            (SelectorKind::XPath, trimmed)
        } else {
            (SelectorKind::Css, trimmed)
        };

        if value.is_empty() {
            return Err(AdapterError::new(AdapterErrorKind::Internal)
                .with_hint(format!("empty selector: '{raw}'")));
        }

        Ok(Self {
            kind,
            value: value.to_string(),
        })
    }
}

impl FromStr for Selector {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SelectorKind::Css => write!(f, "css:{}", self.value),
            SelectorKind::XPath => write!(f, "xpath:{}", self.value),
        }
    }
}

/// Handle to a located element: the selector plus the match index.
///
/// Handles are re-resolved on every use, so a re-rendered node is picked up
/// as long as the selector still matches at that position.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ElementRef {
    pub selector: Selector,
    pub index: usize,
}

impl ElementRef {
    pub fn new(selector: Selector, index: usize) -> Self {
        Self { selector, index }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.selector, self.index)
    }
}
