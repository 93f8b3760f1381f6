//! Runtime.evaluate expressions used by the chromium surface.

use crate::error::{AdapterError, AdapterErrorKind};
use crate::selector::{Selector, SelectorKind};

fn literal(value: &str) -> Result<String, AdapterError> {
    serde_json::to_string(value).map_err(|err| {
        AdapterError::new(AdapterErrorKind::Internal)
            .with_hint(format!("invalid selector encoding: {err}"))
    })
}

/// Expression evaluating to an array of the nodes matching `selector`.
fn nodes_expression(selector: &Selector) -> Result<String, AdapterError> {
    let value = literal(&selector.value)?;
    Ok(match selector.kind {
        SelectorKind::Css => format!(
            "(() => {{ try {{ return Array.from(document.querySelectorAll({value})); }} catch (err) {{ return []; }} }})()"
        ),
        SelectorKind::XPath => format!(
            "(() => {{\n    const out = [];\n    try {{\n        const snap = document.evaluate({value}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);\n        for (let i = 0; i < snap.snapshotLength; i++) {{ out.push(snap.snapshotItem(i)); }}\n    }} catch (err) {{}}\n    return out;\n}})()"
        ),
    })
}

pub(crate) fn count(selector: &Selector) -> Result<String, AdapterError> {
    Ok(format!("{}.length", nodes_expression(selector)?))
}

pub(crate) fn inner_text(selector: &Selector, index: usize) -> Result<String, AdapterError> {
    Ok(format!(
        "(() => {{\n    const el = {nodes}[{index}];\n    if (!el) {{ return {{ status: 'not-found' }}; }}\n    return {{ status: 'ok', text: el.innerText || el.textContent || '' }};\n}})()",
        nodes = nodes_expression(selector)?,
    ))
}

pub(crate) fn focus(selector: &Selector, index: usize) -> Result<String, AdapterError> {
    Ok(format!(
        "(() => {{\n    const el = {nodes}[{index}];\n    if (!el) {{ return {{ status: 'not-found' }}; }}\n    if (typeof el.scrollIntoView === 'function') {{ el.scrollIntoView({{ block: 'center' }}); }}\n    if (typeof el.focus === 'function') {{ el.focus(); }}\n    return {{ status: 'focused' }};\n}})()",
        nodes = nodes_expression(selector)?,
    ))
}

pub(crate) fn click(selector: &Selector, index: usize) -> Result<String, AdapterError> {
    Ok(format!(
        "(() => {{\n    const el = {nodes}[{index}];\n    if (!el) {{ return {{ status: 'not-found' }}; }}\n    if (el.disabled) {{ return {{ status: 'disabled' }}; }}\n    if (typeof el.scrollIntoView === 'function') {{ el.scrollIntoView({{ block: 'center' }}); }}\n    el.click();\n    return {{ status: 'clicked' }};\n}})()",
        nodes = nodes_expression(selector)?,
    ))
}

/// Whether any `target` node lies inside or after the last `anchor` match
/// in document order.
pub(crate) fn after_last(anchor: &Selector, target: &Selector) -> Result<String, AdapterError> {
    Ok(format!(
        "(() => {{\n    const anchors = {anchors};\n    const last = anchors[anchors.length - 1];\n    if (!last) {{ return false; }}\n    return {targets}.some((el) => (last.compareDocumentPosition(el) & Node.DOCUMENT_POSITION_FOLLOWING) !== 0);\n}})()",
        anchors = nodes_expression(anchor)?,
        targets = nodes_expression(target)?,
    ))
}

pub(crate) const LOCATION: &str =
    "(() => ({ url: window.location.href || '', ready: document.readyState || '' }))()";
