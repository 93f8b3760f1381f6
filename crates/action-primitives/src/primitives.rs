//! Action primitives implementation
//!
//! Three primitives used by the conversation controller:
//! 1. deliver - paste a prompt into the input and trigger submission
//! 2. url_advance - wait for the page URL to move off its baseline
//! 3. affordance - wait for the reply-complete control, then read the reply

mod affordance;
mod deliver;
mod url_advance;

pub use affordance::*;
pub use deliver::*;
pub use url_advance::*;

#[cfg(test)]
pub(crate) mod fake;
