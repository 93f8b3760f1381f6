//! L3 Action Primitives - prompt delivery and completion detection
//!
//! Built on the [`cdp_adapter::Surface`] trait:
//! - [`await_predicate`]: bounded, side-effect free polling on the tokio clock
//! - [`UrlAdvance`]: submission completion, observed as a change of page URL
//! - [`await_affordance`]: reply completion, observed as a UI control appearing
//! - [`deliver_prompt`]: paste the prompt and trigger submission

pub mod errors;
mod primitives;
mod waiting;

pub use errors::*;
pub use primitives::*;
pub use waiting::*;
