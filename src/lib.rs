//! chatrelay: drive a browser-hosted conversational interface in two phases.
//!
//! Prompts from a table are submitted into one conversation thread (each
//! submission confirmed by the page URL advancing), then every resulting
//! link is revisited and its reply extracted once the interface shows the
//! reply-complete control.

pub mod archive;
pub mod cli;
pub mod config;
pub mod controller;
pub mod errors;
pub mod metrics;
pub mod session;
pub mod table;

pub use config::Config;
pub use controller::{ControllerSettings, ConversationController, FingerprintCache};
pub use errors::{DispatchFailure, RelayError};
pub use session::Session;
