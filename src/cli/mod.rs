pub mod app;
mod collect;
mod commands;
mod context;
mod dispatch;
mod env;
mod export;
mod run;
pub mod runtime;
mod submit;

pub use app::run;
pub use commands::{CollectArgs, Commands, ExportArgs, SubmitArgs};
pub use env::CliArgs;
