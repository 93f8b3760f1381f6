use std::path::PathBuf;

use clap::{Args, Subcommand};

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Submit every prompt of a CSV table into a conversation thread
    Submit(SubmitArgs),

    /// Collect the replies for a previously submitted table
    Collect(CollectArgs),

    /// Submit a table, then collect its replies in the same browser session
    Run(SubmitArgs),

    /// Extract message lists from a conversation-archive export
    Export(ExportArgs),
}

#[derive(Args, Clone, Debug)]
pub struct SubmitArgs {
    /// CSV file with one prompt per row
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// URL of the conversation thread (or project page) to submit into
    #[arg(short = 'p', long, value_name = "URL")]
    pub thread_url: String,

    /// Prompt column; defaults to `messages`, then `user`
    #[arg(long)]
    pub column: Option<String>,

    /// Record failed prompts and keep going instead of aborting the batch
    #[arg(long)]
    pub fail_soft: bool,

    /// Return to the thread URL before every prompt
    #[arg(long)]
    pub new_thread_per_prompt: bool,
}

#[derive(Args, Clone, Debug)]
pub struct CollectArgs {
    /// Submitted table with `user` and `link` columns
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,
}

#[derive(Args, Clone, Debug)]
pub struct ExportArgs {
    /// `conversations.json` from an account data export
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Keep only conversations whose first message starts with this text
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Output file (defaults to `<stem>_messages.json`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
