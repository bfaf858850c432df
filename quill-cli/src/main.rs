use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use quill_core::config::Config;
use quill_core::logging::{init_logging_with_config, LogConfig};
use quill_core::model::{SortKey, SortOrder};
use quill_core::Client;
use std::path::{Path, PathBuf};
use tracing::debug;

mod commands;
mod output;

use output::Output;

#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(author, version, about = "Command-line client for the Quill blogging platform", long_about = None)]
struct Args {
    /// Set the log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable JSON formatted logging
    #[arg(long, global = true)]
    json_logs: bool,

    /// Read configuration from this TOML file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and log in
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Log in and keep the token for later commands
    Login {
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// End the session on the server and forget the token
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Ask the server whether the stored token is still valid
    Verify,
    /// Browse and manage posts
    #[command(subcommand)]
    Posts(PostsCommand),
    /// Browse and manage authors
    #[command(subcommand)]
    Authors(AuthorsCommand),
}

#[derive(Subcommand, Debug)]
enum PostsCommand {
    /// List posts
    List(ListArgs),
    /// Show one post
    Show { id: u64 },
    /// List the posts of one author
    ByAuthor { author: u64 },
    /// Publish a post
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    /// Edit one of your posts
    Edit {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete one of your posts
    Delete { id: u64 },
    Like { id: u64 },
    Unlike { id: u64 },
}

#[derive(ClapArgs, Debug, Default, PartialEq)]
struct ListArgs {
    /// created_at (latest) or likes_count (likes)
    #[arg(long)]
    sort: Option<SortKey>,
    /// asc or desc
    #[arg(long)]
    order: Option<SortOrder>,
    /// Only your own posts
    #[arg(long)]
    mine: bool,
    /// Only posts by this author
    #[arg(long)]
    author: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum AuthorsCommand {
    /// List authors
    List,
    /// Show one author
    Show { id: u64 },
    /// Post and like counters of one author
    Stats { id: u64 },
    /// Edit your profile
    Edit {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        bio: Option<String>,
    },
    /// Delete your profile
    Delete { id: u64 },
}

/// File (or defaults), then `QUILL_*` variables, then flags
fn load_config(path: Option<&Path>, log_level: Option<&str>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    config.apply_env(|key| std::env::var(key).ok())?;
    if let Some(level) = log_level {
        config.logging.level = level.to_string();
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref(), args.log_level.as_deref())?;
    let log_config = LogConfig::from_settings(&config.logging)?
        .json_format(args.json_logs || config.logging.json_format);
    init_logging_with_config(log_config)?;
    quill_core::metrics::init_metrics();

    debug!(
        auth = %config.api.auth_base_url,
        content = %config.api.content_base_url,
        "configuration loaded"
    );

    let client = Client::new(&config)?;
    let out = Output::new(args.json);
    commands::run(&client, args.command, &out).await
}
