//! Command-line interface definitions for the PhishGuard client.
//!
//! # Example
//!
//! ```bash
//! phishguard login -u alice
//! phishguard detect http://evil.example/login --signals
//! phishguard history --filter phishing
//! phishguard logout
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::logic::history::VerdictFilter;

/// PhishGuard URL phishing detection client.
#[derive(Debug, Parser)]
#[command(name = "phishguard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// PhishGuard API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// File holding the saved credential
    #[arg(long, global = true, value_name = "PATH")]
    pub token_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in and remember the credential
    Login(LoginArgs),
    /// Create an account
    Register(RegisterArgs),
    /// Forget the saved credential
    Logout,
    /// Show the signed-in profile
    Whoami,
    /// Analyze a URL
    Detect(DetectArgs),
    /// List past scans
    History(HistoryArgs),
    /// Check that the API is reachable
    Status,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username or email
    #[arg(short, long)]
    pub username: String,

    #[arg(short, long, env = "PHISHGUARD_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(short, long)]
    pub username: String,

    #[arg(short, long)]
    pub email: String,

    #[arg(short, long, env = "PHISHGUARD_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    /// URL to analyze
    pub url: String,

    /// Also print the extracted URL features
    #[arg(long)]
    pub signals: bool,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// all, legitimate, suspicious or phishing
    #[arg(short, long, default_value = "all")]
    pub filter: VerdictFilter,
}
