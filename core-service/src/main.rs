//! PhishGuard Client - Main Entry Point

use anyhow::Result;
use clap::Parser;

use phishguard_core::api::commands;
use phishguard_core::cli::{Cli, Commands};
use phishguard_core::{constants, ClientConfig, ClientContext};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ClientConfig::default()
        .with_api_url(cli.api_url.clone())
        .with_token_path(cli.token_file.clone());

    log::info!("Starting {} v{}", constants::APP_NAME, constants::APP_VERSION);
    log::info!("API: {}", config.api_base_url);

    let ctx = ClientContext::new(config)?;

    match &cli.command {
        Commands::Login(args) => commands::login(&ctx, args).await,
        Commands::Register(args) => commands::register(&ctx, args).await,
        Commands::Logout => commands::logout(&ctx),
        Commands::Whoami => commands::whoami(&ctx).await,
        Commands::Detect(args) => commands::detect(&ctx, args).await,
        Commands::History(args) => commands::history(&ctx, args).await,
        Commands::Status => commands::status(&ctx).await,
    }
}
