//! Client Commands
//!
//! One function per CLI subcommand. Each one waits for the session to
//! settle before deciding anything, then drives the matching controller.

use anyhow::{bail, Context, Result};

use crate::cli::{DetectArgs, HistoryArgs, LoginArgs, RegisterArgs};
use crate::logic::detection::{signals, DetectionPhase, Rejection, Severity, SubmitOutcome};
use crate::logic::session::SessionStatus;
use crate::logic::ClientContext;

const SIGN_IN_HINT: &str = "Not signed in. Run `phishguard login -u <username>` first.";

pub async fn login(ctx: &ClientContext, args: &LoginArgs) -> Result<()> {
    ctx.session.initialize().await;

    let status = ctx
        .session
        .login(&args.username, &args.password)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))
        .context("Authentication failed")?;

    match status {
        SessionStatus::Authenticated(user) => {
            println!("Signed in as {} <{}>", user.username, user.email);
            Ok(())
        }
        _ => bail!("Signed in, but the profile could not be loaded. Please sign in again."),
    }
}

pub async fn register(ctx: &ClientContext, args: &RegisterArgs) -> Result<()> {
    let message = ctx
        .session
        .register(&args.username, &args.email, &args.password)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))
        .context("Registration failed")?;

    if message.is_empty() {
        println!("Account created. You can now sign in.");
    } else {
        println!("{}", message);
    }
    Ok(())
}

pub fn logout(ctx: &ClientContext) -> Result<()> {
    ctx.session.logout();
    println!("Signed out.");
    Ok(())
}

pub async fn whoami(ctx: &ClientContext) -> Result<()> {
    let SessionStatus::Authenticated(user) = ctx.session.initialize().await else {
        bail!(SIGN_IN_HINT);
    };

    println!("Username:    {}", user.username);
    println!("Email:       {}", user.email);
    if let Some(created) = user.created_at {
        println!("Member since {}", created.format("%Y-%m-%d"));
    }
    println!("Total scans: {}", user.total_scans);
    Ok(())
}

pub async fn detect(ctx: &ClientContext, args: &DetectArgs) -> Result<()> {
    if !ctx.session.initialize().await.is_authenticated() {
        bail!(SIGN_IN_HINT);
    }

    let workflow = ctx.detection();
    let phase = match workflow.submit(&args.url).await {
        SubmitOutcome::Settled(phase) => phase,
        SubmitOutcome::Rejected(Rejection::EmptyUrl) => bail!("Enter a URL to analyze."),
        SubmitOutcome::Rejected(Rejection::NotAuthenticated) => bail!(SIGN_IN_HINT),
        SubmitOutcome::Superseded => workflow.state(),
    };

    match phase {
        DetectionPhase::Resolved(result) => {
            let severity = Severity::from_prediction(&result.prediction);

            println!("{}", severity.title());
            println!("  URL:        {}", result.url);
            println!("  Verdict:    {}", result.prediction);
            println!("  Risk:       {}", severity);
            println!("  Confidence: {}", result.confidence_percent());
            println!();
            println!("{}", severity.description());
            println!("{}", severity.guidance());
            if let Some(note) = &result.policy_note {
                println!("Policy: {}", note);
            }

            if args.signals {
                println!();
                println!("Signals:");
                for (name, value) in signals(&result) {
                    println!("  {:<28} {}", name, value);
                }
            }

            // scan count changed server-side
            ctx.session.refresh().await;
            Ok(())
        }
        DetectionPhase::Failed(info) => {
            if !ctx.session.is_authenticated() {
                bail!("{} {}", info.message, SIGN_IN_HINT);
            }
            bail!(info.message)
        }
        DetectionPhase::Idle | DetectionPhase::Submitting { .. } => {
            bail!("Analysis did not complete. Please retry.")
        }
    }
}

pub async fn history(ctx: &ClientContext, args: &HistoryArgs) -> Result<()> {
    if !ctx.session.initialize().await.is_authenticated() {
        bail!(SIGN_IN_HINT);
    }

    let query = ctx.history();
    query
        .fetch_all()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))
        .context("Could not load scan history")?;

    let view = query.view(args.filter);
    if view.is_empty_history() {
        println!("No scans yet. Try `phishguard detect <url>`.");
        return Ok(());
    }
    if view.has_no_matches() {
        println!("No scans match this filter ({} total).", view.total);
        return Ok(());
    }

    for record in &view.records {
        println!(
            "{}  {:<10}  {:>6}  {}",
            record.timestamp.format("%Y-%m-%d %H:%M"),
            record.prediction,
            record.confidence_percent(),
            record.url
        );
    }

    let counts = query.counts();
    println!();
    println!(
        "{} shown of {} | phishing {} | suspicious {} | legitimate {}",
        view.records.len(),
        view.total,
        counts.phishing,
        counts.suspicious,
        counts.legitimate
    );
    Ok(())
}

pub async fn status(ctx: &ClientContext) -> Result<()> {
    let url = ctx.gateway.config().api_base_url.clone();
    let health = ctx
        .gateway
        .health()
        .await
        .with_context(|| format!("API at {} is not reachable", url))?;

    println!("API:      {} ({})", url, health.status);
    if let Some(database) = health.database {
        println!("Database: {}", database);
    }

    let session = ctx.session.initialize().await;
    match session.user() {
        Some(user) => println!("Session:  signed in as {}", user.username),
        None => println!("Session:  not signed in"),
    }
    Ok(())
}
