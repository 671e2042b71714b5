use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use ai_client::Perplexity;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use claimcheck_common::{AnalysisRequest, ClaimCheckError, Config, StoredClaim, TimeRange};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use claimcheck_analysis::leaderboard::{standing, stats};
use claimcheck_analysis::store::{ClaimHistory, IdentityRoster, MemoryStore};
use claimcheck_analysis::{split_against_history, verification_failed, Analyzer, IdentityDecision};

#[derive(Parser)]
#[command(name = "claimcheck", about = "Extract and verify health claims made by public figures")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify a handle and resolve it against a known roster
    Verify {
        handle: String,
        /// JSON snapshot of known identities and their stored claims
        #[arg(long)]
        roster: Option<PathBuf>,
    },
    /// Verify a handle, then extract and deduplicate its claims
    Analyze {
        handle: String,
        #[arg(long, default_value = "last-month", value_parser = parse_time_range)]
        time_range: TimeRange,
        #[arg(long, default_value_t = 10)]
        claims: u32,
        /// Reference journal to cross-check against (repeatable)
        #[arg(long = "journal", required = true)]
        journals: Vec<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        max_tokens: Option<u32>,
        #[arg(long)]
        roster: Option<PathBuf>,
    },
    /// Score every identity in a roster snapshot
    Leaderboard {
        #[arg(long)]
        roster: PathBuf,
    },
}

fn parse_time_range(raw: &str) -> Result<TimeRange, String> {
    raw.parse().map_err(|e: ClaimCheckError| e.to_string())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("claimcheck=info".parse()?)
                .add_directive("ai_client=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Err(err) = execute(cli.command).await else {
        return Ok(ExitCode::SUCCESS);
    };
    match err.downcast_ref::<ClaimCheckError>() {
        Some(e) if matches!(e, ClaimCheckError::Config(_)) => eprintln!("{e}"),
        Some(e) => {
            if !e.is_user_facing() {
                tracing::error!(error = %e, "Research failed");
            }
            eprintln!("{}", e.user_message());
        }
        None => eprintln!("Error: {err:#}"),
    }
    Ok(ExitCode::FAILURE)
}

async fn execute(command: Command) -> Result<()> {
    match command {
        Command::Verify { handle, roster } => {
            let analyzer = analyzer_from_env()?;
            let store = load_store(roster.as_ref())?;

            let verification = analyzer
                .verify(&handle)
                .await
                .map_err(|e| verification_failed(&handle, e))?;
            let identities = store.identities().await?;
            let decision = IdentityDecision::decide(&handle, &verification, &identities)?;

            print_json(&json!({
                "verification": verification,
                "decision": decision,
            }))
        }
        Command::Analyze {
            handle,
            time_range,
            claims,
            journals,
            notes,
            max_tokens,
            roster,
        } => {
            let request = AnalysisRequest {
                handle,
                time_range,
                claims_count: claims,
                journals,
                notes,
                max_tokens,
            };
            let analyzer = analyzer_from_env()?;
            let store = load_store(roster.as_ref())?;

            let research = analyzer.run(&request).await?;

            let verification = claimcheck_common::SubjectVerification {
                is_recognized_subject: true,
                reason: None,
                details: Some(research.subject.clone()),
            };
            let identities = store.identities().await?;
            let decision = IdentityDecision::decide(&request.handle, &verification, &identities)?;

            let history = match &decision {
                IdentityDecision::Update { id, .. } => store.claims_for(*id).await?,
                IdentityDecision::Create { .. } => Vec::new(),
            };
            let dispositions = split_against_history(
                research.analysis.claims.clone(),
                &history,
                analyzer.settings().dedup.history,
            );

            print_json(&json!({
                "research": research,
                "decision": decision,
                "dispositions": dispositions,
            }))
        }
        Command::Leaderboard { roster } => {
            let store = MemoryStore::load(&roster)?;
            let identities = store.identities().await?;

            let mut standings = Vec::with_capacity(identities.len());
            let mut all_claims: Vec<StoredClaim> = Vec::new();
            for identity in &identities {
                let claims = store.claims_for(identity.id).await?;
                standings.push(json!({
                    "handle": identity.handle,
                    "standing": standing(identity.id, &claims),
                }));
                all_claims.extend(claims);
            }

            print_json(&json!({
                "stats": stats(identities.len(), &all_claims),
                "subjects": standings,
            }))
        }
    }
}

fn analyzer_from_env() -> Result<Analyzer> {
    let config = Config::from_env()?;

    let mut oracle = Perplexity::new(&config.perplexity_api_key, &config.perplexity_model);
    if let Some(url) = &config.perplexity_base_url {
        oracle = oracle.with_base_url(url);
    }

    Ok(Analyzer::new(Arc::new(oracle), config.settings))
}

fn load_store(path: Option<&PathBuf>) -> Result<MemoryStore> {
    match path {
        Some(path) => MemoryStore::load(path),
        None => Ok(MemoryStore::new()),
    }
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{rendered}");
    Ok(())
}
