//! CLI front end: read two profile text files, run one compatibility
//! analysis, print the report. Optionally consults the configured AI
//! provider and records approve/deny feedback.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tracing::info;

use am_core::feedback::{FeedbackLog, FeedbackRecord};
use am_core::llm::{request_opinion, AiConfig};
use am_core::matching::{CompatibilityEngine, EngineConfig, MatchReport};
use am_core::parser::{parse_profile, split_self_and_preferences};
use am_core::taxonomy::TaxonomyStore;
use am_core::{logging, match_id};

#[derive(Debug, Parser)]
#[command(
    name = "am-analyzer",
    about = "Score the compatibility of two matchmaking profile forms"
)]
struct Cli {
    /// First profile form (text file).
    profile_a: PathBuf,

    /// Second profile form (text file).
    profile_b: PathBuf,

    /// Consult the configured AI provider and blend its opinion in.
    #[arg(long, default_value_t = false)]
    with_ai: bool,

    /// Record feedback for this analysis: "approve" or "deny".
    #[arg(long)]
    feedback: Option<String>,

    /// User id to attach to recorded feedback.
    #[arg(long, default_value = "cli")]
    user: String,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {}: {source}", .path.display())]
    ReadProfile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid --feedback value {0:?} (expected approve or deny)")]
    BadFeedback(String),
    #[error(transparent)]
    Feedback(#[from] am_core::feedback::FeedbackError),
}

fn read_profile_file(path: &PathBuf) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::ReadProfile {
        path: path.clone(),
        source,
    })
}

fn print_report(report: &MatchReport, match_id: &str) {
    println!("match {match_id}");
    println!("{} ({}%)", report.band, report.overall_pct());

    if let Some(reason) = &report.dealbreaker {
        println!("dealbreaker: {reason}");
        return;
    }

    println!();
    println!("breakdown:");
    for (name, result) in [
        ("interests", &report.interests),
        ("emotional", &report.emotional),
        ("practical", &report.practical),
    ] {
        println!(
            "  {name:<10} {:>5.1}%  {:<13} {}",
            result.score * 100.0,
            result.status,
            result.details
        );
    }
    if report.conflict_penalty > 0.0 {
        println!("  penalty    -{:.0}%", report.conflict_penalty * 100.0);
    }

    if !report.shared_interests.is_empty() {
        println!();
        println!("shared interests:");
        for (a, b, strength) in report.shared_interests.iter().take(6) {
            let a = a.strip_prefix("custom:").unwrap_or(a).replace('_', " ");
            let b = b.strip_prefix("custom:").unwrap_or(b).replace('_', " ");
            if a == b {
                println!("  {a} ({:.0}%)", strength * 100.0);
            } else {
                println!("  {a} <-> {b} ({:.0}%)", strength * 100.0);
            }
        }
    }

    if !report.friction.is_empty() {
        println!();
        println!("friction:");
        for note in &report.friction {
            println!("  {note}");
        }
    }

    println!();
    println!(
        "confidence: {:.0}% ({})",
        report.confidence * 100.0,
        report.confidence_note
    );
}

async fn run() -> Result<(), CliError> {
    dotenv().ok();
    logging::init("am-analyzer");
    logging::install_panic_hook("am-analyzer");

    let cli = Cli::parse();

    let form_a = read_profile_file(&cli.profile_a)?;
    let form_b = read_profile_file(&cli.profile_b)?;

    let taxonomy = Arc::new(TaxonomyStore::from_env());
    taxonomy.reload_if_stale();
    let snapshot = taxonomy.snapshot();

    // Only the self-description block is scored; anything after the
    // preferences header is dropped.
    let (self_a, _) = split_self_and_preferences(&form_a);
    let (self_b, _) = split_self_and_preferences(&form_b);
    let profile_a = parse_profile(&self_a, &snapshot);
    let profile_b = parse_profile(&self_b, &snapshot);

    let engine = CompatibilityEngine::new(EngineConfig::default(), taxonomy);
    let mut report = engine.analyze(&profile_a, &profile_b);

    let id = match_id::generate();
    info!(
        session = match_id::session(),
        match_id = %id,
        overall = report.overall,
        "analysis complete"
    );

    if cli.with_ai {
        let ai_config = AiConfig::from_env();
        let opinion = request_opinion(&ai_config, &profile_a.raw_text, &profile_b.raw_text).await;
        if opinion.from_model {
            report.blend_with_ai(opinion.score, engine.config().ai_blend_weight);
        }
        println!("ai opinion: {}% - {}", opinion.score, opinion.reason);
        println!();
    }

    print_report(&report, &id);

    if let Some(value) = cli.feedback {
        let approved = match value.to_lowercase().as_str() {
            "approve" | "yes" | "up" => true,
            "deny" | "no" | "down" => false,
            _ => return Err(CliError::BadFeedback(value)),
        };
        let log = FeedbackLog::from_env();
        log.append(FeedbackRecord::new(id, cli.user, approved))?;
        println!("feedback recorded");
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("am-analyzer failed: {err}");
        std::process::exit(1);
    }
}
