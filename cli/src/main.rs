//! CLI entrypoint for roundtable
//!
//! This is the main binary that wires together all layers: configuration
//! loading, the agent registry with process backends, the history sink,
//! and the discussion use case.

mod progress;

use anyhow::Result;
use clap::Parser;
use progress::ConsoleProgress;
use roundtable_application::{AgentRegistry, RunDiscussionInput, RunDiscussionUseCase};
use roundtable_infrastructure::{
    ConfigLoader, FileConfig, JsonlHistorySink, ProcessBackend, Severity,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// CLI arguments for roundtable
#[derive(Parser, Debug)]
#[command(name = "roundtable")]
#[command(author, version, about = "Multi-agent discussion orchestrator for external AI CLIs")]
#[command(long_about = r#"
Roundtable sends one prompt to a fleet of external AI CLIs, runs them
through one or more discussion rounds in which each agent sees the
others' previous answers, detects disagreement, and prints a synthesized
final answer.

Configuration files are loaded from (in priority order):
1. --config <path>       Explicit config file
2. ./roundtable.toml     Project-level config
3. <config dir>/roundtable/roundtable.toml   User-level config

Example:
  roundtable "What's the best way to handle errors in Rust?"
  roundtable --rounds 1 --agents 2 "Compare async/await patterns"
"#)]
struct Cli {
    /// The prompt to discuss
    prompt: String,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    no_config: bool,

    /// Override the number of discussion rounds
    #[arg(short, long, value_name = "N")]
    rounds: Option<usize>,

    /// Override how many agents join the discussion
    #[arg(short, long, value_name = "N")]
    agents: Option<usize>,

    /// Skip writing the session to the history file
    #[arg(long)]
    no_history: bool,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level; RUST_LOG wins when set
    let default_directive = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting roundtable");

    // Load and validate configuration
    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };

    for issue in file_config.validate() {
        match issue.severity {
            Severity::Warning => warn!("config: {}: {}", issue.field, issue.message),
            Severity::Error => error!("config: {}: {}", issue.field, issue.message),
        }
    }

    // === Dependency Injection ===
    let params = file_config.discussion.clone();
    let registry = Arc::new(build_registry(&file_config));
    info!("Registered {} agent(s)", registry.len());

    let mut use_case = RunDiscussionUseCase::new(Arc::clone(&registry), params);

    if !cli.no_history
        && file_config.history.enabled
        && let Some(path) = file_config.history.resolved_path()
        && let Some(sink) = JsonlHistorySink::new(&path)
    {
        use_case = use_case.with_history(Arc::new(sink));
    }

    // Ctrl-C resolves in-flight dispatches as cancelled and ends the
    // session with whatever was collected so far.
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });
    use_case = use_case.with_cancellation_token(cancel);

    let mut input = RunDiscussionInput::new(cli.prompt.clone());
    if let Some(rounds) = cli.rounds {
        input = input.with_rounds(rounds);
    }
    if let Some(agents) = cli.agents {
        input = input.with_agent_count(agents);
    }

    let result = if cli.quiet {
        use_case.execute(input).await
    } else {
        use_case.execute_with_progress(input, &ConsoleProgress).await
    };

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Some(context) = e.partial_context()
                && let Some(round) = context.final_round()
            {
                for round_error in &round.errors {
                    eprintln!("  {} failed: {}", round_error.agent_id, round_error.reason);
                }
            }
            return Err(e.into());
        }
    };

    print_outcome(&outcome);

    Ok(())
}

fn build_registry(file_config: &FileConfig) -> AgentRegistry {
    let mut registry = AgentRegistry::new(&file_config.discussion);
    for (index, agent) in file_config.agents.iter().enumerate() {
        if !agent.enabled {
            continue;
        }
        // Entries with error-severity issues were already reported
        if agent
            .validate(index)
            .iter()
            .any(|issue| issue.severity == Severity::Error)
        {
            continue;
        }
        registry.register(Arc::new(ProcessBackend::from_config(agent)));
    }
    registry
}

fn print_outcome(outcome: &roundtable_application::DiscussionOutcome) {
    let synthesis = &outcome.synthesis;

    println!();
    println!("{}", synthesis.summary);

    if !synthesis.key_points.is_empty() {
        println!();
        println!("Key points:");
        for point in &synthesis.key_points {
            println!("  - {}", point);
        }
    }

    println!();
    let agents: Vec<&str> = synthesis
        .contributing_agents
        .iter()
        .map(|id| id.as_str())
        .collect();
    println!(
        "Agents: {} | Rounds: {} | Consensus: {}",
        agents.join(", "),
        outcome.context.rounds().len(),
        if synthesis.consensus { "yes" } else { "no" }
    );

    if outcome.conflicts.has_conflicts() {
        println!("Unresolved disagreement:");
        for note in &outcome.conflicts.notes {
            println!("  - {}", note);
        }
    }
}
