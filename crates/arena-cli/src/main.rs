//! Answer Arena CLI
//!
//! The `arena` command asks two agent models a question, lets a referee pick
//! the better answer, polishes it, and keeps every turn for later feedback.
//!
//! ## Commands
//!
//! - `ask`: Run the full pipeline for one question
//! - `history`: List stored turns, newest first
//! - `feedback`: Label a stored turn as good or bad

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use arena_core::{
    AskResponse, HistoryItem, HumanLabel, OpenRouterClient, PipelineConfig, PipelineOrchestrator,
    ProviderConfig, RetryPolicy,
};
use arena_state::SurrealTurnStore;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "arena")]
#[command(author = "Answer Arena Developers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Two agents answer, a referee judges, an enhancer polishes", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(flatten)]
    models: ModelArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Role models and call policy. Unset values use the pipeline defaults.
#[derive(Args, Debug, Default)]
struct ModelArgs {
    /// Model for Agent A
    #[arg(long, global = true, env = "ARENA_AGENT_A_MODEL")]
    agent_a_model: Option<String>,

    /// Model for Agent B
    #[arg(long, global = true, env = "ARENA_AGENT_B_MODEL")]
    agent_b_model: Option<String>,

    /// Model for the referee
    #[arg(long, global = true, env = "ARENA_REFEREE_MODEL")]
    referee_model: Option<String>,

    /// Model for the enhancer
    #[arg(long, global = true, env = "ARENA_ENHANCER_MODEL")]
    enhancer_model: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long, global = true, env = "ARENA_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Retries per model call after the first attempt
    #[arg(long, global = true, env = "ARENA_MAX_RETRIES")]
    max_retries: Option<u32>,
}

impl ModelArgs {
    fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        if let Some(model) = &self.agent_a_model {
            config.agent_a_model = model.clone();
        }
        if let Some(model) = &self.agent_b_model {
            config.agent_b_model = model.clone();
        }
        if let Some(model) = &self.referee_model {
            config.referee_model = model.clone();
        }
        if let Some(model) = &self.enhancer_model {
            config.enhancer_model = model.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.call_timeout = Duration::from_secs(secs);
        }
        if let Some(max_retries) = self.max_retries {
            config.retry = RetryPolicy {
                max_retries,
                ..RetryPolicy::default()
            };
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question and store the resulting turn
    Ask {
        /// The question to ask
        question: String,

        /// Print the whole stored turn instead of the answer view
        #[arg(long)]
        raw: bool,
    },

    /// Show stored turns, newest first
    History {
        /// Maximum number of turns to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Record a correctness label on a turn
    Feedback {
        /// Turn id
        turn_id: u64,

        /// `good` or `bad`
        label: HumanLabel,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    arena_core::init_tracing(cli.json_logs, level);

    let arena = build_orchestrator(&cli.models).await?;
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Ask { question, raw } => cmd_ask(&arena, &question, raw, &mut stdout).await,
        Commands::History { limit } => cmd_history(&arena, limit, &mut stdout).await,
        Commands::Feedback { turn_id, label } => {
            cmd_feedback(&arena, turn_id, label, &mut stdout).await
        }
    }
}

async fn build_orchestrator(models: &ModelArgs) -> Result<PipelineOrchestrator> {
    let client = OpenRouterClient::new(ProviderConfig::from_env())
        .context("Failed to create model client")?;
    let store = SurrealTurnStore::from_env()
        .await
        .context("Failed to open turn store")?;
    let config = models.pipeline_config();
    debug!(?config, "pipeline configuration");

    PipelineOrchestrator::new(config, Arc::new(client), Arc::new(store))
        .context("Invalid pipeline configuration")
}

fn print_json<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    writeln!(out, "{text}")?;
    Ok(())
}

/// Run the pipeline, printing stage progress to stderr and the result to `out`.
async fn cmd_ask(
    arena: &PipelineOrchestrator,
    question: &str,
    raw: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<arena_core::StageEvent>();
    let progress = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            eprintln!("  -> {}", event.state);
        }
    });

    let result = arena.submit_question_observed(question, tx).await;
    // The sender is gone once the turn finishes, so this ends promptly.
    let _ = progress.await;

    match result {
        Ok(turn) => {
            if raw {
                print_json(out, &turn)
            } else {
                print_json(out, &AskResponse::from(&turn))
            }
        }
        Err(err) => {
            eprintln!("{}", err.user_message());
            if err.is_retryable() {
                eprintln!("(this can be retried: arena ask \"{question}\")");
            }
            Err(anyhow::Error::new(err).context("ask failed"))
        }
    }
}

async fn cmd_history(
    arena: &PipelineOrchestrator,
    limit: Option<usize>,
    out: &mut dyn Write,
) -> Result<()> {
    let mut items: Vec<HistoryItem> = arena.history_items().await?;
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    print_json(out, &items)
}

async fn cmd_feedback(
    arena: &PipelineOrchestrator,
    turn_id: u64,
    label: HumanLabel,
    out: &mut dyn Write,
) -> Result<()> {
    let turn = arena
        .record_feedback(turn_id, label)
        .await
        .with_context(|| format!("Failed to label turn {turn_id}"))?;
    writeln!(out, "Turn {} labeled {}", turn.turn_id, label)?;
    Ok(())
}
