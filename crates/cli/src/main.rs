// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ghost - durable session archive and knowledge base for coding agents

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{enable, hooks, knowledge, log, maintain, resume, search, stats, status, tag};
use ghost_engine::hooks::HookKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ghost",
    version,
    about = "Ghost - session capture and knowledge archive for coding agents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up hooks, notes display, post-commit checkpoint and shared branch
    Enable(enable::EnableArgs),
    /// Remove this tool's hook entries, leaving session files in place
    Disable,
    /// Wipe the session directory, notes ref and search collection
    Reset,
    /// Report archive, hook wiring and dependency health
    Status,

    /// Hook: session started (stdin JSON, always exits 0)
    #[command(name = "session-start")]
    SessionStart,
    /// Hook: session ended (stdin JSON, always exits 0)
    #[command(name = "session-end")]
    SessionEnd,
    /// Hook: user prompt submitted (stdin JSON, always exits 0)
    Prompt,
    /// Hook: turn completed (stdin JSON, always exits 0)
    Stop,
    /// Hook: file written by the agent (stdin JSON, always exits 0)
    #[command(name = "post-write")]
    PostWrite,
    /// Hook: task dispatched by the agent (stdin JSON, always exits 0)
    #[command(name = "post-task")]
    PostTask,
    /// Attach the latest completed transcript as a note on HEAD
    Checkpoint,

    /// Internal: detached enrichment pass over a completed transcript
    #[command(name = "finalize-session", hide = true)]
    FinalizeSession {
        repo: PathBuf,
        transcript: PathBuf,
        session_id: String,
    },

    /// Semantic search over this project's archived sessions
    Search(search::SearchArgs),
    /// List recent completed sessions
    Log,
    /// Print the session note attached to a commit
    Show {
        /// Commit-ish to look up
        commit: String,
    },
    /// Apply tags to a session
    Tag(tag::TagArgs),
    /// Knowledge base operations
    Knowledge(knowledge::KnowledgeArgs),
    /// Record a mistake entry manually
    Mistake {
        /// What went wrong
        text: String,
    },
    /// List recorded decisions
    Decisions {
        /// Only sessions carrying this tag
        #[arg(long)]
        tag: Option<String>,
    },
    /// Print a continuity block for a session
    Resume {
        /// Session id (default: most recent completed)
        id: Option<String>,
    },
    /// Print knowledge scoped to a topic
    Brief {
        /// Topic text
        text: String,
    },
    /// Most-modified files across archived sessions
    Heatmap(stats::HeatmapArgs),
    /// Archive statistics
    Stats(stats::StatsArgs),
    /// Rebuild the tag index, co-mod cache and search collection
    Reindex,
    /// Check (and with -f repair) structural issues in the archive
    Validate {
        /// Repair what can be repaired
        #[arg(short = 'f', long = "fix")]
        fix: bool,
    },
    /// Re-write hook wiring and the post-commit script in place
    Update,
    /// Print the version
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Hook entry points exit 0 on every outcome and print nothing except
    // SessionStart's context block.
    let hook = match &cli.command {
        Commands::SessionStart => Some(HookKind::SessionStart),
        Commands::SessionEnd => Some(HookKind::SessionEnd),
        Commands::Prompt => Some(HookKind::Prompt),
        Commands::Stop => Some(HookKind::Stop),
        Commands::PostWrite => Some(HookKind::PostWrite),
        Commands::PostTask => Some(HookKind::PostTask),
        Commands::Checkpoint => Some(HookKind::Checkpoint),
        _ => None,
    };
    if let Some(kind) = hook {
        hooks::run(kind).await;
        return;
    }
    if let Commands::FinalizeSession {
        repo,
        transcript,
        session_id,
    } = &cli.command
    {
        hooks::run_finalizer(repo, transcript, session_id).await;
        return;
    }

    init_tracing();
    if let Err(e) = run(cli.command).await {
        eprintln!("Error: {}", format_error(&e));
        std::process::exit(1);
    }
}

/// Stderr tracing for user commands only; hooks stay silent.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_env("GHOST_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

/// Format an anyhow error, deduplicating the chain.
///
/// If the top-level Display already contains the source error text, the
/// "Caused by" chain is skipped to avoid noisy duplicate output.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }
    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Enable(args) => enable::enable(args).await,
        Commands::Disable => enable::disable().await,
        Commands::Update => enable::update().await,
        Commands::Reset => status::reset().await,
        Commands::Status => status::status().await,
        Commands::Search(args) => search::handle(args).await,
        Commands::Log => log::log_sessions().await,
        Commands::Show { commit } => log::show_note(&commit).await,
        Commands::Tag(args) => tag::apply(args).await,
        Commands::Knowledge(args) => knowledge::handle(args).await,
        Commands::Mistake { text } => tag::mistake(&text).await,
        Commands::Decisions { tag: tag_filter } => tag::decisions(tag_filter.as_deref()).await,
        Commands::Resume { id } => resume::resume(id.as_deref()).await,
        Commands::Brief { text } => resume::brief(&text).await,
        Commands::Heatmap(args) => stats::heatmap(args).await,
        Commands::Stats(args) => stats::stats(args).await,
        Commands::Reindex => maintain::reindex().await,
        Commands::Validate { fix } => maintain::validate(fix).await,
        Commands::Version => {
            println!("ghost {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        // Hooks handled before run().
        Commands::SessionStart
        | Commands::SessionEnd
        | Commands::Prompt
        | Commands::Stop
        | Commands::PostWrite
        | Commands::PostTask
        | Commands::Checkpoint
        | Commands::FinalizeSession { .. } => unreachable!(),
    }
}
