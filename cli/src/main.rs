mod config;
mod logging;
mod schedule_cmd;
mod tui;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use dayplan_core::auth::{AuthProvider, IdentityToolkitProvider, OfflineAuthProvider};
use dayplan_core::schedule::ChatCompletionsGenerator;
use dayplan_core::ScheduleRequester;

use crate::config::{AppConfig, ConfigArgs};

#[derive(Parser)]
#[command(name = "dayplan", version)]
#[command(about = "Plan your day: tasks, timers and a generated schedule", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Open the terminal UI (default)
    Tui,
    /// Generate a schedule without the UI
    /// (usage: schedule -t "Write report est:1h pri:high" -t "Email team")
    Schedule {
        /// One task per flag, in the add-task syntax
        #[arg(short, long = "task", required = true)]
        tasks: Vec<String>,
    },
}

fn build_requester(config: &AppConfig) -> Result<ScheduleRequester> {
    let generator = ChatCompletionsGenerator::new(config.llm.clone())?;
    if config.llm.api_key.is_none() {
        tracing::warn!("no LLM API key configured; schedule generation will fail");
    }
    Ok(ScheduleRequester::new(Arc::new(generator)))
}

fn build_auth(config: &AppConfig) -> Result<Arc<dyn AuthProvider>> {
    Ok(match &config.auth {
        Some(identity) => Arc::new(IdentityToolkitProvider::new(identity.clone())?),
        None => {
            tracing::info!("no auth API key configured; only guest sign-in is available");
            Arc::new(OfflineAuthProvider)
        }
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let _log_guard = logging::init_file(&config.log_level, config.log_dir.as_deref())?;
            tracing::info!("dayplan starting");
            // The planner spawns timers and requests on the current runtime.
            let _enter = runtime.enter();
            let requester = build_requester(&config)?;
            let auth = build_auth(&config)?;
            tui::run(&config, requester, auth)?;
            tracing::info!("dayplan exiting");
        }
        Commands::Schedule { tasks } => {
            logging::init_stderr(&config.log_level);
            let requester = build_requester(&config)?;
            runtime.block_on(schedule_cmd::run(&requester, &tasks))?;
        }
    }
    Ok(())
}
