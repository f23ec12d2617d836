use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tasklist_core::{AppError, Config, ConfigError};
use tasklist_services::HttpTaskStore;
use tasklist_ui::{
    execute, render, Command, CommandError, ControllerOptions, Flow, TaskController,
    TaskListState,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

/// Manage a remote task list from the terminal
#[derive(Debug, Parser)]
#[command(name = "tasklist", version)]
struct Args {
    /// Config file (defaults to <config dir>/tasklist/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Collection endpoint of the task store
    #[arg(long)]
    api_url: Option<String>,

    /// Minimum busy period after creating a task, in milliseconds (0 disables)
    #[arg(long)]
    min_busy_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tasklist_core::init()?;

    let config = load_config(&args)?;
    let store = HttpTaskStore::new(&config.services.task_api_url, config.request_timeout())?;
    tracing::info!("Using task store at {}", store.endpoint());

    let controller =
        TaskController::create(Arc::new(store), ControllerOptions::from_config(&config));
    let renderer = tokio::spawn(render_changes(controller.subscribe()));

    if let Err(e) = controller.reload().await {
        eprintln!("{}", AppError::from(e).user_message());
    }
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        match Command::parse(&line) {
            Ok(command) => match execute(&controller, command).await {
                Flow::Continue(Some(message)) => println!("{}", message),
                Flow::Continue(None) => {}
                Flow::Quit => break,
            },
            Err(CommandError::Empty) => {}
            Err(e) => println!("{}", e),
        }
    }

    controller.dispose();
    renderer.await.context("Render task failed")?;

    tracing::info!("Tasklist stopped");
    Ok(())
}

/// Load the config file, then apply command-line overrides
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) if !path.exists() => {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(url) = &args.api_url {
        config.services.task_api_url = url.clone();
    }
    if let Some(ms) = args.min_busy_ms {
        config.ui.min_create_busy_ms = ms;
    }

    config.ensure_valid()?;
    Ok(config)
}

/// Re-render whenever the controller publishes a new settled state.
async fn render_changes(mut rx: watch::Receiver<TaskListState>) {
    let mut last: Option<TaskListState> = None;
    let mut was_busy = false;

    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update().clone();

        if state.busy {
            if !was_busy {
                println!("Loading...");
            }
            was_busy = true;
            continue;
        }
        was_busy = false;

        if last.as_ref() != Some(&state) {
            print!("{}", render(&state));
            last = Some(state);
        }
    }
}
