// ABOUTME: Entry point for the cutover CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use cutover::config::{self, CONFIG_FILENAME, Config};
use cutover::error::{Error, Result};
use cutover::output::{Output, OutputSink};
use cutover::sim::{CloudFixture, SimulatedCloud};
use cutover::task::{Orchestrator, TaskParameters, cancellation};
use std::env;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut output = Output::new(cli.output_mode());
    let result = run(cli, &mut output).await;

    if let Err(e) = result {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &mut Output) -> Result<()> {
    match cli.command {
        Commands::Init { force } => {
            let cwd = env::current_dir()?;
            config::init_config(&cwd, force)?;
            output.success(&format!("Created {CONFIG_FILENAME}"));
            Ok(())
        }
        Commands::Validate { task } => {
            let params = TaskParameters::load(&task)?;
            output.success(&format!(
                "{}: valid {} task",
                task.display(),
                params.protocol()
            ));
            Ok(())
        }
        Commands::Run {
            task,
            cloud,
            dump_state,
        } => run_task(&task, &cloud, dump_state, output).await,
    }
}

/// Run one task against a simulated cloud seeded from `fixture_path`.
async fn run_task(
    task_path: &Path,
    fixture_path: &Path,
    dump_state: bool,
    output: &mut Output,
) -> Result<()> {
    let cwd = env::current_dir()?;
    let config = Config::discover_or_default(&cwd)?;
    let params = TaskParameters::load(task_path)?;
    let fixture = CloudFixture::load(fixture_path)?;

    let (cancel, signal) = cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, no further steps will start");
            cancel.cancel();
        }
    });

    let orchestrator = Orchestrator::new(
        SimulatedCloud::from_fixture(&fixture),
        Arc::new(OutputSink::new(output.mode())),
    )
    .with_steady_state(&config.steady_state)
    .with_cancel_signal(signal);

    output.progress(&format!(
        "Running {} task from {}",
        params.protocol(),
        task_path.display()
    ));
    output.start_timer();
    let result = orchestrator.execute(params).await;
    output.result(&result);

    if dump_state {
        orchestrator.cloud().snapshot().save(fixture_path)?;
        output.progress(&format!("Cloud state written to {}", fixture_path.display()));
    }

    match result.error_message() {
        None => Ok(()),
        Some(message) => Err(Error::TaskFailed(message.to_string())),
    }
}
