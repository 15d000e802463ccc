// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cutover::output::OutputMode;

#[derive(Parser)]
#[command(name = "cutover")]
#[command(about = "Blue/green and canary cutover orchestration for elastic compute groups")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new cutover.yml configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Parse a task file and report which protocol it runs
    Validate {
        /// Task parameters (YAML or JSON)
        task: PathBuf,
    },

    /// Run a task against a simulated cloud
    Run {
        /// Task parameters (YAML or JSON)
        task: PathBuf,

        /// Cloud fixture seeding the simulated provider
        #[arg(long)]
        cloud: PathBuf,

        /// Write the cloud state after the run back to the fixture file
        #[arg(long)]
        dump_state: bool,
    },
}
