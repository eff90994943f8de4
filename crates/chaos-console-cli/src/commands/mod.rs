/*
[INPUT]:  Parsed subcommands, loaded configuration, shutdown token
[OUTPUT]: Command execution against the experiment service
[POS]:    Command layer - routing
[UPDATE]: When adding or renaming subcommands
*/

pub mod config;
pub mod experiments;
pub mod init;
pub mod task;

use anyhow::Result;
use clap::{Args, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::config::ConsoleConfig;
use crate::context::AppContext;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactively write a configuration file
    Init {
        #[arg(long, value_name = "PATH", default_value = "console.yaml")]
        output: PathBuf,
    },
    #[command(subcommand)]
    Config(ConfigCommand),
    #[command(subcommand)]
    Experiments(ExperimentsCommand),
    #[command(subcommand)]
    Task(TaskCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Load and validate configuration, then print the effective settings
    Check,
}

#[derive(Subcommand, Debug)]
pub enum ExperimentsCommand {
    /// List experiments, optionally filtered by task status code
    List(ListArgs),
    Show { id: String },
    /// Start a new task for an experiment
    Run {
        id: String,
        #[arg(long)]
        watch: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Status filter code: -1 waiting, 1-3 start phase, 4-6 end phase, 7 unknown
    #[arg(long = "status", value_name = "CODE", allow_negative_numbers = true)]
    pub status: Option<i32>,
    /// Drop the remembered status filter
    #[arg(long, conflicts_with = "status")]
    pub all: bool,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long, default_value_t = chaos_console_adapter::DEFAULT_PAGE_SIZE)]
    pub size: u32,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    Show { id: String },
    /// Poll a task until it reaches a terminal status
    Watch {
        id: String,
        /// Tail task logs while watching
        #[arg(long)]
        logs: bool,
    },
    End {
        id: String,
        #[arg(long, short = 'y')]
        yes: bool,
    },
    Retry {
        id: String,
        #[arg(long, short = 'y')]
        yes: bool,
    },
    Logs {
        id: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = chaos_console_adapter::poll::log_tail::DEFAULT_LOG_PAGE_SIZE)]
        size: u32,
    },
}

/// Run a subcommand. Commands that talk to the service get an [`AppContext`].
pub async fn dispatch(
    command: Command,
    config: ConsoleConfig,
    shutdown: CancellationToken,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::Init { output } => init::run_init(&output),
        Command::Config(ConfigCommand::Check) => config::check(&config, out),
        Command::Experiments(command) => {
            let mut ctx = AppContext::new(config).await?;
            match command {
                ExperimentsCommand::List(args) => experiments::list(&mut ctx, &args, out).await,
                ExperimentsCommand::Show { id } => experiments::show(&mut ctx, &id, out).await,
                ExperimentsCommand::Run { id, watch } => {
                    experiments::run(&mut ctx, &id, watch, shutdown, out).await
                }
            }
        }
        Command::Task(command) => {
            let mut ctx = AppContext::new(config).await?;
            match command {
                TaskCommand::Show { id } => task::show(&mut ctx, &id, out).await,
                TaskCommand::Watch { id, logs } => task::watch(&mut ctx, &id, logs, shutdown, out).await,
                TaskCommand::End { id, yes } => task::end(&mut ctx, &id, yes, out).await,
                TaskCommand::Retry { id, yes } => task::retry(&mut ctx, &id, yes, out).await,
                TaskCommand::Logs { id, page, size } => task::logs(&mut ctx, &id, page, size, out).await,
            }
        }
    }
}
