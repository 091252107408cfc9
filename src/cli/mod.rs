//! CLI module for nser
//!
//! Provides commands:
//! - `tools`, `health`, `privileges`: catalog and environment checks
//! - `run`, `stream`: execute a tool against a target
//! - `history`, `output`, `reap`: inspect and maintain recorded runs

use crate::app::App;
use clap::{Args, Parser, Subcommand};
use nser_tools::RunRequest;

pub mod catalog;
pub mod exec;
pub mod history;

/// nser CLI
#[derive(Parser, Debug)]
#[command(name = "nser")]
#[command(about = "Run and record external security reconnaissance tools")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the tool catalog grouped by category
    Tools,
    /// Check which tools are installed and their versions
    Health {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show whether nser runs with elevated privileges
    Privileges,
    /// Run a tool and wait for it to finish
    Run(ExecArgs),
    /// Run a tool and print its output as it arrives (Ctrl-C cancels)
    Stream(ExecArgs),
    /// List recorded runs of a workspace, newest first
    History {
        /// Workspace id
        workspace: i64,
        #[arg(long, default_value_t = 20)]
        limit: i64,
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
    /// Print the captured output of a run
    Output {
        /// Run id
        run_id: i64,
    },
    /// Mark runs still `running` after a cut-off as failed
    Reap {
        /// Only reap runs started at least this many seconds ago
        #[arg(long, default_value_t = 3600)]
        older_than_secs: i64,
    },
}

/// Arguments shared by `run` and `stream`
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Registered tool name
    pub tool: String,
    /// Target, passed as the last argument
    pub target: String,
    /// Workspace the run is recorded under
    #[arg(long, short, default_value_t = 1)]
    pub workspace: i64,
    /// Print the final result as JSON
    #[arg(long)]
    pub json: bool,
    /// Print the command line that would run, without running it
    #[arg(long)]
    pub dry_run: bool,
    /// Extra tool arguments, after `--`
    #[arg(last = true)]
    pub args: Vec<String>,
}

impl ExecArgs {
    fn to_request(&self) -> RunRequest {
        RunRequest::new(self.workspace, &self.tool, &self.target).with_args(self.args.iter().cloned())
    }
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        cmd.print_help()?;
        println!();
        return Ok(());
    };

    let app = App::new(crate::config::load_config()?);

    match command {
        Commands::Tools => catalog::tools(&app),
        Commands::Health { json } => catalog::health(&app, json).await,
        Commands::Privileges => catalog::privileges(),
        Commands::Run(args) => exec::run(&app, &args).await,
        Commands::Stream(args) => exec::stream(&app, &args).await,
        Commands::History {
            workspace,
            limit,
            offset,
        } => history::list(&app, workspace, limit, offset).await,
        Commands::Output { run_id } => history::output(&app, run_id).await,
        Commands::Reap { older_than_secs } => history::reap(&app, older_than_secs).await,
    }
}
