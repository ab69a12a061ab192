//! CLI for the opsdl episode sync.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use opsdl_core::config::{self, OpsdlConfig};
use opsdl_core::control::CancelToken;
use opsdl_core::episode::ProgramType;
use opsdl_core::logging::Verbosity;
use std::path::PathBuf;

use commands::{run_config, run_status, run_sync};

/// Top-level CLI for opsdl.
#[derive(Debug, Parser)]
#[command(name = "opsdl")]
#[command(about = "opsdl: sync new catalog episodes into a local media library", long_about = None)]
pub struct Cli {
    /// Log everything at debug level.
    #[arg(long, global = true, conflicts_with_all = ["verbose", "silent"])]
    pub debug: bool,

    /// Log opsdl's own steps at debug level.
    #[arg(short, long, global = true, conflicts_with = "silent")]
    pub verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    pub silent: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Find new episodes in the catalog and file them into the library.
    Sync(SyncArgs),

    /// Show the last synced episode of each configured type.
    Status,

    /// Print the config file path (creating a default one if missing).
    Config {
        /// Open the config file in $EDITOR.
        #[arg(long)]
        edit: bool,
    },
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Only sync this type (QA or CLASS). Repeatable; defaults to the configured types.
    #[arg(long = "type", value_name = "TYPE", value_parser = parse_program_type)]
    pub types: Vec<ProgramType>,

    /// Discover, locate and number new episodes, but do not download.
    #[arg(long)]
    pub pretend: bool,

    /// Show the browser window instead of running headless.
    #[arg(long)]
    pub headed: bool,

    /// Write the browser's captured network log (JSON) to this path.
    #[arg(long, value_name = "PATH")]
    pub dump_network_log: Option<PathBuf>,
}

fn parse_program_type(s: &str) -> std::result::Result<ProgramType, String> {
    ProgramType::from_config_name(s).ok_or_else(|| format!("unknown type {s:?} (expected QA or CLASS)"))
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        if self.debug {
            Verbosity::Debug
        } else if self.verbose {
            Verbosity::Verbose
        } else if self.silent {
            Verbosity::Silent
        } else {
            Verbosity::Normal
        }
    }

    /// Only `sync` and `status` need a valid config; `config` must still work
    /// when the file does not parse, so it can be repaired.
    pub async fn run(self, cfg: Result<OpsdlConfig>, cancel: CancelToken) -> Result<()> {
        match self.command {
            CliCommand::Sync(args) => run_sync(loaded(cfg)?, args, cancel).await?,
            CliCommand::Status => run_status(&loaded(cfg)?)?,
            CliCommand::Config { edit } => {
                if let Err(e) = &cfg {
                    eprintln!("opsdl: current config is invalid: {e:#}");
                }
                run_config(&config::config_path()?, edit)?
            }
        }

        Ok(())
    }
}

fn loaded(cfg: Result<OpsdlConfig>) -> Result<OpsdlConfig> {
    let cfg = cfg?;
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

#[cfg(test)]
mod tests;
