//! CLI command definitions and dispatch.

pub mod check;
pub mod run;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use pip_container_common::config::ConfigParams;
use pip_container_common::constants;

/// pipc — run and check pip containers.
#[derive(Parser, Debug)]
#[command(name = constants::BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open a container from its configuration and run it until Ctrl+C.
    Run(run::RunArgs),
    /// Show the creation plan and report components no factory can create.
    Check(check::CheckArgs),
}

/// Options shared by commands that read a configuration file.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Configuration file (.yml, .yaml, or .json).
    #[arg(short, long, env = constants::CONFIG_PATH_ENV, default_value = constants::DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Placeholder values as `KEY=VALUE;KEY2=VALUE2`; may be repeated.
    #[arg(short, long = "param", value_name = "PARAMS")]
    pub params: Vec<String>,
}

impl ConfigArgs {
    /// Parameters given on the command line, later ones winning.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is not a `KEY=VALUE` list.
    pub fn parameters(&self) -> anyhow::Result<ConfigParams> {
        self.params.iter().try_fold(ConfigParams::new(), |acc, raw| {
            let parsed: ConfigParams = raw
                .parse()
                .with_context(|| format!("invalid --param value '{raw}'"))?;
            Ok(acc.override_with(&parsed))
        })
    }
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Run(args) => run::execute(args),
        Command::Check(args) => check::execute(args),
    }
}
