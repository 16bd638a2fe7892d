//! `pipc run` — Open a container and run it until interrupted.

use clap::Args;
use pip_container_runtime::process::ProcessContainer;

use super::ConfigArgs;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Configuration source and placeholder values.
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Container name, unless the configuration declares a context info.
    #[arg(long, default_value = "pip-container")]
    pub name: String,

    /// Container description.
    #[arg(long, default_value = "")]
    pub description: String,

    /// Correlation id attached to lifecycle logs; generated when omitted.
    #[arg(long)]
    pub correlation_id: Option<String>,
}

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

/// Executes the `run` command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be read, or the container
/// fails to open or close.
pub fn execute(args: RunArgs) -> anyhow::Result<()> {
    let parameters = args.config.parameters()?;
    if !args.config.config.exists() {
        return Err(anyhow::anyhow!(
            "Configuration file not found: {}\n\
             Create one or specify a path: pipc run -c <file>",
            args.config.config.display()
        ));
    }

    eprintln!();
    eprintln!("  {BOLD}pipc{RESET} {DIM}v{}{RESET}", env!("CARGO_PKG_VERSION"));
    eprintln!("  {DIM}config: {}{RESET}", args.config.config.display());
    eprintln!();
    eprintln!("  Press {BOLD}Ctrl+C{RESET} to stop the container...");

    let mut process = ProcessContainer::new(&args.name, &args.description)
        .with_config_path(&args.config.config)
        .with_parameters(&parameters);
    process.run(args.correlation_id.as_deref())?;

    eprintln!();
    eprintln!("  {GREEN}Container stopped.{RESET}");
    Ok(())
}
