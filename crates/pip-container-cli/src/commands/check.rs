//! `pipc check` — Display the creation plan of a configuration.

use anyhow::Context;
use clap::Args;
use pip_container_common::config::ConfigParams;
use pip_container_components::build::Factory;
use pip_container_config::container::ContainerConfig;
use pip_container_config::reader::ContainerConfigReader;
use pip_container_runtime::factory::default_container_factory;
use serde_json::{Value, json};

use super::ConfigArgs;

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Configuration source and placeholder values.
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Print the plan as JSON.
    #[arg(long)]
    pub json: bool,
}

/// One component of the creation plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    /// Locator the component is created and registered under.
    pub locator: String,
    /// Whether one of the default factories can create it.
    pub resolvable: bool,
    /// Section parameters.
    pub params: ConfigParams,
}

/// Lists the components of `config` in creation order.
#[must_use]
pub fn plan(config: &ContainerConfig, factory: &dyn Factory) -> Vec<PlanEntry> {
    config
        .iter()
        .map(|section| {
            let locator = section.locator();
            PlanEntry {
                resolvable: factory.can_create(&locator),
                locator: locator.to_string(),
                params: section.config.clone(),
            }
        })
        .collect()
}

fn to_json(path: &str, entries: &[PlanEntry]) -> Value {
    let components: Vec<Value> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let params: serde_json::Map<String, Value> = entry
                .params
                .iter()
                .map(|(k, v)| (k.to_owned(), Value::String(v.to_owned())))
                .collect();
            json!({
                "position": index + 1,
                "locator": entry.locator,
                "resolvable": entry.resolvable,
                "params": params,
            })
        })
        .collect();
    json!({
        "config": path,
        "components": components,
        "unresolved": entries.iter().filter(|e| !e.resolvable).count(),
    })
}

/// Executes the `check` command.
///
/// Reads and parameterizes the configuration, then lists every component in
/// creation order, marking those no default factory can create.
///
/// # Errors
///
/// Returns an error if the configuration cannot be read, or if any
/// component cannot be created.
pub fn execute(args: CheckArgs) -> anyhow::Result<()> {
    let parameters = ConfigParams::from_env().override_with(&args.config.parameters()?);
    let path = &args.config.config;
    let config = ContainerConfigReader::read_from_file(None, path, Some(&parameters))
        .with_context(|| format!("failed to read configuration {}", path.display()))?;

    let factory = default_container_factory();
    let entries = plan(&config, &factory);
    tracing::debug!(components = entries.len(), "creation plan built");
    let unresolved = entries.iter().filter(|e| !e.resolvable).count();

    if args.json {
        println!("{:#}", to_json(&path.display().to_string(), &entries));
    } else {
        println!("Creation Plan for: {}", path.display());
        println!("{}", "\u{2550}".repeat(35));
        println!();
        for (index, entry) in entries.iter().enumerate() {
            let marker = if entry.resolvable { '+' } else { '!' };
            println!("  {marker} {}. {}", index + 1, entry.locator);
            for (key, value) in entry.params.iter() {
                if key != "descriptor" && key != "type" {
                    println!("      {key}: {value}");
                }
            }
        }
        println!();
        println!("  {} component(s) will be created.", entries.len());
    }

    if unresolved > 0 {
        return Err(anyhow::anyhow!(
            "{unresolved} component(s) cannot be created by the default factories"
        ));
    }
    Ok(())
}
