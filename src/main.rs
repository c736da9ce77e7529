//! Main binary for PSA tools

use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use psa_tools::config::{config_help, AppConfig};
use psa_tools::{create_tool_registry, logging, FixtureSource, ToolArgs, ToolContext};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error};

fn cli() -> Command {
    Command::new("psa-tools")
        .version(env!("CARGO_PKG_VERSION"))
        .about("PSA agent tools with cached company, resource and picklist labels")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("fixture")
                .long("fixture")
                .short('f')
                .global(true)
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("TOML fixture backing the data source (overrides PSA_FIXTURE_PATH)"),
        )
        .subcommand(Command::new("list").about("Print the function schemas of all tools as JSON"))
        .subcommand(
            Command::new("call")
                .about("Execute a tool and print its result as JSON")
                .arg(Arg::new("tool").required(true).help("Tool name"))
                .arg(
                    Arg::new("args")
                        .help("Tool arguments (positional or --name=value)")
                        .num_args(0..)
                        .value_name("ARGS")
                        .action(ArgAction::Append)
                        .trailing_var_arg(true)
                        .allow_hyphen_values(true),
                ),
        )
        .subcommand(Command::new("config-help").about("Describe configuration options"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let mut config = AppConfig::load(matches.get_one::<PathBuf>("config").map(|p| p.as_path()))?;
    if let Some(fixture) = matches.get_one::<PathBuf>("fixture") {
        config.source.fixture_path = Some(fixture.clone());
    }
    logging::init(&config.logging)?;
    debug!(
        server = %config.server.name,
        version = %config.server.version,
        "Configuration loaded"
    );

    match matches.subcommand() {
        Some(("config-help", _)) => {
            println!("{}", config_help());
        }
        Some(("list", _)) => {
            // Schemas never touch the data source
            let source = match &config.source.fixture_path {
                Some(path) => FixtureSource::from_path(path)?,
                None => FixtureSource::default(),
            };
            let ctx = ToolContext::new(Arc::new(source), config.label_ttl());
            let registry = create_tool_registry(Arc::new(ctx));
            println!("{}", serde_json::to_string_pretty(&registry.get_all_schemas())?);
        }
        Some(("call", sub_matches)) => {
            let problems = config.validate();
            if !problems.is_empty() {
                for problem in &problems {
                    eprintln!("Configuration error: {}", problem);
                }
                eprintln!("\n{}", config_help());
                std::process::exit(2);
            }

            let fixture = config
                .source
                .fixture_path
                .as_ref()
                .context("fixture path missing")?;
            let source = FixtureSource::from_path(fixture)?;
            let ctx = ToolContext::new(Arc::new(source), config.label_ttl());
            let mut registry = create_tool_registry(Arc::new(ctx));
            registry.set_enhance_responses(config.cache.enhance_responses);

            let tool_name = sub_matches
                .get_one::<String>("tool")
                .context("tool name missing")?;
            let args: Vec<&str> = sub_matches
                .get_many::<String>("args")
                .unwrap_or_default()
                .map(|s| s.as_str())
                .collect();
            let tool_args = ToolArgs::from_args(&args);

            match registry.execute_tool(tool_name, &tool_args).await {
                Ok(result) => {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                    if !result.success {
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    error!(tool = %tool_name, "{}", e);
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        _ => {
            eprintln!("No command specified");
            std::process::exit(1);
        }
    }

    Ok(())
}
