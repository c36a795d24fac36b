//! Presage - Predictive Maintenance Engine
//!
//! # Usage
//!
//! ```bash
//! # Analyze a batch of machine data from a JSON file
//! presage analyze --input machines.json --pretty
//!
//! # Run a field agent pushing simulated readings to a hub
//! presage agent --hub-url http://hub:9000 --agent-config agent.json
//! ```
//!
//! # Environment Variables
//!
//! - `PRESAGE_CONFIG`: Path to engine tuning TOML (optional)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use presage::agent::{ConfigStore, FieldAgent, SimulatedInclinometer};
use presage::{AnalysisEngine, EngineConfig, MachineData};

#[derive(Parser, Debug)]
#[command(name = "presage")]
#[command(about = "Presage Predictive Maintenance Engine")]
#[command(version)]
struct CliArgs {
    /// Path to engine tuning TOML (overrides PRESAGE_CONFIG)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Analyze a JSON batch of machine data and print the report
    Analyze {
        /// Path to a JSON file holding an array of machine data objects
        #[arg(long)]
        input: String,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },

    /// Run a field agent pushing driver readings to a hub
    Agent {
        /// Hub base URL (e.g. http://hub:9000)
        #[arg(long)]
        hub_url: String,

        /// Path to the agent's config file
        #[arg(long, default_value = "agent.json")]
        agent_config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let engine_config = EngineConfig::load(args.config.as_deref().map(std::path::Path::new))
        .context("Failed to load engine configuration")?;

    match args.command {
        SubCommand::Analyze { input, pretty } => {
            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read input file {input}"))?;
            let machines: Vec<MachineData> =
                serde_json::from_str(&raw).context("Input is not a valid machine data batch")?;

            info!(machines = machines.len(), "Running analysis");
            let engine = AnalysisEngine::new(engine_config);
            let response = engine.analyze(&machines);

            let rendered = if pretty {
                serde_json::to_string_pretty(&response)?
            } else {
                serde_json::to_string(&response)?
            };
            println!("{rendered}");
        }

        SubCommand::Agent {
            hub_url,
            agent_config,
        } => {
            let store = ConfigStore::load(&agent_config)
                .with_context(|| format!("Failed to load agent config {agent_config}"))?;

            let mut agent = FieldAgent::new(hub_url, store);
            agent.add_driver(Box::new(SimulatedInclinometer::new("inclinometer-0")));
            agent.run().await?;
        }
    }

    Ok(())
}
