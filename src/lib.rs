pub mod agent;
pub mod cli;
pub mod config;
pub mod logging;
pub mod model;
pub mod model_gateway;
pub mod providers;
pub mod schema;
pub mod script;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;
use tracing::{debug, info};

use agent::Agent;
use agent::confirm::{ConfirmationGate, ScriptRunner, TerminalConfirm};
use agent::dispatch::Dispatcher;
use cli::{Cli, Command};
use config::Config;
use model_gateway::HostModelGateway;

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let Command::Q { query, .. } = &cli.command else {
        return script::worker::serve();
    };

    dotenvy::dotenv().ok();
    logging::init(cli.verbose());

    let cfg = Config::from_env();
    info!(
        provider = %cfg.model_provider,
        model = %cfg.model,
        model_base_url = %cfg.model_base_url,
        model_timeout_secs = cfg.model_timeout_secs,
        api_key_configured = cfg.api_key.is_some(),
        "loaded runtime configuration"
    );

    let client = Client::builder()
        .timeout(Duration::from_secs(cfg.model_timeout_secs))
        .build()
        .context("Failed to initialize HTTP client")?;

    let confirm = TerminalConfirm;
    let runner = ScriptRunner::current_exe()?;
    let gate = ConfirmationGate::new(&confirm, &runner);
    let dispatcher = Dispatcher::new(&gate, cli.verbose());
    debug!(
        allowed = ?dispatcher.allowed_names().collect::<Vec<_>>(),
        "function allow-list ready"
    );
    let gateway = HostModelGateway::new(&client, &cfg);
    let agent = Agent::new(&gateway, &cfg, &dispatcher);

    let outcome = agent.run_query(query).await?;
    println!("{outcome}");
    Ok(())
}
