use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{BroadcastPresenter, SimulationClient, SimulationHandle};
use shared::domain::ServerAddress;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod timeline;

use commands::{parse_line, ConsoleCommand, HELP};
use config::{load_settings, Settings};

/// Operator console for a GAMA simulation server.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Settings file, defaults to ./gama-console.toml
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
    #[arg(long)]
    model_file: Option<String>,
    #[arg(long)]
    experiment: Option<String>,
    /// Start without connecting; use `connect` at the prompt.
    #[arg(long)]
    no_connect: bool,
}

impl Args {
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(host) = &self.host {
            settings.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(model_file) = &self.model_file {
            settings.model_file = Some(model_file.clone());
        }
        if let Some(experiment) = &self.experiment {
            settings.experiment_name = Some(experiment.clone());
        }
        settings
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    let settings = args.apply(load_settings(args.config.as_deref()));

    let presenter = Arc::new(BroadcastPresenter::new(settings.event_buffer));
    let printer = timeline::spawn_printer(presenter.subscribe_events());
    let client = SimulationClient::new(presenter.clone());

    if let (Some(model_file), Some(experiment)) = (&settings.model_file, &settings.experiment_name)
    {
        client.configure_session(model_file, experiment).await;
    }

    let mut address = settings.address();
    if !args.no_connect {
        connect_or_warn(&client, &address).await;
    }

    run_console(&client, &mut address).await?;

    client.disconnect().await;
    printer.abort();
    Ok(())
}

async fn connect_or_warn(handle: &dyn SimulationHandle, address: &ServerAddress) {
    if let Err(err) = handle.connect(address).await {
        warn!("console: simulation server unavailable: {err:#}");
    }
}

async fn run_console(handle: &dyn SimulationHandle, address: &mut ServerAddress) -> Result<()> {
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read operator input")? {
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        match command {
            ConsoleCommand::Connect => connect_or_warn(handle, address).await,
            ConsoleCommand::Address(next) => {
                *address = next;
                if let Err(err) = handle.change_address(address).await {
                    warn!("console: reconnect failed: {err:#}");
                }
            }
            ConsoleCommand::Experiment {
                model_file,
                experiment_name,
            } => handle.configure_session(&model_file, &experiment_name).await,
            ConsoleCommand::Issue(request) => {
                // Rejections and send failures already reach the timeline.
                if let Err(err) = handle.issue(request).await {
                    debug!(error = %err, "console: command not sent");
                }
            }
            ConsoleCommand::Status => {
                let snapshot = handle.snapshot().await;
                println!("address: {address}");
                println!(
                    "{}",
                    serde_json::to_string_pretty(&snapshot).context("failed to render status")?
                );
            }
            ConsoleCommand::Disconnect => handle.disconnect().await,
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Quit => break,
        }
    }
    info!("console: operator input closed");
    Ok(())
}
