//! Toon CLI - Lightweight client for the Toon smart-thermostat API
//!
//! Logs in with the legacy OAuth2 flow and prints agreements, status and
//! consumption data as JSON.

mod api;
mod auth;
mod config;
mod error;
mod models;
#[cfg(test)]
mod test_support;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{Interval, TimeRange, ToonClient};
use auth::{AuthEvent, Authenticator, Credential};
use config::Config;

#[derive(Parser)]
#[command(name = "toon-cli")]
#[command(
    about = "Lightweight CLI client for the Toon smart-thermostat API",
    long_about = "Lightweight CLI client for the Toon smart-thermostat API.\n\
                  See https://developer.toon.eu/toonapi/apis for the API reference."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    login: LoginArgs,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct LoginArgs {
    /// Username used to log in to your provider services
    #[arg(short, long, global = true)]
    username: Option<String>,

    /// Password used to log in to your provider services
    #[arg(short, long, global = true)]
    password: Option<String>,

    /// App client id (https://developer.toon.eu/user/me/apps)
    #[arg(long, global = true)]
    client_id: Option<String>,

    /// App client secret
    #[arg(long, global = true)]
    client_secret: Option<String>,

    /// Name of your provider, e.g. eneco, viesgo
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Host address to run the callback listener on
    #[arg(long, global = true)]
    callback_host: Option<String>,

    /// Port to run the callback listener on
    #[arg(long, global = true)]
    callback_port: Option<u16>,

    /// Callback path
    #[arg(long, global = true)]
    callback_endpoint: Option<String>,
}

#[derive(Args)]
struct RangeArgs {
    /// Agreement to query (defaults to the first one on the account)
    #[arg(short, long)]
    agreement: Option<String>,

    /// Start time: Unix timestamp in milliseconds
    #[arg(long)]
    start: Option<i64>,

    /// End time: Unix timestamp in milliseconds
    #[arg(long)]
    end: Option<i64>,
}

impl RangeArgs {
    fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }
}

#[derive(Args)]
struct GraphArgs {
    #[command(flatten)]
    range: RangeArgs,

    /// Interval: none, hours, days, weeks, months, years
    #[arg(short, long, default_value = "none")]
    interval: Interval,
}

#[derive(Subcommand)]
enum Commands {
    /// List agreements linked to the account
    Agreements,

    /// Show thermostat, power and gas status
    Status {
        /// Agreement to query (defaults to the first one on the account)
        #[arg(short, long)]
        agreement: Option<String>,
    },

    /// Gas consumption in 5 minute intervals
    GasFlows(RangeArgs),

    /// Gas consumption graph data
    GasGraph(GraphArgs),

    /// Electricity consumption in 5 minute intervals
    ElectricityFlows(RangeArgs),

    /// Electricity consumption graph data (peak / off-peak)
    ElectricityGraph(GraphArgs),

    /// District heat consumption graph data
    DistrictHeatGraph(GraphArgs),
}

impl Commands {
    fn agreement(&self) -> Option<&str> {
        match self {
            Commands::Agreements => None,
            Commands::Status { agreement } => agreement.as_deref(),
            Commands::GasFlows(args) | Commands::ElectricityFlows(args) => {
                args.agreement.as_deref()
            }
            Commands::GasGraph(args)
            | Commands::ElectricityGraph(args)
            | Commands::DistrictHeatGraph(args) => args.range.agreement.as_deref(),
        }
    }
}

/// Apply command-line overrides on top of the file configuration.
fn apply_overrides(config: &mut Config, args: &LoginArgs) {
    if let Some(id) = &args.client_id {
        config.client.client_id = Some(id.clone());
    }
    if let Some(secret) = &args.client_secret {
        config.client.client_secret = Some(secret.clone());
    }
    if let Some(provider) = &args.provider {
        config.client.tenant_id = provider.clone();
    }
    if let Some(host) = &args.callback_host {
        config.callback.host = host.clone();
    }
    if let Some(port) = args.callback_port {
        config.callback.port = port;
    }
    if let Some(endpoint) = &args.callback_endpoint {
        config.callback.endpoint = endpoint.clone();
    }
}

fn credential(args: &LoginArgs) -> Result<Credential> {
    Ok(Credential {
        username: args
            .username
            .clone()
            .context("Missing required --username")?,
        password: args
            .password
            .clone()
            .context("Missing required --password")?,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging (stderr; stdout carries the JSON output)
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli.login);
    let credential = credential(&cli.login)?;

    let authenticator = Authenticator::new(config.auth_config()?)
        .context("Failed to set up authenticator")?;
    let mut events = authenticator.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                AuthEvent::TokenReceived => tracing::info!("Authenticated"),
                AuthEvent::TokenRefreshing => tracing::info!("Refreshing token..."),
                AuthEvent::TokenError(reason) => tracing::error!("Authentication error: {}", reason),
            }
        }
    });

    authenticator.start_login(credential)?;
    let client = ToonClient::new(authenticator, config.api_settings())
        .context("Failed to build HTTP client")?;
    client.wait_for_login().await?;

    // Every command needs the agreements first.
    tracing::info!("Fetching agreements...");
    let agreements = client.get_agreements().await;
    let agreements = match (&cli.command, agreements) {
        (Commands::Agreements, result) => return api::print_response(result),
        (_, Ok(list)) => list,
        (_, Err(e)) => return api::print_response::<()>(Err(e)),
    };
    let agreement = api::pick_agreement(&agreements, cli.command.agreement())?;

    match &cli.command {
        Commands::Agreements => Ok(()),
        Commands::Status { .. } => api::print_response(client.get_status(&agreement).await),
        Commands::GasFlows(args) => {
            api::print_response(client.get_gas_flow_data(&agreement, args.range()).await)
        }
        Commands::GasGraph(args) => api::print_response(
            client
                .get_gas_graph_data(&agreement, args.range.range(), args.interval)
                .await,
        ),
        Commands::ElectricityFlows(args) => api::print_response(
            client
                .get_electricity_flow_data(&agreement, args.range())
                .await,
        ),
        Commands::ElectricityGraph(args) => api::print_response(
            client
                .get_electricity_graph_data(&agreement, args.range.range(), args.interval)
                .await,
        ),
        Commands::DistrictHeatGraph(args) => api::print_response(
            client
                .get_district_heat_graph_data(&agreement, args.range.range(), args.interval)
                .await,
        ),
    }
}
