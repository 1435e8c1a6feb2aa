use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use intake_core::config::{millis_from_env_value, socket_url_from_env_value};
use intake_core::constants::{IDLE_POLL_INTERVAL, INACTIVITY_TIMEOUT};
use intake_core::{ClientConfig, PatientField, PatientSnapshot, PatientStatus};

mod link;
mod render;
mod session;
mod watch;

#[derive(Parser)]
#[command(name = "intake")]
#[command(about = "Patient intake relay clients")]
struct Cli {
    /// Relay WebSocket URL (overrides SOCKET_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in the intake form from stdin and stream it to the relay
    Fill {
        /// Initial field value as `field=value` (repeatable)
        #[arg(long = "set", value_parser = parse_initial_value)]
        initial: Vec<(PatientField, String)>,
        /// Initial status (default: inactive)
        #[arg(long)]
        status: Option<PatientStatus>,
    },
    /// Watch the relayed snapshot as a dashboard
    Watch,
}

fn parse_initial_value(arg: &str) -> Result<(PatientField, String), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected <field>=<value>, got {arg:?}"))?;
    let field = name.trim().parse().map_err(|e| format!("{e}"))?;
    Ok((field, value.trim().to_string()))
}

/// Entry point for the `intake` client.
///
/// # Environment Variables
/// - `SOCKET_URL`: Relay endpoint (default: "ws://localhost:3001/ws")
/// - `INTAKE_IDLE_TIMEOUT_MS`: Inactivity threshold for `fill` (default: 5000)
/// - `INTAKE_IDLE_POLL_MS`: Idle monitor interval for `fill` (default: 2000)
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // stdout carries the session; logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("intake=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let url = socket_url_from_env_value(cli.url.or_else(|| std::env::var("SOCKET_URL").ok()))?;
    let idle_timeout = millis_from_env_value(
        std::env::var("INTAKE_IDLE_TIMEOUT_MS").ok(),
        INACTIVITY_TIMEOUT,
    )?;
    let idle_poll = millis_from_env_value(
        std::env::var("INTAKE_IDLE_POLL_MS").ok(),
        IDLE_POLL_INTERVAL,
    )?;
    let cfg = ClientConfig::new(url, idle_timeout, idle_poll)?;

    match cli.command {
        Commands::Fill { initial, status } => {
            let initial = PatientSnapshot::from_initial_values(initial, status);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            session::run_fill(&cfg, initial, stdin).await
        }
        Commands::Watch => watch::run_watch(&cfg).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_fill_with_initial_values() {
        let cli = Cli::try_parse_from([
            "intake",
            "--url",
            "ws://relay:3001/ws",
            "fill",
            "--set",
            "firstName=Ana",
            "--status",
            "filling",
        ])
        .unwrap();

        assert_eq!(cli.url.as_deref(), Some("ws://relay:3001/ws"));
        match cli.command {
            Commands::Fill { initial, status } => {
                assert_eq!(initial, vec![(PatientField::FirstName, "Ana".to_string())]);
                assert_eq!(status, Some(PatientStatus::Filling));
            }
            Commands::Watch => panic!("expected fill"),
        }
    }

    #[test]
    fn rejects_unknown_initial_fields() {
        assert!(Cli::try_parse_from(["intake", "fill", "--set", "shoeSize=41"]).is_err());
        assert!(Cli::try_parse_from(["intake", "fill", "--set", "firstName"]).is_err());
    }
}
