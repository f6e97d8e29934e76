//! Charge gateway CLI server
//!
//! ```sh
//! # Run with default config (~/.config/charge-gateway/config.toml)
//! charge-gateway
//!
//! # Custom config path
//! charge-gateway --config /etc/charge-gateway/config.toml
//!
//! # Override ports
//! charge-gateway --api-port 8080 --ws-port 9000
//!
//! # Validate config without starting
//! charge-gateway --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use charge_gateway::config::AppConfig;
use charge_gateway::server::{init_tracing, ServerHandle, ServerOptions};

/// OCPP 1.6 gateway for EV charge points.
#[derive(Parser, Debug)]
#[command(
    name = "charge-gateway",
    version,
    about = "OCPP 1.6 charge point gateway with observer fan-out",
    long_about = "Accepts OCPP 1.6-J charge points over WebSocket, tracks their state \
                  in memory and streams status and meter events to observers.\n\n\
                  Default config: ~/.config/charge-gateway/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML). Falls back to
    /// `CHARGE_GATEWAY_CONFIG` when the flag is absent.
    #[arg(short, long, env = "CHARGE_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the charge point WebSocket listen port.
    #[arg(long)]
    ws_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .unwrap_or_else(charge_gateway::default_config_path);

    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // The log level override has to land before tracing starts
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);

    match &load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.api_port {
        info!("CLI override: api_port = {}", port);
        config.server.api_port = port;
    }
    if let Some(port) = cli.ws_port {
        info!("CLI override: ws_port = {}", port);
        config.server.ws_port = port;
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        if let Some(e) = load_error {
            return Err(e.into());
        }
        println!("✅ Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}:{}", config.server.api_host, config.server.api_port);
        println!("   WS address  : {}:{}", config.server.ws_host, config.server.ws_port);
        println!("   Heartbeat   : {}s", config.gateway.heartbeat_interval);
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions { config }).await?;

    // Install OS signal handlers (SIGTERM, SIGINT)
    handle.install_signal_handler();

    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_flag_wins_over_environment() {
        std::env::set_var("CHARGE_GATEWAY_CONFIG", "/from/env.toml");

        let cli = Cli::try_parse_from(["charge-gateway"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/from/env.toml")));

        let cli = Cli::try_parse_from(["charge-gateway", "--config", "/from/flag.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/from/flag.toml")));

        std::env::remove_var("CHARGE_GATEWAY_CONFIG");
    }
}
