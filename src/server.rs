//! Gateway server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: the charge-point WebSocket
//! listener, the API server (commands, queries and the observer socket) and
//! graceful shutdown.

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::application::events::{Broadcaster, SharedBroadcaster};
use crate::application::{OcppGateway, SharedGateway};
use crate::config::{AppConfig, Config};
use crate::interfaces::http::create_api_router;
use crate::interfaces::ws::OcppServer;
use crate::support::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the gateway.
#[derive(Default)]
pub struct ServerOptions {
    pub config: AppConfig,
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running gateway.
///
/// ```rust,no_run
/// use charge_gateway::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub gateway: SharedGateway,
    pub broadcaster: SharedBroadcaster,
    pub config: AppConfig,
    /// Port the API server is bound to
    pub api_port: u16,
    /// Port the charge-point listener is bound to
    pub ws_port: u16,

    shutdown: ShutdownCoordinator,
    ws_task: tokio::task::JoinHandle<()>,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Bind both listeners and start serving. A configured port of `0`
    /// binds an ephemeral port; the bound ports are reported on the handle.
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;

        info!("Starting charge gateway...");

        let broadcaster = Broadcaster::shared();
        let gateway = OcppGateway::shared(Config::from(&app_cfg), broadcaster.clone());

        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        // ── OCPP WebSocket server ──────────────────────────────
        let ws_addr = gateway.config().address();
        let ws_listener = TcpListener::bind(&ws_addr).await?;
        let ws_port = ws_listener.local_addr()?.port();
        info!("🔌 OCPP 1.6 gateway listening on ws://{}:{}", app_cfg.server.ws_host, ws_port);
        info!(
            "   Charge points should connect to: ws://{}:{}/ocpp/{{charge_point_id}}",
            app_cfg.server.ws_host, ws_port
        );

        let server = OcppServer::new(gateway.clone()).with_shutdown(shutdown_signal.clone());

        // ── API server ─────────────────────────────────────────
        let api_router = create_api_router(gateway.clone());
        let api_addr = format!("{}:{}", app_cfg.server.api_host, app_cfg.server.api_port);
        let api_listener = TcpListener::bind(&api_addr).await?;
        let api_port = api_listener.local_addr()?.port();
        info!("REST API listening on http://{}:{}", app_cfg.server.api_host, api_port);
        info!("Observers connect to ws://{}:{}/ws/client", app_cfg.server.api_host, api_port);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(api_listener, api_router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        // ── Spawn server tasks ─────────────────────────────────
        let ws_task = tokio::spawn(async move {
            if let Err(e) = server.serve(ws_listener).await {
                error!("WebSocket server error: {}", e);
            }
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        info!("🚀 All servers started.");

        Ok(Self {
            gateway,
            broadcaster,
            config: app_cfg,
            api_port,
            ws_port,
            shutdown,
            ws_task,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for both servers to stop, bounded by the configured drain timeout.
    pub async fn wait(self) {
        info!("⏳ Waiting for server tasks to complete...");

        let ws_task = self.ws_task;
        let api_task = self.api_task;
        let drained = self
            .shutdown
            .drain(async move {
                match ws_task.await {
                    Ok(()) => info!("WebSocket server stopped"),
                    Err(e) => error!("WebSocket server task panicked: {}", e),
                }
                match api_task.await {
                    Ok(()) => info!("REST API server stopped"),
                    Err(e) => error!("REST API server task panicked: {}", e),
                }
            })
            .await;

        if !drained {
            self.gateway.shutdown();
        }

        info!("👋 Charge gateway shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down charge gateway...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.ws_task.is_finished() || !self.api_task.is_finished()
    }
}

/// Initialize tracing from the application config.
///
/// `RUST_LOG` wins over the configured level. Call once at process startup.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
