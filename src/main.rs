#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::Instrument;
use vanish_server::api::{MgmtState, ServiceContainer};
use vanish_server::config::Config;
use vanish_server::services::auth_service::StaticCredentials;
use vanish_server::services::health_service::HealthService;
use vanish_server::services::message_service::MessageService;
use vanish_server::services::rate_limit_service::RateLimitService;
use vanish_server::{api, storage, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    telemetry::init_telemetry(&config.telemetry)?;

    vanish_server::setup_panic_hook();

    let boot_span = tracing::info_span!("boot_server");
    let (api_listener, mgmt_listener, app_router, mgmt_app, shutdown_tx, shutdown_rx, store_tasks) = async {
        // Phase 1: Infrastructure Setup (Resources)
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        vanish_server::spawn_signal_handler(shutdown_tx.clone());

        let (store, store_tasks) = storage::init_store(&config.store, shutdown_rx.clone()).await?;

        // Phase 2: Component Wiring (Pure logic, no side effects)
        let services = ServiceContainer {
            message_service: MessageService::new(
                Arc::clone(&store),
                config.messages.clone(),
                &config.server.root_path,
            ),
            credentials: Arc::new(StaticCredentials::new(&config.auth.username, &config.auth.password)),
            rate_limit_service: RateLimitService::new(config.server.trusted_proxies.clone()),
            health_service: HealthService::new(Arc::clone(&store)),
        };

        // Phase 3: Runtime Setup (Listeners and Routers)
        let mgmt_app = api::mgmt_router(MgmtState { health_service: services.health_service.clone() });
        let app_router = api::app_router(config.clone(), services);

        let api_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        let mgmt_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.mgmt_port).parse()?;

        tracing::info!(title = %config.title, address = %api_addr, "listening");
        tracing::info!(address = %mgmt_addr, "management server listening");

        let api_listener = tokio::net::TcpListener::bind(api_addr).await?;
        let mgmt_listener = tokio::net::TcpListener::bind(mgmt_addr).await?;

        Ok::<
            (
                tokio::net::TcpListener,
                tokio::net::TcpListener,
                axum::Router,
                axum::Router,
                watch::Sender<bool>,
                watch::Receiver<bool>,
                Vec<tokio::task::JoinHandle<()>>,
            ),
            anyhow::Error,
        >((api_listener, mgmt_listener, app_router, mgmt_app, shutdown_tx, shutdown_rx, store_tasks))
    }
    .instrument(boot_span)
    .await?;

    // Phase 4: Start Runtime (Explicit Spawning and Listening)
    let mut api_rx = shutdown_rx.clone();
    let api_server = axum::serve(api_listener, app_router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            let _ = api_rx.wait_for(|&s| s).await;
        });

    let mut mgmt_rx = shutdown_rx.clone();
    let mgmt_server = axum::serve(mgmt_listener, mgmt_app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            let _ = mgmt_rx.wait_for(|&s| s).await;
        });

    if let Err(e) = tokio::try_join!(api_server, mgmt_server) {
        tracing::error!(error = %e, "Server error");
    }

    // Phase 5: Graceful Shutdown Orchestration
    let _ = shutdown_tx.send(true);
    tokio::select! {
        () = async {
            futures::future::join_all(store_tasks).await;
        } => {
            tracing::info!("Background tasks finished.");
        }
        () = tokio::time::sleep(std::time::Duration::from_secs(config.server.shutdown_timeout_secs)) => {
            tracing::warn!("Timeout waiting for background tasks to finish.");
        }
    }

    Ok(())
}
