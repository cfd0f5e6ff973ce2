//! `depot` binary: wires configuration, services and the HTTP server.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use clap::Parser;
use depot_server::cli::Cli;
use depot_server::clients::{build_http_client, HttpOrderClient, HttpWarehouseClient, LoggingOrderClient};
use depot_server::logging::init_tracing;
use depot_server::network::{AppState, NetworkModule};
use depot_server::service::domain::{default_hub_handlers, default_sensor_handlers, TracingEventSink};
use depot_server::service::{build_dispatch_pipeline, DeliveryService, HandlerRegistry, WarehouseService};
use depot_server::storage::InMemoryDeliveryStore;
use depot_server::{EventSink, OrderClient, WarehouseClient};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    let service_config = cli.service_config();
    let mut network = NetworkModule::new(cli.network_config());

    let sink: Arc<dyn EventSink> = Arc::new(TracingEventSink);
    let sensors = HandlerRegistry::from_handlers(default_sensor_handlers(&sink, &service_config.sensor_topic))
        .context("building sensor handler registry")?;
    let hubs = HandlerRegistry::from_handlers(default_hub_handlers(&sink, &service_config.hub_topic))
        .context("building hub handler registry")?;
    info!(sensor_types = ?sensors.kinds(), hub_types = ?hubs.kinds(), "event handlers registered");

    let http = build_http_client(cli.client_timeout())?;
    let warehouse = Arc::new(WarehouseService::new(service_config.warehouse_address.clone()));
    let orders: Arc<dyn OrderClient> = match &cli.order_url {
        Some(url) => Arc::new(HttpOrderClient::new(http.clone(), url.clone())),
        None => Arc::new(LoggingOrderClient),
    };
    let warehouse_client: Arc<dyn WarehouseClient> = match &cli.warehouse_url {
        Some(url) => Arc::new(HttpWarehouseClient::new(http, url.clone())),
        None => warehouse.clone(),
    };
    let deliveries = Arc::new(DeliveryService::new(
        Arc::new(InMemoryDeliveryStore::new()),
        orders,
        warehouse_client,
        service_config.transition_policy,
    ));
    info!(
        policy = service_config.transition_policy.as_str(),
        order_service = cli.order_url.as_deref().unwrap_or("log-only"),
        warehouse = cli.warehouse_url.as_deref().unwrap_or("local"),
        "delivery service configured"
    );

    let state = AppState {
        sensors: build_dispatch_pipeline(Arc::new(sensors)),
        hubs: build_dispatch_pipeline(Arc::new(hubs)),
        deliveries,
        warehouse,
        shutdown: network.shutdown_controller(),
        start_time: Instant::now(),
    };

    let port = network.start().await?;
    info!(port, "depot listening");
    network.serve(state, shutdown_signal()).await?;

    info!("depot stopped");
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
