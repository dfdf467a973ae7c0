//! Prints the health of every backend service and every known grid.
//!
//! ```text
//! MERIDIAN_SERVICE_HOST=10.0.0.5 RUST_LOG=debug cargo run -p service-status
//! cargo run -p service-status -- --no-grids
//! ```

use std::time::Duration;

use futures_util::future::join_all;
use meridian::{
    GridDirectory, RegistryConfig, Service, ServiceRegistry,
    default_catalog_path, probe_login_uri,
};

const GRID_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

async fn report_services(registry: &ServiceRegistry) {
    println!("Services ({})", registry.config().host);

    // Connect everything concurrently, then read the statuses back.
    registry.connect_to_all_services().await;
    for service in Service::ALL {
        let status = registry.status(service);
        let detail = registry
            .connection_health(service)
            .map(|health| format!("v{} up {:.0}s", health.version, health.uptime))
            .unwrap_or_default();
        println!(
            "  {:<18} :{:<5} {:<12} {}",
            service.label(),
            registry.config().port(service),
            status.to_string(),
            detail
        );
    }

    let up = registry.connected_services().len();
    println!("  {up}/{} connected", Service::ALL.len());
    registry.disconnect_all();
}

// ---------------------------------------------------------------------------
// Grids
// ---------------------------------------------------------------------------

async fn report_grids() {
    let grids = match default_catalog_path() {
        Some(path) => match GridDirectory::load(path).await {
            Ok(grids) => grids,
            Err(e) => {
                tracing::warn!(error = %e, "grid catalog unreadable, showing defaults");
                GridDirectory::in_memory()
            }
        },
        None => GridDirectory::in_memory(),
    };

    println!("Grids");
    let probes = grids.list_grids().iter().map(|grid| async move {
        let reachable = probe_login_uri(&grid.login_uri, GRID_PROBE_TIMEOUT).await;
        (grid, reachable)
    });
    for (grid, reachable) in join_all(probes).await {
        let mark = if reachable { "up" } else { "down" };
        println!("  {:<20} {:<5} {}", grid.to_string(), mark, grid.login_uri);
    }
}

#[tokio::main]
async fn main() {
    meridian::init_tracing();

    let registry = match ServiceRegistry::new(RegistryConfig::from_env()) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    report_services(&registry).await;

    if !std::env::args().any(|arg| arg == "--no-grids") {
        println!();
        report_grids().await;
    }
}
