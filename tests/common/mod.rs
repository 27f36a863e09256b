//! Shared utilities for integration tests.

use std::net::SocketAddr;

use cloud_rest::api::{default_registry, urls};
use cloud_rest::lifecycle::Shutdown;
use cloud_rest::routing::{Dispatch, Resolution, RouteMap};
use cloud_rest::{HttpServer, ServiceConfig};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// The production route map under `/v1`.
pub fn production_map() -> RouteMap {
    RouteMap::build(&urls("v1")).expect("production table builds")
}

/// Unwrap a `Matched` resolution.
#[allow(dead_code)]
pub fn matched(resolution: Resolution) -> Dispatch {
    match resolution {
        Resolution::Matched(dispatch) => dispatch,
        other => panic!("expected a match, got {other:?}"),
    }
}

/// An in-process server over the production table.
#[allow(dead_code)]
pub fn production_server() -> HttpServer {
    let config = ServiceConfig::default();
    HttpServer::new(&config, production_map(), default_registry("v1"))
}

/// HTTP client that never goes through an environment proxy.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Start a production server on an ephemeral port.
///
/// Returns the bound address, the shutdown coordinator and the config update sender.
#[allow(dead_code)]
pub async fn start_server() -> (SocketAddr, Shutdown, mpsc::UnboundedSender<ServiceConfig>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let (updates_tx, updates_rx) = mpsc::unbounded_channel();
    let server = production_server();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, updates_rx, server_shutdown).await;
    });

    (addr, shutdown, updates_tx)
}
