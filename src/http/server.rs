//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a single dispatch fallback
//! - Wire up middleware (request ID, tracing, timeout)
//! - Resolve each request against the current route map
//! - Hand matched calls to the handler registry
//! - Swap in rebuilt route maps on config reload
//! - Observability (metrics, correlation IDs)

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::api::{Call, HandlerRegistry};
use crate::config::{ConfigError, ServiceConfig};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::http::response;
use crate::lifecycle::shutdown::ShutdownReason;
use crate::lifecycle::startup;
use crate::observability::metrics;
use crate::routing::{Resolution, RouteMap};

/// A route map and the handlers it dispatches to.
///
/// Swapped as one unit on reload, so a request never sees a map from one
/// configuration paired with handlers from another.
pub struct RouteSet {
    pub routes: RouteMap,
    pub handlers: HandlerRegistry,
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routing: Arc<ArcSwap<RouteSet>>,
}

impl AppState {
    pub fn new(routes: RouteMap, handlers: HandlerRegistry) -> Self {
        Self {
            routing: Arc::new(ArcSwap::from_pointee(RouteSet { routes, handlers })),
        }
    }
}

/// HTTP front-end for the route map.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server serving `routes` through `handlers`.
    pub fn new(config: &ServiceConfig, routes: RouteMap, handlers: HandlerRegistry) -> Self {
        let state = AppState::new(routes, handlers);
        let router = Self::build_router(config, state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers, outermost first.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(propagate_request_id_layer())
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )));

        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(middleware)
    }

    /// The configured router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Shared state, including the live routing handle.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Run the server until the shutdown signal fires.
    ///
    /// Configs arriving on `config_updates` rebuild the route map; a config
    /// that fails to build leaves the current map in place. The reload loop
    /// stops together with the server.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ServiceConfig>,
        mut shutdown: broadcast::Receiver<ShutdownReason>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let state = self.state.clone();
        let mut reload_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            loop {
                let config = tokio::select! {
                    update = config_updates.recv() => match update {
                        Some(config) => config,
                        None => break,
                    },
                    _ = reload_shutdown.recv() => break,
                };
                match apply_reload(&state, &config) {
                    Ok(rules) => {
                        metrics::record_reload(true);
                        tracing::info!(rules, "Route map reloaded");
                    }
                    Err(e) => {
                        metrics::record_reload(false);
                        tracing::error!(error = %e, "Route reload rejected, keeping current map");
                    }
                }
            }
            tracing::debug!("Route reload loop stopped");
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                match shutdown.recv().await {
                    Ok(reason) => tracing::info!(%reason, "Shutdown signal received"),
                    Err(_) => tracing::info!("Shutdown coordinator dropped"),
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build a fresh map and registry for `config` and swap them in together.
/// Returns the new rule count.
pub fn apply_reload(state: &AppState, config: &ServiceConfig) -> Result<usize, ConfigError> {
    let (routes, handlers) = startup::build_routing(config)?;
    let rules = routes.len();
    state.routing.store(Arc::new(RouteSet { routes, handlers }));
    Ok(rules)
}

/// Resolves the request and dispatches it.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request.request_id().to_string();
    let method = request.method().as_str().to_string();
    let path = request.uri().path().to_string();

    let routing = state.routing.load_full();
    let resolution = routing.routes.resolve(&method, &path);

    let response = match &resolution {
        Resolution::Matched(dispatch) => {
            tracing::debug!(
                request_id = %request_id,
                method = %method,
                path = %path,
                handler = %dispatch.handler,
                method_name = %dispatch.method_name,
                "Dispatching request"
            );
            match routing.handlers.get(&dispatch.handler) {
                Some(handler) => {
                    let result = handler.invoke(Call::from(dispatch));
                    if let Err(e) = &result {
                        tracing::error!(request_id = %request_id, error = %e, "Handler failed");
                    }
                    response::handler_result(result)
                }
                None => {
                    tracing::error!(
                        request_id = %request_id,
                        handler = %dispatch.handler,
                        "No handler registered"
                    );
                    response::missing_handler(dispatch.handler.as_str())
                }
            }
        }
        Resolution::MethodNotAllowed { allowed } => {
            tracing::debug!(request_id = %request_id, method = %method, path = %path, "Method not allowed");
            response::method_not_allowed(&method, allowed)
        }
        Resolution::NotFound => {
            tracing::debug!(request_id = %request_id, path = %path, "No route matched");
            response::not_found(&path)
        }
    };

    metrics::record_request(&method, resolution.outcome(), response.status().as_u16(), start);
    response
}
