//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Build and freeze the route map
//! - Check every routed handler is registered
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::path::Path;

use crate::api::{default_registry, HandlerRegistry};
use crate::config::{build_route_map, load_config, ConfigError, ServiceConfig};
use crate::routing::RouteMap;

/// Everything the server needs, validated.
pub struct Prepared {
    pub config: ServiceConfig,
    pub routes: RouteMap,
    pub handlers: HandlerRegistry,
}

/// Load `config_path`, or the defaults when no file is given.
pub fn load(config_path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    match config_path {
        Some(path) => load_config(path),
        None => Ok(ServiceConfig::default()),
    }
}

/// Load `config_path` (or defaults), build the route map and the handler registry.
pub fn prepare(config_path: Option<&Path>) -> Result<Prepared, ConfigError> {
    prepare_with(load(config_path)?)
}

/// As [`prepare`], from an in-memory configuration.
pub fn prepare_with(config: ServiceConfig) -> Result<Prepared, ConfigError> {
    let (routes, handlers) = build_routing(&config)?;

    tracing::info!(
        api_version = %config.api.version,
        rules = routes.len(),
        handlers = routes.handlers().len(),
        "Startup checks passed"
    );

    Ok(Prepared {
        config,
        routes,
        handlers,
    })
}

/// Build the route map and the registry for one configuration.
///
/// Both follow `api.version`, so they are always built, and replaced, together.
pub fn build_routing(config: &ServiceConfig) -> Result<(RouteMap, HandlerRegistry), ConfigError> {
    let routes = build_route_map(config)?;
    let handlers = default_registry(&config.api.version);
    handlers.verify(&routes)?;
    Ok((routes, handlers))
}
