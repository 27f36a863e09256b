//! Handler seam.
//!
//! The routing core resolves a request to `(handler, method_name, params)`;
//! everything past that point lives behind the [`Handler`] trait. Cloud
//! provider handlers are external collaborators: the default registry binds
//! them to [`Unimplemented`], which names the resolved operation and stops.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use thiserror::Error;

use crate::api::urls::{
    APPLICATION_HANDLER, COMPUTE_HANDLER, DNS_HANDLER, LOADBALANCER_HANDLER, STORAGE_HANDLER,
};
use crate::routing::{ConfigurationError, Dispatch, HandlerRef, ParamMap, RouteMap};

/// A resolved call handed to a handler.
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    pub method_name: &'a str,
    pub endpoint: &'a str,
    pub params: &'a ParamMap,
}

impl<'a> From<&'a Dispatch> for Call<'a> {
    fn from(dispatch: &'a Dispatch) -> Self {
        Self {
            method_name: &dispatch.method_name,
            endpoint: &dispatch.endpoint,
            params: &dispatch.params,
        }
    }
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),

    #[error("`{handler}` cannot run `{method_name}`: no provider backend is attached")]
    NotImplemented {
        handler: String,
        method_name: String,
    },

    #[error("handler failed: {0}")]
    Failed(String),
}

/// Executes named operations.
pub trait Handler: Send + Sync {
    fn invoke(&self, call: Call<'_>) -> Result<Value, HandlerError>;
}

/// Serves the index route.
#[derive(Debug, Clone)]
pub struct ApplicationHandler {
    api_version: String,
}

impl ApplicationHandler {
    pub fn new(api_version: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
        }
    }
}

impl Handler for ApplicationHandler {
    fn invoke(&self, call: Call<'_>) -> Result<Value, HandlerError> {
        match call.method_name {
            "index" => Ok(json!({
                "service": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "api_version": self.api_version,
                "prefix": format!("/{}", self.api_version),
            })),
            other => Err(HandlerError::UnknownOperation(other.to_string())),
        }
    }
}

/// Placeholder for a handler whose backend lives outside this service.
#[derive(Debug, Clone)]
pub struct Unimplemented {
    name: HandlerRef,
}

impl Unimplemented {
    pub fn new(name: HandlerRef) -> Self {
        Self { name }
    }
}

impl Handler for Unimplemented {
    fn invoke(&self, call: Call<'_>) -> Result<Value, HandlerError> {
        Err(HandlerError::NotImplemented {
            handler: self.name.to_string(),
            method_name: call.method_name.to_string(),
        })
    }
}

/// Maps handler references to implementations.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<HandlerRef, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a handler.
    pub fn register(mut self, name: impl Into<String>, handler: impl Handler + 'static) -> Self {
        self.handlers.insert(HandlerRef::new(name), Arc::new(handler));
        self
    }

    pub fn get(&self, name: &HandlerRef) -> Option<Arc<dyn Handler>> {
        self.handlers.get(name).cloned()
    }

    /// Every handler the map dispatches to must be registered.
    pub fn verify(&self, routes: &RouteMap) -> Result<(), ConfigurationError> {
        match routes
            .handlers()
            .into_iter()
            .find(|name| !self.handlers.contains_key(*name))
        {
            Some(missing) => Err(ConfigurationError::UnknownHandler {
                handler: missing.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Application handler plus placeholders for the four cloud handlers.
pub fn default_registry(api_version: &str) -> HandlerRegistry {
    let mut registry =
        HandlerRegistry::new().register(APPLICATION_HANDLER, ApplicationHandler::new(api_version));
    for name in [COMPUTE_HANDLER, STORAGE_HANDLER, LOADBALANCER_HANDLER, DNS_HANDLER] {
        registry = registry.register(name, Unimplemented::new(HandlerRef::new(name)));
    }
    registry
}
