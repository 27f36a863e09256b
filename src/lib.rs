//! REST front-end for a multi-provider cloud-management API.
//!
//! The core is the declarative routing engine in [`routing`]: rule
//! templates, endpoint groups and submounts are expanded once into an
//! immutable [`RouteMap`], which resolves `(method, path)` to a handler call,
//! a 405 with the allowed methods, or a 404.

pub mod api;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Resolution, RouteMap, RouteTable};
