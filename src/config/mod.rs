//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → loader.rs selects the route table (built-in or routes_file)
//!     → RouteMap::build
//!
//! On reload:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server rebuilds the RouteMap
//!     → atomic swap of Arc<RouteMap>
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{build_route_map, load_config, ConfigError};
pub use schema::{
    ApiConfig, ListenerConfig, ObservabilityConfig, ReloadConfig, ServiceConfig, TimeoutConfig,
};
