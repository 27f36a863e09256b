//! The cloud-management API surface.
//!
//! # Data Flow
//! ```text
//! urls.rs      → RouteTable (index + /<version> submount of four groups)
//! handlers.rs  → HandlerRegistry (HandlerRef → dyn Handler)
//! ```

pub mod handlers;
pub mod urls;

pub use handlers::{default_registry, Call, Handler, HandlerError, HandlerRegistry};
pub use urls::urls;
