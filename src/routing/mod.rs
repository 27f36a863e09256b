//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     Rule / RuleTemplate instances
//!     → EndpointGroup (prefix + handler)
//!     → Submount (prefix)
//!     → RouteTable
//!     → RouteMap::build (expand, parse, validate, order)
//!     → Freeze as immutable RouteMap
//!
//! Incoming Request (method, path)
//!     → router.rs (route lookup)
//!     → matcher.rs (segment matching, defaults)
//!     → Resolution: Matched | MethodNotAllowed | NotFound
//! ```
//!
//! # Design Decisions
//! - Route tables are plain data (serde) and can be built in code or loaded
//! - Construction errors are fatal; resolution outcomes are values
//! - Deterministic: same table and request always give the same resolution

pub mod compose;
pub mod error;
pub mod matcher;
pub mod pattern;
pub mod router;
pub mod rule;
pub mod template;

pub use compose::{EndpointGroup, Member, Mount, RouteTable, RuleFactory, Submount};
pub use error::ConfigurationError;
pub use matcher::CompiledRule;
pub use router::{Dispatch, Resolution, RouteMap};
pub use rule::{Endpoint, HandlerRef, ParamMap, Rule};
pub use template::{Instance, RuleTemplate};
