//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming URL (deep link, in-app link, webview redirect)
//!     → classifier.rs (host, path segments, query params)
//!     → dispatcher.rs (domain lookup, ordered table scan)
//!     → Return: Match { module, params } or ExternalUrl
//!
//! Table Compilation (on first dispatch or reload):
//!     FeatureFlags
//!     → domains.rs (select entries, alias hosts)
//!     → pattern.rs (compile templates into segment specs)
//!     → Freeze as immutable DomainMap, swapped in atomically
//! ```
//!
//! # Design Decisions
//! - Tables compiled once per flag set, immutable at dispatch time
//! - No regex, no specificity ranking
//! - Deterministic: same input always matches same route
//! - First match wins (table order is priority)

pub mod classifier;
pub mod dispatcher;
pub mod domains;
pub mod error;
pub mod pattern;
pub mod table;

pub use classifier::{classify, ClassifiedUrl};
pub use dispatcher::{resolve, AppRoutes, Dispatcher, MatchResult, RouteSource};
pub use domains::{build_domain_map, DomainMap, PRIMARY_DOMAIN, WEB_VIEW_MODULE};
pub use error::{PatternError, RouteError};
pub use pattern::{RoutePattern, SegmentSpec, WILDCARD_KEY};
pub use table::{Captures, ParamValue, Params, RouteEntry, RouteTable};
