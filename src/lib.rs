//! URL routing and dispatch for the Artsy mobile app.
//!
//! Resolves deep links, in-app links and webview redirects to an app
//! module with parameters, or tells the caller to open the URL externally.

pub mod config;
pub mod observability;
pub mod routing;

pub use config::schema::{FeatureFlags, RouterConfig};
pub use routing::{Dispatcher, MatchResult};
