//! URL dispatch.
//!
//! # Responsibilities
//! - Resolve a URL to a module and parameters, or an external hand-off
//! - Hold the current domain map, built lazily on first dispatch
//! - Swap in a rebuilt map when feature flags change
//!
//! # Design Decisions
//! - Dispatch never fails: callers always receive a `MatchResult`
//! - Path captures win over query parameters on key collision
//! - The map is swapped atomically; readers never see a partial table
//! - A recognized host with no matching route falls back to the web view

use std::sync::Arc;

use arc_swap::{ArcSwap, ArcSwapOption};
use serde::{Deserialize, Serialize};

use crate::config::schema::FeatureFlags;
use crate::observability::metrics;
use crate::routing::classifier::classify;
use crate::routing::domains::{build_domain_map, DomainMap, PRIMARY_DOMAIN, WEB_VIEW_MODULE};
use crate::routing::error::RouteError;
use crate::routing::table::Params;

/// Where a URL should go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchResult {
    /// Present `module` with `params`.
    Match { module: String, params: Params },
    /// Hand the URL to the platform browser.
    ExternalUrl { url: String },
}

impl MatchResult {
    /// Module name for a match, `None` for external URLs.
    pub fn module(&self) -> Option<&str> {
        match self {
            MatchResult::Match { module, .. } => Some(module),
            MatchResult::ExternalUrl { .. } => None,
        }
    }

    pub fn params(&self) -> Option<&Params> {
        match self {
            MatchResult::Match { params, .. } => Some(params),
            MatchResult::ExternalUrl { .. } => None,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, MatchResult::ExternalUrl { .. })
    }

    fn fallback(url: &str) -> Self {
        let mut params = Params::new();
        params.insert("url".to_string(), url.into());
        MatchResult::Match {
            module: WEB_VIEW_MODULE.to_string(),
            params,
        }
    }
}

/// Resolve `url` against a built domain map.
pub fn resolve(map: &DomainMap, url: &str) -> MatchResult {
    let classified = match classify(url, PRIMARY_DOMAIN) {
        Ok(classified) => classified,
        Err(e) => {
            tracing::warn!(url, error = %e, "Unparseable URL, opening externally");
            metrics::record_dispatch("external_url");
            return MatchResult::ExternalUrl { url: url.to_string() };
        }
    };

    let Some(table) = map.table_for(&classified.host) else {
        tracing::debug!(url, host = %classified.host, "Unrecognized domain");
        metrics::record_dispatch("external_url");
        return MatchResult::ExternalUrl { url: url.to_string() };
    };

    match table.first_match(&classified.path_segments) {
        Some((entry, captured)) => {
            let mut params = classified.query_params;
            params.extend(captured);
            tracing::debug!(
                url,
                host = %classified.host,
                route = %entry.pattern(),
                module = entry.module(),
                "Route matched"
            );
            metrics::record_dispatch("match");
            MatchResult::Match {
                module: entry.module().to_string(),
                params,
            }
        }
        None => {
            tracing::error!(url, table = table.name(), "Unhandled route");
            metrics::record_unhandled_route();
            MatchResult::fallback(url)
        }
    }
}

/// Builds a domain map from feature flags.
pub trait RouteSource: Send + Sync {
    fn build(&self, flags: &FeatureFlags) -> Result<DomainMap, RouteError>;
}

/// The application's own route tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct AppRoutes;

impl RouteSource for AppRoutes {
    fn build(&self, flags: &FeatureFlags) -> Result<DomainMap, RouteError> {
        build_domain_map(flags)
    }
}

impl<F> RouteSource for F
where
    F: Fn(&FeatureFlags) -> Result<DomainMap, RouteError> + Send + Sync,
{
    fn build(&self, flags: &FeatureFlags) -> Result<DomainMap, RouteError> {
        self(flags)
    }
}

/// Shared dispatcher holding the current domain map.
///
/// Safe to call from many threads. The map is built on first use and
/// replaced wholesale by [`Dispatcher::reload`].
pub struct Dispatcher {
    source: Box<dyn RouteSource>,
    flags: ArcSwap<FeatureFlags>,
    current: ArcSwapOption<DomainMap>,
}

impl Dispatcher {
    /// Dispatcher over the application routes.
    pub fn new(flags: FeatureFlags) -> Self {
        Self::with_source(AppRoutes, flags)
    }

    /// Dispatcher over custom route tables.
    pub fn with_source(source: impl RouteSource + 'static, flags: FeatureFlags) -> Self {
        Self {
            source: Box::new(source),
            flags: ArcSwap::from_pointee(flags),
            current: ArcSwapOption::empty(),
        }
    }

    /// Build the map now so construction errors surface at startup.
    pub fn warm_up(&self) -> Result<Arc<DomainMap>, RouteError> {
        self.domain_map()
    }

    /// Rebuild with new flags and swap the result in.
    ///
    /// On error the current map stays in place.
    pub fn reload(&self, flags: FeatureFlags) -> Result<(), RouteError> {
        let map = Arc::new(self.build(&flags)?);
        self.flags.store(Arc::new(flags));
        self.current.store(Some(map));
        tracing::info!("Route tables reloaded");
        Ok(())
    }

    /// Flags the next lazy build will use.
    pub fn flags(&self) -> FeatureFlags {
        FeatureFlags::clone(&self.flags.load())
    }

    /// Current domain map, building it if this is the first use.
    pub fn domain_map(&self) -> Result<Arc<DomainMap>, RouteError> {
        let current = self.current.load();
        if let Some(map) = &*current {
            return Ok(Arc::clone(map));
        }

        let built = Arc::new(self.build(&self.flags())?);
        // A concurrent reload or build may have won; keep whichever landed first.
        let previous = self.current.compare_and_swap(&current, Some(Arc::clone(&built)));
        Ok(match &*previous {
            Some(existing) => Arc::clone(existing),
            None => built,
        })
    }

    /// Resolve `url`. Never fails.
    pub fn dispatch(&self, url: &str) -> MatchResult {
        match self.domain_map() {
            Ok(map) => resolve(&map, url),
            Err(e) => {
                tracing::error!(url, error = %e, "Route tables failed to build");
                metrics::record_unhandled_route();
                MatchResult::fallback(url)
            }
        }
    }

    fn build(&self, flags: &FeatureFlags) -> Result<DomainMap, RouteError> {
        let map = self.source.build(flags)?;
        metrics::record_table_build();
        tracing::info!(
            hosts = map.hosts().len(),
            new_sale_page = flags.new_sale_page,
            "Route tables built"
        );
        Ok(map)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(FeatureFlags::default())
    }
}
