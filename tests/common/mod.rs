//! Shared helpers for integration tests.

use std::sync::Arc;

use deeplink_router::routing::{
    resolve, DomainMap, MatchResult, ParamValue, RouteEntry, RouteTable, PRIMARY_DOMAIN,
};
use deeplink_router::FeatureFlags;

/// Domain map with a single table on the primary domain.
#[allow(dead_code)]
pub fn single_table(routes: &[(&str, &str)]) -> DomainMap {
    let entries = routes
        .iter()
        .map(|(template, module)| RouteEntry::new(template, *module).unwrap())
        .collect();
    let mut map = DomainMap::new(FeatureFlags::default());
    map.insert(PRIMARY_DOMAIN, Arc::new(RouteTable::new("test", entries)));
    map
}

/// Module a URL resolves to against `map`.
#[allow(dead_code)]
pub fn module_for(map: &DomainMap, url: &str) -> Option<String> {
    resolve(map, url).module().map(str::to_string)
}

/// Single-valued parameter from a match.
#[allow(dead_code)]
pub fn param<'a>(result: &'a MatchResult, key: &str) -> Option<&'a str> {
    result.params()?.get(key).and_then(ParamValue::as_str)
}
