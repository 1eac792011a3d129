//! Domain map and the application route tables.
//!
//! # Responsibilities
//! - Map host names to route tables
//! - Build the live-auction and marketplace tables
//! - Select the auction module from feature flags at build time
//!
//! # Design Decisions
//! - Host lookup is exact; aliases share one `Arc<RouteTable>`
//! - Feature flags are passed in, read once per build
//! - Every marketplace path resolves to some module via the trailing `/*`

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::schema::FeatureFlags;
use crate::routing::error::RouteError;
use crate::routing::pattern::WILDCARD_KEY;
use crate::routing::table::{Captures, Params, RouteEntry, RouteTable};

/// Host assumed for URLs without one.
pub const PRIMARY_DOMAIN: &str = "artsy.net";

/// Module that renders arbitrary web content.
pub const WEB_VIEW_MODULE: &str = "WebView";

const LIVE_DOMAINS: &[&str] = &["live.artsy.net", "live-staging.artsy.net"];
const MARKETPLACE_DOMAINS: &[&str] = &["staging.artsy.net", PRIMARY_DOMAIN, "www.artsy.net"];

/// Host name to route table.
#[derive(Debug, Default)]
pub struct DomainMap {
    tables: HashMap<String, Arc<RouteTable>>,
    flags: FeatureFlags,
}

impl DomainMap {
    /// Create an empty map remembering the flags it was built with.
    pub fn new(flags: FeatureFlags) -> Self {
        Self {
            tables: HashMap::new(),
            flags,
        }
    }

    /// Register `table` under every host in `hosts`.
    pub fn insert_aliases(&mut self, hosts: &[&str], table: Arc<RouteTable>) {
        for host in hosts {
            self.tables.insert((*host).to_string(), Arc::clone(&table));
        }
    }

    pub fn insert(&mut self, host: impl Into<String>, table: Arc<RouteTable>) {
        self.tables.insert(host.into(), table);
    }

    /// Table for an exact host, `None` if the host is unrecognized.
    pub fn table_for(&self, host: &str) -> Option<&Arc<RouteTable>> {
        self.tables.get(host)
    }

    /// Recognized hosts, sorted.
    pub fn hosts(&self) -> Vec<&str> {
        let mut hosts: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        hosts.sort_unstable();
        hosts
    }

    /// Flags this map was built with.
    pub fn flags(&self) -> &FeatureFlags {
        &self.flags
    }
}

/// Build the application's domain map.
pub fn build_domain_map(flags: &FeatureFlags) -> Result<DomainMap, RouteError> {
    let live = Arc::new(live_auction_table()?);
    let marketplace = Arc::new(marketplace_table(flags)?);

    let mut map = DomainMap::new(flags.clone());
    map.insert_aliases(LIVE_DOMAINS, live);
    map.insert_aliases(MARKETPLACE_DOMAINS, marketplace);
    Ok(map)
}

fn live_auction_table() -> Result<RouteTable, RouteError> {
    RouteTable::try_from_entries(
        "live-auction",
        [RouteEntry::with_mapper("/*", "LiveAuction", |c| {
            rename(c, WILDCARD_KEY, "slug")
        })],
    )
}

fn marketplace_table(flags: &FeatureFlags) -> Result<RouteTable, RouteError> {
    let auction = if flags.new_sale_page {
        RouteEntry::new("/auction/:saleID", "Auction2")
    } else {
        RouteEntry::new("/auction/:id", "Auction")
    };

    RouteTable::try_from_entries(
        "marketplace",
        [
            RouteEntry::new("/", "Home"),
            RouteEntry::new("/sales", "Sales"),
            RouteEntry::new("/search", "Search"),
            RouteEntry::new("/inbox", "Inbox"),
            RouteEntry::new("/my-profile", "MyProfile"),
            RouteEntry::new("/artist/:artistID", "Artist"),
            RouteEntry::new("/artwork/:artworkID", "Artwork"),
            RouteEntry::with_mapper("/artist/:id/auction-results", WEB_VIEW_MODULE, |c| {
                web_url(format!("/artist/{}/auction-results", capture(c, "id")))
            }),
            // Gallery-context artist pages use the regular artist screen.
            RouteEntry::new("/:profile_id_ignored/artist/:artistID", "Artist"),
            RouteEntry::new("/auction-registration/:id", "AuctionRegistration"),
            auction,
            RouteEntry::new("/auction/:id/bid/:artwork_id", "AuctionBidArtwork"),
            RouteEntry::new("/gene/:geneID", "Gene"),
            RouteEntry::new("/show/:showID", "Show"),
            RouteEntry::new("/show/:showID/artworks", "ShowArtworks"),
            RouteEntry::new("/show/:showID/artists", "ShowArtists"),
            RouteEntry::new("/show/:showID/info", "ShowMoreInfo"),
            RouteEntry::new("/inquiry/:artworkID", "Inquiry"),
            RouteEntry::new("/viewing-rooms", "ViewingRooms"),
            RouteEntry::new("/viewing-room/:viewing_room_id", "ViewingRoom"),
            RouteEntry::new("/viewing-room/:viewing_room_id/artworks", "ViewingRoomArtworks"),
            RouteEntry::new("/viewing-room/:viewing_room_id/:artwork_id", "ViewingRoomArtwork"),
            RouteEntry::new("/feature/:slug", "Feature"),
            RouteEntry::new("/artist-series/:artistSeriesID", "ArtistSeries"),
            RouteEntry::new("/artist/:artistID/artist-series", "FullArtistSeriesList"),
            RouteEntry::new("/collection/:collectionID", "Collection"),
            RouteEntry::new("/collection/:collectionID/artists", "FullFeaturedArtistList"),
            RouteEntry::new("/conversation/:conversationID", "Conversation"),
            RouteEntry::new("/user/conversations/:id", "Conversation"),
            RouteEntry::new("/admin", "Admin"),
            RouteEntry::new("/favorites", "Favorites"),
            RouteEntry::new("/my-account", "MyAccount"),
            RouteEntry::new("/my-account/edit-name", "MyAccountEditName"),
            RouteEntry::new("/my-account/edit-password", "MyAccountEditPassword"),
            RouteEntry::new("/my-account/edit-email", "MyAccountEditEmail"),
            RouteEntry::new("/my-account/edit-phone", "MyAccountEditPhone"),
            RouteEntry::new("/my-bids", "MyBids"),
            RouteEntry::new("/my-profile/payment", "MyProfilePayment"),
            RouteEntry::new("/my-profile/payment/new-card", "MyProfilePaymentNewCreditCard"),
            RouteEntry::new("/my-profile/push-notifications", "MyProfilePushNotifications"),
            RouteEntry::new("/local-discovery", "LocalDiscovery"),
            RouteEntry::new("/privacy-request", "PrivacyRequest"),
            RouteEntry::new("/my-collection/add-artwork", "AddEditArtwork"),
            RouteEntry::new("/my-collection/artwork-detail/:artworkID", "MyCollectionArtworkDetail"),
            RouteEntry::new("/my-collection/artwork-list", "MyCollectionArtworkList"),
            RouteEntry::new("/my-collection/home", "MyCollectionHome"),
            RouteEntry::new("/my-collection/marketing-home", "MyCollectionMarketingHome"),
            RouteEntry::new(
                "/collections/my-collection/artworks/new/submissions/new",
                "ConsignmentsSubmissionForm",
            ),
            RouteEntry::new("/consign/submission", "Consignments"),
            RouteEntry::new("/collections/my-collection/marketing-landing", "SellTabApp"),
            // Presented modally by the navigation layer.
            RouteEntry::new("/conditions-of-sale", WEB_VIEW_MODULE),
            RouteEntry::new("/artwork-classifications", "ArtworkAttributionClassFAQ"),
            RouteEntry::new("/partner-locations/:id", "PartnerLocations"),
            RouteEntry::new("/fair/:id/artworks", "FairArtworks"),
            RouteEntry::new("/fair/:id/artists", "FairArtists"),
            RouteEntry::new("/fair/:id/exhibitors", "FairExhibitors"),
            RouteEntry::new("/fair/:id/info", "FairMoreInfo"),
            RouteEntry::new("/fair/:id/bmw-sponsored-content", "FairBMWArtActivation"),
            RouteEntry::new("/city/:city_slug/:section", "CitySectionList"),
            RouteEntry::new("/city-fair/:city_slug", "CityFairList"),
            RouteEntry::new("/city-save/:city_slug", "CitySavedList"),
            RouteEntry::new("/auctions", "Auctions"),
            RouteEntry::new("/works-for-you", "WorksForYou"),
            RouteEntry::with_mapper("/categories", WEB_VIEW_MODULE, |_| {
                web_url("/categories".to_string())
            }),
            RouteEntry::new("/city-bmw-list/:id", "CityBMWList"),
            RouteEntry::new("/:slug", "VanityURLEntity"),
            RouteEntry::with_mapper("/*", WEB_VIEW_MODULE, |c| {
                web_url(format!("/{}", capture(c, WILDCARD_KEY)))
            }),
        ],
    )
}

fn capture<'a>(captures: &'a Captures, name: &str) -> &'a str {
    captures.get(name).map(String::as_str).unwrap_or_default()
}

fn rename(captures: &Captures, from: &str, to: &str) -> Params {
    let mut params = Params::new();
    params.insert(to.to_string(), capture(captures, from).into());
    params
}

fn web_url(url: String) -> Params {
    let mut params = Params::new();
    params.insert("url".to_string(), url.into());
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::table::ParamValue;

    fn resolve<'a>(map: &'a DomainMap, host: &str, path: &[&str]) -> (&'a str, Params) {
        let table = map.table_for(host).expect("host should be recognized");
        let (entry, params) = table.first_match(path).expect("catch-all should match");
        (entry.module(), params)
    }

    #[test]
    fn test_aliases_share_tables() {
        let map = build_domain_map(&FeatureFlags::default()).unwrap();

        let primary = map.table_for("artsy.net").unwrap();
        assert!(Arc::ptr_eq(primary, map.table_for("www.artsy.net").unwrap()));
        assert!(Arc::ptr_eq(primary, map.table_for("staging.artsy.net").unwrap()));

        let live = map.table_for("live.artsy.net").unwrap();
        assert!(Arc::ptr_eq(live, map.table_for("live-staging.artsy.net").unwrap()));
        assert!(!Arc::ptr_eq(primary, live));

        assert!(map.table_for("unknown.example.com").is_none());
        assert_eq!(map.hosts().len(), 5);
    }

    #[test]
    fn test_tables_end_in_catch_all() {
        let map = build_domain_map(&FeatureFlags::default()).unwrap();
        for host in map.hosts() {
            assert!(map.table_for(host).unwrap().has_catch_all(), "{host}");
        }
    }

    #[test]
    fn test_flag_selects_auction_module() {
        let map = build_domain_map(&FeatureFlags::default()).unwrap();
        let (module, params) = resolve(&map, "artsy.net", &["auction", "spring-sale"]);
        assert_eq!(module, "Auction");
        assert_eq!(params.get("id"), Some(&ParamValue::from("spring-sale")));

        let flags = FeatureFlags { new_sale_page: true };
        let map = build_domain_map(&flags).unwrap();
        let (module, params) = resolve(&map, "artsy.net", &["auction", "spring-sale"]);
        assert_eq!(module, "Auction2");
        assert_eq!(params.get("saleID"), Some(&ParamValue::from("spring-sale")));
        assert!(map.flags().new_sale_page);
    }

    #[test]
    fn test_flag_only_changes_one_slot() {
        let off = build_domain_map(&FeatureFlags::default()).unwrap();
        let on = build_domain_map(&FeatureFlags { new_sale_page: true }).unwrap();
        let off = off.table_for(PRIMARY_DOMAIN).unwrap();
        let on = on.table_for(PRIMARY_DOMAIN).unwrap();

        assert_eq!(off.len(), on.len());
        let differing = off
            .entries()
            .iter()
            .zip(on.entries())
            .filter(|(a, b)| a.module() != b.module())
            .count();
        assert_eq!(differing, 1);
    }

    #[test]
    fn test_live_auction_slug() {
        let map = build_domain_map(&FeatureFlags::default()).unwrap();
        let (module, params) = resolve(&map, "live.artsy.net", &["shared-live-mocktion-k8"]);
        assert_eq!(module, "LiveAuction");
        assert_eq!(params.get("slug"), Some(&ParamValue::from("shared-live-mocktion-k8")));
    }

    #[test]
    fn test_web_view_mappers() {
        let map = build_domain_map(&FeatureFlags::default()).unwrap();

        let (module, params) = resolve(&map, "artsy.net", &["artist", "banksy", "auction-results"]);
        assert_eq!(module, WEB_VIEW_MODULE);
        assert_eq!(
            params.get("url"),
            Some(&ParamValue::from("/artist/banksy/auction-results"))
        );

        let (module, params) = resolve(&map, "artsy.net", &["categories"]);
        assert_eq!(module, WEB_VIEW_MODULE);
        assert_eq!(params.get("url"), Some(&ParamValue::from("/categories")));

        let (module, params) = resolve(&map, "artsy.net", &["some", "deep", "page"]);
        assert_eq!(module, WEB_VIEW_MODULE);
        assert_eq!(params.get("url"), Some(&ParamValue::from("/some/deep/page")));
    }

    #[test]
    fn test_gallery_context_artist() {
        let map = build_domain_map(&FeatureFlags::default()).unwrap();
        let (module, params) = resolve(&map, "artsy.net", &["spruth-magers", "artist", "astrid-klein"]);
        assert_eq!(module, "Artist");
        assert_eq!(params.get("artistID"), Some(&ParamValue::from("astrid-klein")));
        assert_eq!(
            params.get("profile_id_ignored"),
            Some(&ParamValue::from("spruth-magers"))
        );
    }
}
