//! Place enrichment: destination names in, display-ready places out.
//!
//! The resolver asks a [`PlaceSearch`] provider for the best match for a
//! destination name and normalises the first hit into a [`Place`]. Failures
//! are per-destination: a failed lookup yields `None` and is logged, and
//! never affects the other lookups in the same batch.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use futures_util::future::join_all;
use geo::Coord;
use thiserror::Error;
use tripsync_core::{
    Destination, PLACEHOLDER_IMAGE, Place, PlaceCandidate, PlaceSearch, SearchError, TextQuery,
};
use url::Url;

/// Default search anchor: Manhattan.
pub const DEFAULT_ANCHOR: Coord<f64> = Coord {
    x: -73.9712,
    y: 40.7831,
};

const PHOTO_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/place/photo";
const DEFAULT_PHOTO_WIDTH: u32 = 400;

/// How photo references become image URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoConfig {
    /// Photo endpoint.
    pub endpoint: String,
    /// Maps API key; without one every place gets the placeholder image.
    pub api_key: Option<String>,
    /// Requested image width in pixels.
    pub max_width: u32,
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            endpoint: PHOTO_ENDPOINT.to_owned(),
            api_key: None,
            max_width: DEFAULT_PHOTO_WIDTH,
        }
    }
}

impl PhotoConfig {
    /// Use `api_key` when building photo URLs.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into()).filter(|k: &String| !k.trim().is_empty());
        self
    }

    /// Image URL for a photo reference, or [`PLACEHOLDER_IMAGE`].
    #[must_use]
    pub fn image_url(&self, photo_ref: Option<&str>) -> String {
        let (Some(photo_ref), Some(key)) = (photo_ref, self.api_key.as_deref()) else {
            return PLACEHOLDER_IMAGE.to_owned();
        };
        let Ok(mut url) = Url::parse(&self.endpoint) else {
            log::warn!("photo endpoint {:?} is not a valid URL", self.endpoint);
            return PLACEHOLDER_IMAGE.to_owned();
        };
        url.query_pairs_mut()
            .append_pair("maxwidth", &self.max_width.to_string())
            .append_pair("photoreference", photo_ref)
            .append_pair("key", key);
        url.into()
    }
}

/// Configuration for [`PlaceResolver`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Location searches are biased towards.
    pub anchor: Coord<f64>,
    /// Keyword filters passed to the provider.
    pub filters: Vec<String>,
    /// Photo URL construction.
    pub photos: PhotoConfig,
    /// Remember successful lookups per `(name, anchor)`.
    pub memoize: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            anchor: DEFAULT_ANCHOR,
            filters: Vec::new(),
            photos: PhotoConfig::default(),
            memoize: false,
        }
    }
}

impl ResolverConfig {
    /// Set the search anchor.
    #[must_use]
    pub fn with_anchor(mut self, anchor: Coord<f64>) -> Self {
        self.anchor = anchor;
        self
    }

    /// Set keyword filters.
    #[must_use]
    pub fn with_filters(mut self, filters: Vec<String>) -> Self {
        self.filters = filters;
        self
    }

    /// Set photo URL construction.
    #[must_use]
    pub fn with_photos(mut self, photos: PhotoConfig) -> Self {
        self.photos = photos;
        self
    }

    /// Enable or disable the lookup cache.
    #[must_use]
    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }
}

/// Why a single lookup produced nothing.
#[derive(Debug, Error)]
enum ResolveError {
    #[error("destination name is blank")]
    BlankName,
    #[error("no places matched {0:?}")]
    NoMatch(String),
    #[error(transparent)]
    Search(#[from] SearchError),
}

type CacheKey = (String, u64, u64);

/// Enriches destination names through a [`PlaceSearch`] provider.
#[derive(Debug)]
pub struct PlaceResolver<S> {
    search: S,
    config: ResolverConfig,
    cache: Mutex<HashMap<CacheKey, PlaceCandidate>>,
}

impl<S: PlaceSearch> PlaceResolver<S> {
    /// A resolver with default configuration.
    pub fn new(search: S) -> Self {
        Self::with_config(search, ResolverConfig::default())
    }

    /// A resolver with explicit configuration.
    pub fn with_config(search: S, config: ResolverConfig) -> Self {
        Self {
            search,
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The underlying provider.
    #[must_use]
    pub const fn search(&self) -> &S {
        &self.search
    }

    /// Enrich a backend destination.
    ///
    /// The place id falls back to `dest-{id}` when the provider has none, and
    /// the destination's visit time is carried over.
    pub async fn resolve(&self, destination: &Destination) -> Option<Place> {
        match self.lookup(&destination.name).await {
            Ok(candidate) => Some(self.normalise(
                candidate,
                || format!("dest-{}", destination.id),
                destination.visit_time.clone(),
            )),
            Err(err) => {
                log::warn!(
                    "dropping destination {} ({:?}): {err}",
                    destination.id,
                    destination.name
                );
                None
            }
        }
    }

    /// Enrich a free-text name that has no backend destination yet.
    ///
    /// The place id falls back to the trimmed name when the provider has none.
    pub async fn resolve_name(&self, name: &str) -> Option<Place> {
        match self.lookup(name).await {
            Ok(candidate) => Some(self.normalise(candidate, || name.trim().to_owned(), None)),
            Err(err) => {
                log::warn!("could not resolve {name:?}: {err}");
                None
            }
        }
    }

    /// Enrich destinations concurrently.
    ///
    /// Every lookup runs to completion regardless of the others. The result is
    /// aligned with the input: element `i` is the outcome for
    /// `destinations[i]`.
    pub async fn resolve_all(&self, destinations: &[Destination]) -> Vec<Option<Place>> {
        join_all(destinations.iter().map(|d| self.resolve(d))).await
    }

    async fn lookup(&self, name: &str) -> Result<PlaceCandidate, ResolveError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ResolveError::BlankName);
        }
        let key = self.cache_key(name);
        if let Some(hit) = self.cached(&key) {
            log::debug!("resolver cache hit for {name:?}");
            return Ok(hit);
        }

        let query = TextQuery::new(name, self.config.anchor).with_filters(self.config.filters.clone());
        let candidate = self
            .search
            .text_search(&query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::NoMatch(name.to_owned()))?;

        if self.config.memoize {
            self.cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(key, candidate.clone());
        }
        Ok(candidate)
    }

    fn cache_key(&self, name: &str) -> CacheKey {
        (
            name.to_owned(),
            self.config.anchor.x.to_bits(),
            self.config.anchor.y.to_bits(),
        )
    }

    fn cached(&self, key: &CacheKey) -> Option<PlaceCandidate> {
        if !self.config.memoize {
            return None;
        }
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn normalise(
        &self,
        candidate: PlaceCandidate,
        fallback_id: impl FnOnce() -> String,
        visit_time: Option<String>,
    ) -> Place {
        let image_url = self.config.photos.image_url(candidate.photo_ref.as_deref());
        let id = candidate.place_id.unwrap_or_else(fallback_id);
        let location = candidate.location.unwrap_or(Coord { x: 0.0, y: 0.0 });
        Place::new(id, candidate.name, location)
            .with_address(candidate.address.unwrap_or_default())
            .with_rating(candidate.rating.unwrap_or(0.0))
            .with_image_url(image_url)
            .with_visit_time(visit_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tripsync_core::test_support::StubPlaceSearch;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime")
            .block_on(future)
    }

    fn met() -> PlaceCandidate {
        PlaceCandidate {
            place_id: Some("met-1".into()),
            name: "The Met".into(),
            address: Some("1000 5th Ave".into()),
            location: Some(Coord { x: -73.9632, y: 40.7794 }),
            rating: Some(4.7),
            photo_ref: Some("photo-1".into()),
        }
    }

    #[fixture]
    fn search() -> StubPlaceSearch {
        StubPlaceSearch::new()
            .with_place("The Met", met())
            .with_place(
                "Bare",
                PlaceCandidate {
                    name: "Bare".into(),
                    ..PlaceCandidate::default()
                },
            )
            .with_failure(
                "Broken",
                SearchError::Network {
                    url: "stub".into(),
                    message: "refused".into(),
                },
            )
    }

    #[rstest]
    fn normalises_first_match(search: StubPlaceSearch) {
        let photos = PhotoConfig::default().with_api_key("k");
        let resolver =
            PlaceResolver::with_config(search, ResolverConfig::default().with_photos(photos));
        let destination = Destination::new(5, "The Met", Some("2024-05-01T10:00:00".into()));
        let place = block_on(resolver.resolve(&destination)).expect("resolved");

        assert_eq!(place.id, "met-1");
        assert_eq!(place.address, "1000 5th Ave");
        assert!((place.rating - 4.7).abs() < f32::EPSILON);
        assert_eq!(place.visit_time.as_deref(), Some("2024-05-01T10:00:00"));
        assert_eq!(
            place.image_url,
            "https://maps.googleapis.com/maps/api/place/photo?maxwidth=400&photoreference=photo-1&key=k"
        );
    }

    #[rstest]
    fn fills_defaults_for_sparse_results(search: StubPlaceSearch) {
        let resolver = PlaceResolver::new(search);
        let place = block_on(resolver.resolve(&Destination::new(9, "Bare", None))).expect("resolved");

        assert_eq!(place.id, "dest-9");
        assert_eq!(place.address, "");
        assert!(!place.has_location());
        assert_eq!(place.image_url, PLACEHOLDER_IMAGE);
        assert!(place.rating.abs() < f32::EPSILON);
    }

    #[rstest]
    fn photo_requires_api_key(search: StubPlaceSearch) {
        let resolver = PlaceResolver::new(search);
        let place = block_on(resolver.resolve_name("The Met")).expect("resolved");
        assert_eq!(place.image_url, PLACEHOLDER_IMAGE);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("Broken")]
    #[case("Unknown")]
    fn failures_yield_none(search: StubPlaceSearch, #[case] name: &str) {
        let resolver = PlaceResolver::new(search);
        assert!(block_on(resolver.resolve(&Destination::new(1, name, None))).is_none());
    }

    #[rstest]
    fn blank_names_skip_the_provider(search: StubPlaceSearch) {
        let resolver = PlaceResolver::new(search);
        assert!(block_on(resolver.resolve_name("  ")).is_none());
        assert_eq!(resolver.search().calls(), 0);
    }

    #[rstest]
    fn batch_is_aligned_and_tolerates_failures(search: StubPlaceSearch) {
        let resolver = PlaceResolver::new(search);
        let destinations = vec![
            Destination::new(1, "The Met", None),
            Destination::new(2, "Broken", None),
            Destination::new(3, "Bare", None),
        ];
        let places = block_on(resolver.resolve_all(&destinations));
        let ids: Vec<_> = places.iter().map(|p| p.as_ref().map(|p| p.id.clone())).collect();
        assert_eq!(
            ids,
            vec![Some("met-1".to_owned()), None, Some("dest-3".to_owned())]
        );
    }

    #[rstest]
    fn passes_anchor_and_filters(search: StubPlaceSearch) {
        let anchor = Coord { x: 2.35, y: 48.85 };
        let config = ResolverConfig::default()
            .with_anchor(anchor)
            .with_filters(vec!["museum".into()]);
        let resolver = PlaceResolver::with_config(search, config);
        block_on(resolver.resolve_name("The Met"));
        let queries = resolver.search().queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].anchor, anchor);
        assert_eq!(queries[0].filters, vec!["museum".to_owned()]);
    }

    #[rstest]
    fn memoizes_successes_only(search: StubPlaceSearch) {
        let resolver =
            PlaceResolver::with_config(search, ResolverConfig::default().with_memoize(true));
        block_on(resolver.resolve_name("The Met"));
        block_on(resolver.resolve_name("The Met"));
        block_on(resolver.resolve_name("Broken"));
        block_on(resolver.resolve_name("Broken"));
        assert_eq!(resolver.search().calls(), 3);
    }
}
