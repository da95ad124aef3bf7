//! reqwest-based [`PlaceSearch`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tripsync_core::{PlaceCandidate, PlaceSearch, SearchError, TextQuery};
use url::Url;

use super::wire::PlacesPayload;
use crate::client::{
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, ProviderBuildError, TransportFailure, build_client,
    classify, failure_message,
};

/// Configuration for [`HttpPlaceSearch`].
#[derive(Debug, Clone)]
pub struct HttpSearchConfig {
    /// Search endpoint (e.g. `"http://localhost:8080/api/places"`).
    pub places_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpSearchConfig {
    fn default() -> Self {
        Self {
            places_url: "http://localhost:8080/places".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpSearchConfig {
    /// Create a configuration for the given endpoint.
    #[must_use]
    pub fn new(places_url: impl Into<String>) -> Self {
        Self {
            places_url: places_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Text search against an HTTP places endpoint.
///
/// Each query is sent as
/// `GET {places_url}?query=..&filters=a,b&lat=..&lng=..`; `filters` is
/// omitted when empty.
#[derive(Debug)]
pub struct HttpPlaceSearch {
    client: Client,
    config: HttpSearchConfig,
    endpoint: Url,
}

impl HttpPlaceSearch {
    /// Create a search client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client fails to build.
    pub fn new(places_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpSearchConfig::new(places_url))
    }

    /// Create a search client with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client fails to build.
    pub fn with_config(config: HttpSearchConfig) -> Result<Self, ProviderBuildError> {
        let endpoint = Url::parse(&config.places_url).map_err(|err| {
            ProviderBuildError::InvalidUrl {
                url: config.places_url.clone(),
                reason: err.to_string(),
            }
        })?;
        let client = build_client(&config.user_agent, config.timeout)?;
        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    fn build_query_url(&self, query: &TextQuery) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", &query.text);
            if !query.filters.is_empty() {
                pairs.append_pair("filters", &query.filters.join(","));
            }
            pairs
                .append_pair("lat", &query.anchor.y.to_string())
                .append_pair("lng", &query.anchor.x.to_string());
        }
        url
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &Url) -> SearchError {
        let url = url.to_string();
        match classify(error) {
            TransportFailure::Timeout => SearchError::Timeout {
                url,
                timeout_secs: self.config.timeout.as_secs(),
            },
            TransportFailure::Status(status, message) => SearchError::Http {
                url,
                status,
                message,
            },
            TransportFailure::Network(message) => SearchError::Network { url, message },
        }
    }
}

#[async_trait]
impl PlaceSearch for HttpPlaceSearch {
    async fn text_search(&self, query: &TextQuery) -> Result<Vec<PlaceCandidate>, SearchError> {
        let url = self.build_query_url(query);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;
        if !response.status().is_success() {
            let (status, message) = failure_message(response).await;
            return Err(SearchError::Http {
                url: url.to_string(),
                status,
                message,
            });
        }
        let payload: PlacesPayload = response.json().await.map_err(|err| SearchError::Decode {
            url: url.to_string(),
            message: err.to_string(),
        })?;
        Ok(payload.into_results().into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use rstest::rstest;
    use std::collections::HashMap;

    fn params(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    #[rstest]
    fn encodes_query_anchor_and_filters() {
        let search = HttpPlaceSearch::new("http://places.example.com/search").expect("should build");
        let query = TextQuery::new("Central Park & Zoo", Coord { x: -73.9712, y: 40.7831 })
            .with_filters(vec!["park".into(), "zoo".into()]);
        let url = search.build_query_url(&query);
        let params = params(&url);

        assert_eq!(url.path(), "/search");
        assert_eq!(params.get("query").map(String::as_str), Some("Central Park & Zoo"));
        assert_eq!(params.get("filters").map(String::as_str), Some("park,zoo"));
        assert_eq!(params.get("lat").map(String::as_str), Some("40.7831"));
        assert_eq!(params.get("lng").map(String::as_str), Some("-73.9712"));
    }

    #[rstest]
    fn omits_empty_filters() {
        let search = HttpPlaceSearch::new("http://places.example.com/search").expect("should build");
        let url = search.build_query_url(&TextQuery::new("Met", Coord { x: 0.0, y: 0.0 }));
        assert!(!params(&url).contains_key("filters"));
    }

    #[rstest]
    fn rejects_invalid_endpoint() {
        let err = HttpPlaceSearch::new("::nope").expect_err("should reject");
        assert!(matches!(err, ProviderBuildError::InvalidUrl { .. }));
    }
}
