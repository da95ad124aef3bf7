//! Text search over an external places provider.

use async_trait::async_trait;
use geo::Coord;
use thiserror::Error;

/// Errors from [`PlaceSearch::text_search`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The provider answered with a non-success status.
    #[error("search request to {url} failed with status {status}: {message}")]
    Http {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error text supplied by the provider.
        message: String,
    },
    /// The request could not be delivered.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Request URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The request did not complete in time.
    #[error("search request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Configured timeout.
        timeout_secs: u64,
    },
    /// The response body did not match the expected schema.
    #[error("failed to decode search response from {url}: {message}")]
    Decode {
        /// Request URL.
        url: String,
        /// Decoder error description.
        message: String,
    },
    /// The provider found nothing for the query.
    #[error("no places matched {query:?}")]
    NoResults {
        /// Query text.
        query: String,
    },
}

/// A text search anchored at a location.
#[derive(Debug, Clone, PartialEq)]
pub struct TextQuery {
    /// Free-text query, usually a destination name.
    pub text: String,
    /// Location the provider should bias results towards.
    pub anchor: Coord<f64>,
    /// Keyword filters such as place categories.
    pub filters: Vec<String>,
}

impl TextQuery {
    /// Construct a query without filters.
    pub fn new(text: impl Into<String>, anchor: Coord<f64>) -> Self {
        Self {
            text: text.into(),
            anchor,
            filters: Vec::new(),
        }
    }

    /// Attach keyword filters.
    #[must_use]
    pub fn with_filters(mut self, filters: Vec<String>) -> Self {
        self.filters = filters;
        self
    }
}

/// One provider result, before normalisation into a [`Place`](crate::Place).
///
/// Every field other than `name` may be missing from the provider's answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceCandidate {
    /// Provider identifier.
    pub place_id: Option<String>,
    /// Display name.
    pub name: String,
    /// Formatted address.
    pub address: Option<String>,
    /// Coordinates, `x = longitude`.
    pub location: Option<Coord<f64>>,
    /// Provider rating.
    pub rating: Option<f32>,
    /// Opaque photo reference.
    pub photo_ref: Option<String>,
}

impl PlaceCandidate {
    /// A candidate with an id, name and location and nothing else.
    pub fn located(place_id: impl Into<String>, name: impl Into<String>, location: Coord<f64>) -> Self {
        Self {
            place_id: Some(place_id.into()),
            name: name.into(),
            location: Some(location),
            ..Self::default()
        }
    }
}

/// Look up places by free text.
///
/// Implementations return results best match first. An empty vector is a
/// valid answer; callers decide whether that is an error.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Run a text search.
    async fn text_search(&self, query: &TextQuery) -> Result<Vec<PlaceCandidate>, SearchError>;
}
