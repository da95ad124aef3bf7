//! reqwest-based [`TripBackend`].

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use tripsync_core::{
    AuthToken, BackendError, DestinationId, NewDestination, RescheduleDestination, Trip,
    TripBackend, TripId,
};
use url::Url;

use super::wire::{CreateDestinationBody, RescheduleBody, TripResponse, WireId};
use crate::client::{
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, ProviderBuildError, RetryPolicy, TransportFailure,
    build_client, classify, failure_message,
};

/// Configuration for [`HttpTripBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Base URL of the backend API (e.g. `"http://localhost:8080/api"`).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Backoff for transient failures.
    pub retry: RetryPolicy,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            retry: RetryPolicy::default(),
        }
    }
}

impl HttpBackendConfig {
    /// Create a configuration for the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
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

    /// Set the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Trip backend speaking the REST surface over HTTP.
///
/// Reads, reschedules and deletes are retried on transient failures per the
/// configured [`RetryPolicy`]. Creates are sent once because the backend
/// assigns a fresh id to every accepted create.
#[derive(Debug)]
pub struct HttpTripBackend {
    client: Client,
    config: HttpBackendConfig,
    base: Url,
    token: RwLock<Option<AuthToken>>,
}

impl HttpTripBackend {
    /// Create a backend with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpBackendConfig::new(base_url))
    }

    /// Create a backend with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client fails to build.
    pub fn with_config(config: HttpBackendConfig) -> Result<Self, ProviderBuildError> {
        let base = parse_base(&config.base_url)?;
        let client = build_client(&config.user_agent, config.timeout)?;
        Ok(Self {
            client,
            config,
            base,
            token: RwLock::new(None),
        })
    }

    /// Build `{base}/trips/{trip}[/...]`.
    fn endpoint(&self, trip: &TripId, tail: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("trips")
                .push(trip.as_str())
                .extend(tail);
        }
        url
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &Url) -> BackendError {
        let url = url.to_string();
        match classify(error) {
            TransportFailure::Timeout => BackendError::Timeout {
                url,
                timeout_secs: self.config.timeout.as_secs(),
            },
            TransportFailure::Status(status, message) => BackendError::Http {
                url,
                status,
                message,
            },
            TransportFailure::Network(message) => BackendError::Network { url, message },
        }
    }

    fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        let request = self.client.request(method, url.clone());
        let token = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match token {
            Some(token) => request.bearer_auth(token.expose()),
            None => request,
        }
    }

    async fn send_once(&self, url: &Url, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        if response.status().is_success() {
            return Ok(response);
        }
        let (status, message) = failure_message(response).await;
        Err(BackendError::Http {
            url: url.to_string(),
            status,
            message,
        })
    }

    /// Send a request built by `build`, retrying transient failures.
    async fn send_with_retry<F>(&self, url: &Url, build: F) -> Result<Response, BackendError>
    where
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        let retry = self.config.retry;
        let mut attempt = 1;
        loop {
            match self.send_once(url, build()).await {
                Err(err) if err.is_transient() && retry.allows_retry_after(attempt) => {
                    let delay = retry.delay_after(attempt);
                    log::warn!(
                        "attempt {attempt}/{} failed: {err}; retrying in {delay:?}",
                        retry.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    fn json_request<B: Serialize>(&self, method: Method, url: &Url, body: &B) -> RequestBuilder {
        self.request(method, url).json(body)
    }
}

fn parse_base(raw: &str) -> Result<Url, ProviderBuildError> {
    let invalid = |reason: String| ProviderBuildError::InvalidUrl {
        url: raw.to_owned(),
        reason,
    };
    let url = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot carry path segments".to_owned()));
    }
    Ok(url)
}

fn render_visit_time(visit_time: Option<jiff::civil::DateTime>) -> Option<String> {
    visit_time.map(|t| t.strftime("%Y-%m-%dT%H:%M:%S").to_string())
}

#[async_trait]
impl TripBackend for HttpTripBackend {
    fn set_auth_token(&self, token: &AuthToken) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
    }

    async fn fetch_trip(&self, trip: &TripId) -> Result<Trip, BackendError> {
        let url = self.endpoint(trip, &[]);
        let response = self
            .send_with_retry(&url, || self.request(Method::GET, &url))
            .await?;
        let payload: TripResponse = response.json().await.map_err(|err| BackendError::Decode {
            url: url.to_string(),
            message: err.to_string(),
        })?;
        payload
            .into_trip(trip)
            .map_err(|message| BackendError::Decode {
                url: url.to_string(),
                message,
            })
    }

    async fn create_destination(
        &self,
        trip: &TripId,
        destination: &NewDestination,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(trip, &["destinations"]);
        let body = CreateDestinationBody {
            trip_id: WireId::from(trip),
            destination_name: &destination.name,
            lat: destination.location.y,
            lon: destination.location.x,
            visit_time: render_visit_time(destination.visit_time),
        };
        log::debug!("creating destination {:?} in trip {trip}", destination.name);
        self.send_once(&url, self.json_request(Method::POST, &url, &body))
            .await?;
        Ok(())
    }

    async fn reschedule_destination(
        &self,
        trip: &TripId,
        request: &RescheduleDestination,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(trip, &["destinations"]);
        let body = RescheduleBody {
            destination_id: request.destination_id,
            visit_time: render_visit_time(request.visit_time),
        };
        log::debug!(
            "rescheduling destination {} in trip {trip}",
            request.destination_id
        );
        self.send_with_retry(&url, || self.json_request(Method::PUT, &url, &body))
            .await?;
        Ok(())
    }

    async fn delete_destination(
        &self,
        trip: &TripId,
        destination_id: DestinationId,
    ) -> Result<(), BackendError> {
        let id = destination_id.to_string();
        let url = self.endpoint(trip, &["destinations", id.as_str()]);
        log::debug!("deleting destination {destination_id} from trip {trip}");
        self.send_with_retry(&url, || self.request(Method::DELETE, &url))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;
    use rstest::rstest;

    #[rstest]
    #[case("http://api.example.com", "http://api.example.com/trips/7")]
    #[case("http://api.example.com/", "http://api.example.com/trips/7")]
    #[case("http://api.example.com/v1/", "http://api.example.com/v1/trips/7")]
    fn builds_trip_endpoint(#[case] base: &str, #[case] expected: &str) {
        let backend = HttpTripBackend::new(base).expect("backend should build");
        assert_eq!(backend.endpoint(&TripId::from("7"), &[]).as_str(), expected);
    }

    #[rstest]
    fn escapes_path_segments() {
        let backend = HttpTripBackend::new("http://api.example.com").expect("backend should build");
        let url = backend.endpoint(&TripId::from("a/b"), &["destinations", "9"]);
        assert_eq!(url.as_str(), "http://api.example.com/trips/a%2Fb/destinations/9");
    }

    #[rstest]
    #[case("not a url")]
    #[case("mailto:someone@example.com")]
    fn rejects_unusable_base_urls(#[case] base: &str) {
        let err = HttpTripBackend::new(base).expect_err("should reject");
        assert!(matches!(err, ProviderBuildError::InvalidUrl { .. }));
    }

    #[rstest]
    fn renders_visit_time_without_fraction() {
        let at = date(2024, 5, 1).at(14, 0, 0, 0);
        assert_eq!(
            render_visit_time(Some(at)).as_deref(),
            Some("2024-05-01T14:00:00")
        );
        assert_eq!(render_visit_time(None), None);
    }

    #[rstest]
    fn config_builder_pattern() {
        let config = HttpBackendConfig::new("http://example.com")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("test-agent/1.0")
            .with_retry(RetryPolicy::none());

        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "test-agent/1.0");
        assert_eq!(config.retry.max_attempts, 1);
    }
}
