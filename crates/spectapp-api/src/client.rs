//! `SpectAppClient` - Spect'App API client implementation.

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use crate::api::LocalSpectAppApi;
use crate::error::{Result, SpectAppError};
use crate::params::{Query, show_query, shows_query, with_key};
use crate::types::{
    DatesPayload, Envelope, HeaderPayload, IconPayload, MediaKind, Show, ShowDate, ShowDetails,
    ShowPage, ShowPayload,
};

/// Default base URL of the JSON API.
const DEFAULT_BASE_URL: &str = "https://spectapp.linaki.org/api/";

/// Default base URL of the static image assets.
const DEFAULT_STATIC_BASE_URL: &str = "https://spectapp.linaki.org/static/img/";

/// Default User-Agent.
const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Endpoint serving show lists and searches.
const SHOWS_ENDPOINT: &str = "shows";
/// Endpoint serving a single show.
const SHOW_ENDPOINT: &str = "show";
/// Endpoint serving performance dates.
const DATES_ENDPOINT: &str = "dates";

/// Spect'App API client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct SpectAppClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// Base URL for static images (bypass mode).
    static_base_url: Url,
    /// API key appended to every request.
    api_key: Option<String>,
}

/// Builder for `SpectAppClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct SpectAppClientBuilder {
    base_url: Option<Url>,
    static_base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: Option<String>,
}

impl SpectAppClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            static_base_url: None,
            api_key: None,
            user_agent: None,
        }
    }

    /// Overrides the API base URL (for wiremock in tests).
    ///
    /// A missing trailing `/` is added, so `http://host/api` and
    /// `http://host/api/` are equivalent.
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Overrides the static image base URL used when remote lookup is off.
    #[must_use]
    pub fn static_base_url(mut self, url: Url) -> Self {
        self.static_base_url = Some(url);
        self
    }

    /// Sets the API key. Optional; can also be set later with [`SpectAppClient::set_key`].
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the User-Agent (default: `spectapp-api/<version>`).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - A default base URL fails to parse.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<SpectAppClient> {
        let base_url = match self.base_url {
            Some(url) => with_trailing_slash(url),
            None => parse_default_url(DEFAULT_BASE_URL)?,
        };
        let static_base_url = match self.static_base_url {
            Some(url) => url,
            None => parse_default_url(DEFAULT_STATIC_BASE_URL)?,
        };
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| String::from(DEFAULT_USER_AGENT));

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .map_err(SpectAppError::HttpClient)?;

        Ok(SpectAppClient {
            http_client,
            base_url,
            static_base_url,
            api_key: self.api_key,
        })
    }
}

/// Ensures the path ends with `/` so `Url::join` appends instead of replacing the last segment.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn parse_default_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|source| SpectAppError::InvalidUrl {
        endpoint: String::from(raw),
        source,
    })
}

impl SpectAppClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> SpectAppClientBuilder {
        SpectAppClientBuilder::new()
    }

    /// Sets or replaces the API key used by subsequent requests.
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.api_key = Some(key.into());
    }

    /// Returns the current API key.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Formats the static image URL of a show without contacting the server.
    ///
    /// Example: `https://spectapp.linaki.org/static/img/chalon2024/icon/128.jpeg`
    #[must_use]
    pub fn static_media_url(&self, festival_id: &str, show_id: &str, kind: MediaKind) -> String {
        format!(
            "{}/{festival_id}/{kind}/{show_id}.jpeg",
            self.static_base_url.as_str().trim_end_matches('/'),
        )
    }

    /// Returns the key, treating an empty key as unset.
    fn require_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(SpectAppError::MissingKey)
    }

    /// Sends a GET request with the API key and unwraps the response envelope.
    async fn request<T: DeserializeOwned>(&self, endpoint: &str, params: Query) -> Result<T> {
        let key = self.require_key()?;

        let url = self
            .base_url
            .join(endpoint)
            .map_err(|source| SpectAppError::InvalidUrl {
                endpoint: String::from(endpoint),
                source,
            })?;

        tracing::debug!(%url, ?params, "Spect'App API request");
        let query = with_key(params, key);

        let transport = |source: reqwest::Error| SpectAppError::Transport {
            endpoint: String::from(endpoint),
            source,
        };

        let response = self
            .http_client
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?;

        let body = response.text().await.map_err(transport)?;
        tracing::debug!(endpoint, body_len = body.len(), "Response body received");

        let envelope: Envelope = serde_json::from_str(&body).map_err(|e| {
            SpectAppError::invalid_response(endpoint, format!("failed to decode JSON: {e}"))
        })?;
        envelope.into_payload(endpoint)
    }

    /// Resolves a media URL either through the `show` endpoint or locally.
    async fn get_show_media(
        &self,
        festival_id: &str,
        show_id: &str,
        kind: MediaKind,
        use_remote_lookup: bool,
    ) -> Result<String> {
        self.require_key()?;

        if !use_remote_lookup {
            let url = self.static_media_url(festival_id, show_id, kind);
            tracing::debug!(%kind, %url, "Media URL formatted locally");
            return Ok(url);
        }

        let params = show_query(festival_id, show_id);
        match kind {
            MediaKind::Icon => self
                .request::<IconPayload>(SHOW_ENDPOINT, params)
                .await
                .map(|p| p.icon),
            MediaKind::Header => self
                .request::<HeaderPayload>(SHOW_ENDPOINT, params)
                .await
                .map(|p| p.header),
        }
    }
}

impl LocalSpectAppApi for SpectAppClient {
    #[instrument(skip_all)]
    async fn list_shows(&self, festival_id: &str, page: u32) -> Result<ShowPage> {
        self.request(SHOWS_ENDPOINT, shows_query(festival_id, page, None))
            .await
    }

    #[instrument(skip_all)]
    async fn search_shows(&self, festival_id: &str, query: &str, page: u32) -> Result<ShowPage> {
        self.request(SHOWS_ENDPOINT, shows_query(festival_id, page, Some(query)))
            .await
    }

    #[instrument(skip_all)]
    async fn get_show(&self, festival_id: &str, show_id: &str) -> Result<Show> {
        self.request::<ShowPayload>(SHOW_ENDPOINT, show_query(festival_id, show_id))
            .await
            .map(|p| p.show)
    }

    #[instrument(skip_all)]
    async fn get_show_details(&self, festival_id: &str, show_id: &str) -> Result<ShowDetails> {
        self.request(SHOW_ENDPOINT, show_query(festival_id, show_id))
            .await
    }

    #[instrument(skip_all)]
    async fn get_show_icon(
        &self,
        festival_id: &str,
        show_id: &str,
        use_remote_lookup: bool,
    ) -> Result<String> {
        self.get_show_media(festival_id, show_id, MediaKind::Icon, use_remote_lookup)
            .await
    }

    #[instrument(skip_all)]
    async fn get_show_header(
        &self,
        festival_id: &str,
        show_id: &str,
        use_remote_lookup: bool,
    ) -> Result<String> {
        self.get_show_media(festival_id, show_id, MediaKind::Header, use_remote_lookup)
            .await
    }

    #[instrument(skip_all)]
    async fn get_show_dates(&self, festival_id: &str, show_id: &str) -> Result<Vec<ShowDate>> {
        let payload: DatesPayload = self
            .request(DATES_ENDPOINT, show_query(festival_id, show_id))
            .await?;

        payload
            .dates
            .into_iter()
            .map(|raw| raw.into_show_date(DATES_ENDPOINT))
            .collect()
    }
}
