//! Registry client for listing and deleting repository tags.
//!
//! [`RegistryClient`] is the seam the purger talks to. [`DockerHubClient`]
//! implements it against the Docker Hub v2 API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Response, StatusCode};
use tracing::debug;
use url::Url;

use crate::config::{Credentials, RegistryConfig};
use crate::error::RegistryError;
use crate::hub::{LoginRequest, LoginResponse, RepositoryTag, TagsPage};

/// Operations the purger needs from a registry.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Lists every tag of an image, across all pages.
    async fn fetch_tags(&self, image: &str) -> Result<Vec<RepositoryTag>, RegistryError>;

    /// Deletes one tag of an image.
    async fn delete_tag(&self, image: &str, tag: &str) -> Result<(), RegistryError>;
}

/// Client for the Docker Hub v2 API.
#[derive(Debug)]
pub struct DockerHubClient {
    config: RegistryConfig,
    base: Url,
    http: reqwest::Client,
    token: String,
}

impl DockerHubClient {
    /// Logs in with the given credentials and returns an authenticated client.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the registry cannot be
    /// reached, or the credentials are rejected.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use hubcycle_registry::{Credentials, DockerHubClient, RegistryClient, RegistryConfig};
    ///
    /// # async fn example() -> Result<(), hubcycle_registry::RegistryError> {
    /// let credentials = Credentials::new("user", "secret");
    /// let client = DockerHubClient::login(RegistryConfig::default(), &credentials).await?;
    /// let tags = client.fetch_tags("strongeleeroy/hubcycle").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn login(
        config: RegistryConfig,
        credentials: &Credentials,
    ) -> Result<Self, RegistryError> {
        let http = Self::build_http_client(&config)?;

        let response = http
            .post(config.login_url())
            .json(&LoginRequest {
                username: &credentials.username,
                password: &credentials.password,
            })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RegistryError::AuthenticationFailed {
                message: format!("login rejected for user '{}'", credentials.username),
            });
        }
        let response = Self::check_status(response, None).await?;

        let body: LoginResponse = serde_json::from_slice(&response.bytes().await?)?;
        debug!(user = %credentials.username, "logged in to registry");

        Self::with_token(config, body.token)
    }

    /// Creates a client from an already issued token.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be
    /// created.
    pub fn with_token(config: RegistryConfig, token: impl Into<String>) -> Result<Self, RegistryError> {
        let base = Self::parse_url(&config.url)?;
        let http = Self::build_http_client(&config)?;

        Ok(Self {
            config,
            base,
            http,
            token: token.into(),
        })
    }

    /// Returns the registry configuration.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Fetches one page of a tag listing.
    async fn fetch_page(&self, url: &Url, image: &str) -> Result<TagsPage, RegistryError> {
        debug!(%url, image, "fetching tag page");

        let response = self
            .http
            .get(url.clone())
            .headers(self.auth_headers()?)
            .send()
            .await?;
        let response = Self::check_status(response, Some(image)).await?;

        Ok(serde_json::from_slice(&response.bytes().await?)?)
    }

    /// Builds the HTTP client with proper configuration.
    fn build_http_client(config: &RegistryConfig) -> Result<reqwest::Client, RegistryError> {
        reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| RegistryError::ConnectionFailed {
                url: config.url.clone(),
                source: e,
            })
    }

    /// Creates the JWT authorization header.
    fn auth_headers(&self) -> Result<HeaderMap, RegistryError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("JWT {}", self.token)).map_err(|_| {
                RegistryError::AuthenticationFailed {
                    message: "Invalid token".to_string(),
                }
            })?,
        );
        Ok(headers)
    }

    fn parse_url(url: &str) -> Result<Url, RegistryError> {
        Url::parse(url).map_err(|_| RegistryError::InvalidUrl {
            url: url.to_string(),
        })
    }

    /// Resolves a `next` link, which may be relative to the registry base.
    fn resolve_link(&self, link: &str) -> Result<Url, RegistryError> {
        self.base
            .join(link)
            .map_err(|_| RegistryError::InvalidUrl {
                url: link.to_string(),
            })
    }

    /// Maps non-success responses to registry errors.
    async fn check_status(
        response: Response,
        image: Option<&str>,
    ) -> Result<Response, RegistryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match (status, image) {
            (StatusCode::NOT_FOUND, Some(image)) => Err(RegistryError::NotFound {
                image: image.to_string(),
            }),
            (StatusCode::UNAUTHORIZED, _) => Err(RegistryError::AuthenticationFailed {
                message: response.text().await.unwrap_or_default(),
            }),
            _ => Err(RegistryError::HttpError {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

#[async_trait]
impl RegistryClient for DockerHubClient {
    async fn fetch_tags(&self, image: &str) -> Result<Vec<RepositoryTag>, RegistryError> {
        let mut url = Self::parse_url(&self.config.tags_url(image))?;
        let mut tags = Vec::new();

        loop {
            let page = self.fetch_page(&url, image).await?;
            tags.extend(page.results);

            match page.next.as_deref() {
                Some(next) => {
                    let next = self.resolve_link(next)?;
                    if next == url {
                        break;
                    }
                    url = next;
                }
                None => break,
            }
        }

        debug!(image, count = tags.len(), "fetched tags");
        Ok(tags)
    }

    async fn delete_tag(&self, image: &str, tag: &str) -> Result<(), RegistryError> {
        let url = Self::parse_url(&self.config.tag_url(image, tag))?;

        let response = self
            .http
            .delete(url)
            .headers(self.auth_headers()?)
            .send()
            .await?;
        Self::check_status(response, Some(image)).await?;

        Ok(())
    }
}
