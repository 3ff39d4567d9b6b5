//! Configuration types for the registry client.

use std::fmt;
use std::time::Duration;

/// Docker Hub API base URL.
pub const DOCKER_HUB_URL: &str = "https://hub.docker.com";

/// Configuration for the registry client.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Registry API base URL (e.g., "<https://hub.docker.com>").
    pub url: String,

    /// Request timeout.
    pub timeout: Duration,

    /// Number of tags requested per page when listing.
    pub page_size: u32,

    /// User agent string.
    pub user_agent: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new(DOCKER_HUB_URL)
    }
}

impl RegistryConfig {
    /// Creates a new registry configuration with the given URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use hubcycle_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::new("https://hub.example.com/");
    /// assert_eq!(config.url, "https://hub.example.com");
    /// ```
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
            page_size: 100,
            user_agent: format!("hubcycle/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the page size used when listing tags.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// URL of the login endpoint.
    #[must_use]
    pub fn login_url(&self) -> String {
        format!("{}/v2/users/login/", self.url)
    }

    /// URL of the first tag page for an image.
    ///
    /// # Examples
    ///
    /// ```
    /// use hubcycle_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::default();
    /// assert_eq!(
    ///     config.tags_url("strongeleeroy/hubcycle"),
    ///     "https://hub.docker.com/v2/repositories/strongeleeroy/hubcycle/tags?page_size=100"
    /// );
    /// ```
    #[must_use]
    pub fn tags_url(&self, image: &str) -> String {
        format!(
            "{}/v2/repositories/{image}/tags?page_size={}",
            self.url, self.page_size
        )
    }

    /// URL addressing a single tag of an image.
    #[must_use]
    pub fn tag_url(&self, image: &str, tag: &str) -> String {
        format!("{}/v2/repositories/{image}/tags/{tag}/", self.url)
    }
}

/// Username and password used to obtain an API token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account name.
    pub username: String,
    /// Password or personal access token.
    pub password: String,
}

impl Credentials {
    /// Creates credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
