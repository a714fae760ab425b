use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use log::{debug, trace};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE};
use reqwest::{Client as ReqwestClient, Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use url::Url;

use crate::api::user::UserApi;
use crate::models::ApiResponse;
use crate::{models, UniFiError, UniFiResult};

#[cfg(feature = "default-client")]
use arc_swap::ArcSwap;
#[cfg(feature = "default-client")]
use once_cell::sync::Lazy;

#[cfg(feature = "default-client")]
static UNIFI_CLIENT: Lazy<ArcSwap<UniFiClient>> = Lazy::new(|| {
    // Create a default client using the builder's default values.
    ArcSwap::new(Arc::new(UniFiClient::default()))
});

/// Initializes the static UniFiClient instance.  This should be called once
/// at the beginning of your application.
#[cfg(feature = "default-client")]
pub fn initialize(client: UniFiClient) {
    UNIFI_CLIENT.store(Arc::new(client));
}

/// Returns a reference to the static UniFiClient instance.
///
/// This function provides a thread-safe way to access the UniFi client
/// instance. It returns a reference to the current UniFi client, which can be
/// used to make API requests. If it hasn't been previously initialized it
/// returns a default instance with no authentication set.
#[cfg(feature = "default-client")]
pub fn instance() -> Arc<UniFiClient> {
    UNIFI_CLIENT.load_full()
}

/// Builder for UniFi client.
///
/// This builder provides a fluent API for creating UniFi clients
/// with validation at build time.
#[derive(Default)]
pub struct UniFiClientBuilder {
    controller_url: Option<String>,
    username: Option<String>,
    password: Option<SecretString>,
    site: Option<String>,
    controller_version: Option<String>,
    verify_ssl: bool,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    http_client: Option<ReqwestClient>,
}

impl UniFiClientBuilder {
    /// Sets the controller URL.
    pub fn controller_url(mut self, url: impl Into<String>) -> Self {
        self.controller_url = Some(url.into());
        self
    }

    /// Sets the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the password for authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Sets the password from an environment variable.
    pub fn password_from_env(mut self, var_name: &str) -> Self {
        let password = std::env::var(var_name)
            .map_err(|e| format!("Failed to read environment variable '{}': {}", var_name, e))
            .expect("Failed to set password from environment");
        self.password = Some(SecretString::from(password));
        self
    }

    /// Sets the site to use.
    pub fn site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Sets the controller's self-reported version string (e.g. "6.0.43").
    ///
    /// The version decides which update protocol [`UserApi::update`] uses.
    /// It can also be refreshed from the controller later with
    /// [`UniFiClient::refresh_controller_version`]; when never set, updates
    /// take the legacy write path.
    pub fn controller_version(mut self, version: impl Into<String>) -> Self {
        self.controller_version = Some(version.into());
        self
    }

    /// Sets whether to verify SSL certificates.
    pub fn verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }

    /// Sets the HTTP request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets a custom user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets a custom reqwest client (e.g., for testing or custom middleware).
    pub fn http_client(mut self, http_client: ReqwestClient) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub async fn build(self) -> UniFiResult<UniFiClient> {
        let site = self.site.unwrap_or_else(|| "default".to_string());

        let timeout = self.timeout.unwrap_or(Duration::from_secs(30));

        let username = self
            .username
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| UniFiError::ConfigurationError("Username is required".into()))?;

        let password = self
            .password
            .filter(|p| !p.expose_secret().trim().is_empty())
            .ok_or_else(|| UniFiError::ConfigurationError("Password is required".into()))?;

        let controller_url = self
            .controller_url
            .ok_or_else(|| UniFiError::ConfigurationError("Controller URL is required".into()))
            .and_then(|url_str| {
                Url::parse(&url_str).map_err(|e| {
                    UniFiError::ConfigurationError(format!("Invalid controller URL: {e}"))
                })
            })?;

        let user_agent = self
            .user_agent
            .as_deref()
            .unwrap_or(concat!("unifi-stations/", env!("CARGO_PKG_VERSION")));

        let http_client = if let Some(custom_client) = self.http_client {
            custom_client
        } else {
            ReqwestClient::builder()
                .timeout(timeout)
                .danger_accept_invalid_certs(!self.verify_ssl)
                .cookie_store(true)
                .user_agent(user_agent)
                .build()
                .map_err(|e| {
                    UniFiError::ConfigurationError(format!("Failed to create HTTP client: {e}"))
                })?
        };

        let client = UniFiClient {
            controller_url,
            username,
            password,
            site,
            verify_ssl: self.verify_ssl,
            timeout,
            user_agent: self.user_agent,
            http_client,
            auth_state: Arc::new(Mutex::new(None)),
            version: Arc::new(RwLock::new(self.controller_version)),
        };
        client.login().await?;
        Ok(client)
    }
}

/// Authentication state for the client.
#[derive(Clone, Debug)]
struct AuthState {
    cookies: String,
    csrf_token: Option<String>,
}

/// Subset of `stat/sysinfo` the client cares about.
#[derive(Debug, Deserialize)]
struct SysInfo {
    version: String,
}

/// The main UniFi client for interacting with the UniFi Controller API.
///
/// This client manages authentication and request handling, and exposes the
/// station management operations through [`UniFiClient::users`].
pub struct UniFiClient {
    controller_url: Url,
    username: String,
    password: SecretString,
    site: String,
    verify_ssl: bool,
    timeout: Duration,
    user_agent: Option<String>,
    http_client: ReqwestClient,
    auth_state: Arc<Mutex<Option<AuthState>>>,
    /// Controller's self-reported version. Shared across clones so a
    /// refresh is visible everywhere.
    version: Arc<RwLock<Option<String>>>,
}

impl Default for UniFiClient {
    fn default() -> Self {
        UniFiClient {
            controller_url: Url::parse("https://localhost:8443")
                .expect("Failed to parse default URL"),
            username: "admin".to_string(),
            password: SecretString::from("admin".to_string()),
            site: "default".to_string(),
            verify_ssl: false,
            timeout: Duration::from_secs(30),
            user_agent: Some(concat!("unifi-stations/", env!("CARGO_PKG_VERSION")).to_string()),
            http_client: reqwest::Client::new(),
            auth_state: Arc::new(Mutex::new(None)),
            version: Arc::new(RwLock::new(None)),
        }
    }
}

impl fmt::Debug for UniFiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let authenticated = self
            .auth_state
            .try_lock()
            .map(|state| state.is_some())
            .unwrap_or(false);

        f.debug_struct("UniFiClient")
            .field("controller_url", &self.controller_url)
            .field("username", &self.username)
            .field("site", &self.site)
            .field("verify_ssl", &self.verify_ssl)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("version", &self.controller_version())
            .field("auth_state", &authenticated)
            .finish()
    }
}

impl UniFiClient {
    pub fn builder() -> UniFiClientBuilder {
        UniFiClientBuilder::default()
    }

    async fn login(&self) -> UniFiResult<()> {
        let login_url = self
            .controller_url
            .join("/api/login")
            .map_err(UniFiError::UrlParseError)?;

        let login_data = models::auth::LoginRequest {
            username: self.username.clone(),
            password: self.password.expose_secret().to_string(),
        };

        debug!("logging in to {}", self.controller_url);
        let response = self.http_client.post(login_url).json(&login_data).send().await?;

        if !response.status().is_success() {
            return Err(UniFiError::AuthenticationError(format!(
                "Authentication failed with status code: {}",
                response.status()
            )));
        }

        let cookie_header = response
            .headers()
            .get("set-cookie")
            .ok_or_else(|| {
                UniFiError::AuthenticationError("No cookies received from server".into())
            })?
            .to_str()
            .map_err(|e| UniFiError::AuthenticationError(format!("Invalid cookie header: {}", e)))?
            .to_string();

        let csrf_token = response
            .headers()
            .get("x-csrf-token")
            .map(|v| v.to_str().unwrap_or_default().to_string());

        let login_response: ApiResponse<Value> = response.json().await?;

        if let Some(msg) = login_response.meta.error_message() {
            return Err(UniFiError::AuthenticationError(msg));
        }

        let mut auth_state = self.auth_state.lock().await;
        *auth_state = Some(AuthState {
            cookies: cookie_header,
            csrf_token,
        });

        Ok(())
    }

    /// Ensure the client is authenticated.
    async fn ensure_authenticated(&self) -> UniFiResult<()> {
        // Check if essential fields are configured *before* trying to use them.
        if self.username.is_empty() {
            return Err(UniFiError::ConfigurationError("Username is required".into()));
        }
        if self.controller_url.as_str().is_empty() {
            return Err(UniFiError::ConfigurationError("Controller URL is required".into()));
        }
        if self.auth_state.lock().await.is_none() {
            return self.login().await;
        }

        let url = self
            .controller_url
            .join("/api/self")
            .map_err(UniFiError::UrlParseError)?;

        match self.http_client.get(url).headers(self.get_auth_headers().await?).send().await {
            Ok(response) => {
                if response.status().is_success() {
                    return Ok(());
                } else if response.status() == StatusCode::UNAUTHORIZED {
                    return self.login().await;
                }
                Ok(())
            }
            Err(_) => self.login().await,
        }
    }

    // Helper to get authentication headers
    async fn get_auth_headers(&self) -> UniFiResult<HeaderMap> {
        let auth_state = self.auth_state.lock().await;
        let auth_state = auth_state.as_ref().ok_or(UniFiError::NotAuthenticated)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&auth_state.cookies)
                .map_err(|e| UniFiError::ApiError(format!("Invalid cookie header: {}", e)))?,
        );

        if let Some(token) = &auth_state.csrf_token {
            headers.insert(
                "x-csrf-token",
                HeaderValue::from_str(token)
                    .map_err(|e| UniFiError::ApiError(format!("Invalid CSRF token: {}", e)))?,
            );
        }

        Ok(headers)
    }

    /// Makes a raw request to the UniFi API.
    ///
    /// # Warning
    ///
    /// This is an advanced API that bypasses the type-safe wrappers.
    /// Use the typed API methods (like `users()`) when possible.
    ///
    /// # Arguments
    ///
    /// * `method` - The HTTP method to use (e.g., "GET", "POST").
    /// * `endpoint` - The API endpoint path (e.g.,
    ///   "/api/s/default/stat/sysinfo").
    /// * `body` - Optional request body (must implement `Serialize`).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The client is not configured (missing URL, username, etc.).
    /// - Authentication fails (invalid credentials, expired session).
    /// - The request fails due to network issues.
    /// - The API returns an error response.
    /// - Deserialization of the response fails.
    pub async fn raw_request<T>(
        &self,
        method: &str,
        endpoint: &str,
        body: Option<T>,
    ) -> UniFiResult<Vec<Value>>
    where
        T: Serialize,
    {
        let method = Method::from_bytes(method.as_bytes()).unwrap_or(Method::GET);
        let response: ApiResponse<Value> = self.request(method, endpoint, body).await?;
        response.into_data()
    }

    /// Make a request to the UniFi API.
    ///
    /// Handles authentication and HTTP-level failures, then deserializes the
    /// response body into the caller-chosen envelope type. Envelope
    /// classification (metadata errors, cardinality) is the caller's job;
    /// endpoints disagree on nesting, so the shape cannot be fixed here.
    pub(crate) async fn request<T, R>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<T>,
    ) -> UniFiResult<R>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        self.ensure_authenticated().await?;

        let url = self
            .controller_url
            .join(endpoint)
            .map_err(UniFiError::UrlParseError)?;

        debug!("{} {}", method, url);
        let mut request = self.http_client.request(method, url);

        request = request.headers(self.get_auth_headers().await?);

        // Add JSON body if provided
        if let Some(data) = body {
            request = request.json(&data).header(CONTENT_TYPE, "application/json");
        }

        let response = request.send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(UniFiError::NotAuthenticated);
        }

        if !response.status().is_success() {
            return Err(UniFiError::ApiError(format!(
                "API request failed with status code: {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    /// Gets the current site ID.
    pub fn site(&self) -> &str {
        &self.site
    }

    /// Gets the controller's self-reported version, if known.
    pub fn controller_version(&self) -> Option<String> {
        self.version.read().expect("version lock poisoned").clone()
    }

    /// Fetches the controller version from `stat/sysinfo` and stores it for
    /// subsequent update-protocol selection.
    pub async fn refresh_controller_version(&self) -> UniFiResult<String> {
        let endpoint = format!("/api/s/{}/stat/sysinfo", self.site);
        let response: ApiResponse<SysInfo> = self.request(Method::GET, &endpoint, None::<()>).await?;
        let info = response.into_single()?;

        trace!("controller reports version {}", info.version);
        let mut version = self.version.write().expect("version lock poisoned");
        *version = Some(info.version.clone());

        Ok(info.version)
    }

    /// Gets the user (client-station) API interface.
    pub fn users(&self) -> UserApi<'_> {
        UserApi::new(self)
    }
}

// Implement Clone for UniFiClient
impl Clone for UniFiClient {
    fn clone(&self) -> Self {
        UniFiClient {
            controller_url: self.controller_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            site: self.site.clone(),
            verify_ssl: self.verify_ssl,
            timeout: self.timeout,
            user_agent: self.user_agent.clone(),
            http_client: self.http_client.clone(),
            auth_state: self.auth_state.clone(),
            version: self.version.clone(),
        }
    }
}
