//! Client for the hosted-PBX directory API.
//!
//! Every inbound request triggers a fresh login followed by one
//! authenticated GET; tokens are deliberately not cached, so each call pair
//! is independent and the gateway holds no upstream session state.

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use crate::config::Config;
use crate::error::{AuthError, FetchError};

/// Header carrying the upstream account scope.
const ACCOUNT_HEADER: &str = "X-Account-Id";

/// Upstream path for active call status, relative to the base URL.
const CALLS_PATH: &str = "status/calls";

/// One authenticated upstream session, valid for a single call pair.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Opaque bearer token from the login response.
    pub token: String,
    /// Upstream id of the service account user, when the login response
    /// includes one. Needed for device ownership filtering.
    pub user_id: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    domain: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: Option<String>,
    user: Option<LoginUser>,
}

#[derive(Deserialize)]
struct LoginUser {
    #[serde(rename = "_id")]
    id: Option<String>,
}

/// Externally-defined user record; any field may be absent.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub presence_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Kept untyped: a malformed tags list, or malformed entries in it,
    /// are dropped during normalization rather than failing the whole
    /// fetch.
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default, rename = "isAgent")]
    pub is_agent: Option<bool>,
}

/// Active call as reported by the upstream status endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ActiveCall {
    pub caller_id_number: String,
    pub callee_id_number: String,
    pub user: CallUser,
    pub duration_in_seconds: u64,
    pub answered: bool,
    pub direction: CallDirection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallUser {
    pub presence_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallDirection {
    Inbound,
    Outbound,
}

/// Upstream device record from the list-devices endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDevice {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sip: Option<DeviceSip>,
    #[serde(default)]
    pub media: Option<DeviceMedia>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub owner_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceSip {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceMedia {
    #[serde(default)]
    pub webrtc: bool,
}

/// Upstream API client holding the shared reqwest client and configuration.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    config: Arc<Config>,
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("base_url", &self.config.api_base_url)
            .field("account_id", &self.config.account_id)
            .finish_non_exhaustive()
    }
}

impl UpstreamClient {
    /// Create a new upstream client.
    ///
    /// # Panics
    /// Panics if the HTTP client fails to create.
    #[must_use]
    pub fn new(config: Arc<Config>) -> Self {
        let client = Client::builder()
            .timeout(config.outbound_timeout())
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Exchange the configured service credentials for a bearer token.
    ///
    /// # Errors
    /// `AuthError::RequestFailed` on a non-2xx status,
    /// `AuthError::TokenMissing` when the 2xx response carries no usable
    /// `access_token`, `AuthError::Transport` on network-level failures.
    #[instrument(skip(self))]
    pub async fn authenticate(&self) -> Result<AuthSession, AuthError> {
        let url = format!("{}{}", self.config.api_base_url, self.config.login_endpoint);
        let request = LoginRequest {
            username: &self.config.username,
            password: self.config.password.expose_secret(),
            domain: &self.config.domain,
        };

        debug!(%url, "Logging in to upstream API");

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, "Upstream login rejected");
            return Err(AuthError::RequestFailed { status, body });
        }

        let body = response.text().await?;
        // A 2xx body we cannot read a token out of is reported as a missing
        // token, whatever shape it had.
        let login: LoginResponse =
            serde_json::from_str(&body).map_err(|_| AuthError::TokenMissing)?;

        let token = login
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::TokenMissing)?;

        let user_id = login.user.and_then(|u| u.id);
        if user_id.is_none() {
            warn!("Login response carries no user id; device provisioning unavailable");
        }

        Ok(AuthSession { token, user_id })
    }

    /// Fetch the full user list for the configured account.
    #[instrument(skip(self, session))]
    pub async fn list_users(&self, session: &AuthSession) -> Result<Vec<RawUser>, FetchError> {
        self.get_json(&self.config.list_users_endpoint, session).await
    }

    /// Fetch currently active calls for the configured account.
    #[instrument(skip(self, session))]
    pub async fn active_calls(&self, session: &AuthSession) -> Result<Vec<ActiveCall>, FetchError> {
        self.get_json(CALLS_PATH, session).await
    }

    /// Fetch the device map (device id -> device) for the configured account.
    ///
    /// A `BTreeMap` keeps the output order deterministic; the upstream JSON
    /// object has no defined order of its own.
    #[instrument(skip(self, session))]
    pub async fn list_devices(
        &self,
        session: &AuthSession,
    ) -> Result<BTreeMap<String, RawDevice>, FetchError> {
        self.get_json(&self.config.list_devices_endpoint, session).await
    }

    /// Authenticated GET returning a deserialized JSON body.
    ///
    /// # Errors
    /// `FetchError::RequestFailed` on a non-2xx status,
    /// `FetchError::ParseFailed` when the body does not match `T`,
    /// `FetchError::Transport` on network-level failures.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        session: &AuthSession,
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.config.api_base_url, path);

        debug!(%url, "Fetching from upstream API");

        let response = self
            .client
            .get(&url)
            .header(ACCOUNT_HEADER, &self.config.account_id)
            .bearer_auth(&session.token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, %url, "Upstream fetch failed");
            return Err(FetchError::RequestFailed { status, body });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
