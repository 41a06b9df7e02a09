//! HTTP client for the service under test
//!
//! Wraps `reqwest` with base-URL joining and bearer authentication, and holds
//! the request/response DTOs for the endpoints the smoke test calls.

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::errors::{Result, SmokeError};

/// Default base URL of the service under test
pub const DEFAULT_BASE_URL: &str = "http://localhost:5005";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the service (e.g., "http://localhost:5005")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), timeout: DEFAULT_TIMEOUT_SECS }
    }
}

/// HTTP client bound to one service base URL
#[derive(Debug, Clone)]
pub struct SmokeClient {
    client: Client,
    base_url: String,
}

impl SmokeClient {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| SmokeError::connectivity(config.base_url.clone(), e))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join the base URL and a path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build an unauthenticated GET request
    pub fn get(&self, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("GET {}", url);

        self.client.get(&url)
    }

    /// Build a GET request carrying a bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Build an unauthenticated POST request
    pub fn post(&self, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("POST {}", url);

        self.client.post(&url)
    }
}

// === Data Transfer Objects (DTOs) ===

/// Identity posted to the login endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub keycloak_token: String,
    pub email: String,
    pub name: String,
    pub sub: Uuid,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            keycloak_token: "test".to_string(),
            email: "smoke-test@example.com".to_string(),
            name: "smoke-test".to_string(),
            sub: Uuid::from_u128(0xe42f2228_cd5e_4d46_8e76_77c7355a1a4a),
        }
    }
}

/// Request body for `POST /api/auth/keycloak-login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub keycloak_token: String,
    pub user_info: UserInfo,
}

/// Fabricated user profile sent with the login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub email: String,
    pub name: String,
    pub sub: String,
}

impl From<&Credentials> for LoginRequest {
    fn from(credentials: &Credentials) -> Self {
        Self {
            keycloak_token: credentials.keycloak_token.clone(),
            user_info: UserInfo {
                email: credentials.email.clone(),
                name: credentials.name.clone(),
                sub: credentials.sub.to_string(),
            },
        }
    }
}

/// Response from the login endpoint; only `token` is read
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Response from `GET /api/google-sheets/settings`
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsResponse {
    pub success: bool,
    pub configured: bool,
}
