//! Service-account OAuth for the Sheets API.
//!
//! A signed JWT assertion is exchanged at the account's token endpoint for a
//! short-lived bearer token, cached per scope until shortly before expiry.
use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::StoreError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    ReadOnly,
    ReadWrite,
}

impl Scope {
    pub fn url(&self) -> &'static str {
        match self {
            Scope::ReadOnly => "https://www.googleapis.com/auth/spreadsheets.readonly",
            Scope::ReadWrite => "https://www.googleapis.com/auth/spreadsheets",
        }
    }
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a service-account key file that token exchange needs.
#[derive(Deserialize, Clone)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_json(raw: &str) -> Result<Self> {
        let key: ServiceAccountKey =
            serde_json::from_str(raw).context("GOOGLE_CREDENTIALS is not a service-account JSON key")?;
        if key.client_email.is_empty() {
            anyhow::bail!("service-account key has an empty client_email");
        }
        Ok(key)
    }
}

#[derive(Serialize, Debug)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

pub struct TokenSource {
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    http: reqwest::Client,
    cache: Mutex<HashMap<Scope, CachedToken>>,
}

impl TokenSource {
    pub fn new(key: ServiceAccountKey, http: reqwest::Client) -> Result<Self> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .context("service-account private_key is not a valid RSA PEM key")?;
        Ok(Self {
            key,
            signing_key,
            http,
            cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    pub async fn token(&self, scope: Scope) -> Result<String, StoreError> {
        let mut cache = self.cache.lock().await;
        let now = Utc::now();
        if let Some(cached) = cache.get(&scope)
            && cached.expires_at > now + Duration::seconds(EXPIRY_MARGIN_SECS)
        {
            return Ok(cached.access_token.clone());
        }

        let fresh = self.exchange(scope, now).await?;
        let access_token = fresh.access_token.clone();
        cache.insert(scope, fresh);
        Ok(access_token)
    }

    /// Drops a cached token the store rejected.
    pub async fn invalidate(&self, scope: Scope) {
        self.cache.lock().await.remove(&scope);
    }

    fn assertion(&self, scope: Scope, now: DateTime<Utc>) -> Result<String, StoreError> {
        let claims = Claims {
            iss: &self.key.client_email,
            scope: scope.url(),
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| StoreError::Auth(format!("failed to sign assertion: {}", e)))
    }

    async fn exchange(&self, scope: Scope, now: DateTime<Utc>) -> Result<CachedToken, StoreError> {
        let assertion = self.assertion(scope, now)?;
        tracing::debug!("requesting {:?} token for {}", scope, self.key.client_email);

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(StoreError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!("token endpoint returned {}: {}", status, body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Auth(format!("malformed token response: {}", e)))?;

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}
