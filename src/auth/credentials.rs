use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use super::{read_token_response, TokenError, TokenProvider, GOOGLE_TOKEN_URI};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Google credentials JSON, as written by `gcloud` or downloaded for a service account.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialsFile {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUserKey),
}

#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Deserialize)]
pub struct AuthorizedUserKey {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for AuthorizedUserKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedUserKey")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl CredentialsFile {
    pub fn load(path: &str) -> Result<Self, TokenError> {
        let raw = std::fs::read_to_string(path).map_err(|source| TokenError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        serde_json::from_str(raw).map_err(|e| TokenError::InvalidCredentials(e.to_string()))
    }

    pub fn into_provider(self, scope: String, http: reqwest::Client) -> Arc<dyn TokenProvider> {
        match self {
            CredentialsFile::ServiceAccount(key) => Arc::new(ServiceAccount::new(key, scope, http)),
            CredentialsFile::AuthorizedUser(key) => Arc::new(AuthorizedUser::new(key, http)),
        }
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Exchanges a self-signed JWT for an access token.
#[derive(Debug, Clone)]
pub struct ServiceAccount {
    key: ServiceAccountKey,
    scope: String,
    http: reqwest::Client,
}

impl ServiceAccount {
    pub fn new(key: ServiceAccountKey, scope: String, http: reqwest::Client) -> Self {
        Self { key, scope, http }
    }

    fn token_uri(&self) -> &str {
        self.key.token_uri.as_deref().unwrap_or(GOOGLE_TOKEN_URI)
    }

    pub(crate) fn signed_assertion(&self) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: self.token_uri(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;
        Ok(encode(&header, &claims, &key)?)
    }
}

#[async_trait]
impl TokenProvider for ServiceAccount {
    async fn access_token(&self) -> Result<String, TokenError> {
        let assertion = self.signed_assertion()?;
        let response = self
            .http
            .post(self.token_uri())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        read_token_response(response).await
    }

    fn kind(&self) -> &'static str {
        "service_account"
    }
}

/// Exchanges a gcloud user refresh token for an access token.
#[derive(Debug, Clone)]
pub struct AuthorizedUser {
    key: AuthorizedUserKey,
    token_uri: String,
    http: reqwest::Client,
}

impl AuthorizedUser {
    pub fn new(key: AuthorizedUserKey, http: reqwest::Client) -> Self {
        Self {
            key,
            token_uri: GOOGLE_TOKEN_URI.to_string(),
            http,
        }
    }

    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self
    }
}

#[async_trait]
impl TokenProvider for AuthorizedUser {
    async fn access_token(&self) -> Result<String, TokenError> {
        let response = self
            .http
            .post(&self.token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.key.client_id.as_str()),
                ("client_secret", self.key.client_secret.as_str()),
                ("refresh_token", self.key.refresh_token.as_str()),
            ])
            .send()
            .await?;
        read_token_response(response).await
    }

    fn kind(&self) -> &'static str {
        "authorized_user"
    }
}
