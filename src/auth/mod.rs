//! OAuth access tokens for calling Firestore.
//!
//! Resolution follows Google's Application Default Credentials order. A fresh
//! token is requested for every Firestore call; nothing is cached here.

mod credentials;
mod metadata;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::config::CredentialsConfig;

pub use credentials::{AuthorizedUser, AuthorizedUserKey, CredentialsFile, ServiceAccount, ServiceAccountKey};
pub use metadata::MetadataServer;

pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to read credentials file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("token endpoint returned {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("token response did not contain an access token")]
    MissingAccessToken,
}

/// Source of bearer tokens for the Firestore REST API.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, TokenError>;

    /// Short label for logs
    fn kind(&self) -> &'static str;
}

/// A fixed token, typically from `FIRESTORE_ACCESS_TOKEN`.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, TokenError> {
        Ok(self.0.clone())
    }

    fn kind(&self) -> &'static str {
        "static"
    }
}

/// Standard OAuth token endpoint response
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Read an OAuth token response, rejecting non-2xx statuses and empty tokens.
pub(crate) async fn read_token_response(response: reqwest::Response) -> Result<String, TokenError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TokenError::Rejected { status, body });
    }

    let token: TokenResponse = response.json().await?;
    token
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or(TokenError::MissingAccessToken)
}

/// Pick a token provider the way Application Default Credentials does:
/// static token, `GOOGLE_APPLICATION_CREDENTIALS`, the gcloud well-known
/// file, then the GCE metadata server.
pub fn find_default_credentials(
    config: &CredentialsConfig,
    http: reqwest::Client,
) -> Result<Arc<dyn TokenProvider>, TokenError> {
    if let Some(token) = &config.static_token {
        tracing::info!("Using static Firestore access token");
        return Ok(Arc::new(StaticToken::new(token.clone())));
    }

    if let Some(path) = &config.credentials_file {
        let file = CredentialsFile::load(path)?;
        tracing::info!("Using credentials from {}", path);
        return Ok(file.into_provider(config.scope.clone(), http));
    }

    if let Some(path) = well_known_credentials_path().filter(|p| p.is_file()) {
        let path_str = path.display().to_string();
        let file = CredentialsFile::load(&path_str)?;
        tracing::info!("Using gcloud application default credentials from {}", path_str);
        return Ok(file.into_provider(config.scope.clone(), http));
    }

    tracing::info!("No credentials file found, falling back to the metadata server");
    Ok(Arc::new(MetadataServer::new(http, config.scope.clone())))
}

fn well_known_credentials_path() -> Option<PathBuf> {
    const FILE: &str = "application_default_credentials.json";

    if cfg!(windows) {
        std::env::var_os("APPDATA").map(|dir| PathBuf::from(dir).join("gcloud").join(FILE))
    } else {
        std::env::var_os("HOME").map(|dir| PathBuf::from(dir).join(".config").join("gcloud").join(FILE))
    }
}
