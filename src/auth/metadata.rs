use async_trait::async_trait;

use super::{read_token_response, TokenError, TokenProvider};

const DEFAULT_METADATA_HOST: &str = "http://metadata.google.internal";
const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// Token for the default service account of the GCE / Cloud Run instance.
#[derive(Debug, Clone)]
pub struct MetadataServer {
    host: String,
    scope: String,
    http: reqwest::Client,
}

impl MetadataServer {
    pub fn new(http: reqwest::Client, scope: String) -> Self {
        // Same override the Google client libraries honour
        let host = std::env::var("GCE_METADATA_HOST")
            .map(|h| format!("http://{}", h.trim_end_matches('/')))
            .unwrap_or_else(|_| DEFAULT_METADATA_HOST.to_string());
        Self { host, scope, http }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl TokenProvider for MetadataServer {
    async fn access_token(&self) -> Result<String, TokenError> {
        let response = self
            .http
            .get(format!("{}{}", self.host, TOKEN_PATH))
            .query(&[("scopes", self.scope.as_str())])
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;
        read_token_response(response).await
    }

    fn kind(&self) -> &'static str {
        "metadata_server"
    }
}
