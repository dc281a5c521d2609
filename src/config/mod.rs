use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_OAUTH_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub firestore: FirestoreConfig,
    pub collections: CollectionsConfig,
    pub credentials: CredentialsConfig,
    pub server: ServerConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub database_id: String,
    pub base_url: String,
    /// Sent as `pageSize` on collection listings; the server default applies when unset
    pub page_size: Option<u32>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionsConfig {
    pub restaurants: String,
    /// Document path the dead-letter collection-group query is scoped to.
    /// Empty queries every matching collection in the database.
    pub dead_letters_parent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    pub credentials_file: Option<String>,
    #[serde(skip_serializing)]
    pub static_token: Option<String>,
    pub scope: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    /// Empty means any origin
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Firestore overrides
        if let Ok(v) = env::var("PROJECT_ID") {
            self.firestore.project_id = v.trim().to_string();
        }
        if let Ok(v) = env::var("DATABASE_ID") {
            if !v.trim().is_empty() {
                self.firestore.database_id = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("FIRESTORE_BASE_URL") {
            if !v.trim().is_empty() {
                self.firestore.base_url = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("FIRESTORE_PAGE_SIZE") {
            self.firestore.page_size = v.parse().ok().filter(|size| *size > 0);
        }
        if let Ok(v) = env::var("FIRESTORE_TIMEOUT_SECS") {
            self.firestore.timeout_secs = v.parse().unwrap_or(self.firestore.timeout_secs);
        }

        // Collection overrides
        if let Ok(v) = env::var("RESTAURANTS_COLLECTION") {
            if !v.trim().is_empty() {
                self.collections.restaurants = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("DEAD_LETTERS_PARENT") {
            self.collections.dead_letters_parent = v.trim().trim_matches('/').to_string();
        }

        // Credential overrides
        if let Ok(v) = env::var("GOOGLE_APPLICATION_CREDENTIALS") {
            self.credentials.credentials_file = Some(v).filter(|p| !p.is_empty());
        }
        if let Ok(v) = env::var("FIRESTORE_ACCESS_TOKEN") {
            self.credentials.static_token = Some(v).filter(|t| !t.is_empty());
        }
        if let Ok(v) = env::var("OAUTH_SCOPE") {
            if !v.trim().is_empty() {
                self.credentials.scope = v.trim().to_string();
            }
        }

        // Server overrides
        if let Some(port) = env::var("API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("BIND_ADDRESS") {
            if !v.trim().is_empty() {
                self.server.bind_address = v.trim().to_string();
            }
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    fn base(environment: Environment, timeout_secs: u64) -> Self {
        Self {
            environment,
            firestore: FirestoreConfig {
                project_id: String::new(),
                database_id: "(default)".to_string(),
                base_url: DEFAULT_FIRESTORE_BASE_URL.to_string(),
                page_size: None,
                timeout_secs,
            },
            collections: CollectionsConfig {
                restaurants: "restaurants".to_string(),
                dead_letters_parent: String::new(),
            },
            credentials: CredentialsConfig {
                credentials_file: None,
                static_token: None,
                scope: DEFAULT_OAUTH_SCOPE.to_string(),
            },
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 4000,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: Vec::new(),
            },
        }
    }

    fn development() -> Self {
        Self::base(Environment::Development, 30)
    }

    fn staging() -> Self {
        let mut config = Self::base(Environment::Staging, 15);
        config.firestore.page_size = Some(300);
        config
    }

    fn production() -> Self {
        let mut config = Self::base(Environment::Production, 10);
        config.firestore.page_size = Some(300);
        // Grafana proxies datasource calls server-side, so browsers never need CORS in prod
        config.security.enable_cors = false;
        config
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
