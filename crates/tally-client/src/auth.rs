//! Credential loading and OAuth authenticator construction.
//!
//! The credential file is read from `CredentialsConfig::directory`; when it is
//! missing, the bundled JSON (if any) is used instead. Two kinds are accepted:
//!
//! - an installed-application client secret (`{"installed": {...}}`), which runs
//!   the browser consent flow once and caches tokens next to the credentials
//! - a service account key (`{"type": "service_account", ...}`)

use std::path::PathBuf;

use google_sheets4::oauth2::{
    self, authenticator::DefaultAuthenticator, ApplicationSecret, InstalledFlowAuthenticator,
    InstalledFlowReturnMethod, ServiceAccountAuthenticator, ServiceAccountKey,
};

use crate::config::CredentialsConfig;
use crate::error::{ClientError, Result};

/// OAuth scopes requested on every call, so one cached token serves them all.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

/// Where the credential JSON was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    File(PathBuf),
    Bundled,
}

/// Parsed credential JSON.
#[derive(Debug, Clone)]
pub enum Credentials {
    InstalledApp(ApplicationSecret),
    ServiceAccount(ServiceAccountKey),
}

/// Read the credential JSON, preferring the file on disk over the bundled copy.
pub fn load_credentials(config: &CredentialsConfig) -> Result<(CredentialSource, String)> {
    let path = config.credentials_path();
    if path.is_file() {
        let json = std::fs::read_to_string(&path)?;
        return Ok((CredentialSource::File(path), json));
    }

    match &config.bundled {
        Some(json) => Ok((CredentialSource::Bundled, json.clone())),
        None => Err(ClientError::CredentialsNotFound(path)),
    }
}

/// Decide which kind of credential `json` holds and parse it.
pub fn parse_credentials(json: &str) -> Result<Credentials> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| ClientError::InvalidCredentials(e.to_string()))?;

    if value.get("type").and_then(serde_json::Value::as_str) == Some("service_account") {
        oauth2::parse_service_account_key(json)
            .map(Credentials::ServiceAccount)
            .map_err(|e| ClientError::InvalidCredentials(e.to_string()))
    } else {
        oauth2::parse_application_secret(json)
            .map(Credentials::InstalledApp)
            .map_err(|e| ClientError::InvalidCredentials(e.to_string()))
    }
}

/// Build an authenticator from the configured credentials.
pub async fn authenticator(config: &CredentialsConfig) -> Result<DefaultAuthenticator> {
    let (source, json) = load_credentials(config)?;
    tracing::debug!("Loading credentials from {:?}", source);

    match parse_credentials(&json)? {
        Credentials::InstalledApp(secret) => {
            std::fs::create_dir_all(&config.directory)?;
            let cache = config.token_cache_path();
            tracing::info!(
                "Using installed-app flow (redirect port {}, token cache {})",
                config.redirect_port,
                cache.display()
            );
            let auth = InstalledFlowAuthenticator::builder(
                secret,
                InstalledFlowReturnMethod::HTTPPortRedirect(config.redirect_port),
            )
            .persist_tokens_to_disk(cache)
            .build()
            .await?;
            Ok(auth)
        }
        Credentials::ServiceAccount(key) => {
            tracing::info!("Using service account {}", key.client_email);
            let auth = ServiceAccountAuthenticator::builder(key).build().await?;
            Ok(auth)
        }
    }
}
