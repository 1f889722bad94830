//! Where credentials come from and how the OAuth session is set up.

use std::path::PathBuf;

/// Default directory searched for the credential file.
pub const DEFAULT_CREDENTIALS_DIR: &str = "gconf";

/// Default credential file name inside the directory.
pub const DEFAULT_CREDENTIALS_FILE: &str = "gsheet-auth.json";

/// File the installed-app flow persists its tokens to.
pub const TOKEN_CACHE_FILE: &str = "tokens.json";

/// Configuration for opening a Sheets API session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialsConfig {
    /// Directory holding the credential file and the token cache. Default: `gconf`.
    pub directory: PathBuf,
    /// Credential file name. Default: `gsheet-auth.json`.
    pub file_name: String,
    /// Credential JSON compiled into the host program, used when the file is missing.
    pub bundled: Option<String>,
    /// Local port the installed-app flow listens on for the OAuth redirect. Default: 8888.
    pub redirect_port: u16,
    /// Sent as the HTTP user agent. Default: `tally/<version>`.
    pub application_name: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_CREDENTIALS_DIR),
            file_name: DEFAULT_CREDENTIALS_FILE.to_string(),
            bundled: None,
            redirect_port: 8888,
            application_name: concat!("tally/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl CredentialsConfig {
    /// Override the directory and/or file name. Empty values keep the current setting.
    pub fn set_credential_dir(&mut self, directory: &str, file_name: &str) {
        if !directory.is_empty() {
            self.directory = PathBuf::from(directory);
        }
        if !file_name.is_empty() {
            self.file_name = file_name.to_string();
        }
    }

    /// Use `json` when no credential file exists on disk.
    pub fn with_bundled(mut self, json: impl Into<String>) -> Self {
        self.bundled = Some(json.into());
        self
    }

    /// Full path of the credential file.
    pub fn credentials_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    /// Full path of the installed-app token cache.
    pub fn token_cache_path(&self) -> PathBuf {
        self.directory.join(TOKEN_CACHE_FILE)
    }
}
