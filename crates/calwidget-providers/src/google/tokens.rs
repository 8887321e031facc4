//! OAuth token persistence.
//!
//! The token file is JSON. Besides its own layout, the loader accepts the
//! field names written by Google's Python `google-auth` library (`token`,
//! `expiry`), so an existing `token.json` keeps working without a new
//! consent.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};

/// Refresh this long before the server-side expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// An OAuth credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    #[serde(alias = "token")]
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: Option<String>,

    #[serde(default, alias = "expiry")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Granted scopes. Empty when the issuer did not record them.
    #[serde(default)]
    pub scopes: Vec<String>,

    #[serde(default = "Utc::now")]
    pub last_refresh: DateTime<Utc>,

    /// The client that minted this token; lets a refresh run without the
    /// client configuration file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

impl TokenInfo {
    /// Creates a token from an OAuth token response.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: expires_in_secs.map(expiry_from_now),
            scopes,
            last_refresh: Utc::now(),
            client_id: None,
            client_secret: None,
        }
    }

    /// Records the OAuth client this token belongs to.
    pub fn with_client(mut self, client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    /// True once the access token is past (or within a minute of) its expiry.
    /// Tokens without an expiry never expire.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expires_at| Utc::now() >= expires_at)
    }

    /// True if every required scope was granted. A token that recorded no
    /// scopes is accepted as is.
    pub fn has_scopes(&self, required: &[String]) -> bool {
        self.scopes.is_empty() || required.iter().all(|scope| self.scopes.contains(scope))
    }

    /// Applies a refresh response.
    pub fn update_access_token(&mut self, access_token: impl Into<String>, expires_in_secs: Option<i64>) {
        self.access_token = access_token.into();
        self.expires_at = expires_in_secs.map(expiry_from_now);
        self.last_refresh = Utc::now();
    }
}

fn expiry_from_now(secs: i64) -> DateTime<Utc> {
    Utc::now() + Duration::seconds(secs) - Duration::seconds(EXPIRY_MARGIN_SECS)
}

/// File-backed token storage.
#[derive(Debug, Clone)]
pub struct TokenStorage {
    path: PathBuf,
}

impl TokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the token file. `Ok(None)` when there is no file.
    pub fn load(&self) -> ProviderResult<Option<TokenInfo>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no token file");
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            ProviderError::configuration(format!("failed to read token file: {e}")).with_source(e)
        })?;

        let token: TokenInfo = serde_json::from_str(&content).map_err(|e| {
            ProviderError::configuration(format!("failed to parse token file: {e}")).with_source(e)
        })?;

        info!(path = %self.path.display(), "loaded token");
        Ok(Some(token))
    }

    /// Writes the token, replacing any previous file.
    pub fn save(&self, token: &TokenInfo) -> ProviderResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    ProviderError::configuration(format!("failed to create token directory: {e}"))
                })?;
            }
        }

        // Write to a sibling then rename, so a crash never leaves half a file
        let temp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(token)
            .map_err(|e| ProviderError::internal(format!("failed to serialize token: {e}")))?;

        fs::write(&temp_path, &content).map_err(|e| {
            ProviderError::configuration(format!("failed to write token file: {e}"))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&temp_path, perms);
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            ProviderError::configuration(format!("failed to rename token file: {e}"))
        })?;

        debug!(path = %self.path.display(), "saved token");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
