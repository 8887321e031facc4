//! Obtaining a usable access token.
//!
//! [`CredentialManager`] owns the cached [`TokenInfo`]. It reuses the
//! persisted token when it is still valid, refreshes it once when it has
//! expired, and falls back to the interactive consent flow only from
//! [`CredentialManager::obtain`].

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{AuthError, ProviderError, ProviderResult};

use super::config::{GoogleConfig, OAuthCredentials};
use super::oauth::OAuthClient;
use super::tokens::{TokenInfo, TokenStorage};

/// Owns the OAuth credential for the session.
#[derive(Debug)]
pub struct CredentialManager {
    config: GoogleConfig,
    storage: TokenStorage,
    cached: Mutex<Option<TokenInfo>>,
}

impl CredentialManager {
    pub fn new(config: GoogleConfig) -> Self {
        let storage = TokenStorage::new(&config.token_path);
        Self {
            config,
            storage,
            cached: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }

    /// Returns a valid credential, running the consent flow if needed.
    ///
    /// # Errors
    ///
    /// Fails when no stored token can be used and the consent flow fails.
    pub async fn obtain(&self) -> Result<TokenInfo, AuthError> {
        let mut cached = self.cached.lock().await;

        let stored = match cached.take() {
            Some(token) => Some(token),
            None => self.load_stored(),
        };

        if let Some(token) = stored {
            if !token.has_scopes(&self.config.scopes) {
                info!("stored token lacks required scopes, asking for consent again");
            } else {
                match self.ensure_fresh(token).await {
                    Ok(token) => {
                        *cached = Some(token.clone());
                        return Ok(token);
                    }
                    Err(e) => warn!(error = %e, "stored token is unusable"),
                }
            }
        }

        let token = self.consent().await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Returns the current access token without user interaction.
    ///
    /// An expired token is refreshed once; there is no consent fallback.
    pub async fn access_token(&self) -> ProviderResult<String> {
        let mut cached = self.cached.lock().await;

        let token = match cached.take() {
            Some(token) => token,
            None => self.load_stored().ok_or_else(|| {
                ProviderError::authentication("not authenticated - no stored token")
            })?,
        };

        // Keep the stale token around so the next call can try again
        let fallback = token.clone();
        match self.ensure_fresh(token).await {
            Ok(token) => {
                let access = token.access_token.clone();
                *cached = Some(token);
                Ok(access)
            }
            Err(e) => {
                *cached = Some(fallback);
                Err(e)
            }
        }
    }

    fn load_stored(&self) -> Option<TokenInfo> {
        match self.storage.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable token file");
                None
            }
        }
    }

    /// Returns `token` as is when valid, otherwise makes the single refresh
    /// attempt and persists the result.
    async fn ensure_fresh(&self, mut token: TokenInfo) -> ProviderResult<TokenInfo> {
        if !token.is_expired() {
            return Ok(token);
        }

        let refresh_token = token
            .refresh_token
            .clone()
            .ok_or_else(|| ProviderError::authentication("token expired and no refresh token"))?;

        debug!("access token expired, refreshing");
        let client = OAuthClient::new(self.refresh_credentials(&token)?, &self.config)?;
        let (access_token, expires_in) = client.refresh_token(&refresh_token).await?;

        token.update_access_token(access_token, expires_in);
        if let Err(e) = self.storage.save(&token) {
            warn!(error = %e, "failed to persist refreshed token");
        }
        Ok(token)
    }

    /// Client used for refresh: the one recorded in the token, or the
    /// client configuration file.
    fn refresh_credentials(&self, token: &TokenInfo) -> ProviderResult<OAuthCredentials> {
        if let (Some(id), Some(secret)) = (&token.client_id, &token.client_secret) {
            return Ok(OAuthCredentials::new(id, secret));
        }
        OAuthCredentials::from_file(&self.config.credentials_path)
    }

    async fn consent(&self) -> Result<TokenInfo, AuthError> {
        self.config.validate()?;

        let credentials = OAuthCredentials::from_file(&self.config.credentials_path)?;
        credentials.validate().map_err(|e| {
            ProviderError::configuration(format!("invalid client configuration: {e}"))
        })?;

        let client = OAuthClient::new(credentials, &self.config)?;
        let token = client
            .authorize(&self.config.scopes, self.config.loopback_port_range)
            .await
            .map_err(|e| e.with_provider("google"))?;

        self.storage.save(&token)?;
        info!(path = %self.storage.path().display(), "authorization complete");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use crate::google::test_support::serve_once;
    use chrono::{Duration, Utc};

    fn manager(dir: &tempfile::TempDir, token_url: &str) -> CredentialManager {
        let config = GoogleConfig::new(
            dir.path().join("credentials.json"),
            dir.path().join("token.json"),
        )
        .with_token_url(token_url)
        .with_consent_timeout(std::time::Duration::from_millis(50));
        CredentialManager::new(config)
    }

    fn expired_token() -> TokenInfo {
        let mut token = TokenInfo::new(
            "stale",
            Some("refresh".to_string()),
            Some(3600),
            vec![GoogleConfig::DEFAULT_SCOPE.to_string()],
        )
        .with_client("id.apps.googleusercontent.com", "secret");
        token.expires_at = Some(Utc::now() - Duration::hours(1));
        token
    }

    #[tokio::test]
    async fn valid_stored_token_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(&dir, "http://127.0.0.1:1/token");
        let token = TokenInfo::new(
            "valid",
            None,
            Some(3600),
            vec![GoogleConfig::DEFAULT_SCOPE.to_string()],
        );
        TokenStorage::new(dir.path().join("token.json"))
            .save(&token)
            .unwrap();

        assert_eq!(manager.obtain().await.unwrap().access_token, "valid");
        assert_eq!(manager.access_token().await.unwrap(), "valid");
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let url = serve_once("200 OK", r#"{"access_token": "fresh", "expires_in": 3600}"#);
        let manager = manager(&dir, &url);
        TokenStorage::new(dir.path().join("token.json"))
            .save(&expired_token())
            .unwrap();

        let token = manager.obtain().await.unwrap();
        assert_eq!(token.access_token, "fresh");
        assert!(!token.is_expired());
        assert_eq!(token.refresh_token.as_deref(), Some("refresh"));

        let persisted = TokenStorage::new(dir.path().join("token.json"))
            .load()
            .unwrap()
            .unwrap();
        assert_eq!(persisted.access_token, "fresh");
    }

    #[tokio::test]
    async fn failed_refresh_without_client_file_is_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(&dir, "http://127.0.0.1:1/token");
        TokenStorage::new(dir.path().join("token.json"))
            .save(&expired_token())
            .unwrap();

        // refresh fails (unreachable), consent fails (no credentials.json)
        let err = manager.obtain().await.unwrap_err();
        assert_eq!(err.0.code(), ProviderErrorCode::ConfigurationError);
    }

    #[tokio::test]
    async fn missing_everything_is_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(&dir, "http://127.0.0.1:1/token");
        assert!(manager.obtain().await.is_err());

        let err = manager.access_token().await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
    }

    #[tokio::test]
    async fn invalid_client_file_is_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("credentials.json"),
            r#"{"installed": {"client_id": "not-a-google-client", "client_secret": "s"}}"#,
        )
        .unwrap();
        let manager = manager(&dir, "http://127.0.0.1:1/token");

        let err = manager.obtain().await.unwrap_err();
        assert!(err.to_string().contains("invalid client configuration"));
    }

    #[tokio::test]
    async fn access_token_surfaces_refresh_failure() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(&dir, "http://127.0.0.1:1/token");
        TokenStorage::new(dir.path().join("token.json"))
            .save(&expired_token())
            .unwrap();

        let err = manager.access_token().await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::NetworkError);
    }

    #[tokio::test]
    async fn corrupt_token_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("token.json"), "garbage").unwrap();
        let manager = manager(&dir, "http://127.0.0.1:1/token");

        let err = manager.access_token().await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
    }
}
