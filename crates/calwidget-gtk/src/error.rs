//! Startup errors of the widget binary.

use calwidget_core::TracingError;
use calwidget_providers::AuthError;
use thiserror::Error;

/// Anything that stops the widget before its window opens.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("failed to create runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("failed to initialise logging: {0}")]
    Tracing(#[from] TracingError),

    #[error("failed to create HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use calwidget_providers::ProviderError;

    #[test]
    fn auth_error_keeps_provider_message() {
        let err = AppError::from(AuthError::from(ProviderError::configuration(
            "credentials file not found",
        )));
        let text = err.to_string();
        assert!(text.starts_with("authentication failed:"));
        assert!(text.contains("credentials file not found"));
    }

    #[test]
    fn runtime_error_exposes_source() {
        use std::error::Error as _;
        let err = AppError::Runtime(std::io::Error::other("no threads"));
        assert_eq!(err.to_string(), "failed to create runtime: no threads");
        assert!(err.source().is_some());
    }
}
