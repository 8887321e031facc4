//! calwidget entry point.

use std::sync::Arc;

use gtk4::glib;
use tracing::{error, warn};

use calwidget_core::{TracingConfig, WidgetConfig, init_tracing};
use calwidget_gtk::{AppError, CalendarApp};
use calwidget_providers::google::{CredentialManager, GoogleConfig, GoogleProvider};
use calwidget_providers::AuthError;

fn main() -> glib::ExitCode {
    let (config, config_error) = match WidgetConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (WidgetConfig::default(), Some(e)),
    };

    if let Err(e) = init_tracing(TracingConfig::for_debug(config.debug)) {
        eprintln!("error: {}", AppError::from(e));
        return glib::ExitCode::FAILURE;
    }
    if let Some(e) = config_error {
        warn!(error = %e, "invalid configuration, using defaults");
    }

    match run(config) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "startup failed");
            eprintln!("error: {e}");
            glib::ExitCode::FAILURE
        }
    }
}

fn run(config: WidgetConfig) -> Result<glib::ExitCode, AppError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(AppError::Runtime)?;

    let (port_start, port_end) = config.loopback_port_range();
    let google = GoogleConfig::new(&config.credentials_path, &config.token_path)
        .with_timeout(config.request_timeout())
        .with_loopback_port_range(port_start, port_end);
    let credentials = Arc::new(CredentialManager::new(google));

    // May open the browser and block until consent completes
    runtime.block_on(credentials.obtain())?;

    let provider = GoogleProvider::new(credentials).map_err(AuthError::from)?;
    let app = CalendarApp::new(config, Arc::new(runtime), Arc::new(provider))?;
    Ok(app.run())
}
