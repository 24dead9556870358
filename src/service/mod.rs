//! Service layer over the Appserver REST API

mod angles;
mod appserver;
pub mod models_html;

pub use angles::AngleService;
pub use appserver::AppserverService;

use std::sync::Arc;

use crate::client::AppserverClient;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::platform;

/// Build both services over one shared HTTP client and token source
pub fn connect(config: &Config) -> Result<(Arc<AppserverService>, Arc<AngleService>)> {
    let http = AppserverClient::build_http_client(config)?;
    let tokens = platform::token_provider(config, http.clone())?;
    let client = AppserverClient::with_http(http, &config.appserver.base_url, tokens);

    Ok((
        Arc::new(AppserverService::new(client.clone(), config)),
        Arc::new(AngleService::new(client, config)),
    ))
}

/// Validate an identifier before it is spliced into a URI path
pub(crate) fn path_id<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidInput(format!("{} is required", what)));
    }
    if value.contains(['/', '?', '#']) {
        return Err(Error::InvalidInput(format!("{} contains invalid characters", what)));
    }
    Ok(value)
}

/// Validate a URI argument that must point somewhere
pub(crate) fn required_uri<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidInput(format!("{} is required", what)));
    }
    Ok(value)
}
