use std::net::SocketAddr;

use axum::{extract::Request, Router};
use rolodex_core::Settings;
use rolodex_store::{Directory, StorageError};
use tower::{util::MapRequest, Layer};
use tracing::info;

use crate::{extract, router, AppState};

pub(crate) type App = MapRequest<Router<()>, fn(Request) -> Request>;

/// Builds the directory named by `settings` and wires it into the served app.
pub(crate) fn build(settings: &Settings) -> Result<App, StorageError> {
    let directory = Directory::from_settings(settings)?;
    info!(
        backend = ?settings.backend,
        db = %settings.db_path.display(),
        "contact directory ready"
    );
    Ok(app_with(directory))
}

pub(crate) fn app_with(directory: Directory) -> App {
    with_method_override(attach_http_layers(router_with(directory)))
}

/// Method override has to run before routing, so it wraps the router
/// instead of being one of its layers.
pub(crate) fn with_method_override(router: Router<()>) -> App {
    let rewrite: fn(Request) -> Request = extract::method_override;
    tower::util::MapRequestLayer::new(rewrite).layer(router)
}

pub(crate) fn router_with(directory: Directory) -> Router<()> {
    let (router, endpoints) = router::build_router();
    router.with_state(AppState::new(directory, endpoints))
}

pub(crate) fn attach_http_layers(router: Router<()>) -> Router<()> {
    use tower_http::trace::TraceLayer;

    router.layer(TraceLayer::new_for_http())
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum HttpConfigError {
    #[error("invalid bind address: {0}")]
    InvalidBind(String),
}

pub(crate) fn http_addr(settings: &Settings) -> Result<SocketAddr, HttpConfigError> {
    let raw = if settings.bind.contains(':') && !settings.bind.starts_with('[') {
        format!("[{}]:{}", settings.bind, settings.port)
    } else {
        format!("{}:{}", settings.bind, settings.port)
    };
    raw.parse()
        .map_err(|_| HttpConfigError::InvalidBind(settings.bind.clone()))
}
