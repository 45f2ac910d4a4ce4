use axum::{extract::Request, ServiceExt};
use rolodex_core::Settings;
use tracing::{error, info};

mod api;
mod app_state;
mod bootstrap;
mod extract;
mod responses;
mod router;

pub(crate) use app_state::AppState;

#[tokio::main]
async fn main() {
    rolodex_otel::init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    };
    let addr = match bootstrap::http_addr(&settings) {
        Ok(addr) => addr,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    };
    let app = match bootstrap::build(&settings) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("error: failed to open contact storage: {err}");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("error: failed to bind {addr}: {err}");
            std::process::exit(1);
        }
    };
    info!(%addr, "rolodex listening");

    let server = axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal());

    if let Err(err) = server.await {
        error!("http server exited with error: {err}");
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                error!(%err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("shutdown signal received");
}

#[cfg(test)]
mod http_tests;
