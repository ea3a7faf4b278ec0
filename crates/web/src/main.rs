//! `agency-web` binary: public site plus admin panel.
//!
//! Reads `WebConfig` from the environment, wires up logging and error
//! reporting, then serves the router from `agency_web::app` until Ctrl+C
//! or SIGTERM.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::borrow::Cow;

use agency_web::config::WebConfig;
use agency_web::state::AppState;
use sentry::integrations::tracing::{EventFilter, layer as sentry_layer};
use tracing::{Level, Metadata};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "agency_web=info,tower_http=debug";

/// Starts the error-reporting client when a DSN is configured.
///
/// The returned guard flushes pending events on drop, so `main` holds it.
fn start_error_reporting(config: &WebConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_deref()?;
    let options = sentry::ClientOptions {
        release: sentry::release_name!(),
        environment: config.sentry_environment.clone().map(Cow::Owned),
        sample_rate: config.sentry_sample_rate,
        traces_sample_rate: config.sentry_traces_sample_rate,
        attach_stacktrace: true,
        ..Default::default()
    };
    Some(sentry::init((dsn, options)))
}

/// Warnings and errors become reported events; info and debug ride along
/// as breadcrumbs.
fn report_level(metadata: &Metadata<'_>) -> EventFilter {
    let level = *metadata.level();
    if level <= Level::WARN {
        EventFilter::Event
    } else if level <= Level::DEBUG {
        EventFilter::Breadcrumb
    } else {
        EventFilter::Ignore
    }
}

/// Installs the global subscriber. `AGENCY_LOG_JSON` switches to flattened
/// JSON lines.
fn install_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var_os("AGENCY_LOG_JSON").is_some();

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().flatten_event(true)))
        .with((!json).then(fmt::layer))
        .with(sentry_layer().event_filter(report_level))
        .init();
}

#[tokio::main]
async fn main() {
    let config = WebConfig::from_env().expect("Failed to load configuration");

    // Client first so the tracing layer has somewhere to send events.
    let _reporting = start_error_reporting(&config);
    install_logging();

    if config.sentry_dsn.is_some() {
        tracing::info!("Error reporting enabled");
    }
    tracing::info!(
        environment = ?config.environment,
        api_url = %config.api_url,
        demo_credentials = config.demo.is_some(),
        "Configuration loaded"
    );

    let addr = config.socket_addr();
    let state = AppState::new(config).expect("Failed to create application state");
    let app = agency_web::app(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "agency web listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_stop())
        .await
        .expect("Server error");
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn wait_for_stop() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.expect("Failed to install Ctrl+C handler"),
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");

    tracing::info!("Stop signal received, draining connections");
}
