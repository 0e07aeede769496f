//! Tienda Storefront - catalog, cart, checkout and administration API.
//!
//! ```bash
//! # in-memory tables, nothing to set up
//! cargo run -p tienda-storefront
//!
//! # against PostgreSQL (run `tienda-cli migrate` first)
//! TIENDA_DATABASE_URL=postgres://localhost/tienda cargo run -p tienda-storefront
//! ```
//!
//! See [`tienda_storefront::config`] for every environment variable.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::borrow::Cow;

use sentry::integrations::tracing::{self as sentry_tracing, EventFilter};
use tracing::{Level, Metadata};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tienda_storefront::build_app;
use tienda_storefront::config::StorefrontConfig;
use tienda_storefront::db::Database;
use tienda_storefront::state::AppState;

const DEFAULT_LOG_FILTER: &str = "tienda_storefront=info,tower_http=debug";

/// Start the Sentry client when `SENTRY_DSN` is set.
///
/// The returned guard flushes pending events on drop, so it lives as long
/// as `main`.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_deref()?;
    let options = sentry::ClientOptions {
        release: sentry::release_name!(),
        environment: config.sentry_environment.clone().map(Cow::Owned),
        sample_rate: config.sentry_sample_rate,
        traces_sample_rate: config.sentry_traces_sample_rate,
        attach_stacktrace: true,
        ..Default::default()
    };

    let guard = sentry::init((dsn, options));
    sentry::configure_scope(|scope| scope.set_tag("storefront.base_url", &config.base_url));
    Some(guard)
}

/// Failed logins and checkout rejections log at warn, so they reach Sentry
/// as events; request traces only ride along as breadcrumbs.
fn sentry_level(metadata: &Metadata<'_>) -> EventFilter {
    match *metadata.level() {
        Level::ERROR | Level::WARN => EventFilter::Event,
        Level::INFO | Level::DEBUG => EventFilter::Breadcrumb,
        _ => EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_level))
        .init();
}

#[tokio::main]
async fn main() {
    let config = StorefrontConfig::from_env().expect("Invalid storefront configuration");

    // Sentry before tracing, so the tracing layer finds a bound client.
    let sentry_guard = init_sentry(&config);
    init_tracing();
    if sentry_guard.is_some() {
        tracing::info!("Sentry error reporting enabled");
    }

    let database = Database::connect(config.database_url.as_ref())
        .await
        .expect("Failed to open storage");
    if matches!(database, Database::Memory(_)) {
        tracing::warn!("TIENDA_DATABASE_URL not set; users, products and purchases live in memory");
    }
    sentry::configure_scope(|scope| scope.set_tag("storage", database.backend_name()));

    let addr = config.socket_addr();
    let app = build_app(AppState::new(config, database))
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind storefront address");
    tracing::info!(%addr, "Tienda storefront listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Storefront server error");
}

/// Resolve on Ctrl+C, or on SIGTERM from the process supervisor.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }

    tracing::info!("Draining in-flight requests before exit");
}
