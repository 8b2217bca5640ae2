mod app;
mod config;
mod handlers;

use std::sync::Arc;

use anyhow::{Context, Result};
use bff_api::middleware::OriginGuard;
use bff_auth::{AuthConfig, AuthFlow, AuthState, InMemorySessionStore, OidcProviderConfig};
use bff_core::auth::SessionRepository;
use clap::Parser;
use listenfd::ListenFd;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    app::create_app,
    config::{Cli, LogFormat, DEFAULT_LOG_FILTER},
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_format);

    let provider_config = cli.provider_config();
    let auth_config = AuthConfig::new(&provider_config, &cli.frontend_base_url, cli.use_https)?;
    let origin = OriginGuard::new(&cli.frontend_base_url)?;

    let flow = init_auth_flow(&provider_config).await?;
    let sessions = init_session_store(&cli).await?;
    let state = AuthState::new(flow, sessions, auth_config);

    // Build the application router
    let app = create_app(state, origin);

    // Auto-reload support via listenfd
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        // If we are given a tcp listener on listen fd 0, use that one
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        // Otherwise fall back to CLI-specified host:port
        None => {
            let addr = format!("{}:{}", cli.host, cli.port);
            TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?
        }
    };

    tracing::info!(
        addr = %listener.local_addr()?,
        frontend = %cli.frontend_base_url,
        "listening"
    );

    // Run the server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}

/// Discover the Keycloak realm and build the login flow on top of it.
#[cfg(not(feature = "mock"))]
async fn init_auth_flow(config: &OidcProviderConfig) -> Result<AuthFlow> {
    let provider = bff_auth::KeycloakProvider::discover(config)
        .await
        .context("failed to initialise the identity provider")?;
    Ok(AuthFlow::from_provider(Arc::new(provider)))
}

/// Build the login flow on the in-memory mock provider.
#[cfg(feature = "mock")]
async fn init_auth_flow(config: &OidcProviderConfig) -> Result<AuthFlow> {
    tracing::warn!("using the mock identity provider; every authorization code is accepted");
    let provider = bff_auth::MockProvider::new(config)?;
    Ok(AuthFlow::from_provider(Arc::new(provider)))
}

/// Pick the session store: Redis when a URL is configured, memory otherwise.
async fn init_session_store(cli: &Cli) -> Result<Arc<dyn SessionRepository>> {
    let Some(url) = cli.session_store_url.as_deref() else {
        tracing::info!("storing sessions in memory");
        return Ok(Arc::new(InMemorySessionStore::new()));
    };

    #[cfg(feature = "redis")]
    {
        let store = bff_auth::RedisSessionStore::connect(url, cli.session_store_namespace.clone())
            .await
            .context("failed to connect to the session store")?;
        tracing::info!(namespace = %cli.session_store_namespace, "storing sessions in Redis");
        Ok(Arc::new(store))
    }

    #[cfg(not(feature = "redis"))]
    {
        anyhow::bail!("SESSION_STORE_URL is set to {url:?} but this build lacks the `redis` feature")
    }
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
