//! mcstats relay
//!
//! Accepts one metric event per `POST /` and forwards it to a statsd
//! collector as a single UDP datagram.
//! - Config: optional YAML (`MCSTATS_CONFIG`) + `STATSD_HOST`/`STATSD_PORT`/`RACK_ENV`
//! - Logging: `RUST_LOG` filter, `info` by default
//! - Graceful shutdown on Ctrl+C / SIGTERM

use tracing_subscriber::{fmt, EnvFilter};

use mcstats_gateway::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = config::load_from_env().expect("config load failed");
    let listen = cfg.listen_addr().expect("listen address already validated");

    tracing::info!(
        %listen,
        env = %cfg.env,
        statsd_host = %cfg.statsd.host,
        statsd_port = cfg.statsd.port,
        "mcstats relay starting"
    );

    let state = app_state::AppState::new(cfg);
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");

    tracing::info!("mcstats relay stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
