//! Quill server binary.
//!
//! `quill-server [CONFIG_PATH] [init-db]`
//!
//! Without a subcommand, starts the axum HTTP server with structured
//! logging and graceful shutdown on SIGTERM/SIGINT. The `init-db`
//! subcommand destructively recreates the database schema and exits; it is
//! meant for first-time setup and test fixtures, and is the only way tables
//! get created — the server never touches the schema while serving.

use quill_server::{app, config, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

struct CliArgs {
    config_path: Option<String>,
    config_source: &'static str,
    init_db: bool,
}

fn parse_args() -> CliArgs {
    let mut init_db = false;
    let mut config_path = None;
    let mut config_source = "default";

    for arg in std::env::args().skip(1) {
        if arg == "init-db" {
            init_db = true;
        } else if !arg.trim().is_empty() && config_path.is_none() {
            config_path = Some(arg);
            config_source = "cli-arg";
        }
    }

    if config_path.is_none() {
        if let Ok(path) = std::env::var("QUILL_CONFIG_PATH") {
            if !path.trim().is_empty() {
                config_path = Some(path);
                config_source = "env-var";
            }
        }
    }

    CliArgs {
        config_path,
        config_source,
        init_db,
    }
}

#[tokio::main]
async fn main() {
    let args = parse_args();
    let selected_config_path = args.config_path.as_deref().or(Some("config.toml"));

    // Load configuration
    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration — the server cannot start without valid config");

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = args.config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    // Initialize database pool
    let pool = quill_db::create_pool(
        &config.database.path,
        quill_db::PoolSettings {
            busy_timeout_ms: config.database.busy_timeout_ms,
            max_size: config.database.pool_max_size,
        },
    )
    .expect("failed to create database pool — check database.path in config");

    if args.init_db {
        let conn = pool
            .get()
            .expect("failed to get database connection for schema initialization");
        quill_db::init_schema(&conn).expect("failed to initialize database schema");
        println!("Initialized the database.");
        return;
    }

    if config.session.secret_key == config::DEV_SECRET_KEY {
        tracing::warn!(
            "session.secret_key is the development default — set QUILL_SECRET_KEY in production"
        );
    }

    // Build application
    let app = app(AppState::new(pool, &config.session.secret_key));
    let addr = SocketAddr::new(config.server.host, config.server.port);

    tracing::info!(%addr, "starting quill server");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address — is another process using this port?");

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("quill server shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
