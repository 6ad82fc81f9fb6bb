//! # idm-api
//!
//! Serves the REST gateway over the bundled in-memory directory.
//!
//! ```bash
//! idm-api --port 8088 --seed-file directory.json
//! IDM_API_LOG_LEVEL=debug idm-api
//! ```

use clap::Parser;
use idm_api::resource::Resource;
use idm_api::{IdmServer, InMemoryDirectory, ServerConfig, http::create_router};
use log::{error, info};
use std::process;
use std::sync::Arc;

fn load_seed(path: &std::path::Path) -> Result<Vec<Resource>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        process::exit(1);
    }

    let directory = InMemoryDirectory::new()
        .with_cursor_lifetime(chrono::Duration::seconds(config.cursor_lifetime_secs));

    if let Some(path) = &config.seed_file {
        let loaded = match load_seed(path) {
            Ok(resources) => directory.seed(resources).await,
            Err(e) => {
                error!("Cannot read seed file {}: {}", path.display(), e);
                process::exit(1);
            }
        };
        match loaded {
            Ok(count) => info!("Loaded {} objects from {}", count, path.display()),
            Err(e) => {
                error!("Cannot seed directory: {}", e);
                process::exit(1);
            }
        }
    }

    let server = Arc::new(IdmServer::with_config(directory, config.server_config()));
    let app = create_router(server);

    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Cannot bind {}: {}", addr, e);
            process::exit(1);
        }
    };

    info!("idm-api listening on {} ({})", addr, config.base_url);
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        process::exit(1);
    }
}
