//! fxgate entry point
//!
//! Initializes logging, loads configuration from the environment, and
//! serves. Everything else lives in the library.

use fxgate::config::AppConfig;
use fxgate::server::HttpServer;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    let server = HttpServer::new(config);

    if let Err(e) = server.start().await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
