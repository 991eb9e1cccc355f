use tracing::info;

use devlink::web::ApiServer;
use devlink::{Config, Database};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = devlink::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        devlink::logging::init_console_only(&config.logging.level);
    }

    info!("devlink API server starting");

    let db = match Database::connect(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    let server = match ApiServer::new(&config, db) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to configure server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
