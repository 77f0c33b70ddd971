use sensorgate_server::{SensorgateServer, build_state, load_config, observability};

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else); optional for
    // local development.
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    let config_path =
        std::env::var("SENSORGATE_CONFIG").unwrap_or_else(|_| "sensorgate.toml".to_string());

    let config = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {e}");
        std::process::exit(2);
    }

    observability::init_tracing_with_level(&config.logging.level);
    tracing::info!(path = %config_path, "Configuration loaded");

    let state = match build_state(&config).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Bootstrap error: {e:#}");
            std::process::exit(2);
        }
    };

    let server = SensorgateServer::new(config.addr(), state);
    if let Err(e) = server.run().await {
        eprintln!("Server error: {e:#}");
        std::process::exit(1);
    }
}
