use std::process;

use handshake_broker::config::{BrokerConfig, BROKER_ADDRESS};
use handshake_broker::transport::remote::{bind, ctrl_c_shutdown, Broker};
use handshake_broker::utils::logging::init_logging;
use tracing::{error, info};

fn load_config() -> handshake_broker::Result<BrokerConfig> {
    let mut config = match std::env::var("BROKER_CONFIG") {
        Ok(path) => BrokerConfig::from_file(path)?,
        Err(_) => BrokerConfig::default(),
    };
    config.apply_env();
    config.validate_strict()?;
    Ok(config)
}

#[tokio::main]
async fn main() {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{e}");
    }

    info!(app = %config.logging.app_name, "Starting broker");

    let listener = match bind(BROKER_ADDRESS).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(address = BROKER_ADDRESS, error = %e, "Failed to bind");
            eprintln!("Failed to bind to {BROKER_ADDRESS}: {e}");
            process::exit(1);
        }
    };

    // open connections are not drained; returning from main ends them
    let broker = Broker::new(&config.server);
    if let Err(e) = broker.serve(listener, ctrl_c_shutdown()).await {
        error!(error = %e, "Broker stopped with error");
        process::exit(1);
    }
}
