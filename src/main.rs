use std::sync::Arc;

use clap::Parser;
use lbryio::cli::Cli;
use lbryio::config::{load_config, print_schema};
use lbryio::host::MemoryHost;
use lbryio::utils::logger::init_logging;
use lbryio::Lbryio;
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.schema {
        if let Err(e) = print_schema() {
            eprintln!("Error printing schema: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    // No host process here: keep the token in memory for this run.
    let host = Arc::new(MemoryHost::new(cli.token));
    let client = Lbryio::new(&config, host.clone());

    let user = match client.authenticate().await {
        Ok(user) => user,
        Err(e) => {
            error!(error = %e, "authentication failed");
            std::process::exit(1);
        }
    };
    let rates = client.get_exchange_rates().await;

    let mut report = serde_json::json!({
        "user": user,
        "auth_token": host.stored_token(),
        "stripe_key": client.stripe_publishable_key(),
    });
    match rates {
        Ok(rates) => report["exchange_rates"] = serde_json::json!(rates),
        Err(e) => report["exchange_rates_error"] = serde_json::json!(e.to_string()),
    }
    match serde_json::to_string_pretty(&report) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            error!(error = %e, "could not render report");
            std::process::exit(1);
        }
    }
}
