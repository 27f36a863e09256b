//! cloud-rest service binary.
//!
//! ```text
//! cloud-rest [--config PATH] serve
//! cloud-rest [--config PATH] routes
//! cloud-rest [--config PATH] resolve METHOD PATH
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use cloud_rest::config::watcher::ConfigWatcher;
use cloud_rest::lifecycle::{signals, startup};
use cloud_rest::observability::{logging, metrics};
use cloud_rest::routing::RouteMap;
use cloud_rest::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "cloud-rest")]
#[command(about = "REST front-end for multi-provider cloud management", long_about = None)]
struct Cli {
    /// Service configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the API (default)
    Serve,
    /// Print the expanded route map in declaration order
    Routes,
    /// Resolve one request against the route map
    Resolve {
        /// HTTP method, e.g. GET
        method: String,
        /// Request path, e.g. /v1/compute/providers
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(cli.config).await,
        Commands::Routes => {
            logging::init_logging("warn");
            let prepared = startup::prepare(cli.config.as_deref())?;
            print_routes(&prepared.routes);
            Ok(())
        }
        Commands::Resolve { method, path } => {
            logging::init_logging("warn");
            let prepared = startup::prepare(cli.config.as_deref())?;
            let resolution = prepared.routes.resolve(&method, &path);
            println!("{}", serde_json::to_string_pretty(&resolution)?);
            Ok(())
        }
    }
}

async fn serve(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    // Logging first: building the route map logs at info.
    let config = startup::load(config_path.as_deref())?;
    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        api_version = %config.api.version,
        request_timeout_secs = config.timeouts.request_secs,
        "cloud-rest starting"
    );

    let prepared = startup::prepare_with(config)?;
    let config = prepared.config;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let (_watch_task, config_updates) = match (&config_path, config.reload.enabled) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path, &config);
            (Some(watcher.run()?), updates)
        }
        _ => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::shutdown_on_signal(&signal_shutdown).await;
    });

    let server = HttpServer::new(&config, prepared.routes, prepared.handlers);
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn print_routes(routes: &RouteMap) {
    for rule in routes.rules() {
        let methods: Vec<&str> = rule.methods().iter().map(String::as_str).collect();
        let defaults: Vec<String> = rule
            .rule()
            .defaults
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        println!(
            "{:<18} {:<80} {}.{} {}",
            methods.join(","),
            rule.pattern().as_str(),
            rule.handler(),
            rule.endpoint(),
            defaults.join(" ")
        );
    }
}
