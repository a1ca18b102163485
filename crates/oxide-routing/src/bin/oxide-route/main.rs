//! oxide-route CLI
//!
//! Builds the demonstration route table and dispatches requests from the
//! command line.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_routing::{Dispatcher, Request, RouteRegistry, RouterConfig};

mod web;

/// URI-pattern router demo.
#[derive(Parser)]
#[command(name = "oxide-route")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Router configuration file (JSON).
    #[arg(short, long, env = "OXIDE_ROUTE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch one request and print the response.
    Dispatch {
        /// HTTP method.
        method: String,

        /// Request path.
        path: String,

        /// Form field as key=value; may be repeated.
        #[arg(short, long = "form", value_parser = parse_form_field)]
        form: Vec<(String, String)>,
    },

    /// Print the compiled route table.
    Routes,
}

fn parse_form_field(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &cli.config {
        Some(path) => {
            info!("Loading router configuration from {}", path.display());
            RouterConfig::from_path(path)?
        }
        None => web::default_config(),
    };

    let controllers = web::controllers(&config.controllers_namespace);
    let mut routes = RouteRegistry::new(config);
    web::declare(&mut routes)?;
    let dispatcher = Dispatcher::new(routes, controllers)?;

    match cli.command {
        Commands::Dispatch { method, path, form } => {
            let mut request = Request::new(method, path);
            request.form.extend(form);

            let response = dispatcher.dispatch(&request);
            println!("{} {}", response.status, response.status_text());
            if let Some(body) = response.body_str() {
                println!("\n{body}");
            }
        }

        Commands::Routes => {
            for method in &dispatcher.config().methods {
                for route in dispatcher.routes_for(*method) {
                    println!(
                        "{:<7} {:<45} {}",
                        method.as_str(),
                        route.template(),
                        route.pattern().as_regex_str()
                    );
                }
            }
        }
    }

    Ok(())
}
