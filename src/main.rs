//! Matrix client CLI
//!
//! Thin command-line front end over the library: loads a client config,
//! runs one call against the home server and prints the result as JSON.
//!
//! ```text
//! matrix-http-client --config client.toml discover
//! matrix-http-client --config client.toml versions
//! matrix-http-client --config client.toml login --user alice --password hunter2
//! matrix-http-client --config client.toml whoami
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use matrix_http_client::config::load_config;
use matrix_http_client::observability::logging::init_logging;
use matrix_http_client::{MatrixClient, PasswordCredentials};

#[derive(Parser)]
#[command(name = "matrix-http-client")]
#[command(about = "Talk to a Matrix home server from the command line", long_about = None)]
struct Cli {
    /// Client configuration file (TOML)
    #[arg(short, long, default_value = "client.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the home server and identity server for the configured domain
    Discover,
    /// List protocol versions supported by the home server
    Versions,
    /// Log in with a password and print the new session
    Login {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        password: String,
    },
    /// Show which user the configured access token belongs to
    Whoami,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    init_logging(&config.observability);
    tracing::debug!(path = %cli.config.display(), "Configuration loaded");

    let mut client = MatrixClient::from_config(&config)?;

    let output = match cli.command {
        Commands::Discover => {
            let settings = client.discover()?;
            let ctx = client.context();
            json!({
                "well_known": settings.is_some(),
                "homeserver_url": ctx.homeserver_url().map(|u| u.as_str()),
                "identity_server_url": ctx.identity_server_url().map(|u| u.as_str()),
            })
        }
        Commands::Versions => json!({ "versions": client.versions()? }),
        Commands::Login { user, password } => {
            if config.server.homeserver_url.is_none() {
                client.discover()?;
            }
            client.login(&PasswordCredentials::new(user, password))?;
            let ctx = client.context();
            json!({
                "user_id": ctx.user().map(|u| u.as_str()),
                "device_id": ctx.device_id(),
                "access_token": ctx.access_token(),
            })
        }
        Commands::Whoami => json!({ "user_id": client.whoami()?.as_str() }),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
