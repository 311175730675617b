use clap::Parser;
use clap::Subcommand;
use needful::api::serve_api;
use needful::config::AppConfig;
use needful::Result;

#[derive(Parser)]
#[command(name = "needful")]
#[command(about = "NeedFul local-services marketplace API server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides config)
        #[arg(long)]
        port: Option<u16>,
        /// Enable CORS for all origins
        #[arg(long)]
        cors: bool,
        /// Serve the built-in sample dataset instead of Postgres
        #[arg(long)]
        demo: bool,
    },
    /// Print the effective configuration as JSON
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            cors,
            demo,
        } => {
            // Demo mode works without any config file
            let config = if demo {
                AppConfig::load().unwrap_or_default()
            } else {
                AppConfig::load()?
            };
            needful::logging::init_logging_with_config(Some(&config))?;

            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let enable_cors = cors || config.server.enable_cors;

            serve_api(&config, host, port, enable_cors, demo).await
        }
        Commands::Config => {
            let config = AppConfig::load().unwrap_or_default();
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}
