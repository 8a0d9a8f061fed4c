use crate::app::router;
use crate::config::AppConfig;
use crate::loyalty::{GenerationOptions, run_generation};
use crate::state::AppState;
use crate::storage::load_purchases;
use clap::{Args, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(
    name = "retail_dashboard",
    about = "Serve retail purchase analytics and generate the loyalty ledger",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Rebuild the loyalty ledger file from the purchases export and exit
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured bind address
    #[arg(long)]
    host: Option<IpAddr>,
    /// Override the configured port
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug, Default)]
struct GenerateArgs {
    /// Purchases export to read
    #[arg(long)]
    input: Option<PathBuf>,
    /// Ledger file to write
    #[arg(long)]
    output: Option<PathBuf>,
    /// Seed for the redemption simulation
    #[arg(long)]
    seed: Option<u64>,
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?,
        )
        .init();

    match cli.command.unwrap_or_else(|| Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => {
            if let Some(host) = args.host {
                config.host = host;
            }
            if let Some(port) = args.port {
                config.port = port;
            }
            serve(config).await
        }
        Command::Generate(args) => {
            let options = GenerationOptions {
                input: args.input.unwrap_or(config.purchases_path),
                output: args.output.unwrap_or(config.loyalty_path),
                seed: args.seed.or(config.loyalty_seed),
            };
            let generated = run_generation(&options).await?;
            println!(
                "Loyalty data generated for {} clients ({} purchases, {} skipped): {}",
                generated.report.clients,
                generated.report.purchases,
                generated.report.skipped,
                generated.report.output.display()
            );
            Ok(())
        }
    }
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let ingested = load_purchases(&config.purchases_path).await;
    let state = AppState::new(
        config.purchases_path.clone(),
        config.loyalty_path.clone(),
        config.loyalty_seed,
        ingested.purchases,
    );
    let app = router(state);

    let addr = config.socket_addr();
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
