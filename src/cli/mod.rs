pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "jobboard-api")]
#[command(about = "Job board and professional networking API server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides PORT)")]
        port: Option<u16>,

        #[arg(long, help = "Use in-process storage instead of PostgreSQL")]
        memory: bool,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Create an administrator account")]
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "Site")]
        first_name: String,
        #[arg(long, default_value = "Admin")]
        last_name: String,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    tracing::info!("Starting jobboard-api in {:?} mode", config.environment);

    match cli.command.unwrap_or(Commands::Serve { port: None, memory: false }) {
        Commands::Serve { port, memory } => commands::serve::handle(config, port, memory).await,
        Commands::Migrate => commands::migrate::handle(config).await,
        Commands::CreateAdmin {
            email,
            password,
            first_name,
            last_name,
        } => commands::admin::handle(config, email, password, first_name, last_name).await,
    }
}
