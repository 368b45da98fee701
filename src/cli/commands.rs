use crate::app::App;
use crate::config::AppConfig;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface for the package metadata service
#[derive(Parser, Debug)]
#[command(name = "pkgmeta")]
#[command(about = "Package registry metadata API", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides shared by every subcommand that builds the service.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct ServiceArgs {
    /// YAML configuration file
    #[arg(short, long, env = "PKGMETA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen port (overrides config and PKGMETA_PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Listen host (overrides config and PKGMETA_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// SQLite database path, or `:memory:` (overrides config and PKGMETA_DATABASE)
    #[arg(short, long)]
    pub database: Option<String>,
}

impl ServiceArgs {
    /// Resolve the effective configuration: defaults, file, environment, then flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be loaded.
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(host) = &self.host {
            config.host.clone_from(host);
        }
        if let Some(database) = &self.database {
            config.database.clone_from(database);
        }
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the metadata API until the process is terminated
    Serve {
        #[command(flatten)]
        args: ServiceArgs,
    },
    /// Print the bound route table and exit
    Routes {
        #[command(flatten)]
        args: ServiceArgs,
    },
}

/// Execute a parsed command line.
///
/// # Errors
///
/// Returns any startup failure: configuration, store connection, route binding or
/// listener bind.
pub fn run_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve { args } => {
            let config = args.resolve()?;
            App::bootstrap(config)?.run()
        }
        Commands::Routes { args } => {
            let mut config = args.resolve()?;
            // Listing routes never needs the real database.
            config.database = ":memory:".to_string();
            let app = App::bootstrap(config)?;
            print!("{}", app.route_table());
            Ok(())
        }
    }
}
