use clap::Parser;
use pkgmeta::cli::{run_cli, Cli};
use pkgmeta::logging::{init_logging, LogConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_env())?;

    if let Err(e) = run_cli(cli) {
        tracing::error!(error = ?e, "Startup failed");
        return Err(e);
    }
    Ok(())
}
