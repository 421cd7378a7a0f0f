use addon_updater::{Config, UpdateOutcome, Updater};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Download and install the latest addon release when the installed one is out of date.
#[derive(Debug, Parser)]
#[command(name = "addon-updater", version, about)]
struct Cli {
    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long, env = "ADDON_UPDATER_CONFIG")]
    config: Option<PathBuf>,

    /// Override the game Interface directory
    #[arg(long)]
    install_dir: Option<PathBuf>,

    /// Download and extract even if the installed version matches
    #[arg(short, long)]
    force: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn load_config(&self) -> addon_updater::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(dir) = &self.install_dir {
            config.install_dir = dir.clone();
        }
        if self.force {
            config.check_version = false;
        }
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: addon_updater::Result<UpdateOutcome> = async {
        let config = cli.load_config()?;
        let updater = Updater::new(config)?;
        updater.run().await
    }
    .await;

    match result {
        Ok(UpdateOutcome::Updated {
            archive,
            version,
            files,
            cleanup_warning,
        }) => {
            println!("Updated to {} from {} ({} entries)", version, archive, files.len());
            if let Some(warning) = cleanup_warning {
                eprintln!("warning: {}", warning);
            }
            ExitCode::SUCCESS
        }
        Ok(UpdateOutcome::AlreadyCurrent { version }) => {
            println!("Already up to date ({})", version);
            ExitCode::SUCCESS
        }
        Ok(UpdateOutcome::NotFound) => {
            println!("Archive pattern was not found on the download page, exiting.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error [{}]: {}", e.code(), e);
            ExitCode::FAILURE
        }
    }
}
