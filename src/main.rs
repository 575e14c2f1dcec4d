//! tunconf CLI
//!
//! Entry point for the `tunconf` command-line tool.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tunconf::{ConfigError, Loader, Provider, VpnType};
use tunconf_sources::{EnvSource, FilesSource};

#[derive(Parser)]
#[command(name = "tunconf")]
#[command(about = "Resolve, check and display VPN tunnel settings", version)]
struct Cli {
    /// Log every resolution step at debug level
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved settings, valid or not
    Show {
        /// Output a JSON report with provenance instead of the tree
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        sources: SourceArgs,
    },

    /// Validate the resolved settings
    Check {
        #[command(flatten)]
        sources: SourceArgs,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Directory holding wireguard/wg0.conf and the OpenVPN PEM files
    /// (default: /gluetun)
    #[arg(long, env = "TUNCONF_FILES_DIR")]
    files_dir: Option<PathBuf>,

    /// VPN service provider, overriding files and environment
    #[arg(long)]
    provider: Option<Provider>,

    /// VPN protocol (openvpn, wireguard), overriding files and environment
    #[arg(long)]
    vpn_type: Option<VpnType>,
}

impl SourceArgs {
    fn loader(self) -> Loader {
        let files = match self.files_dir {
            Some(dir) => FilesSource::in_dir(&dir),
            None => FilesSource::new(),
        };

        let mut loader = Loader::new(files, EnvSource::from_process());
        if let Some(provider) = self.provider {
            loader = loader.with_provider(provider);
        }
        if let Some(vpn_type) = self.vpn_type {
            loader = loader.with_vpn_type(vpn_type);
        }
        loader
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Show { json, sources } => run_show(sources.loader(), json),
        Commands::Check { sources } => run_check(sources.loader()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if let ConfigError::Settings(ref err) = e {
            eprintln!("Kind: {}", err.kind());
        }
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let result = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };

    if let Err(e) = result {
        eprintln!("Error setting up logging: {}", e);
    }
}

fn run_show(loader: Loader, json: bool) -> Result<(), ConfigError> {
    if json {
        let report = loader.effective()?;
        println!("{}", report.to_json()?);
        return Ok(());
    }

    let resolution = loader.resolve()?;
    println!("{}", resolution.settings());
    if let Err(e) = resolution.settings().validate() {
        eprintln!();
        eprintln!("Settings are not valid: {} ({})", e, e.kind());
    }
    Ok(())
}

fn run_check(loader: Loader) -> Result<(), ConfigError> {
    let resolved = loader.load()?;
    println!(
        "Settings valid: {} over {}",
        resolved.vpn.vpn_type(),
        resolved.vpn.provider()
    );
    Ok(())
}
