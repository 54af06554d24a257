mod builtin;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use plinth_core::{Application, BootstrapConfig, Result};
use tracing::{debug, error};

/// Plinth: dependency injection and plugin lifecycle host
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Bootstrap config file (.json, .toml, .yaml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory to search for plugin manifests; replaces the configured list
    #[arg(long = "plugin-dir", value_name = "DIR")]
    plugin_dirs: Vec<PathBuf>,

    /// Drop a plugin after loading
    #[arg(long, value_name = "NAME")]
    disable: Vec<String>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List loaded plugins with their dependency ranges
    List,
    /// Print the initialization order without starting anything
    Order,
    /// Load, order and initialize every plugin (default)
    Run,
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("plinth=debug,plinth_core=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    });

    let subscriber = tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true),
    );

    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        // plinth-core logs through the `log` facade
        let _ = tracing_log::LogTracer::init();
    }
}

async fn bootstrap_config(args: &CliArgs) -> Result<BootstrapConfig> {
    let mut config = match &args.config {
        Some(path) => BootstrapConfig::load(path).await?,
        None => BootstrapConfig::default(),
    };
    if !args.plugin_dirs.is_empty() {
        config.plugin_dirs = args.plugin_dirs.clone();
    }
    config.disabled.extend(args.disable.iter().cloned());
    debug!(?config, "Bootstrap configuration");
    Ok(config)
}

async fn execute(args: CliArgs) -> Result<()> {
    let config = bootstrap_config(&args).await?;
    let mut app = Application::new(config);
    app.add_source(builtin::source());

    match args.command.unwrap_or(Commands::Run) {
        Commands::List => {
            app.load().await?;
            if app.registry().is_empty() {
                println!("No plugins registered.");
            }
            for plugin in app.registry().iter() {
                println!("{}@{}", plugin.name(), plugin.version());
                for (dependency, range) in plugin.requirements() {
                    println!("  requires {} {}", dependency, range);
                }
            }
        }
        Commands::Order => {
            app.load().await?;
            let registry = app.registry_mut();
            registry.resolve()?;
            registry.prioritize()?;
            for name in registry.prioritized().names() {
                println!("{}", name);
            }
        }
        Commands::Run => {
            app.run().await?;
            for name in app.registry().prioritized().names() {
                println!("started {}", name);
            }
            if let Ok(banner) = app.injector().get_as::<String>(builtin::BANNER_KEY) {
                println!("{}", banner);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    setup_tracing(args.verbose);

    match execute(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
