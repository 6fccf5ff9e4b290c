use anyhow::{Context, Result};
use clap::Parser;
use jswatch::compiler::{BackendKind, BackendResolver};
use jswatch::config::Config;
use jswatch::logging::{self, Console};
use jswatch::monitor::ChangeMonitor;
use jswatch::report::ConsoleReporter;
use jswatch::watcher::CompileWatcher;
use jswatch::WatchError;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "jswatch")]
#[command(about = "Watch a directory and minify changed JavaScript files", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory to watch
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Configuration file (default: <PATH>/.jswatch.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only use this compiler backend
    #[arg(long, value_enum)]
    backend: Option<BackendKind>,

    /// Closure Compiler jar for the local backend
    #[arg(long)]
    jar: Option<PathBuf>,

    /// Compiler service URL for the remote backend
    #[arg(long)]
    service_url: Option<String>,

    /// Show debug output
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn main() {
    let cli = Cli::parse();
    let console = Arc::new(Console::new(cli.verbose));

    let code = match run(&cli, &console) {
        Ok(()) => 0,
        Err(e) => match e.downcast_ref::<WatchError>() {
            Some(WatchError::MissingDependency(reason)) => {
                console.critical(&format!("Missing dependency: {reason}"));
                1
            }
            _ => {
                console.critical(&format!("Uncaught error: {e:#}"));
                2
            }
        },
    };

    std::process::exit(code);
}

fn run(cli: &Cli, console: &Arc<Console>) -> Result<()> {
    let color = !cli.no_color && std::io::stdout().is_terminal();
    logging::init(cli.verbose, color)?;

    let mut monitor = ChangeMonitor::new(&cli.path)?;

    let mut config = Config::load(&cli.path, cli.config.as_deref())?;
    if let Some(kind) = cli.backend {
        config.only_backend(kind);
    }
    if let Some(jar) = &cli.jar {
        config.local.jar = jar.clone();
    }
    if let Some(url) = &cli.service_url {
        config.remote.url = url.clone();
    }

    let backend = BackendResolver::new(&config).resolve()?;
    console.debug(&format!("Using {} compiler", backend.kind()));

    let reporter = Arc::new(ConsoleReporter::new(Arc::clone(console)));
    monitor.add_watcher(CompileWatcher::new(backend, reporter));

    // SIGINT/SIGTERM: the watch process would outlive us otherwise. terminate()
    // returns only once it has been reaped, killing it if SIGTERM is ignored.
    let handle = monitor.source().shutdown_handle();
    ctrlc::set_handler(move || {
        handle.terminate();
        std::process::exit(0);
    })
    .context("Failed to set signal handler")?;

    console.info(&format!("Watching {} for changes", monitor.root().display()));
    monitor.run()?;
    Ok(())
}
