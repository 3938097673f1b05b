use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use jailhttp::config::{Config, parse_port};
use jailhttp::server::{Server, ShutdownHandle};

/// Serves .html/.htm files from a root directory over HTTP/1.0.
#[derive(Debug, Parser)]
#[command(name = "jailhttp", version)]
struct Cli {
    /// Port to listen on, on every interface
    #[arg(value_parser = parse_port)]
    port: Option<u16>,

    /// Directory to serve files from
    #[arg(long)]
    root: Option<PathBuf>,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Close connections idle for this many milliseconds (0 = never)
    #[arg(long)]
    idle_timeout_ms: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load(),
    };
    if let Some(port) = cli.port {
        cfg = cfg.with_port(port);
    }
    if let Some(root) = cli.root {
        cfg.static_files.root = root;
    }
    if let Some(ms) = cli.idle_timeout_ms {
        cfg.server.idle_timeout_ms = ms;
    }

    let server = Server::bind(&cfg)?;
    watch_ctrl_c(server.shutdown_handle())?;

    server.run()
}

/// Triggers `shutdown` on Ctrl-C from a side thread; the event loop itself
/// stays on the main thread.
fn watch_ctrl_c(shutdown: ShutdownHandle) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    std::thread::Builder::new()
        .name("signal".to_string())
        .spawn(move || match runtime.block_on(tokio::signal::ctrl_c()) {
            Ok(()) => {
                tracing::info!("Shutdown signal received");
                shutdown.trigger();
            }
            Err(e) => tracing::error!(error = %e, "cannot listen for Ctrl-C"),
        })?;

    Ok(())
}
