use std::process::ExitCode;

use anyhow::bail;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jailhttp::client;

/// Fetches an http:// URL, following redirects, and prints the HTML body.
#[derive(Debug, Parser)]
#[command(name = "fetch", version)]
struct Cli {
    url: String,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let response = client::fetch(&cli.url)?;
    let body = String::from_utf8_lossy(&response.body);

    if response.status.as_u16() >= 400 {
        println!("{body}");
        return Ok(ExitCode::FAILURE);
    }

    match response.header("Content-Type") {
        Some(content_type) if content_type.contains("text/html") => {
            println!("{body}");
            Ok(ExitCode::SUCCESS)
        }
        _ => bail!("content type not understood: Content-Type is not text/html"),
    }
}
