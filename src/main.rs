mod bundle;
mod dom;
mod error;
mod load;
mod markdown;
mod scripts;
mod serialize;

use std::{io, path::PathBuf, process::ExitCode};

use clap::Parser;

use bundle::BundleOptions;
use error::BundleError;
use scripts::HttpFetcher;

/// Create a single html file to use without local server.
#[derive(Parser)]
#[command(
    name = "single-html",
    version,
    about = "Create a single html file to use without local server",
    after_help = "The bundle is written to single_html.html next to FILE, replacing any previous one.\nSet RUST_LOG=debug for per-element diagnostics."
)]
struct Cli {
    /// Path to the entry HTML file
    file: PathBuf,
    /// Leave remote <script src> elements as they are instead of fetching them
    #[arg(long)]
    no_remote: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    let options = BundleOptions {
        inline_remote_scripts: !cli.no_remote,
    };

    let fetcher = match HttpFetcher::new() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match bundle::bundle(&cli.file, options, &fetcher) {
        Ok(output) => {
            println!("{}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

/// Print a fatal error in the same shape for every failure path.
fn report(err: &BundleError) {
    match err {
        BundleError::Read { path, source } => match source.kind() {
            io::ErrorKind::NotFound => {
                eprintln!("Error: file not found: {}", path.display());
            }
            io::ErrorKind::PermissionDenied => {
                eprintln!("Error: permission denied: {}", path.display());
            }
            io::ErrorKind::InvalidData => {
                eprintln!("Error: '{}' is not valid UTF-8", path.display());
            }
            _ => eprintln!("Error: {err}"),
        },
        _ => eprintln!("Error: {err}"),
    }
}
