//! Staticgen CLI
//!
//! Usage:
//!   staticgen [OPTIONS]
//!
//! Options:
//!   -c, --config <FILE>       Config file (default: .staticgen.yml if present)
//!       --components <DIR>    Component definitions directory
//!       --pages <DIR>         Page sources directory
//!   -o, --output <DIR>        Output directory
//!   -v, --verbose             Increase log verbosity (repeatable)

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use staticgen::component::DefinitionLoadError;
use staticgen::page::PageError;
use staticgen::site::PageBuildError;
use staticgen::{BuildError, Site, SiteConfig};

#[derive(Parser)]
#[command(name = "staticgen", version)]
#[command(about = "Component-based static HTML generator")]
struct Cli {
    /// Config file (YAML or TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding component definitions
    #[arg(long)]
    components: Option<PathBuf>,

    /// Directory holding page sources
    #[arg(long)]
    pages: Option<PathBuf>,

    /// Output directory for generated pages
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match SiteConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(dir) = cli.components {
        config.components = dir;
    }
    if let Some(dir) = cli.pages {
        config.pages = dir;
    }
    if let Some(dir) = cli.output {
        config.output = dir;
    }

    let report = match Site::new(config).build() {
        Ok(report) => report,
        Err(BuildError::Components(DefinitionLoadError::Markup { path, text, errors })) => {
            let filename = path.display().to_string();
            for error in &errors {
                eprint!("{}", error.format(&text, &filename));
            }
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for failure in &report.failures {
        match &failure.error {
            PageBuildError::Load(PageError::Markup { path, text, errors }) => {
                let filename = path.display().to_string();
                for error in errors {
                    eprint!("{}", error.format(text, &filename));
                }
            }
            other => eprintln!("Error in {}: {}", failure.source.display(), other),
        }
    }

    println!(
        "Generated {} page(s), {} failed",
        report.written.len(),
        report.failures.len()
    );
    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Install the log subscriber; `RUST_LOG` directives are honoured on top of `-v`
fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
