use anyhow::Result;
use clap::Parser;
use pycomply::cli::{Cli, Commands};
use pycomply::commands::{check_project, init_config, CheckConfig};
use pycomply::report::ExitSignal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit code for configuration and I/O failures
const EXIT_ERROR: i32 = 2;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    let code = match run(cli) {
        Ok(signal) => signal.code(),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<ExitSignal> {
    match cli.command {
        Commands::Check {
            paths,
            config,
            coverage_file,
            format,
            output,
            jobs,
            max_complexity,
            min_coverage,
            exclude,
            disable,
        } => check_project(CheckConfig {
            paths,
            config,
            coverage_file,
            format,
            output,
            jobs,
            max_complexity,
            min_coverage,
            exclude,
            disable,
            verbosity: cli.verbosity,
        }),
        Commands::Init { force } => {
            let path = init_config(&std::env::current_dir()?, force)?;
            println!("Created {} configuration file", path.display());
            Ok(ExitSignal::Success)
        }
    }
}

/// `RUST_LOG` wins; otherwise `-v` flags raise the default level.
fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pycomply={}", default_level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
