//! apklens binary entry point.
//!
//! Parses the command line, sets up logging, loads settings, and dispatches
//! to the subcommand handlers.

use apklens::cli::{Cli, Commands, ScanCommand};
use apklens::config::AppSettings;
use apklens::error::CliResult;
use apklens::output;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => AppSettings::load_from(path),
        None => AppSettings::load(),
    };
    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing(cli.verbose, cli.quiet);
            output::print_error(&e.to_string());
            std::process::exit(1);
        }
    };

    // Settings can enable verbose diagnostics globally; flags still win.
    init_tracing(cli.verbose || settings.verbose, cli.quiet);

    if let Err(e) = run(cli, &settings).await {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise verbosity flags pick the level.
/// Diagnostics go to stderr so JSON and CSV output stay parseable.
fn init_tracing(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if quiet {
            "error"
        } else if verbose {
            "debug"
        } else {
            "warn"
        };
        EnvFilter::new(format!("apklens={}", level))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli, settings: &AppSettings) -> CliResult<()> {
    let verbose = cli.verbose || settings.verbose;

    match cli.command {
        Some(Commands::Scan(cmd)) => cmd.execute(settings, verbose, cli.quiet).await,
        Some(Commands::Inspect(cmd)) => cmd.execute(verbose, cli.quiet).await,
        Some(Commands::Profiles(cmd)) => cmd.execute(verbose, cli.quiet),
        Some(Commands::Export(cmd)) => cmd.execute(verbose, cli.quiet),
        Some(Commands::History(cmd)) => cmd.execute(verbose, cli.quiet),
        None => match cli.legacy_path {
            // Bare `apklens <path>` behaves like `apklens scan <path>`
            Some(path) => {
                let cmd = ScanCommand::parse_from(["scan", path.as_str()]);
                cmd.execute(settings, verbose, cli.quiet).await
            }
            None => {
                use clap::CommandFactory;
                Cli::command().print_help().ok();
                println!();
                Ok(())
            }
        },
    }
}
