mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::Context;
use log::{error, info};
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .parse_default_env()
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let ctx = Context::from_cli(cli);
    info!(
        "{}: backend={} dest={}",
        ctx.command.name(),
        ctx.resource.backend_name(),
        ctx.dest_dir.display()
    );

    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    commands::execute(&ctx, stdin, &mut stdout)
}

/// Log the error chain and, for library errors, a hint.
fn report(err: &anyhow::Error) {
    error!("{err:#}");
    if let Some(cause) = err.chain().find_map(|e| e.downcast_ref::<flykit::Error>()) {
        let category = cause.category();
        error!("{category}: {}", category.advice());
    }
}
