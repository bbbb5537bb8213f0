use anyhow::{Context, Result};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod error;
mod invoke;
mod orchestrate;
mod tools;
mod util;

use error::AddFileError;
use tools::ToolResolver;

/// Environment variable holding the tracing filter; `RUST_LOG` is the fallback.
const LOG_ENV: &str = "SHFS_ADD_FILE_LOG";

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_error(&err),
    }
}

fn run() -> Result<()> {
    let args = cli::parse_args(std::env::args_os())?;
    let config = tools::load_tools_config().context("load tool configuration")?;
    let mut resolver = ToolResolver::from_env(&config);
    let summary = orchestrate::run(&args, &config, &mut resolver)?;
    tracing::debug!(
        volume_exit_code = summary.volume.exit_code,
        domains = summary.domains.len(),
        failed_domains = summary.failed_domains(),
        tools_resolved = resolver.resolved_count(),
        "run complete"
    );
    Ok(())
}

fn report_error(err: &anyhow::Error) -> ExitCode {
    let Some(add_file_err) = err.downcast_ref::<AddFileError>() else {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    };
    match add_file_err {
        // clap renders its own usage hints; help/version go to stdout.
        AddFileError::Cli(clap_err) => {
            let _ = clap_err.print();
        }
        AddFileError::Usage => eprint!("{}", cli::usage_text()),
        _ => eprintln!("{err:#}"),
    }
    ExitCode::from(add_file_err.exit_code())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
