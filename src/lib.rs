#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc)]

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use console::style;
use log::LevelFilter;

mod app;
mod cli;
pub mod error;
mod present;
pub mod providers;
mod request;
mod results;
mod steps;
mod user_config;

use crate::app::App;
use crate::cli::Cli;
use crate::error::Error;
use crate::providers::dns::SystemResolver;
use crate::providers::whois::WhoisClient;
use crate::request::LookupRequest;

fn init_logging(verbose: bool) {
  let mut builder = env_logger::Builder::from_env(
    env_logger::Env::default().default_filter_or("warn"),
  );
  if verbose {
    builder.filter_module(env!("CARGO_CRATE_NAME"), LevelFilter::Debug);
  }
  let _ = builder.try_init();
}

async fn run_cli(cli: &Cli) -> Result<(), Error> {
  let config_path = cli.config_path.as_deref();
  let mut cfg = user_config::load(config_path);
  if cli.save_defaults {
    cfg = LookupRequest::as_user_config(cli, &cfg);
    user_config::store(&cfg, config_path)?;
  }

  let request = LookupRequest::from_sources(cli, &cfg);
  if cli.config_show {
    let json =
      serde_json::to_string_pretty(&request).map_err(io::Error::other)?;
    writeln!(io::stdout(), "{json}")?;
    return Ok(());
  }

  // Held until the end of this scope, whichever way the run ends.
  let handle = steps::open_databases(&request)?;

  let app = App::new(
    request,
    SystemResolver::new(),
    WhoisClient,
    present::terminal_width(),
  );
  let mut stdout = io::stdout().lock();
  app.run(&handle, &mut stdout).await
}

/// Runs the command line tool and returns its exit status.
///
/// `0` on success, `1` when no geo database can be opened, `2` when the
/// geo lookup fails, `3` when the target cannot be resolved and `4` for
/// configuration or output failures.
pub async fn run() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  match run_cli(&cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("{}", style(&e).red().bold());
      ExitCode::from(e.exit_code())
    }
  }
}
