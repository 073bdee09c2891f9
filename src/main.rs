#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::process::ExitCode;

use geolookup::run;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
  run().await
}
