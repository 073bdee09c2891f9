use std::net::IpAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Exit status for a run where no geo database could be opened.
pub const EXIT_NO_DATABASE: u8 = 1;
/// Exit status for a failed geo query on a resolved address.
pub const EXIT_LOOKUP_FAILED: u8 = 2;
/// Exit status for a target that is neither resolvable nor a literal address.
pub const EXIT_UNRESOLVED: u8 = 3;
/// Exit status for configuration storage and output failures.
pub const EXIT_OTHER: u8 = 4;

/// Fatal conditions of a lookup run.
///
/// Optional steps (ASN, reverse DNS, WHOIS) never produce one of these; they
/// degrade the output where they fail instead.
#[derive(Debug, Error)]
pub enum Error {
  #[error("ERROR: GeoIP2 database not found!")]
  DatabaseNotFound { tried: Vec<PathBuf> },

  #[error("ERROR: could not resolve target `{0}`")]
  Unresolved(String),

  #[error("ERROR: lookup failed for {ip}: {reason}")]
  Lookup { ip: IpAddr, reason: String },

  #[error("ERROR: config: {0}")]
  Config(#[from] confy::ConfyError),

  #[error("ERROR: {0}")]
  Io(#[from] std::io::Error),
}

impl Error {
  #[must_use]
  pub const fn exit_code(&self) -> u8 {
    match self {
      Self::DatabaseNotFound { .. } => EXIT_NO_DATABASE,
      Self::Lookup { .. } => EXIT_LOOKUP_FAILED,
      Self::Unresolved(_) => EXIT_UNRESOLVED,
      Self::Config(_) | Self::Io(_) => EXIT_OTHER,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_exit_codes_are_distinct_per_fatal_path() {
    let no_db = Error::DatabaseNotFound { tried: Vec::new() };
    let unresolved = Error::Unresolved("nonexistent.invalid".into());
    let lookup = Error::Lookup {
      ip: "127.0.0.1".parse().unwrap(),
      reason: "address not found in database".into(),
    };

    assert_eq!(no_db.exit_code(), 1);
    assert_eq!(lookup.exit_code(), 2);
    assert_eq!(unresolved.exit_code(), 3);
  }

  #[test]
  fn test_messages() {
    let no_db = Error::DatabaseNotFound { tried: Vec::new() };
    assert_eq!(no_db.to_string(), "ERROR: GeoIP2 database not found!");

    let unresolved = Error::Unresolved("nonexistent.invalid".into());
    assert!(unresolved.to_string().contains("nonexistent.invalid"));
  }
}
