use std::sync::LazyLock;

use log::debug;
use thiserror::Error;
use whois_rust::{WhoIs, WhoIsError, WhoIsLookupOptions, WhoIsServerValue};

static DEFAULT_SERVERS_JSON: &str = include_str!("../../config/servers.json");

/// Registry of last resort for objects missing from the server table.
const IANA_SERVER: &str = "whois.iana.org";

/// Referral hops followed after the first answer.
const FOLLOW_HOPS: u8 = 2;

static WHOIS_CLIENT: LazyLock<Result<WhoIs, String>> = LazyLock::new(|| {
  WhoIs::from_string(DEFAULT_SERVERS_JSON).map_err(|e| e.to_string())
});

#[derive(Debug, Error)]
pub enum Error {
  #[error("whois operation failed: {0}")]
  WhoIs(#[from] WhoIsError),
  #[error("invalid whois server table: {0}")]
  ServerTable(String),
  #[error("empty response")]
  Empty,
}

/// Text lookup of a domain or address block registration.
#[allow(async_fn_in_trait)]
pub trait WhoisLookup {
  async fn lookup(&self, target: &str) -> Result<String, Error>;
}

/// `whois-rust` client over the bundled server table.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhoisClient;

impl WhoisClient {
  async fn query(
    whois: &WhoIs,
    target: &str,
    server: Option<&str>,
  ) -> Result<String, Error> {
    let mut opts = WhoIsLookupOptions::from_string(target)?;
    if let Some(host) = server {
      opts.server = Some(WhoIsServerValue::from_string(host)?);
    }
    opts.follow = FOLLOW_HOPS.into();
    Ok(whois.lookup_async(opts).await?)
  }
}

/// True when the server table has no entry for the target, the only case
/// worth asking IANA about. Network failures are reported as they are.
const fn needs_iana_fallback(err: &Error) -> bool {
  matches!(err, Error::WhoIs(WhoIsError::MapError(_)))
}

impl WhoisLookup for WhoisClient {
  /// Queries the server the table assigns to `target`, retrying against
  /// IANA when the table has none.
  async fn lookup(&self, target: &str) -> Result<String, Error> {
    let whois = WHOIS_CLIENT
      .as_ref()
      .map_err(|e| Error::ServerTable(e.clone()))?;
    let target = target.trim_end_matches('.');

    let raw = match Self::query(whois, target, None).await {
      Ok(raw) => raw,
      Err(e) if needs_iana_fallback(&e) => {
        debug!("no whois server for {target} ({e}), asking {IANA_SERVER}");
        Self::query(whois, target, Some(IANA_SERVER)).await?
      }
      Err(e) => return Err(e),
    };

    let raw = raw.trim();
    if raw.is_empty() {
      return Err(Error::Empty);
    }
    Ok(raw.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io;

  #[test]
  fn test_bundled_server_table_parses() {
    assert!(WHOIS_CLIENT.is_ok(), "{:?}", WHOIS_CLIENT.as_ref().err());
  }

  #[test]
  fn test_error_display() {
    assert_eq!(Error::Empty.to_string(), "empty response");
    assert!(Error::ServerTable("bad".into())
      .to_string()
      .contains("bad"));
  }

  #[test]
  fn test_unknown_server_falls_back_to_iana() {
    let err = Error::WhoIs(WhoIsError::MapError(
      "No whois server is known for this kind of object.",
    ));
    assert!(needs_iana_fallback(&err));
  }

  #[test]
  fn test_network_errors_are_not_retried() {
    let io_err = Error::WhoIs(WhoIsError::IOError(io::Error::new(
      io::ErrorKind::ConnectionRefused,
      "connection refused",
    )));
    assert!(!needs_iana_fallback(&io_err));
    assert!(!needs_iana_fallback(&Error::Empty));
    assert!(!needs_iana_fallback(&Error::ServerTable("bad".into())));
  }
}
