use std::net::IpAddr;

use anyhow::{anyhow, Result};
use hickory_resolver::{Resolver, TokioResolver};
use log::{debug, warn};
use serde::Serialize;

use crate::error::Error;

/// The address a run is looked up with, plus its reverse-DNS decoration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAddress {
  pub ip: IpAddr,
  pub reverse_name: Option<String>,
}

/// Forward and reverse name resolution.
#[allow(async_fn_in_trait)]
pub trait Resolve {
  /// Resolves `host` to its addresses, in the order the resolver returns them.
  async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>>;

  /// Returns the first PTR name for `ip`.
  async fn reverse(&self, ip: IpAddr) -> Result<String>;
}

/// Resolver built from the system configuration (`/etc/resolv.conf` or the
/// platform equivalent).
pub struct SystemResolver {
  inner: Option<TokioResolver>,
}

impl SystemResolver {
  /// Builds the resolver. A missing or unreadable system configuration is
  /// logged and leaves the resolver unable to answer any query.
  #[must_use]
  pub fn new() -> Self {
    let inner = match Resolver::builder_tokio() {
      Ok(builder) => Some(builder.build()),
      Err(e) => {
        warn!("DNS resolver unavailable: {e}");
        None
      }
    };
    Self { inner }
  }

  fn resolver(&self) -> Result<&TokioResolver> {
    self
      .inner
      .as_ref()
      .ok_or_else(|| anyhow!("no system DNS configuration"))
  }
}

impl Default for SystemResolver {
  fn default() -> Self {
    Self::new()
  }
}

impl Resolve for SystemResolver {
  async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>> {
    let response = self.resolver()?.lookup_ip(host).await?;
    Ok(response.iter().collect())
  }

  async fn reverse(&self, ip: IpAddr) -> Result<String> {
    let response = self.resolver()?.reverse_lookup(ip).await?;
    response
      .iter()
      .next()
      .map(|name| name.to_utf8())
      .ok_or_else(|| anyhow!("no PTR record for {ip}"))
  }
}

/// Turns the target into a single address: the first forward-resolution
/// result, otherwise the target parsed as a literal address.
///
/// # Errors
///
/// Returns [`Error::Unresolved`] if neither step yields an address.
pub async fn resolve_target<R: Resolve>(
  resolver: &R,
  target: &str,
) -> Result<IpAddr, Error> {
  match resolver.lookup_ip(target).await {
    Ok(ips) => {
      if let Some(ip) = ips.first() {
        debug!("{target} resolved to {ip} ({} addresses)", ips.len());
        return Ok(*ip);
      }
      debug!("{target} resolved to no addresses");
    }
    Err(e) => debug!("forward lookup of {target} failed: {e}"),
  }

  target
    .parse::<IpAddr>()
    .map_err(|_| Error::Unresolved(target.to_string()))
}

/// Reverse lookup for display only; any failure yields `None`.
pub async fn reverse_name<R: Resolve>(resolver: &R, ip: IpAddr) -> Option<String> {
  match resolver.reverse(ip).await {
    Ok(name) => {
      let name = name.trim_end_matches('.');
      (!name.is_empty()).then(|| name.to_string())
    }
    Err(e) => {
      debug!("reverse lookup of {ip} failed: {e}");
      None
    }
  }
}

/// Resolves the target and decorates it with its reverse name.
///
/// # Errors
///
/// See [`resolve_target`].
pub async fn resolve<R: Resolve>(
  resolver: &R,
  target: &str,
) -> Result<ResolvedAddress, Error> {
  let ip = resolve_target(resolver, target).await?;
  let reverse_name = reverse_name(resolver, ip).await;
  Ok(ResolvedAddress { ip, reverse_name })
}
