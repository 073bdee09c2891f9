use log::{debug, info};
use maxminddb::Reader;

use crate::error::Error;
use crate::providers::dns::ResolvedAddress;
use crate::providers::geo::{self, DatabaseHandle, GeoReader};
use crate::providers::locator;
use crate::providers::whois::{self, WhoisLookup};
use crate::request::LookupRequest;
use crate::results::{self, DisplayRow};

/// Opens the MaxMind databases named by the request.
pub fn open_databases(
  request: &LookupRequest,
) -> Result<DatabaseHandle<Reader<Vec<u8>>>, Error> {
  let handle = locator::locate(request, geo::open_mmdb).inspect_err(|e| {
    if let Error::DatabaseNotFound { tried } = e {
      debug!("no geo database among {tried:?}");
    }
  })?;
  info!(
    "using {} (ASN database {})",
    handle.geo_path.display(),
    if handle.asn.is_some() { "loaded" } else { "absent" }
  );
  Ok(handle)
}

/// Queries the databases for the resolved address and builds the table rows.
pub fn fetch_geo_step<D: GeoReader>(
  handle: &DatabaseHandle<D>,
  address: &ResolvedAddress,
  language: &str,
) -> Result<Vec<DisplayRow>, Error> {
  let record = geo::lookup(handle, address.ip)?;
  Ok(results::assemble(address, &record, language))
}

/// Fetches WHOIS text for the raw target, as typed by the user.
pub async fn fetch_whois_step<W: WhoisLookup>(
  client: &W,
  target: &str,
) -> Result<String, whois::Error> {
  client
    .lookup(target)
    .await
    .inspect_err(|e| debug!("whois lookup for {target} failed: {e}"))
}
