//! Offline GeoIP2/GeoLite2 and ASN lookups backed by MaxMind databases.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::net::IpAddr;
use std::path::PathBuf;

use log::debug;
use maxminddb::Reader;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Localized names keyed by MaxMind language code (`en`, `de`, `pt-BR`, ...).
pub type Names = BTreeMap<String, String>;

/// A continent or city: only the localized names are used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
  pub names: Option<Names>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Country {
  pub names: Option<Names>,
  pub iso_code: Option<String>,
  pub is_in_european_union: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
  pub latitude: Option<f64>,
  pub longitude: Option<f64>,
  pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Postal {
  pub code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traits {
  pub is_anonymous_proxy: Option<bool>,
  pub is_satellite_provider: Option<bool>,
}

/// ASN database record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsnRecord {
  pub autonomous_system_number: Option<u32>,
  pub autonomous_system_organization: Option<String>,
}

/// The sparse result of a City or Country database query.
///
/// Every section is optional: Country databases carry no city, postal or
/// location data, and City databases lack coverage for many networks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoRecord {
  pub continent: Option<Place>,
  pub country: Option<Country>,
  pub city: Option<Place>,
  pub postal: Option<Postal>,
  pub location: Option<Location>,
  pub traits: Option<Traits>,
  /// Filled from the ASN database, never from the geo database.
  #[serde(skip)]
  pub asn: Option<AsnRecord>,
}

/// Query-by-address capability of an opened database.
///
/// `Ok(None)` means the database has no data for the address.
pub trait GeoReader {
  type Error: Display;

  fn city(&self, ip: IpAddr) -> Result<Option<GeoRecord>, Self::Error>;

  fn asn(&self, ip: IpAddr) -> Result<Option<AsnRecord>, Self::Error>;
}

impl GeoReader for Reader<Vec<u8>> {
  type Error = maxminddb::MaxMindDbError;

  fn city(&self, ip: IpAddr) -> Result<Option<GeoRecord>, Self::Error> {
    let result = self.lookup(ip)?;
    if !result.has_data() {
      return Ok(None);
    }
    result.decode::<GeoRecord>()
  }

  fn asn(&self, ip: IpAddr) -> Result<Option<AsnRecord>, Self::Error> {
    let result = self.lookup(ip)?;
    if !result.has_data() {
      return Ok(None);
    }
    result.decode::<AsnRecord>()
  }
}

/// Opens a MaxMind database file, reading it fully into memory.
///
/// # Errors
///
/// Returns the reader error if the file is missing or not a valid database.
pub fn open_mmdb(
  path: &std::path::Path,
) -> Result<Reader<Vec<u8>>, maxminddb::MaxMindDbError> {
  Reader::open_readfile(path)
}

/// The databases opened for one run: exactly one geo database and at most
/// one ASN database. Both are closed when the handle is dropped.
#[derive(Debug)]
pub struct DatabaseHandle<D> {
  pub geo: D,
  pub geo_path: PathBuf,
  pub asn: Option<D>,
}

/// Queries the geo database and, when present, the ASN database.
///
/// # Errors
///
/// Returns [`Error::Lookup`] if the geo query fails or finds nothing. ASN
/// failures are not errors; the record is returned without ASN data.
pub fn lookup<D: GeoReader>(
  handle: &DatabaseHandle<D>,
  ip: IpAddr,
) -> Result<GeoRecord, Error> {
  let mut record = handle
    .geo
    .city(ip)
    .map_err(|e| Error::Lookup {
      ip,
      reason: e.to_string(),
    })?
    .ok_or_else(|| Error::Lookup {
      ip,
      reason: "address not found in database".to_string(),
    })?;

  if let Some(asn_db) = &handle.asn {
    match asn_db.asn(ip) {
      Ok(Some(asn)) => record.asn = Some(asn),
      Ok(None) => debug!("no ASN data for {ip}"),
      Err(e) => debug!("ASN lookup for {ip} failed: {e}"),
    }
  }

  Ok(record)
}
