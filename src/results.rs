use anyhow::{Context, Result};
use serde::Serialize;

use crate::providers::dns::ResolvedAddress;
use crate::providers::geo::{GeoRecord, Names};

const YES: &str = "yes";
const MAP_URL_PREFIX: &str = "https://www.google.com/maps/place/";

/// One line of the GeoIP table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
  pub label: &'static str,
  pub value: String,
}

impl DisplayRow {
  fn new(label: &'static str, value: impl Into<String>) -> Self {
    Self {
      label,
      value: value.into(),
    }
  }
}

/// Everything printed for one run, in JSON mode serialized as is.
///
/// The reverse name stays nested under `address` next to the IP it
/// decorates.
#[derive(Debug, Serialize, Default)]
pub struct Analysis {
  pub target: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub address: Option<ResolvedAddress>,
  pub rows: Vec<DisplayRow>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub whois: Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub errors: Vec<String>,
}

/// The entry for `language`, or an empty string when the map lacks it.
fn localized(names: &Names, language: &str) -> String {
  names.get(language).cloned().unwrap_or_default()
}

fn address_value(address: &ResolvedAddress) -> String {
  address.reverse_name.as_ref().map_or_else(
    || address.ip.to_string(),
    |name| format!("{} <{name}>", address.ip),
  )
}

/// Builds the GeoIP table rows for a lookup result.
///
/// Rows run from identity through flags and geography to coordinates and
/// network ownership. A name row is emitted whenever the record carries a
/// name map, even if `language` is missing from it.
#[must_use]
pub fn assemble(
  address: &ResolvedAddress,
  record: &GeoRecord,
  language: &str,
) -> Vec<DisplayRow> {
  let mut rows = vec![DisplayRow::new("IP:", address_value(address))];

  let traits = record.traits.clone().unwrap_or_default();
  if traits.is_anonymous_proxy.unwrap_or(false) {
    rows.push(DisplayRow::new("Anonymous Proxy:", YES));
  }
  if traits.is_satellite_provider.unwrap_or(false) {
    rows.push(DisplayRow::new("Satellite Provider:", YES));
  }

  if let Some(names) = record.continent.as_ref().and_then(|c| c.names.as_ref())
  {
    rows.push(DisplayRow::new("Continent:", localized(names, language)));
  }

  if let Some(country) = &record.country {
    if let Some(names) = &country.names {
      rows.push(DisplayRow::new("Country:", localized(names, language)));
    }
    if let Some(iso) = country.iso_code.as_deref().filter(|c| !c.is_empty()) {
      rows.push(DisplayRow::new("ISO code:", iso));
    }
    if country.is_in_european_union.unwrap_or(false) {
      rows.push(DisplayRow::new("European Union:", YES));
    }
  }

  if let Some(names) = record.city.as_ref().and_then(|c| c.names.as_ref()) {
    rows.push(DisplayRow::new("City:", localized(names, language)));
  }

  if let Some(code) = record
    .postal
    .as_ref()
    .and_then(|p| p.code.as_deref())
    .filter(|c| !c.is_empty())
  {
    rows.push(DisplayRow::new("Postal Code:", code));
  }

  if let Some(location) = &record.location {
    if let Some(tz) = location.time_zone.as_deref().filter(|t| !t.is_empty()) {
      rows.push(DisplayRow::new("Timezone:", tz));
    }

    // (0, 0) doubles as "no coordinates".
    let lat = location.latitude.unwrap_or(0.0);
    let lon = location.longitude.unwrap_or(0.0);
    if lat != 0.0 && lon != 0.0 {
      let coordinates = format!("{lat:.6},{lon:.6}");
      let map_url = format!("{MAP_URL_PREFIX}{coordinates}");
      rows.push(DisplayRow::new("Coordinates:", coordinates));
      rows.push(DisplayRow::new("Google Map URL:", map_url));
    }
  }

  if let Some(asn) = &record.asn {
    rows.push(DisplayRow::new(
      "ASN Number:",
      asn.autonomous_system_number.unwrap_or_default().to_string(),
    ));
    rows.push(DisplayRow::new(
      "ASN Organization:",
      asn.autonomous_system_organization.clone().unwrap_or_default(),
    ));
  }

  rows
}

/// Pretty-printed JSON document for `--json` output.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(results: &Analysis) -> Result<String> {
  serde_json::to_string_pretty(results)
    .context("Failed to serialize results to JSON")
}
