//! The immutable description of one lookup run.

use serde::Serialize;

use crate::cli::Cli;
use crate::user_config::UserConfig;

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_ASN_FILENAME: &str = "GeoLite2-ASN.mmdb";
pub const DEFAULT_GEO_FILENAMES: [&str; 4] = [
  "GeoIP2-City.mmdb",
  "GeoLite2-City.mmdb",
  "GeoIP2-Country.mmdb",
  "GeoLite2-Country.mmdb",
];

/// Everything the pipeline needs, merged from flags, user config and
/// built-in defaults. Built once before the pipeline starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupRequest {
  pub target: String,
  /// Lower-cased language code used to pick localized names.
  pub language: String,
  /// Explicit geo database filenames, replacing the defaults when set.
  pub geo_filenames: Option<Vec<String>>,
  /// `None` disables the ASN database.
  pub asn_filename: Option<String>,
  pub base_dir: Option<String>,
  pub whois: bool,
  pub json: bool,
}

impl LookupRequest {
  /// Merges `cli` over `cfg` over the built-in defaults.
  #[must_use]
  pub fn from_sources(cli: &Cli, cfg: &UserConfig) -> Self {
    let language = cli
      .lang
      .clone()
      .or_else(|| cfg.language.clone())
      .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
      .to_lowercase();

    let geo_filenames = if cli.geo.is_empty() {
      cfg.geo.clone().filter(|g| !g.is_empty())
    } else {
      Some(cli.geo.clone())
    };

    let asn_filename = cli
      .asn
      .clone()
      .or_else(|| cfg.asn.clone())
      .unwrap_or_else(|| DEFAULT_ASN_FILENAME.to_string());

    let base_dir = cli
      .path
      .clone()
      .or_else(|| cfg.path.clone())
      .filter(|p| !p.is_empty());

    Self {
      target: cli.target.clone().unwrap_or_default(),
      language,
      geo_filenames,
      asn_filename: Some(asn_filename).filter(|a| !a.is_empty()),
      base_dir,
      whois: cli.whois,
      json: cli.json,
    }
  }

  /// Geo database filenames in the order they are tried.
  #[must_use]
  pub fn geo_candidates(&self) -> Vec<String> {
    self.geo_filenames.clone().unwrap_or_else(|| {
      DEFAULT_GEO_FILENAMES.iter().map(ToString::to_string).collect()
    })
  }

  /// True when neither a base directory nor a filename list was given,
  /// which is when the standard directories are searched.
  #[must_use]
  pub const fn needs_directory_search(&self) -> bool {
    self.base_dir.is_none() && self.geo_filenames.is_none()
  }

  /// The `-l/-p/-a/-g` values of this run, as they would be persisted.
  #[must_use]
  pub fn as_user_config(cli: &Cli, current: &UserConfig) -> UserConfig {
    UserConfig {
      language: cli.lang.clone().or_else(|| current.language.clone()),
      path: cli.path.clone().or_else(|| current.path.clone()),
      asn: cli.asn.clone().or_else(|| current.asn.clone()),
      geo: if cli.geo.is_empty() {
        current.geo.clone()
      } else {
        Some(cli.geo.clone())
      },
    }
  }
}
