use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "geolookup";
const FILE_NAME: Option<&str> = None;

/// Persisted defaults, sitting between the command line and built-ins.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct UserConfig {
  pub language: Option<String>,
  pub path: Option<String>,
  pub asn: Option<String>,
  pub geo: Option<Vec<String>>,
}

/// Read ~/.config/geolookup/default-config.toml (or OS equivalent), or
/// `path` when given. Unreadable config falls back to empty defaults.
pub fn load(path: Option<&Path>) -> UserConfig {
  let loaded = match path {
    Some(p) => confy::load_path(p),
    None => confy::load(APP_NAME, FILE_NAME),
  };
  loaded.unwrap_or_else(|e| {
    warn!("ignoring unreadable config: {e}");
    UserConfig::default()
  })
}

pub fn store(
  cfg: &UserConfig,
  path: Option<&Path>,
) -> Result<(), confy::ConfyError> {
  match path {
    Some(p) => confy::store_path(p, cfg),
    None => confy::store(APP_NAME, FILE_NAME, cfg),
  }
}
