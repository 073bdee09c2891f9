//! Finds and opens the geo and ASN database files for a run.

use std::fmt::Display;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use log::debug;

use crate::error::Error;
use crate::providers::geo::DatabaseHandle;
use crate::request::LookupRequest;

/// Directories searched, in order, when no path or filename list is given.
pub const SEARCH_DIRS: [&str; 5] = [
  ".",
  "/usr/share/GeoIP/",
  "/usr/local/share/GeoIP/",
  "/var/lib/GeoIP/",
  "/opt/homebrew/var/GeoIP",
];

const DB_EXTENSION: &str = "mmdb";

/// Returns the first directory in `dirs` holding at least one `.mmdb` file.
pub fn find_search_dir<P: AsRef<Path>>(dirs: &[P]) -> Option<PathBuf> {
  dirs.iter().map(AsRef::as_ref).find_map(|dir| {
    let has_db = std::fs::read_dir(dir)
      .ok()?
      .filter_map(Result::ok)
      .any(|entry| {
        entry.path().extension().is_some_and(|ext| ext == DB_EXTENSION)
      });
    has_db.then(|| dir.to_path_buf())
  })
}

/// Appends a path separator unless `dir` already ends with one.
#[must_use]
pub fn normalize_base_dir(dir: &str) -> String {
  if dir.ends_with(MAIN_SEPARATOR) {
    dir.to_string()
  } else {
    format!("{dir}{MAIN_SEPARATOR}")
  }
}

/// Joins a filename onto the (already normalized) base directory prefix.
fn database_path(base: Option<&str>, file: &str) -> PathBuf {
  base.map_or_else(
    || PathBuf::from(file),
    |b| PathBuf::from(format!("{b}{file}")),
  )
}

/// The base directory used for this run, after the search fallback.
fn effective_base_dir<P: AsRef<Path>>(
  request: &LookupRequest,
  search_dirs: &[P],
) -> Option<String> {
  let base = if request.needs_directory_search() {
    let found = find_search_dir(search_dirs)
      .map(|dir| dir.to_string_lossy().into_owned());
    debug!("database search directory: {found:?}");
    found
  } else {
    request.base_dir.clone()
  };
  base.map(|b| normalize_base_dir(&b))
}

/// Opens the first geo candidate that succeeds plus the optional ASN
/// database, searching the given directories when the request names none.
///
/// `open` is the database reader's open-by-path capability.
///
/// # Errors
///
/// Returns [`Error::DatabaseNotFound`] if none of the geo candidates opens.
/// An ASN database that fails to open is skipped without error.
pub fn locate_in<D, E, F, P>(
  request: &LookupRequest,
  search_dirs: &[P],
  open: F,
) -> Result<DatabaseHandle<D>, Error>
where
  F: Fn(&Path) -> Result<D, E>,
  E: Display,
  P: AsRef<Path>,
{
  let base = effective_base_dir(request, search_dirs);
  let mut tried = Vec::new();

  let mut geo = None;
  for file in request.geo_candidates() {
    let path = database_path(base.as_deref(), &file);
    match open(&path) {
      Ok(db) => {
        debug!("opened geo database {}", path.display());
        geo = Some((db, path));
        break;
      }
      Err(e) => {
        debug!("cannot open {}: {e}", path.display());
        tried.push(path);
      }
    }
  }
  let (geo, geo_path) = geo.ok_or(Error::DatabaseNotFound { tried })?;

  let asn = request.asn_filename.as_deref().and_then(|file| {
    let path = database_path(base.as_deref(), file);
    open(&path)
      .map_err(|e| debug!("ASN database {} skipped: {e}", path.display()))
      .ok()
  });

  Ok(DatabaseHandle { geo, geo_path, asn })
}

/// [`locate_in`] over the standard [`SEARCH_DIRS`].
///
/// # Errors
///
/// See [`locate_in`].
pub fn locate<D, E, F>(
  request: &LookupRequest,
  open: F,
) -> Result<DatabaseHandle<D>, Error>
where
  F: Fn(&Path) -> Result<D, E>,
  E: Display,
{
  locate_in(request, &SEARCH_DIRS, open)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::cell::RefCell;
  use std::fs;

  /// Opens any existing file, returning its path as the "database".
  fn open_existing(path: &Path) -> Result<PathBuf, std::io::Error> {
    fs::metadata(path).map(|_| path.to_path_buf())
  }

  fn request(base: Option<&Path>, geo: Option<&[&str]>) -> LookupRequest {
    LookupRequest {
      target: "8.8.8.8".into(),
      language: "en".into(),
      geo_filenames: geo.map(|g| g.iter().map(ToString::to_string).collect()),
      asn_filename: Some("GeoLite2-ASN.mmdb".into()),
      base_dir: base.map(|b| b.to_string_lossy().into_owned()),
      whois: false,
      json: false,
    }
  }

  fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"").unwrap();
  }

  #[test]
  fn test_normalize_base_dir() {
    let sep = MAIN_SEPARATOR;
    assert_eq!(normalize_base_dir("/srv/geoip"), format!("/srv/geoip{sep}"));
    assert_eq!(
      normalize_base_dir(&format!("/srv/geoip{sep}")),
      format!("/srv/geoip{sep}")
    );
    assert_eq!(normalize_base_dir("."), format!(".{sep}"));
  }

  #[test]
  fn test_first_existing_candidate_wins() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "GeoLite2-City.mmdb");
    touch(dir.path(), "GeoLite2-Country.mmdb");

    let attempts = RefCell::new(Vec::new());
    let handle = locate_in(&request(Some(dir.path()), None), &SEARCH_DIRS, |p| {
      attempts.borrow_mut().push(p.to_path_buf());
      open_existing(p)
    })
    .unwrap();

    assert_eq!(handle.geo, dir.path().join("GeoLite2-City.mmdb"));
    assert_eq!(handle.geo_path, handle.geo);
    // GeoIP2-City, GeoLite2-City, then the ASN file; the country databases
    // are never touched.
    let names: Vec<_> = attempts
      .borrow()
      .iter()
      .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
      .collect();
    assert_eq!(
      names,
      vec!["GeoIP2-City.mmdb", "GeoLite2-City.mmdb", "GeoLite2-ASN.mmdb"]
    );
    assert!(handle.asn.is_none());
  }

  #[test]
  fn test_explicit_list_order_is_respected() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "a.mmdb");
    touch(dir.path(), "b.mmdb");

    let handle = locate_in(
      &request(Some(dir.path()), Some(&["b.mmdb", "a.mmdb"])),
      &SEARCH_DIRS,
      open_existing,
    )
    .unwrap();
    assert_eq!(handle.geo, dir.path().join("b.mmdb"));
  }

  #[test]
  fn test_asn_database_opens_from_same_base() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "GeoIP2-Country.mmdb");
    touch(dir.path(), "GeoLite2-ASN.mmdb");

    let handle =
      locate_in(&request(Some(dir.path()), None), &SEARCH_DIRS, open_existing)
        .unwrap();
    assert_eq!(handle.geo, dir.path().join("GeoIP2-Country.mmdb"));
    assert_eq!(handle.asn, Some(dir.path().join("GeoLite2-ASN.mmdb")));
  }

  #[test]
  fn test_no_candidate_is_database_not_found() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "GeoLite2-ASN.mmdb");

    let err =
      locate_in(&request(Some(dir.path()), None), &SEARCH_DIRS, open_existing)
        .unwrap_err();
    match err {
      Error::DatabaseNotFound { tried } => assert_eq!(tried.len(), 4),
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn test_find_search_dir_picks_first_with_mmdb() {
    let empty = tempfile::tempdir().unwrap();
    let other_files = tempfile::tempdir().unwrap();
    touch(other_files.path(), "README.txt");
    let first = tempfile::tempdir().unwrap();
    touch(first.path(), "Anything.mmdb");
    let second = tempfile::tempdir().unwrap();
    touch(second.path(), "GeoLite2-City.mmdb");

    let dirs = [
      Path::new("/nonexistent/geolookup"),
      empty.path(),
      other_files.path(),
      first.path(),
      second.path(),
    ];
    assert_eq!(find_search_dir(&dirs), Some(first.path().to_path_buf()));
    assert_eq!(find_search_dir(&dirs[..3]), None);
  }

  #[test]
  fn test_search_dirs_used_only_without_explicit_settings() {
    let searched = tempfile::tempdir().unwrap();
    touch(searched.path(), "GeoLite2-Country.mmdb");
    let dirs = [searched.path()];

    let handle = locate_in(&request(None, None), &dirs, open_existing).unwrap();
    assert_eq!(handle.geo, searched.path().join("GeoLite2-Country.mmdb"));

    // An explicit filename list skips the search; names stay relative to
    // the working directory.
    let attempts = RefCell::new(Vec::new());
    let result = locate_in(
      &request(None, Some(&["GeoLite2-Country.mmdb"])),
      &dirs,
      |p| {
        attempts.borrow_mut().push(p.to_path_buf());
        Err::<PathBuf, _>("refused")
      },
    );
    assert!(result.is_err());
    assert_eq!(
      attempts.borrow()[0],
      PathBuf::from("GeoLite2-Country.mmdb")
    );
  }

  #[test]
  fn test_search_finds_nothing_falls_back_to_bare_filenames() {
    let empty = tempfile::tempdir().unwrap();
    let attempts = RefCell::new(Vec::new());
    let result = locate_in(&request(None, None), &[empty.path()], |p| {
      attempts.borrow_mut().push(p.to_path_buf());
      Err::<PathBuf, _>("refused")
    });

    assert!(matches!(result, Err(Error::DatabaseNotFound { .. })));
    assert_eq!(attempts.borrow()[0], PathBuf::from("GeoIP2-City.mmdb"));
  }
}
