use std::io::{self, Write};

use crate::error::Error;
use crate::present;
use crate::providers::dns::{self, Resolve};
use crate::providers::geo::{DatabaseHandle, GeoReader};
use crate::providers::whois::WhoisLookup;
use crate::request::LookupRequest;
use crate::results::{self, Analysis};
use crate::steps;

pub struct App<R, W> {
  request: LookupRequest,
  resolver: R,
  whois: W,
  term_width: usize,
}

impl<R: Resolve, W: WhoisLookup> App<R, W> {
  pub const fn new(
    request: LookupRequest,
    resolver: R,
    whois: W,
    term_width: usize,
  ) -> Self {
    Self {
      request,
      resolver,
      whois,
      term_width,
    }
  }

  /// Resolves the target, looks it up in `handle` and writes the tables
  /// (or the JSON document) to `out`.
  ///
  /// The GeoIP table is written before the WHOIS lookup starts; a WHOIS
  /// failure only adds a notice.
  pub async fn run<D: GeoReader, O: Write>(
    &self,
    handle: &DatabaseHandle<D>,
    out: &mut O,
  ) -> Result<(), Error> {
    let target = self.request.target.as_str();
    let address = dns::resolve(&self.resolver, target).await?;
    let rows =
      steps::fetch_geo_step(handle, &address, &self.request.language)?;

    let mut analysis = Analysis {
      target: target.to_string(),
      address: Some(address),
      rows,
      ..Default::default()
    };

    if !self.request.json {
      present::render_geo(out, &analysis.rows)?;
    }

    if self.request.whois {
      let whois = steps::fetch_whois_step(&self.whois, target).await;
      if self.request.json {
        match whois {
          Ok(text) => analysis.whois = Some(text),
          Err(e) => analysis.errors.push(format!("Whois error: {e}")),
        }
      } else {
        present::render_whois(out, whois.as_deref(), self.term_width)?;
      }
    }

    if self.request.json {
      let json = results::to_json(&analysis).map_err(io::Error::other)?;
      writeln!(out, "{json}")?;
    }
    Ok(())
  }
}
