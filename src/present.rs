//! Table rendering for the GeoIP and WHOIS sections.

use std::io::{self, Write};

use console::Term;
use tabled::builder::Builder;
use tabled::settings::object::{Cell, Rows};
use tabled::settings::style::BorderSpanCorrection;
use tabled::settings::{Alignment, Span, Style, Width};

use crate::results::DisplayRow;

pub const GEO_HEADER: &str = "GeoIP INFO";
pub const WHOIS_HEADER: &str = "Whois";
pub const DEFAULT_TERM_WIDTH: usize = 80;

/// Two-column GeoIP table whose header spans both columns.
#[must_use]
pub fn geo_table(rows: &[DisplayRow]) -> String {
  let mut builder = Builder::default();
  builder.push_record([GEO_HEADER.to_string(), String::new()]);
  for row in rows {
    builder.push_record([row.label.to_string(), row.value.clone()]);
  }

  let mut table = builder.build();
  table
    .with(Style::sharp())
    .modify(Cell::new(0, 0), Span::column(2))
    .modify(Rows::first(), Alignment::center())
    .with(BorderSpanCorrection);
  table.to_string()
}

/// Single-column WHOIS table, clamped to `width` columns.
#[must_use]
pub fn whois_table(text: &str, width: usize) -> String {
  let mut builder = Builder::default();
  builder.push_record([WHOIS_HEADER.to_string()]);
  builder.push_record([text.to_string()]);

  let mut table = builder.build();
  table
    .with(Style::sharp())
    .modify(Rows::first(), Alignment::center())
    .modify(Rows::new(1..), Alignment::left())
    .with(Width::truncate(width));
  table.to_string()
}

/// Width of the attached terminal, or [`DEFAULT_TERM_WIDTH`] when stdout
/// is not a terminal.
#[must_use]
pub fn terminal_width() -> usize {
  Term::stdout()
    .size_checked()
    .map_or(DEFAULT_TERM_WIDTH, |(_, cols)| usize::from(cols))
}

/// Writes the GeoIP table.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render_geo<W: Write>(out: &mut W, rows: &[DisplayRow]) -> io::Result<()> {
  writeln!(out, "{}", geo_table(rows))?;
  out.flush()
}

/// Writes the WHOIS table, or a one-line notice if the lookup failed.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render_whois<W: Write, E: std::fmt::Display>(
  out: &mut W,
  whois: Result<&str, E>,
  width: usize,
) -> io::Result<()> {
  match whois {
    Ok(text) => writeln!(out, "{}", whois_table(text, width))?,
    Err(e) => writeln!(out, "Whois error: {e}")?,
  }
  out.flush()
}
