use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "geolookup", version)]
#[command(
  about = "Look up GeoIP, ASN and WHOIS info for an IP address or domain.",
  long_about = "A command-line utility that resolves a hostname or IP address and prints its geolocation and network ownership from offline MaxMind GeoIP2/GeoLite2 databases, optionally followed by the WHOIS record."
)]
pub struct Cli {
  /// IP or domain for lookup.
  #[arg(required_unless_present = "config_show")]
  pub target: Option<String>,

  /// MaxMind ASN database path (optional).
  #[arg(short = 'a', long = "asn", value_name = "PATH")]
  pub asn: Option<String>,

  /// MaxMind GeoIP2 database path(s), tried in order.
  #[arg(short = 'g', long = "geo", value_name = "PATH", num_args = 1..)]
  pub geo: Vec<String>,

  /// MaxMind GeoIP2 database language.
  #[arg(short = 'l', long = "lang", value_name = "LANG")]
  pub lang: Option<String>,

  /// Path prefix to MaxMind databases.
  #[arg(short = 'p', long = "path", value_name = "PATH")]
  pub path: Option<String>,

  /// Lookup Whois information.
  #[arg(short = 'w', long = "whois")]
  pub whois: bool,

  /// Output results in JSON format instead of tables.
  #[arg(long)]
  pub json: bool,

  /// Log each lookup step to stderr.
  #[arg(long)]
  pub verbose: bool,

  /// Read and write defaults from this file instead of the user config dir.
  #[arg(long = "config", value_name = "FILE")]
  pub config_path: Option<PathBuf>,

  /// Persist the -l/-p/-a/-g values given on this run as defaults.
  #[arg(long)]
  pub save_defaults: bool,

  /// Print the current merged configuration and exit.
  #[arg(long)]
  pub config_show: bool,
}
