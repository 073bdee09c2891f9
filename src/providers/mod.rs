//! Adapters for the external capabilities a lookup consumes: database
//! files, DNS and WHOIS.

pub mod dns;
pub mod geo;
pub mod locator;
pub mod whois;
