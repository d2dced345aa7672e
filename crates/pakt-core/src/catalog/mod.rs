//! Package catalogs: report parsers, result merging and live search.
//!
//! - [`winget`] and [`chocolatey`] turn raw console text into [`PackageRecord`]s
//! - [`merge`] combines both lists, primary source first
//! - [`search`] runs the package managers and feeds their output through the above

pub mod chocolatey;
pub mod merge;
pub mod search;
pub mod winget;

pub use merge::{matches_query, merge};
pub use search::{CatalogSearch, CommandRunner, ProcessRunner, SearchScope};

use crate::types::{PackageRecord, PackageSource};

/// Parse raw output with the parser that belongs to `source`.
pub fn parse(source: PackageSource, output: &str) -> Vec<PackageRecord> {
    match source {
        PackageSource::Winget => winget::parse(output),
        PackageSource::Chocolatey => chocolatey::parse(output),
    }
}
