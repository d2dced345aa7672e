//! Parser for `choco search` console output.
//!
//! Chocolatey prints a version banner, one `<name> <version> [flags]` line per
//! match and a trailing summary:
//!
//! ```text
//! Chocolatey v2.2.2
//! vscode 1.95.3 [Approved] Downloads cached for licensed users
//! 1 packages found.
//! ```
//!
//! The report carries no separate identifier column, so the identifier is
//! derived from the name.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{PackageRecord, PackageSource};

/// Name, whitespace, a dotted numeric version of at least three parts, then a
/// trailing boundary (whitespace or end of line). Text after the boundary is
/// ignored.
static ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.+?)\s+(?P<version>\d+\.\d+\.\d+(?:\.\d+)*)(?:\s|$)")
        .expect("chocolatey row pattern is valid")
});

static BANNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Chocolatey v\d").expect("chocolatey banner pattern is valid"));

/// Summary and hint lines choco appends around the result rows.
const NOISE_MARKERS: &[&str] = &[
    "packages found",
    "package found",
    "validations performed",
    "Did you know",
];

/// Parse raw `choco search` output into records, in emission order.
///
/// Never fails: banners, summaries and lines without a recognizable version
/// are skipped.
pub fn parse(output: &str) -> Vec<PackageRecord> {
    let records: Vec<PackageRecord> = output.lines().filter_map(parse_row).collect();
    tracing::debug!(count = records.len(), "Parsed chocolatey output");
    records
}

/// Parse a single result line.
pub(crate) fn parse_row(line: &str) -> Option<PackageRecord> {
    let line = line.trim();
    if line.is_empty() || is_noise(line) {
        return None;
    }

    let captures = ROW.captures(line)?;
    let name = captures.name("name")?.as_str().trim();
    let version = captures.name("version")?.as_str();
    if name.is_empty() {
        return None;
    }

    Some(PackageRecord::new(
        name,
        id_from_name(name),
        version,
        PackageSource::Chocolatey,
        publisher_from_name(name),
    ))
}

/// Lower-cased name with each internal whitespace run collapsed to a period.
pub fn id_from_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(".")
}

/// First whitespace-delimited token of the name.
pub fn publisher_from_name(name: &str) -> Option<String> {
    name.split_whitespace().next().map(str::to_string)
}

fn is_noise(line: &str) -> bool {
    BANNER.is_match(line) || NOISE_MARKERS.iter().any(|marker| line.contains(marker))
}
