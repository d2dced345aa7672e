//! Parser for `winget search` console tables.
//!
//! Winget prints a localized header row, a dashed separator, then one
//! column-aligned row per match:
//!
//! ```text
//! Name                Id                          Version  Source
//! ---------------------------------------------------------------
//! Visual Studio Code  Microsoft.VisualStudioCode  1.95.3   winget
//! ```
//!
//! Columns are separated by runs of two or more whitespace characters. Only the
//! first three columns (name, id, version) are read.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{PackageRecord, PackageSource};

static COLUMN_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("column separator pattern is valid"));

/// Parse raw `winget search` output into records, in emission order.
///
/// Never fails: banners, headers, separators and rows that cannot be split
/// into name, id and version are skipped.
pub fn parse(output: &str) -> Vec<PackageRecord> {
    let lines: Vec<&str> = output.lines().map(visible_text).collect();

    // Everything up to the dashed separator is banner and (localized) header.
    let body_start = lines
        .iter()
        .position(|line| is_separator(line))
        .map(|idx| idx + 1)
        .unwrap_or(0);

    let records: Vec<PackageRecord> = lines[body_start..]
        .iter()
        .filter_map(|line| parse_row(line))
        .collect();

    tracing::debug!(count = records.len(), "Parsed winget output");
    records
}

/// Parse a single table row.
pub(crate) fn parse_row(line: &str) -> Option<PackageRecord> {
    let line = line.trim();
    if line.is_empty() || is_separator(line) || is_header(line) {
        return None;
    }

    let mut fields = COLUMN_SEPARATOR.split(line).map(str::trim);
    let name = fields.next().filter(|s| !s.is_empty())?;
    let id = fields.next().filter(|s| is_identifier(s))?;
    let version = fields.next().filter(|s| !s.is_empty())?;

    Some(PackageRecord::new(
        name,
        id,
        version,
        PackageSource::Winget,
        publisher_from_id(id),
    ))
}

/// Publisher is the identifier segment before the first period.
pub fn publisher_from_id(id: &str) -> Option<String> {
    id.split_once('.')
        .map(|(publisher, _)| publisher)
        .filter(|publisher| !publisher.is_empty())
        .map(str::to_string)
}

/// Winget redraws its progress spinner with carriage returns; only the text
/// after the last `\r` is what the terminal would show.
fn visible_text(line: &str) -> &str {
    line.rsplit('\r').next().unwrap_or(line)
}

fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.chars().count() >= 3 && trimmed.chars().all(|c| c == '-' || c == '─')
}

fn is_header(line: &str) -> bool {
    let mut fields = COLUMN_SEPARATOR.split(line);
    matches!(
        (fields.next(), fields.next()),
        (Some(name), Some(id)) if name.eq_ignore_ascii_case("name") && id.eq_ignore_ascii_case("id")
    )
}

/// Identifiers never contain whitespace; a field that does means the columns
/// were misaligned and the row cannot be trusted.
fn is_identifier(field: &str) -> bool {
    !field.is_empty() && !field.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publisher_is_prefix_before_first_period() {
        assert_eq!(
            publisher_from_id("Microsoft.VisualStudioCode"),
            Some("Microsoft".to_string())
        );
        assert_eq!(
            publisher_from_id("Adobe.Acrobat.Reader.64-bit"),
            Some("Adobe".to_string())
        );
    }

    #[test]
    fn publisher_unset_without_period() {
        assert_eq!(publisher_from_id("vlc"), None);
        assert_eq!(publisher_from_id(".hidden"), None);
    }

    #[test]
    fn visible_text_drops_spinner_frames() {
        assert_eq!(visible_text("   - \r   \\ \rName  Id"), "Name  Id");
        assert_eq!(visible_text("plain"), "plain");
    }

    #[test]
    fn separator_detection() {
        assert!(is_separator("-------------------"));
        assert!(is_separator("  -----  "));
        assert!(!is_separator("--"));
        assert!(!is_separator("Foo-Bar"));
    }

    #[test]
    fn row_with_single_spaced_id_is_dropped() {
        assert!(parse_row("Some App  Some Id  1.0").is_none());
    }
}
