//! Merging of per-source results into one presentation order.

use crate::types::PackageRecord;

/// Concatenate primary (winget) results followed by secondary (Chocolatey)
/// results, keeping each list's emission order.
///
/// When `query` is given, records whose name and id both miss the query
/// (case-insensitive substring) are dropped first. Nothing else is removed: the
/// same application listed by both catalogs stays twice, once per source.
pub fn merge(
    primary: Vec<PackageRecord>,
    secondary: Vec<PackageRecord>,
    query: Option<&str>,
) -> Vec<PackageRecord> {
    let needle = query.map(str::to_lowercase);
    let keep = |record: &PackageRecord| match needle.as_deref() {
        Some(needle) => contains_folded(record, needle),
        None => true,
    };

    let merged: Vec<PackageRecord> = primary
        .into_iter()
        .filter(|record| keep(record))
        .chain(secondary.into_iter().filter(|record| keep(record)))
        .collect();

    tracing::debug!(count = merged.len(), "Merged catalog results");
    merged
}

/// Case-insensitive substring match on name or id.
pub fn matches_query(record: &PackageRecord, query: &str) -> bool {
    contains_folded(record, &query.to_lowercase())
}

/// Stable reorder of an already-mixed list so primary-source records come
/// first. Used when results arrive as a single list rather than per source.
pub fn order_by_precedence(records: &mut [PackageRecord]) {
    records.sort_by_key(|record| record.source.precedence());
}

fn contains_folded(record: &PackageRecord, needle: &str) -> bool {
    record.name.to_lowercase().contains(needle) || record.id.to_lowercase().contains(needle)
}
