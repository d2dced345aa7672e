use proptest::prelude::*;

use pakt_core::catalog::{self, chocolatey, winget};
use pakt_core::types::PackageSource;

const WINGET_VSCODE: &str = "\
Name                          Id                                Version  Source
-------------------------------------------------------------------------------
Visual Studio Code            Microsoft.VisualStudioCode        1.95.3   winget
Visual Studio Code Insiders   Microsoft.VisualStudioCode.Insiders  1.96.0   winget
";

const CHOCO_VSCODE: &str = "\
Chocolatey v2.2.2
vscode 1.95.3 [Approved] Downloads cached for licensed users
vscode.install 1.95.3 [Approved]
2 packages found.
";

#[test]
fn winget_table_yields_one_record_per_row() {
    let records = winget::parse(WINGET_VSCODE);

    assert_eq!(records.len(), 2);
    let first = &records[0];
    assert_eq!(first.name, "Visual Studio Code");
    assert_eq!(first.id, "Microsoft.VisualStudioCode");
    assert_eq!(first.version, "1.95.3");
    assert_eq!(first.source, PackageSource::Winget);
    assert_eq!(first.publisher.as_deref(), Some("Microsoft"));
    assert_eq!(first.description, "Package Visual Studio Code");

    assert_eq!(records[1].id, "Microsoft.VisualStudioCode.Insiders");
    assert_eq!(records[1].version, "1.96.0");
}

#[test]
fn winget_banner_and_spinner_are_ignored() {
    let output = "   - \r   \\ \r\
Name   Id        Version\r\n\
------------------------\r\n\
Git    Git.Git   2.47.0\r\n";

    let records = winget::parse(output);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "Git.Git");
    assert_eq!(records[0].version, "2.47.0");
}

#[test]
fn winget_localized_header_is_skipped_by_separator() {
    let output = "\
Nom            ID               Version
---------------------------------------
7-Zip 24.08    7zip.7zip        24.08
";

    let records = winget::parse(output);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "7-Zip 24.08");
    assert_eq!(records[0].publisher.as_deref(), Some("7zip"));
}

#[test]
fn winget_rows_with_too_few_columns_are_dropped() {
    let output = "\
Name   Id   Version
-------------------
Lonely
Two    Fields
Ok     Vendor.Ok  1.0
";

    let records = winget::parse(output);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "Vendor.Ok");
}

#[test]
fn winget_no_match_message_yields_nothing() {
    let output = "No package found matching input criteria.\n";
    assert!(winget::parse(output).is_empty());
}

#[test]
fn chocolatey_lines_become_records_with_derived_ids() {
    let records = chocolatey::parse(CHOCO_VSCODE);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "vscode");
    assert_eq!(records[0].id, "vscode");
    assert_eq!(records[0].version, "1.95.3");
    assert_eq!(records[0].source, PackageSource::Chocolatey);
    assert_eq!(records[0].publisher.as_deref(), Some("vscode"));
    assert_eq!(records[1].id, "vscode.install");
}

#[test]
fn chocolatey_multi_word_names_are_joined_with_periods() {
    let records = chocolatey::parse("Google Chrome 131.0.6778.86 [Approved]\n");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Google Chrome");
    assert_eq!(records[0].id, "google.chrome");
    assert_eq!(records[0].version, "131.0.6778.86");
    assert_eq!(records[0].publisher.as_deref(), Some("Google"));
}

#[test]
fn chocolatey_name_derives_dotted_id_and_publisher() {
    let records = chocolatey::parse("VS Code 1.95.3\n");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "VS Code");
    assert_eq!(records[0].id, "vs.code");
    assert_eq!(records[0].version, "1.95.3");
    assert_eq!(records[0].publisher.as_deref(), Some("VS"));
    assert_eq!(records[0].description, "Package VS Code");
}

#[test]
fn chocolatey_two_part_versions_are_not_rows() {
    assert!(chocolatey::parse("legacy 1.2 [Approved]\n").is_empty());
}

#[test]
fn chocolatey_summary_and_hints_are_skipped() {
    let output = "\
Chocolatey v1.4.0
0 packages found.
Did you know Pro / Business automatically syncs with Programs and Features? 1.0.0
";
    assert!(chocolatey::parse(output).is_empty());
}

#[test]
fn dispatch_uses_the_matching_parser() {
    assert_eq!(catalog::parse(PackageSource::Winget, WINGET_VSCODE).len(), 2);
    assert_eq!(catalog::parse(PackageSource::Chocolatey, CHOCO_VSCODE).len(), 2);
    // Each parser ignores the other's format.
    assert!(catalog::parse(PackageSource::Chocolatey, "Name  Id  Version\n---\n").is_empty());
}

proptest! {
    #[test]
    fn winget_parse_is_total(input in "\\PC*") {
        for record in winget::parse(&input) {
            prop_assert!(!record.id.is_empty());
            prop_assert!(!record.version.is_empty());
            prop_assert_eq!(record.source, PackageSource::Winget);
        }
    }

    #[test]
    fn chocolatey_parse_is_total(input in "\\PC*") {
        for record in chocolatey::parse(&input) {
            prop_assert!(!record.name.is_empty());
            prop_assert_eq!(record.source, PackageSource::Chocolatey);
        }
    }

    #[test]
    fn winget_parse_handles_arbitrary_lines(lines in prop::collection::vec("[ -~\\r]{0,60}", 0..20)) {
        let output = lines.join("\n");
        let records = winget::parse(&output);
        prop_assert!(records.len() <= lines.len());
    }

    #[test]
    fn chocolatey_rows_keep_their_version(
        name in "[a-z][a-z0-9-]{0,12}",
        major in 0u32..100,
        minor in 0u32..100,
        patch in 0u32..100,
    ) {
        let line = format!("{} {}.{}.{} [Approved]", name, major, minor, patch);
        let records = chocolatey::parse(&line);
        prop_assert_eq!(records.len(), 1);
        prop_assert_eq!(&records[0].name, &name);
        prop_assert_eq!(records[0].version.clone(), format!("{}.{}.{}", major, minor, patch));
    }
}
