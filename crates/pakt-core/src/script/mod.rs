//! PowerShell deployment script synthesis.
//!
//! [`synthesize`] is a pure function of a record's id, name, version and
//! source. Each generated script:
//!
//! 1. checks that the package manager (or its helper script) exists at a fixed
//!    path and exits `1` with a one-line diagnostic when it does not
//! 2. creates the log folder only when it is missing
//! 3. runs the install non-interactively for the record's id and exits with the
//!    installer's own code when that code is non-zero
//! 4. turns any exception into a one-line diagnostic and exit code `1`
//! 5. exits `0` only after a successful install
//!
//! Persisting a script is the job of a [`sink::ScriptSink`].

pub mod sink;
mod template;

use crate::types::{PackageRecord, PackageSource};

pub use sink::{DirectorySink, SaveOutcome, ScriptSink};

/// Log folder shared by every generated script.
pub const LOG_FOLDER: &str = r"C:\ProgramData\Autopilot-Setup";

/// Winget-AutoUpdate's install helper, used instead of calling winget directly
/// because winget is not on PATH for the SYSTEM account.
pub const WINGET_INSTALL_SCRIPT: &str =
    r"C:\Program Files\Winget-Autoupdate-aaS\Winget-AutoUpdate\Winget-Install.ps1";

/// Chocolatey's default machine-wide executable.
pub const CHOCO_EXECUTABLE: &str = r"C:\ProgramData\chocolatey\choco.exe";

/// Windows PowerShell host used to run the winget helper.
pub const POWERSHELL_EXECUTABLE: &str = r"$env:WINDIR\System32\WindowsPowerShell\v1.0\powershell.exe";

/// Generate the deployment script for `record`.
pub fn synthesize(record: &PackageRecord) -> String {
    let template = match record.source {
        PackageSource::Winget => template::WINGET,
        PackageSource::Chocolatey => template::CHOCOLATEY,
    };

    let name = comment_safe(&record.name);
    let version = comment_safe(&record.version);
    let id_literal = single_quoted(&record.id);
    let id_comment = comment_safe(&record.id);

    template::render(
        template,
        &[
            ("NAME", name.as_str()),
            ("ID", id_comment.as_str()),
            ("VERSION", version.as_str()),
            ("SOURCE", record.source.as_str()),
            ("ID_LITERAL", id_literal.as_str()),
            ("LOG_FOLDER", LOG_FOLDER),
            ("WINGET_INSTALL_SCRIPT", WINGET_INSTALL_SCRIPT),
            ("CHOCO_EXECUTABLE", CHOCO_EXECUTABLE),
            ("POWERSHELL_EXECUTABLE", POWERSHELL_EXECUTABLE),
        ],
    )
}

/// File name offered when saving the script for `record`: `<id>_install.ps1`.
pub fn suggested_filename(record: &PackageRecord) -> String {
    let stem: String = record
        .id
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() || c.is_whitespace() => '_',
            c => c,
        })
        .collect();
    format!("{}_install.ps1", stem)
}

/// PowerShell single-quoted literal. Only `'` needs escaping (doubled); periods,
/// hyphens and mixed case pass through untouched.
fn single_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Header comments are one line each.
fn comment_safe(value: &str) -> String {
    value
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect()
}
