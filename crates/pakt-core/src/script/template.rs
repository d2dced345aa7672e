//! Script templates and a single-pass placeholder renderer.
//!
//! Placeholders are written `{{NAME}}`. Substituted values are never scanned
//! again, so a package name containing `{{ID}}` stays literal.

pub(super) const WINGET: &str = r#"# ============================================================
# Winget-Install deployment script
# Package: {{NAME}}
# ID: {{ID}}
# Version: {{VERSION}}
# Source: {{SOURCE}}
# Log: {{LOG_FOLDER}}
# ============================================================

$ErrorActionPreference = 'Stop'

$LogFolder = '{{LOG_FOLDER}}'
$WingetInstall = '{{WINGET_INSTALL_SCRIPT}}'
$AppID = {{ID_LITERAL}}

try {
    # Nothing is changed until the helper script is known to exist
    if (-not (Test-Path -Path $WingetInstall)) {
        Write-Output "ERROR: Winget-Install.ps1 not found at $WingetInstall"
        exit 1
    }

    if (-not (Test-Path -Path $LogFolder)) {
        New-Item -ItemType Directory -Path $LogFolder -Force | Out-Null
    }

    $Process = Start-Process -FilePath "{{POWERSHELL_EXECUTABLE}}" -ArgumentList @(
        '-ExecutionPolicy', 'Bypass',
        '-NoProfile',
        '-NonInteractive',
        '-File', "`"$WingetInstall`"",
        '-AppIDs', "`"$AppID`"",
        '-LogPath', "`"$LogFolder`""
    ) -Wait -PassThru -NoNewWindow

    if ($Process.ExitCode -ne 0) {
        Write-Output "ERROR: Winget-Install.ps1 returned exit code $($Process.ExitCode)"
        exit $Process.ExitCode
    }
}
catch {
    Write-Output ("ERROR: Exception caught - " + ($_.Exception.Message -replace '\s+', ' '))
    exit 1
}

exit 0
"#;

pub(super) const CHOCOLATEY: &str = r#"# ============================================================
# Chocolatey-Install deployment script
# Package: {{NAME}}
# ID: {{ID}}
# Version: {{VERSION}}
# Source: {{SOURCE}}
# Log: {{LOG_FOLDER}}
# ============================================================

$ErrorActionPreference = 'Stop'

$LogFolder = '{{LOG_FOLDER}}'
$ChocoPath = '{{CHOCO_EXECUTABLE}}'
$PackageID = {{ID_LITERAL}}

try {
    # Nothing is changed until Chocolatey is known to exist
    if (-not (Test-Path -Path $ChocoPath)) {
        Write-Output "ERROR: Chocolatey not found at $ChocoPath"
        exit 1
    }

    if (-not (Test-Path -Path $LogFolder)) {
        New-Item -ItemType Directory -Path $LogFolder -Force | Out-Null
    }

    & $ChocoPath install $PackageID --yes --no-progress --limit-output "--log-file=$LogFolder\choco-install.log"
    $ExitCode = $LASTEXITCODE

    if ($ExitCode -ne 0) {
        Write-Output "ERROR: Chocolatey installation failed with exit code $ExitCode"
        exit $ExitCode
    }
}
catch {
    Write-Output ("ERROR: Exception caught - " + ($_.Exception.Message -replace '\s+', ' '))
    exit 1
}

exit 0
"#;

/// Replace every `{{KEY}}` in `template` with its value. Unknown keys are left
/// as written.
pub(super) fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        match after_open.find("}}") {
            Some(close) => {
                let key = &after_open[..close];
                match values.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(key);
                        out.push_str("}}");
                    }
                }
                rest = &after_open[close + 2..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_known_keys() {
        let out = render("a {{X}} b {{Y}}", &[("X", "1"), ("Y", "2")]);
        assert_eq!(out, "a 1 b 2");
    }

    #[test]
    fn render_does_not_rescan_values() {
        let out = render("{{X}}|{{Y}}", &[("X", "{{Y}}"), ("Y", "2")]);
        assert_eq!(out, "{{Y}}|2");
    }

    #[test]
    fn render_keeps_unknown_and_unterminated_placeholders() {
        assert_eq!(render("{{NOPE}} {{X", &[("X", "1")]), "{{NOPE}} {{X");
    }

    #[test]
    fn templates_only_use_known_keys() {
        for template in [WINGET, CHOCOLATEY] {
            let keys = [
                "NAME",
                "ID",
                "VERSION",
                "SOURCE",
                "ID_LITERAL",
                "LOG_FOLDER",
                "WINGET_INSTALL_SCRIPT",
                "CHOCO_EXECUTABLE",
                "POWERSHELL_EXECUTABLE",
            ];
            let values: Vec<(&str, &str)> = keys.iter().map(|k| (*k, "")).collect();
            assert!(!render(template, &values).contains("{{"));
        }
    }
}
