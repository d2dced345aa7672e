//! TOML parser with helpful error messages

use super::schema::PaktConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Parse pakt.toml with detailed error messages
pub fn parse_pakt_toml(path: &Path) -> Result<PaktConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_pakt_toml_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse pakt.toml content from string
pub fn parse_pakt_toml_str(content: &str) -> Result<PaktConfig> {
    let config: PaktConfig =
        toml::from_str(content).map_err(|e| enhance_toml_error(e, content))?;

    config.validate()?;

    Ok(config)
}

/// Enhance TOML parsing errors with the offending lines
fn enhance_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let error_msg = error.message().to_string();

    let line_hint = error
        .span()
        .and_then(|span| content.get(..span.start))
        .map(|before| before.matches('\n').count() + 1);

    if let Some(line_num) = line_hint {
        let context = get_line_context(content, line_num);
        anyhow::anyhow!(
            "TOML parsing error at line {}:\n{}\n\nError: {}",
            line_num,
            context,
            error_msg
        )
    } else {
        anyhow::anyhow!("TOML parsing error: {}", error_msg)
    }
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2).min(lines.len());
    let end = (line_num + 1).min(lines.len());

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize a configuration to TOML string
pub fn to_toml(config: &PaktConfig) -> Result<String> {
    toml::to_string_pretty(config).with_context(|| "Failed to serialize configuration to TOML")
}
