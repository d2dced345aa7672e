//! Interactive flow for script and deploy commands.
//!
//! Prompts for whatever the command line left open when `-i` is passed.
//! Uses dialoguer for terminal UI prompts.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, Password, Select, theme::ColorfulTheme};

use pakt_core::deploy::DeploymentConfig;
use pakt_core::script::{DirectorySink, SaveOutcome, ScriptSink};
use pakt_core::types::PackageRecord;

/// Pre-filled values from CLI args that skip prompts.
#[derive(Debug, Clone, Default)]
pub struct PrefilledOptions {
    /// Package id - if Some, skip package selection
    pub id: Option<String>,
    /// Target groups - if Some, skip the group prompt
    pub groups: Option<Vec<String>>,
    /// Skip all confirmations
    pub yes: bool,
}

pub struct InteractiveFlow<W: Write = io::Stdout> {
    prefilled: PrefilledOptions,
    /// Output writer (for testing)
    writer: W,
    theme: ColorfulTheme,
}

impl InteractiveFlow<io::Stdout> {
    pub fn new(prefilled: PrefilledOptions) -> Self {
        Self {
            prefilled,
            writer: io::stdout(),
            theme: ColorfulTheme::default(),
        }
    }
}

impl<W: Write> InteractiveFlow<W> {
    /// Create a new interactive flow with custom writer (for testing).
    #[cfg(test)]
    pub fn with_writer(prefilled: PrefilledOptions, writer: W) -> Self {
        Self {
            prefilled,
            writer,
            theme: ColorfulTheme::default(),
        }
    }

    /// Index of the package the operator picks from `results`.
    pub fn choose_package(&self, results: &[PackageRecord]) -> Result<usize> {
        if let Some(id) = &self.prefilled.id
            && let Some(index) = results.iter().position(|r| r.id.eq_ignore_ascii_case(id))
        {
            return Ok(index);
        }

        let items: Vec<String> = results.iter().map(package_label).collect();
        let selection = Select::with_theme(&self.theme)
            .with_prompt("Select a package")
            .items(&items)
            .default(0)
            .interact()?;

        Ok(selection)
    }

    /// Target groups to add to the deployment.
    pub fn prompt_groups(&self) -> Result<Vec<String>> {
        if let Some(groups) = &self.prefilled.groups {
            return Ok(groups.clone());
        }

        let input: String = Input::with_theme(&self.theme)
            .with_prompt("Target groups (comma-separated, empty for none)")
            .allow_empty(true)
            .interact_text()?;

        Ok(split_groups(&input))
    }

    /// Print the deployment summary and ask for confirmation.
    pub fn confirm_deploy(&mut self, config: &DeploymentConfig) -> Result<bool> {
        self.write_summary(config)?;

        if self.prefilled.yes {
            return Ok(true);
        }

        let confirmed = Confirm::with_theme(&self.theme)
            .with_prompt("Proceed with deployment?")
            .default(true)
            .interact()?;

        Ok(confirmed)
    }

    fn write_summary(&mut self, config: &DeploymentConfig) -> Result<()> {
        let on_off = |flag: bool| if flag { "yes" } else { "no" };

        writeln!(self.writer)?;
        writeln!(self.writer, "{}", style("  Deployment summary").bold())?;
        writeln!(self.writer, "  ───────────────────────────")?;
        writeln!(
            self.writer,
            "  App:          {} {}",
            style(&config.display_name).green(),
            config.version
        )?;
        writeln!(self.writer, "  Id:           {}", style(&config.app_id).green())?;
        if !config.publisher.is_empty() {
            writeln!(self.writer, "  Publisher:    {}", config.publisher)?;
        }
        writeln!(self.writer, "  Install:      {}", config.install_command)?;
        writeln!(self.writer, "  Uninstall:    {}", config.uninstall_command)?;
        writeln!(self.writer, "  Requirements: {}", config.requirements)?;
        writeln!(self.writer, "  Silent:       {}", on_off(config.silent_install))?;
        writeln!(self.writer, "  Auto-update:  {}", on_off(config.auto_update))?;
        writeln!(self.writer, "  As SYSTEM:    {}", on_off(config.install_as_system))?;

        let groups = if config.target_groups.is_empty() {
            "(none)".to_string()
        } else {
            config
                .target_groups
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        };
        writeln!(self.writer, "  Groups:       {}", style(groups).green())?;
        writeln!(self.writer)?;
        Ok(())
    }
}

/// Sink that asks where to save and lets the operator back out.
pub struct PromptSink {
    default_dir: PathBuf,
    theme: ColorfulTheme,
}

impl PromptSink {
    pub fn new(default_dir: PathBuf) -> Self {
        Self {
            default_dir,
            theme: ColorfulTheme::default(),
        }
    }
}

impl ScriptSink for PromptSink {
    fn save(&self, script: &str, suggested_name: &str) -> Result<SaveOutcome> {
        let save = Confirm::with_theme(&self.theme)
            .with_prompt(format!("Save {}?", suggested_name))
            .default(true)
            .interact()?;
        if !save {
            return Ok(SaveOutcome::Cancelled);
        }

        let dir: String = Input::with_theme(&self.theme)
            .with_prompt("Directory")
            .default(self.default_dir.display().to_string())
            .interact_text()?;

        DirectorySink::new(dir.trim()).save(script, suggested_name)
    }
}

/// `value` when given, otherwise a non-empty answer from the operator.
pub fn value_or_prompt(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Ok(Input::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .interact_text()?),
    }
}

/// Hidden-input prompt for secrets.
pub fn prompt_secret(prompt: &str) -> Result<String> {
    Ok(Password::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact()?)
}

fn package_label(record: &PackageRecord) -> String {
    format!(
        "{}  {}  {}  [{}]",
        record.name, record.id, record.version, record.source
    )
}

fn split_groups(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|group| !group.is_empty())
        .map(str::to_string)
        .collect()
}
