//! Pakt - Windows package search, script generation and deployment
//!
//! Usage:
//!   pakt search <query>          # Search winget and Chocolatey
//!   pakt parse <file> -s winget  # Normalize a saved search report
//!   pakt script <query>          # Generate an install script
//!   pakt deploy <query>          # Roll a package out to managed devices
//!   pakt credentials set         # Store enterprise credentials

mod interactive;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pakt_core::catalog::{CatalogSearch, CommandRunner, SearchScope};
use pakt_core::config::PaktConfig;
use pakt_core::context::AppContext;
use pakt_core::credentials::Credentials;
use pakt_core::deploy::{
    DeployOutcome, DeploymentOrchestrator, LogEntry, Session, Severity, Stage, Workflow,
    WorkflowEvent,
};
use pakt_core::script::{self, DirectorySink, SaveOutcome, ScriptSink};
use pakt_core::types::{PackageRecord, PackageSource};

use crate::interactive::{InteractiveFlow, PrefilledOptions, PromptSink};

#[derive(Parser)]
#[command(name = "pakt")]
#[command(about = "Windows package search, script generation and deployment", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the package catalogs
    Search {
        /// Text to search for
        query: String,

        /// Catalogs to query (both, winget, chocolatey)
        #[arg(long, short)]
        source: Option<String>,

        /// Drop results whose name and id do not contain the query
        #[arg(long)]
        filter: bool,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        format: OutputFormat,
    },

    /// Parse a saved package-manager search report
    Parse {
        /// Report file captured from `winget search` or `choco search`
        file: PathBuf,

        /// Package manager that produced the report (winget, chocolatey)
        #[arg(long, short)]
        source: String,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        format: OutputFormat,
    },

    /// Generate the PowerShell install script for a package
    Script(ScriptArgs),

    /// Deploy a package to managed devices
    Deploy(Box<DeployArgs>),

    /// Manage enterprise credentials
    Credentials(CredentialsArgs),
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

/// Options shared by commands that search and then pick one package.
#[derive(Args)]
struct SelectArgs {
    /// Text to search for
    query: String,

    /// Catalogs to query (both, winget, chocolatey)
    #[arg(long, short)]
    source: Option<String>,

    /// Package id to pick from the results
    #[arg(long)]
    id: Option<String>,

    /// Interactive mode - prompts for the package and confirmations
    #[arg(short, long)]
    interactive: bool,
}

#[derive(Args)]
struct ScriptArgs {
    #[command(flatten)]
    select: SelectArgs,

    /// Directory to save the script in
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print the script instead of saving it
    #[arg(long)]
    print: bool,
}

#[derive(Args)]
struct DeployArgs {
    #[command(flatten)]
    select: SelectArgs,

    /// Target group to assign the app to (repeatable)
    #[arg(long = "group", value_name = "GROUP")]
    groups: Vec<String>,

    /// Minimum operating system requirement
    #[arg(long)]
    requirements: Option<String>,

    /// Let the installer show its UI
    #[arg(long)]
    no_silent: bool,

    /// Keep the app updated after installation
    #[arg(long)]
    auto_update: bool,

    /// Make the simulated back end fail at this stage
    #[arg(long, value_name = "STAGE")]
    fail_at: Option<String>,

    /// Reason reported when --fail-at triggers
    #[arg(long, default_value = "Simulated failure", requires = "fail_at")]
    fail_reason: String,

    /// Skip all confirmation prompts (for CI/CD)
    #[arg(short = 'y', long)]
    yes: bool,
}

#[derive(Args)]
struct CredentialsArgs {
    #[command(subcommand)]
    command: CredentialsSubcommand,
}

#[derive(Subcommand)]
enum CredentialsSubcommand {
    /// Save credentials (missing values are prompted for)
    Set {
        #[arg(long)]
        tenant_id: Option<String>,

        #[arg(long)]
        client_id: Option<String>,

        #[arg(long)]
        client_secret: Option<String>,
    },

    /// Show whether credentials are configured
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pakt=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    run_cli(cli.command).await
}

async fn run_cli(command: Commands) -> Result<()> {
    let ctx = AppContext::from_env()?;
    dispatch(command, &ctx).await
}

/// Config is read only by the commands that use it, so a broken `pakt.toml`
/// cannot stop `parse` or `credentials`.
async fn dispatch(command: Commands, ctx: &AppContext) -> Result<()> {
    match command {
        Commands::Search {
            query,
            source,
            filter,
            format,
        } => run_search(ctx, &ctx.load_config()?, query, source, filter, format).await,
        Commands::Parse {
            file,
            source,
            format,
        } => run_parse(file, &source, format),
        Commands::Script(args) => run_script(ctx, &ctx.load_config()?, args).await,
        Commands::Deploy(args) => run_deploy(ctx, &ctx.load_config()?, *args).await,
        Commands::Credentials(args) => run_credentials(ctx, args),
    }
}

async fn run_search(
    ctx: &AppContext,
    config: &PaktConfig,
    query: String,
    source: Option<String>,
    filter: bool,
    format: OutputFormat,
) -> Result<()> {
    let scope = resolve_scope(config, source.as_deref())?;
    let search = ctx
        .catalog_search(config)
        .with_filter(filter || config.search.filter_results);
    let records = search.search(&query, scope).await?;
    print_records(&records, format)
}

fn run_parse(file: PathBuf, source: &str, format: OutputFormat) -> Result<()> {
    let source: PackageSource = source.parse()?;
    let content = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read report: {}", file.display()))?;
    let records = pakt_core::catalog::parse(source, &content);
    print_records(&records, format)
}

async fn run_script(ctx: &AppContext, config: &PaktConfig, args: ScriptArgs) -> Result<()> {
    let mut workflow = ctx.workflow(config);
    let search = ctx.catalog_search(config);
    let mut flow = InteractiveFlow::new(PrefilledOptions {
        id: args.select.id.clone(),
        ..Default::default()
    });

    if !select_package(&mut workflow, &search, &args.select, config, &mut flow).await? {
        return Ok(());
    }

    let session = workflow.session();
    let (Some(record), Some(script)) = (session.selection(), session.script()) else {
        anyhow::bail!("No package selected");
    };

    if args.print {
        print!("{}", script);
        return Ok(());
    }

    let suggested = script::suggested_filename(record);
    let outcome = match (&args.out, args.select.interactive) {
        (Some(dir), _) => DirectorySink::new(dir).save(script, &suggested)?,
        (None, true) => PromptSink::new(ctx.script_dir(config)).save(script, &suggested)?,
        (None, false) => ctx.script_sink(config).save(script, &suggested)?,
    };

    match outcome {
        SaveOutcome::Saved(path) => {
            println!("{} Saved {}", style("✓").green(), path.display());
        }
        SaveOutcome::Cancelled => println!("Save cancelled."),
    }
    Ok(())
}

async fn run_deploy(ctx: &AppContext, config: &PaktConfig, args: DeployArgs) -> Result<()> {
    let fail_at = args.fail_at.as_deref().map(parse_fail_stage).transpose()?;

    let mut settings = config.deploy.clone();
    if args.no_silent {
        settings.silent_install = false;
    }
    if args.auto_update {
        settings.auto_update = true;
    }
    let mut workflow = Workflow::new(settings);
    let search = ctx.catalog_search(config);
    let mut flow = InteractiveFlow::new(PrefilledOptions {
        id: args.select.id.clone(),
        groups: (!args.groups.is_empty() || !args.select.interactive)
            .then(|| args.groups.clone()),
        yes: args.yes,
    });

    if !select_package(&mut workflow, &search, &args.select, config, &mut flow).await? {
        return Ok(());
    }

    let mut deployment = workflow
        .session()
        .config()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("No package selected"))?;
    if let Some(requirements) = &args.requirements {
        deployment = deployment.with_requirements(requirements);
    }
    for group in flow.prompt_groups()? {
        deployment.add_target_group(group);
    }
    workflow.apply(WorkflowEvent::ConfigUpdated(deployment.clone()))?;

    if !flow.confirm_deploy(&deployment)? {
        println!("Deployment cancelled.");
        return Ok(());
    }

    let gate = ctx.credential_gate()?;
    let mut backend = ctx.simulated_backend(config);
    if let Some(stage) = fail_at {
        backend = backend.failing_at(stage, &args.fail_reason);
    }
    let orchestrator = DeploymentOrchestrator::new(backend);

    let outcome = orchestrator
        .run(&mut workflow, &gate, |session, appended| {
            print_progress(session, appended)
        })
        .await?;

    match outcome {
        DeployOutcome::Succeeded => {
            println!();
            println!(
                "{} {} is deployed. Review it at {}",
                style("✓").green(),
                deployment.display_name,
                style(config.deploy.portal_url.as_str()).cyan()
            );
            Ok(())
        }
        DeployOutcome::Rejected => {
            anyhow::bail!("Enterprise credentials are missing. Run `pakt credentials set` first")
        }
        DeployOutcome::Failed(failure) => Err(failure.into()),
    }
}

fn run_credentials(ctx: &AppContext, args: CredentialsArgs) -> Result<()> {
    let mut gate = ctx.credential_gate()?;

    match args.command {
        CredentialsSubcommand::Set {
            tenant_id,
            client_id,
            client_secret,
        } => {
            let credentials = Credentials::new(
                interactive::value_or_prompt(tenant_id, "Tenant ID")?,
                interactive::value_or_prompt(client_id, "Client ID")?,
                match client_secret {
                    Some(secret) => secret,
                    None => interactive::prompt_secret("Client secret")?,
                },
            );
            gate.set(credentials)?;
            println!(
                "{} Credentials saved to {}",
                style("✓").green(),
                ctx.keystore().path().display()
            );
        }
        CredentialsSubcommand::Status => match gate.credentials() {
            Some(credentials) => println!(
                "Credentials configured (tenant {}, client {})",
                credentials.tenant_id, credentials.client_id
            ),
            None => {
                println!("No credentials configured.");
                println!("Add them with: pakt credentials set");
            }
        },
    }
    Ok(())
}

/// Search, record the outcome in the workflow and select one package.
///
/// Returns `false` when there is nothing to select.
async fn select_package<R: CommandRunner>(
    workflow: &mut Workflow,
    search: &CatalogSearch<R>,
    args: &SelectArgs,
    config: &PaktConfig,
    flow: &mut InteractiveFlow,
) -> Result<bool> {
    let scope = resolve_scope(config, args.source.as_deref())?;

    print_entries(&workflow.apply(WorkflowEvent::SearchStarted {
        query: args.query.clone(),
    })?);

    let results = match search.search(&args.query, scope).await {
        Ok(results) => results,
        Err(error) => {
            print_entries(&workflow.apply(WorkflowEvent::SearchFailed {
                reason: error.to_string(),
            })?);
            return Err(error.into());
        }
    };
    print_entries(&workflow.apply(WorkflowEvent::SearchCompleted { results })?);

    let results = workflow.session().results();
    if results.is_empty() {
        println!("No packages found.");
        return Ok(false);
    }

    let index = match resolve_selection(results, args.id.as_deref())? {
        Some(index) => index,
        None if args.interactive => flow.choose_package(results)?,
        None => {
            print_records_table(results);
            anyhow::bail!(
                "{} packages match '{}'. Pick one with --id <id> or use --interactive",
                results.len(),
                args.query
            );
        }
    };

    print_entries(&workflow.apply(WorkflowEvent::PackageSelected { index })?);
    Ok(true)
}

/// Index chosen by `id`, or the only result when there is exactly one.
fn resolve_selection(results: &[PackageRecord], id: Option<&str>) -> Result<Option<usize>> {
    match id {
        Some(id) => results
            .iter()
            .position(|record| record.id.eq_ignore_ascii_case(id))
            .map(Some)
            .ok_or_else(|| anyhow::anyhow!("No result has id '{}'", id)),
        None if results.len() == 1 => Ok(Some(0)),
        None => Ok(None),
    }
}

fn resolve_scope(config: &PaktConfig, source: Option<&str>) -> Result<SearchScope> {
    match source {
        Some(source) => source.parse(),
        None => Ok(config.search.default_scope),
    }
}

fn parse_fail_stage(s: &str) -> Result<Stage> {
    let stage: Stage = s.parse()?;
    if !stage.is_remote() {
        anyhow::bail!(
            "Stage '{}' runs locally and cannot be made to fail",
            stage.name()
        );
    }
    Ok(stage)
}

fn print_records(records: &[PackageRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_records_table(records),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
    }
    Ok(())
}

fn print_records_table(records: &[PackageRecord]) {
    if records.is_empty() {
        println!("No packages found.");
        return;
    }

    println!("{:<36} {:<40} {:<16} Source", "Name", "Id", "Version");
    println!("{}", "-".repeat(104));

    for record in records {
        println!(
            "{:<36} {:<40} {:<16} {}",
            truncate(&record.name, 36),
            truncate(&record.id, 40),
            truncate(&record.version, 16),
            record.source
        );
    }
}

fn print_progress(session: &Session, appended: &[LogEntry]) {
    print_entries(appended);
    let progress = session.progress();
    if progress.completed > 0 {
        println!("  {}", style(format!("progress {}", progress)).dim());
    }
}

fn print_entries(entries: &[LogEntry]) {
    for entry in entries {
        let time = entry
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%H:%M:%S");
        let marker = match entry.severity {
            Severity::Info => style("•").blue(),
            Severity::Success => style("✓").green(),
            Severity::Error => style("✗").red(),
        };
        println!("[{}] {} {}", time, marker, entry.message);
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", kept)
}
