use anyhow::{Context, Result};
use armory_core::Config;
use armory_core::logging::LoggingConfig;
use armory_skills::{
    ContractViolation, SkillContract, create_registry, scaffold_template, validate_skill_contract,
};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "armory.toml";

/// Armory - skill capability registry for coding agents
#[derive(Parser, Debug)]
#[command(name = "armory")]
#[command(about = "Discover, validate and inspect agent skill contracts", long_about = None)]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to armory.toml (default: ./armory.toml, optional)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Local skills directory (overrides [registry].local_skills_dir)
    #[arg(long, value_name = "DIR")]
    skills_dir: Option<PathBuf>,

    /// Timeout for the global skills CLI (overrides [registry].cli_timeout_ms)
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Verbose output (debug logging)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sync the registry and list every skill
    List {
        /// Print the contracts as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Sync the registry and print one contract
    Show {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Check a contract file without touching the registry
    Validate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print a conservative contract template for a new local skill
    Scaffold {
        #[arg(value_name = "ID")]
        id: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let mut logging = LoggingConfig::from(config.logging.clone());
    if cli.verbose {
        logging = logging.with_level("debug");
    }
    let _guard = armory_core::init_logging(Some(logging)).context("Failed to initialize logging")?;

    if cli.verbose {
        eprintln!(
            "{} Local skills: {}",
            "Info:".blue().bold(),
            config.registry.resolved_local_dir().display()
        );
    }

    match cli.command {
        Commands::List { json } => cmd_list(&config, json).await,
        Commands::Show { id } => cmd_show(&config, &id).await,
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Scaffold { id } => cmd_scaffold(&config, &id),
    }
}

/// Load armory.toml and apply command-line overrides.
///
/// A missing default file means defaults; a missing file passed with `--config` is an error.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            Config::from_file(path).with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => Config::load_or_default(Path::new(DEFAULT_CONFIG_FILE))
            .with_context(|| format!("Failed to load {}", DEFAULT_CONFIG_FILE))?,
    };

    if let Some(dir) = &cli.skills_dir {
        config.registry.local_skills_dir = Some(dir.clone());
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        anyhow::ensure!(timeout_ms > 0, "--timeout-ms must be greater than zero");
        config.registry.cli_timeout_ms = timeout_ms;
    }

    Ok(config)
}

/// Sync, then print the inventory
async fn cmd_list(config: &Config, json: bool) -> Result<()> {
    let mut registry = create_registry(&config.registry);
    let report = registry
        .sync()
        .await
        .map_err(armory_core::Error::from)
        .context("Failed to sync skill registry")?;
    let skills = registry.get_all()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&skills)?);
        return Ok(());
    }

    println!("{}", "Skills".green().bold().underline());
    if skills.is_empty() {
        println!("  {}", "No skills registered".yellow());
    }
    for skill in &skills {
        let is_override = report.overrides.iter().any(|id| id == &skill.skill_id);
        println!("{}", render_skill_line(skill, is_override));
    }
    println!();
    println!(
        "{} {} global, {} local, {} registered, {} overridden",
        "Info:".blue().bold(),
        report.global,
        report.local,
        report.registered.to_string().cyan(),
        report.overrides.len()
    );

    Ok(())
}

/// Sync, then print one contract
async fn cmd_show(config: &Config, id: &str) -> Result<()> {
    let mut registry = create_registry(&config.registry);
    registry
        .sync()
        .await
        .map_err(armory_core::Error::from)
        .context("Failed to sync skill registry")?;

    match registry.get_skill(id)? {
        Some(skill) => {
            println!("{}", serde_json::to_string_pretty(skill)?);
            Ok(())
        }
        None => {
            let target = registry.local_skills_dir().join(format!("{id}.json"));
            anyhow::bail!(
                "Skill \"{}\" not found. Run `armory scaffold {}` and save it to {}",
                id,
                id,
                target.display()
            )
        }
    }
}

/// Validate a single contract file
fn cmd_validate(file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let raw: serde_json::Value =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", file.display()))?;

    match validate_skill_contract(&raw) {
        Ok(contract) => {
            println!(
                "{} {} is a valid {} contract for {}",
                "Success:".green().bold(),
                file.display(),
                contract.metadata.source,
                contract.skill_id.cyan()
            );
            Ok(())
        }
        Err(violations) => {
            eprint!("{}", render_violations(&violations));
            anyhow::bail!("{} is not a valid skill contract", file.display())
        }
    }
}

/// Print a template and where to save it
fn cmd_scaffold(config: &Config, id: &str) -> Result<()> {
    anyhow::ensure!(!id.trim().is_empty(), "Skill id must not be empty");

    let template = scaffold_template(id);
    println!("{}", serde_json::to_string_pretty(&template)?);

    let target = config.registry.resolved_local_dir().join(format!("{id}.json"));
    eprintln!("{} Save this to {} and fill in the TODOs", "Info:".blue().bold(), target.display());

    Ok(())
}

fn render_skill_line(skill: &SkillContract, is_override: bool) -> String {
    let mut flags = Vec::new();
    if skill.constraints.is_destructive {
        flags.push("destructive");
    }
    if skill.constraints.requires_hitl {
        flags.push("hitl");
    }
    if is_override {
        flags.push("override");
    }

    format!(
        "  {:<32} {:<6} {:<6} {}",
        skill.skill_id,
        skill.metadata.source.as_str(),
        skill.constraints.sandbox_type.as_str(),
        flags.join(", ")
    )
    .trim_end()
    .to_string()
}

fn render_violations(violations: &[ContractViolation]) -> String {
    violations.iter().map(|v| format!("  - {}\n", v.message)).collect()
}
