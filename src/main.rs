#![forbid(unsafe_code)]

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

use xset::menu::{self, MenuEntry};
use xset::{AppSettings, Autosave, Config, ContextSnapshot, Registry, SaveReport, Subject, TaskRequest, rules};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "xset")]
#[command(about = "Inspect and edit the file manager's settings registry")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the user config dir)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a context rule string against a snapshot
    Eval {
        /// Stored rule string
        #[arg(long)]
        rules: String,
        /// Snapshot variable as SUBJECT_INDEX=VALUE
        #[arg(long = "set", value_name = "IDX=VALUE")]
        vars: Vec<String>,
        /// Treat the snapshot as stale
        #[arg(long)]
        invalid: bool,
        /// Global action-disable policy
        #[arg(long)]
        actions_disabled: bool,
        /// Item-level "disable instead of hide"
        #[arg(long)]
        def_disable: bool,
    },
    /// List records in the session
    List,
    /// Print the menu rooted at HEAD
    Menu {
        head: String,
        #[arg(long = "set", value_name = "IDX=VALUE")]
        vars: Vec<String>,
    },
    /// Show what a custom command would run
    Run { name: String },
    /// Verify tree links
    Check,
    /// Drop orphaned plugin mirrors and plugin data
    Clean,
    /// Export a record and its submenu as a plugin
    Export { name: String, dir: PathBuf },
    /// Import a plugin as custom records
    Import {
        dir: PathBuf,
        /// Insert after this record
        #[arg(long)]
        after: String,
    },
}

fn parse_snapshot(vars: &[String]) -> Result<ContextSnapshot> {
    let mut snapshot = ContextSnapshot::new();
    for var in vars {
        let (index, value) = var
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected IDX=VALUE, got '{var}'"))?;
        let index: i64 = index.trim().parse().context(format!("Bad subject index in '{var}'"))?;
        let subject = Subject::from_index(index).ok_or_else(|| anyhow!("Unknown subject index {index}"))?;
        snapshot.set(subject, value);
    }
    Ok(snapshot)
}

fn print_menu(entries: &[MenuEntry], depth: usize) {
    for entry in entries {
        println!(
            "{:indent$}{} [{}] {:?}",
            "",
            entry.label.as_deref().unwrap_or(&entry.name),
            entry.name,
            entry.decision,
            indent = depth * 2
        );
        print_menu(&entry.children, depth + 1);
    }
}

/// Write the session through the autosave worker and wait for the result
fn persist(registry: &Registry, settings: &AppSettings, config: &Config) -> Result<()> {
    let autosave = Autosave::spawn(&config.session_path(), config.autosave_delay())?;
    autosave.request(registry.session_text(settings));
    autosave.flush();
    match autosave.wait_report(Duration::from_secs(30)) {
        Some(SaveReport::Saved { path, bytes }) => {
            info!(path = %path.display(), bytes, "Session saved");
            Ok(())
        }
        Some(SaveReport::Failed(message)) => bail!(message),
        None => bail!("Timed out waiting for session save"),
    }
}

fn open_registry(config: &Config) -> Result<(Registry, AppSettings)> {
    let mut registry = Registry::init(&config.settings_dir);
    let settings = registry.load_session(&config.session_path())?;
    let mut plugins = 0;
    for root in config.plugin_dirs() {
        plugins += registry.load_plugins(&root);
    }
    let linked = registry.link_mirrors();
    info!(records = registry.store().len(), plugins, linked, "Registry ready");
    Ok((registry, settings))
}

/// Open the registry, run `f` against it and tear it down
fn with_registry(config: &Config, f: impl FnOnce(&mut Registry, &AppSettings) -> Result<()>) -> Result<()> {
    let (mut registry, settings) = open_registry(config)?;
    let result = f(&mut registry, &settings);
    registry.teardown();
    result
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let mut config = Config::load_from(path)?;
            config.apply_env_overrides();
            config.validate_and_clamp();
            Ok(config)
        }
        None => Config::load(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.trace_level())
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Command::Eval {
            rules,
            vars,
            invalid,
            actions_disabled,
            def_disable,
        } => {
            let mut snapshot = parse_snapshot(&vars)?;
            snapshot.valid = !invalid;
            snapshot.actions_disabled = actions_disabled;
            println!("{:?}", rules::evaluate(&rules, &snapshot, def_disable));
        }
        Command::List => with_registry(&config, |registry, _| {
            for name in registry.store().names() {
                let Some(record) = registry.exists(&name) else { continue };
                let kind = if record.is_mirror() {
                    "mirror"
                } else if record.is_plugin() {
                    "plugin"
                } else if record.is_custom() {
                    "custom"
                } else {
                    "builtin"
                };
                println!("{name}\t{kind}\t{:?}\t{}", record.menu_style, record.menu_label.as_deref().unwrap_or(""));
            }
            Ok(())
        })?,
        Command::Menu { head, vars } => with_registry(&config, |registry, _| {
            if registry.exists(&head).is_none() {
                bail!("No record named '{head}'");
            }
            let snapshot = parse_snapshot(&vars)?;
            print_menu(&menu::build(registry, &head, &snapshot), 0);
            Ok(())
        })?,
        Command::Run { name } => with_registry(&config, |registry, _| {
            let request = TaskRequest::for_record(registry, &name).ok_or_else(|| anyhow!("'{name}' is not a command"))?;
            println!("{request:#?}");
            Ok(())
        })?,
        Command::Check => with_registry(&config, |registry, _| {
            let violations = registry.check_links();
            for violation in &violations {
                warn!(?violation, "Link invariant violated");
                println!("{violation:?}");
            }
            if !violations.is_empty() {
                bail!("{} link violation(s)", violations.len());
            }
            println!("ok");
            Ok(())
        })?,
        Command::Clean => with_registry(&config, |registry, settings| {
            let report = registry.clean_plugin_mirrors();
            println!("removed {} mirror(s), {} plugin data dir(s)", report.mirrors, report.data_dirs);
            persist(registry, settings, &config)
        })?,
        Command::Export { name, dir } => with_registry(&config, |registry, _| {
            registry.export_plugin(&name, &dir)?;
            println!("exported {name} to {}", dir.display());
            Ok(())
        })?,
        Command::Import { dir, after } => with_registry(&config, |registry, settings| {
            let top = registry.import_plugin(&dir, &after)?;
            println!("imported {} as {top}", dir.display());
            persist(registry, settings, &config)
                .inspect_err(|e| error!(error = %e, "Imported records were not saved"))
        })?,
    }

    Ok(())
}
