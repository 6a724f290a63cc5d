//! Command dispatch: load the forest, run one read-only query, print the result.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::{describe_value, enumerate, render_tree, ApplicationError};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{Forest, NodeKind, TreeError};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see 'kvtree --help'".to_string(),
        ));
    };

    match command {
        Commands::Completion { shell } => _completion(*shell),
        Commands::Config { command } => _config(cli, command),
        query => {
            let container = ServiceContainer::new(load_settings(cli)?);
            match query {
                Commands::Show { key } => _show(cli, &container, key),
                Commands::Tree { key } => _tree(cli, &container, key),
                Commands::Get { key } => _get(cli, &container, key),
                Commands::Type { key } => _type(cli, &container, key),
                Commands::Text { key, language } => _text(cli, &container, key, language),
                Commands::Check => _check(cli, &container),
                Commands::Completion { .. } | Commands::Config { .. } => Ok(()),
            }
        }
    }
}

/// Local config lives next to the data file: the one given with `--file`,
/// else the one configured globally or via env, else the working directory.
fn local_dir(cli: &Cli) -> CliResult<PathBuf> {
    let configured = match &cli.file {
        Some(_) => None,
        None => Settings::load(None)?.data_file,
    };
    match data_dir(cli.file.as_deref().or(configured.as_deref())) {
        Some(dir) => Ok(dir),
        None => env::current_dir()
            .map_err(|e| CliError::from(InfraError::io("resolve current directory", e))),
    }
}

fn data_dir(data_file: Option<&Path>) -> Option<PathBuf> {
    let parent = data_file?.parent()?;
    if parent.as_os_str().is_empty() {
        Some(PathBuf::from("."))
    } else {
        Some(parent.to_path_buf())
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let dir = local_dir(cli)?;
    debug!("local config dir: {}", dir.display());
    Ok(Settings::load(Some(&dir))?)
}

fn load_forest(cli: &Cli, container: &ServiceContainer) -> CliResult<Forest> {
    Ok(container.load_forest(cli.file.as_deref())?)
}

fn tree_err(e: TreeError) -> CliError {
    CliError::from(ApplicationError::from(e))
}

#[instrument(skip(cli, container))]
fn _show(cli: &Cli, container: &ServiceContainer, key: &str) -> CliResult<()> {
    let forest = load_forest(cli, container)?;
    let entries = enumerate(&forest, key).map_err(tree_err)?;

    if entries.is_empty() {
        output::warning(&format!("no values below '{}'", key));
        return Ok(());
    }
    for entry in entries {
        output::entry(entry.key, entry.value);
    }
    Ok(())
}

#[instrument(skip(cli, container))]
fn _tree(cli: &Cli, container: &ServiceContainer, key: &str) -> CliResult<()> {
    let forest = load_forest(cli, container)?;
    let tree = render_tree(&forest, key).map_err(tree_err)?;
    output::info(&tree);
    Ok(())
}

#[instrument(skip(cli, container))]
fn _get(cli: &Cli, container: &ServiceContainer, key: &str) -> CliResult<()> {
    let forest = load_forest(cli, container)?;
    let kind = forest.get_type(key).map_err(tree_err)?;

    match forest.get_value(key) {
        Some(value) if kind != NodeKind::Parent => {
            output::info(&describe_value(value));
            Ok(())
        }
        _ => Err(tree_err(TreeError::WrongNodeKind {
            key: key.to_string(),
            kind,
        })),
    }
}

#[instrument(skip(cli, container))]
fn _type(cli: &Cli, container: &ServiceContainer, key: &str) -> CliResult<()> {
    let forest = load_forest(cli, container)?;
    let kind = forest.get_type(key).map_err(tree_err)?;
    output::info(&kind);
    Ok(())
}

#[instrument(skip(cli, container))]
fn _text(cli: &Cli, container: &ServiceContainer, key: &str, language: &str) -> CliResult<()> {
    let forest = load_forest(cli, container)?;
    let fallback = container.settings.fallback_language.as_str();

    let text = forest
        .get_text_with_fallback(key, language, fallback)
        .ok_or_else(|| tree_err(TreeError::NoSuchTarget(key.to_string())))?;
    output::info(&text);
    Ok(())
}

#[instrument(skip(cli, container))]
fn _check(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    let path = container.resolve_data_file(cli.file.as_deref())?;
    let forest = container.ingest_service().load_file(&path)?;

    let sections = forest
        .node(forest.root())
        .map(|root| {
            root.children()
                .iter()
                .filter_map(|&idx| forest.node(idx))
                .map(|node| node.key())
                .join(", ")
        })
        .unwrap_or_default();

    output::success(&format!("{}: valid", path.display()));
    output::detail(&format!("nodes: {}", forest.len()));
    output::detail(&format!("depth: {}", forest.depth()));
    output::detail(&format!("sections: {}", sections));
    Ok(())
}

fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let dir = local_dir(cli)?;
            output::header("Config files");
            match global_config_path() {
                Some(path) => output::detail(&format!(
                    "global: {} {}",
                    path.display(),
                    existence(&path)
                )),
                None => output::detail("global: <no config directory>"),
            }
            let local = local_config_path(&dir);
            output::detail(&format!("local:  {} {}", local.display(), existence(&local)));
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}

fn existence(path: &Path) -> &'static str {
    if path.exists() {
        "(exists)"
    } else {
        "(not found)"
    }
}

fn _completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
