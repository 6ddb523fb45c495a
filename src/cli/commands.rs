//! Command dispatch

use std::collections::BTreeMap;
use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::paging::PageParams;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{NodeId, NodeView};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::store::seed_if_empty;
use crate::infrastructure::InfraError;
use crate::server;

/// Load settings: config files and env, then command-line overrides.
pub fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(database) = &cli.database {
        settings.database = Some(database.clone());
    }
    debug!(?settings.database, bind = %settings.bind, "settings loaded");
    Ok(settings)
}

pub fn execute(cli: Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `orgchart --help`".to_string(),
        ));
    };

    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => cmd_config(&cli, command),
        Commands::Serve { bind } => {
            let mut settings = load_settings(&cli)?;
            if let Some(bind) = bind {
                settings.bind = bind.to_string();
            }
            cmd_serve(settings)
        }
        Commands::Seed => {
            let mut settings = load_settings(&cli)?;
            settings.seed = false;
            cmd_seed(&ServiceContainer::new(settings)?)
        }
        _ => {
            let services = ServiceContainer::new(load_settings(&cli)?)?;
            match command {
                Commands::List {
                    language,
                    page_num,
                    page_size,
                } => cmd_list(&services, language, PageParams::new(page_num.clone(), page_size.clone())),
                Commands::Get { id, language } => cmd_get(&services, *id, language),
                Commands::Children {
                    id,
                    language,
                    search,
                    page_num,
                    page_size,
                } => cmd_children(
                    &services,
                    *id,
                    language,
                    search,
                    PageParams::new(page_num.clone(), page_size.clone()),
                ),
                Commands::Insert { parent, names } => cmd_insert(&services, *parent, names),
                Commands::Tree { language } => cmd_tree(&services, language),
                Commands::Check => cmd_check(&services),
                Commands::Completion { .. }
                | Commands::Config { .. }
                | Commands::Serve { .. }
                | Commands::Seed => Ok(()),
            }
        }
    }
}

fn cmd_serve(settings: Settings) -> CliResult<()> {
    let addr = settings.bind_addr()?;
    let services = ServiceContainer::new(settings)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| InfraError::io("start async runtime", e))?;
    output::info(&format!("serving on http://{addr}"));
    runtime.block_on(server::run(services, addr))?;
    Ok(())
}

#[instrument(skip(services))]
fn cmd_list(services: &ServiceContainer, language: &str, page: PageParams) -> CliResult<()> {
    let nodes = services.query.list_nodes(Some(language), &page)?;
    output::nodes(&nodes);
    Ok(())
}

#[instrument(skip(services))]
fn cmd_get(services: &ServiceContainer, id: i64, language: &str) -> CliResult<()> {
    let nodes = services.query.get_node(id, Some(language))?;
    output::nodes(&nodes);
    Ok(())
}

#[instrument(skip(services))]
fn cmd_children(
    services: &ServiceContainer,
    id: i64,
    language: &str,
    search: &str,
    page: PageParams,
) -> CliResult<()> {
    let nodes = services
        .query
        .search_children(id, Some(language), Some(search), &page)?;
    output::nodes(&nodes);
    Ok(())
}

/// Parse repeated `LANG=NAME` arguments.
pub fn parse_names(raw: &[String]) -> CliResult<BTreeMap<String, String>> {
    raw.iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(lang, name)| (lang.trim().to_string(), name.to_string()))
                .ok_or_else(|| CliError::InvalidArgs(format!("expected LANG=NAME, got {pair:?}")))
        })
        .collect()
}

#[instrument(skip(services))]
fn cmd_insert(services: &ServiceContainer, parent: i64, names: &[String]) -> CliResult<()> {
    let names = parse_names(names)?;
    let node = services.tree.insert_child(NodeId(parent), &names)?;
    let name = services
        .tree
        .resolve_name(&node, services.settings.languages.fallback.as_str());
    output::success(&format!("created node {} under {parent}", node.id));
    output::info(&output::node_line(&NodeView::new(&node, name)));
    Ok(())
}

#[instrument(skip(services))]
fn cmd_tree(services: &ServiceContainer, language: &str) -> CliResult<()> {
    let forest = services.tree.forest(language)?;
    if forest.is_empty() {
        output::warning("the store holds no nodes");
    }
    for tree in forest.to_tree_strings() {
        output::info(&tree);
    }
    Ok(())
}

fn cmd_check(services: &ServiceContainer) -> CliResult<()> {
    let report = services.tree.check_consistency()?;
    output::header(&format!(
        "{} node(s), {} root(s)",
        report.nodes, report.roots
    ));
    if report.is_consistent() {
        output::success("nested set is consistent");
        return Ok(());
    }
    for violation in &report.violations {
        output::failure(violation);
    }
    Err(CliError::Inconsistent {
        violations: report.violations.len(),
    })
}

fn cmd_seed(services: &ServiceContainer) -> CliResult<()> {
    let seeded = seed_if_empty(services.store.as_ref())
        .map_err(|e| InfraError::store("seed store", e))?;
    if seeded {
        output::success("loaded reference org chart");
    } else {
        output::warning("store already holds nodes, nothing loaded");
    }
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let state = if path.exists() { "exists" } else { "not found" };
                    output::info(&format!("global: {} ({state})", path.display()));
                }
                None => output::info("global: unavailable (no home directory)"),
            }
            if let Some(path) = &cli.config {
                output::info(&format!("explicit: {}", path.display()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_lang_name_pairs_when_parsing_then_map() {
        let names = parse_names(&["English=Legal".into(), "Italian=Ufficio = legale".into()]).unwrap();
        assert_eq!(names["English"], "Legal");
        assert_eq!(names["Italian"], "Ufficio = legale");
    }

    #[test]
    fn given_pair_without_equals_when_parsing_then_invalid_args() {
        let err = parse_names(&["English".into()]).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgs(_)));
    }
}
