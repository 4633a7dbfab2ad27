//! Command dispatch: each command loads its fixture, runs one use case and prints the outcome

use tracing::{debug, instrument};

use crate::application::{DetachNodeCommand, PasteElementCommand, PostponeProgramTreeCommand};
use crate::cli::args::{Cli, Commands, ConfigCommands, TreeArgs};
use crate::cli::output;
use crate::cli::render::render_tree;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::prerequisite::{Language, Prerequisite};
use crate::domain::repository::ProgramTreeRepository;
use crate::domain::{DomainError, LinkType, NodeIdentity, PasteCommand, ProgramTreeIdentity};
use crate::infrastructure::{Fixture, InfraError, ServiceContainer};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Tree { tree }) => show_tree(cli, tree),
        Some(Commands::Check { tree }) => check(cli, tree),
        Some(Commands::Paste {
            tree,
            path,
            node_code,
            node_year,
            reference,
            optional,
            block,
            relative_credits,
            detach_from,
        }) => {
            let paste = PasteCommand {
                link_type: reference.then_some(LinkType::Reference),
                is_mandatory: !optional,
                block: *block,
                relative_credits: *relative_credits,
                path_where_to_detach: detach_from.clone(),
                ..PasteCommand::new(path.clone())
            };
            let command = PasteElementCommand {
                node_to_paste_code: node_code.clone(),
                node_to_paste_year: node_year.unwrap_or(tree.year),
                paste,
            };
            paste_element(cli, tree, &command)
        }
        Some(Commands::Detach { tree, path }) => detach(cli, tree, path),
        Some(Commands::Postpone { tree }) => postpone(cli, tree),
        Some(Commands::Prerequisite { expression, lang }) => prerequisite(expression, *lang),
        Some(Commands::Config { command }) => config(cli, command),
        Some(Commands::Completion { .. }) => Ok(()),
        None => Err(CliError::Usage("no command given, see --help".to_string())),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    Settings::load(cli.config.as_deref()).map_err(|e| CliError::Infra(InfraError::from(e)))
}

fn container(cli: &Cli, tree: &TreeArgs) -> CliResult<ServiceContainer> {
    let settings = load_settings(cli)?;
    let fixture = Fixture::load(&tree.fixture)?;
    Ok(ServiceContainer::new(settings, fixture)?)
}

fn print_tree(container: &ServiceContainer, identity: &ProgramTreeIdentity) -> CliResult<()> {
    let tree = ProgramTreeRepository::get(container.repository.as_ref(), identity)?;
    output::info(&render_tree(&tree));
    Ok(())
}

#[instrument(skip(cli))]
fn show_tree(cli: &Cli, tree: &TreeArgs) -> CliResult<()> {
    let container = container(cli, tree)?;
    print_tree(&container, &ProgramTreeIdentity::new(&tree.code, tree.year))
}

#[instrument(skip(cli))]
fn check(cli: &Cli, tree: &TreeArgs) -> CliResult<()> {
    let container = container(cli, tree)?;
    let identity = ProgramTreeIdentity::new(&tree.code, tree.year);
    container.program_tree_service.check_program_tree(&identity)?;
    output::success(&format!("{identity} satisfies every rule"));
    Ok(())
}

#[instrument(skip(cli))]
fn paste_element(cli: &Cli, tree: &TreeArgs, command: &PasteElementCommand) -> CliResult<()> {
    let container = container(cli, tree)?;
    let link = container.program_tree_service.paste_element(command)?;
    output::action("pasted", &link);
    print_tree(&container, &ProgramTreeIdentity::new(&tree.code, tree.year))
}

#[instrument(skip(cli))]
fn detach(cli: &Cli, tree: &TreeArgs, path: &str) -> CliResult<()> {
    let container = container(cli, tree)?;
    let link = container.program_tree_service.detach_node(&DetachNodeCommand {
        path_where_to_detach: path.to_string(),
    })?;
    output::action("detached", &link);
    print_tree(&container, &ProgramTreeIdentity::new(&tree.code, tree.year))
}

#[instrument(skip(cli))]
fn postpone(cli: &Cli, tree: &TreeArgs) -> CliResult<()> {
    let container = container(cli, tree)?;
    let created = container
        .postponement_service
        .postpone_program_tree(&PostponeProgramTreeCommand {
            from_code: tree.code.clone(),
            from_year: tree.year,
        })?;
    if created.is_empty() {
        output::info("nothing to postpone");
    }
    for identity in &created {
        output::action("created", identity);
    }
    Ok(())
}

#[instrument]
fn prerequisite(expression: &str, lang: Language) -> CliResult<()> {
    let parsed = Prerequisite::parse(expression, NodeIdentity::new("", 0), ProgramTreeIdentity::new("", 0))
        .map_err(DomainError::from)?;
    debug!(groups = parsed.groups.len(), "expression parsed");
    output::info(&parsed.to_expression(lang));
    Ok(())
}

fn config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml().map_err(InfraError::from)?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => {
                output::header("Global config");
                output::detail(&path.display());
            }
            None => return Err(CliError::Usage("no config directory on this platform".to_string())),
        },
    }
    Ok(())
}
