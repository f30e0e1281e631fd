//! `codemap` - admin tool for medical codes, master lists and mappings
//!
//! Talks to the mapping backend over HTTP. Configuration comes from
//! `codemap.toml`, `CODEMAP__*` environment variables and the global flags
//! below, in increasing order of precedence.

mod commands;
mod config;
mod logging;

use anyhow::Context;
use clap::{Parser, Subcommand};

use codemap_client::HttpMapperClient;
use codemap_core::{Category, Relationship};

use crate::commands::ItemArg;

#[derive(Parser)]
#[command(name = "codemap")]
#[command(version, about = "Curate medical codes, master lists and code mappings")]
struct Cli {
    /// Backend base URL (overrides api.base_url)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log level (overrides logging.level)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Assume "yes" for confirmation prompts
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the backend, and the auxiliary service if configured, are reachable
    Health,
    /// List the known clients
    Clients,
    /// Medical codes
    #[command(subcommand)]
    Codes(CodeCommand),
    /// Master lists (labs, physicalExam, treatment, medications, mustRequiredCondition)
    #[command(subcommand)]
    Master(MasterCommand),
    /// Submit a group of master items for a code
    Select {
        /// Code text or id
        #[arg(long)]
        code: String,
        /// Client the group is submitted for
        #[arg(long)]
        client: String,
        /// Items as CATEGORY:ITEM[@FREQUENCY], e.g. labs:CBC@3
        #[arg(long = "item", required = true)]
        items: Vec<ItemArg>,
    },
    /// Previously submitted groups
    #[command(subcommand)]
    Groups(GroupCommand),
    /// Mappings between master items and codes
    #[command(subcommand)]
    Mapping(MappingCommand),
}

#[derive(Subcommand)]
enum CodeCommand {
    /// List codes, optionally filtered
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Add a code
    Add { text: String },
    /// Show the master items attached to a code, per category
    Show { code: String },
}

#[derive(Subcommand)]
enum MasterCommand {
    /// List a master list, optionally filtered
    List {
        category: Category,
        #[arg(long)]
        search: Option<String>,
    },
    /// Add an item to a master list
    Add { category: Category, text: String },
    /// Show CUIs resolved from an item's text
    Details { category: Category, item: String },
    /// Delete an item from a master list
    Delete { category: Category, item: String },
}

#[derive(Subcommand)]
enum GroupCommand {
    /// List the groups submitted for a code
    List { code: String },
    /// Delete one group of a code
    Delete { code: String, group_id: i64 },
}

#[derive(clap::Args)]
struct MappingTarget {
    category: Category,
    /// Master item text or id
    #[arg(long)]
    item: String,
    /// Code text or id
    #[arg(long)]
    code: String,
}

#[derive(clap::Args)]
struct Qualifiers {
    #[arg(long)]
    relationship: Option<Relationship>,
    #[arg(long)]
    value1: Option<String>,
    #[arg(long)]
    value2: Option<String>,
    #[arg(long)]
    unit: Option<String>,
    #[arg(long)]
    except_value: Option<String>,
    #[arg(long)]
    comment: Option<String>,
}

#[derive(Subcommand)]
enum MappingCommand {
    /// Map a master item to a code. Qualifiers are only sent for labs.
    Add {
        #[command(flatten)]
        target: MappingTarget,
        #[command(flatten)]
        qualifiers: Qualifiers,
    },
    /// Show the stored mapping rows
    Show {
        #[command(flatten)]
        target: MappingTarget,
    },
    /// Delete a mapping
    Delete {
        #[command(flatten)]
        target: MappingTarget,
    },
    /// Show the CUIs attached to a mapping
    Cuis {
        #[command(flatten)]
        target: MappingTarget,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = config::Config::load().context("Failed to load configuration")?;
    if let Some(url) = cli.base_url {
        config.api.base_url = url;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    logging::init_logging(&config.logging).context("Failed to initialize logging")?;
    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.api.base_url,
        "Starting codemap"
    );

    let api = HttpMapperClient::new(config.client_config())
        .context("Failed to build backend client")?;
    let mut prompt = commands::Prompt::new(cli.yes);

    match cli.command {
        Commands::Health => commands::health(&api).await,
        Commands::Clients => commands::clients(&api).await,
        Commands::Codes(CodeCommand::List { search }) => {
            commands::list_codes(&api, search.as_deref()).await
        }
        Commands::Codes(CodeCommand::Add { text }) => commands::add_code(&api, &text).await,
        Commands::Codes(CodeCommand::Show { code }) => commands::show_code(&api, &code).await,
        Commands::Master(MasterCommand::List { category, search }) => {
            commands::list_master(&api, category, search.as_deref()).await
        }
        Commands::Master(MasterCommand::Add { category, text }) => {
            commands::add_master(&api, category, &text).await
        }
        Commands::Master(MasterCommand::Details { category, item }) => {
            commands::master_details(&api, category, &item).await
        }
        Commands::Master(MasterCommand::Delete { category, item }) => {
            commands::delete_master(&api, &mut prompt, category, &item).await
        }
        Commands::Select {
            code,
            client,
            items,
        } => commands::select(&api, &code, &client, &items).await,
        Commands::Groups(GroupCommand::List { code }) => commands::list_groups(&api, &code).await,
        Commands::Groups(GroupCommand::Delete { code, group_id }) => {
            commands::delete_group(&api, &mut prompt, &code, group_id).await
        }
        Commands::Mapping(MappingCommand::Add { target, qualifiers }) => {
            let qualifiers = commands::QualifierArgs {
                relationship: qualifiers.relationship,
                value1: qualifiers.value1,
                value2: qualifiers.value2,
                unit: qualifiers.unit,
                except_value: qualifiers.except_value,
                comment: qualifiers.comment,
            };
            commands::add_mapping(&api, target.category, &target.item, &target.code, qualifiers)
                .await
        }
        Commands::Mapping(MappingCommand::Show { target }) => {
            commands::show_mapping(&api, target.category, &target.item, &target.code).await
        }
        Commands::Mapping(MappingCommand::Delete { target }) => {
            commands::delete_mapping(
                &api,
                &mut prompt,
                target.category,
                &target.item,
                &target.code,
            )
            .await
        }
        Commands::Mapping(MappingCommand::Cuis { target }) => {
            commands::mapping_cuis(&api, target.category, &target.item, &target.code).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_select_items() {
        let cli = Cli::try_parse_from([
            "codemap",
            "select",
            "--code",
            "A00.1",
            "--client",
            "City Clinic",
            "--item",
            "labs:CBC@3",
            "--item",
            "mustRequiredCondition:Pregnancy",
        ])
        .unwrap();
        match cli.command {
            Commands::Select { items, .. } => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[0].category, Category::Labs);
                assert_eq!(items[0].frequency, Some(3));
                assert_eq!(items[1].category, Category::MustRequiredCondition);
            }
            _ => panic!("expected select"),
        }
    }

    #[test]
    fn rejects_unknown_categories() {
        assert!(Cli::try_parse_from(["codemap", "master", "list", "vitals"]).is_err());
        assert!(Cli::try_parse_from([
            "codemap",
            "mapping",
            "add",
            "labs",
            "--item",
            "CBC",
            "--code",
            "A00.1",
            "--relationship",
            "between",
            "--value1",
            "4",
            "--value2",
            "10",
        ])
        .is_ok());
    }
}
