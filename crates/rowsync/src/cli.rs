//! Clap derive structures for the `rowsync` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};

use rowsync_core::{AttributeField, DictionaryKind, EntityField};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// rowsync -- review and edit validated entity metadata
#[derive(Debug, Parser)]
#[command(
    name = "rowsync",
    version,
    about = "Review and edit validated entity metadata from the command line",
    long_about = "Loads entities and their attributes from the record service, shows the\n\
        validation state of every field, and sends edits back for revalidation.\n\
        Selected entities can be exported as a text document.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Service profile to use
    #[arg(long, short = 'p', env = "ROWSYNC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Record service URL (overrides profile)
    #[arg(long, env = "ROWSYNC_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Dictionary service URL (overrides profile)
    #[arg(long, env = "ROWSYNC_DICTIONARY_URL", global = true)]
    pub dictionary_url: Option<String>,

    /// Metadata service URL (overrides profile)
    #[arg(long, env = "ROWSYNC_METADATA_URL", global = true)]
    pub metadata_url: Option<String>,

    /// Username for the record service
    #[arg(long, short = 'u', env = "ROWSYNC_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password for the record service
    #[arg(long, env = "ROWSYNC_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ROWSYNC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "ROWSYNC_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "ROWSYNC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage entities
    #[command(alias = "ent", alias = "e")]
    Entities(EntitiesArgs),

    /// Manage the attributes of an entity
    #[command(alias = "attr", alias = "a")]
    Attributes(AttributesArgs),

    /// Manage imported files
    #[command(alias = "f")]
    Files(FilesArgs),

    /// Show lookup dictionaries
    #[command(alias = "dict")]
    Dicts(DictsArgs),

    /// Export selected entities as a text document
    Export(ExportArgs),

    /// Check the exported document against the metadata service
    Validate(ValidateArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Value parsers ────────────────────────────────────────────────────

fn parse_entity_field(s: &str) -> Result<EntityField, String> {
    EntityField::from_str(s).map_err(|_| format!("unknown entity field '{s}'"))
}

fn parse_attribute_field(s: &str) -> Result<AttributeField, String> {
    AttributeField::from_str(s).map_err(|_| format!("unknown attribute field '{s}'"))
}

fn parse_dictionary_kind(s: &str) -> Result<DictionaryKind, String> {
    DictionaryKind::from_str(s).map_err(|_| format!("unknown dictionary '{s}'"))
}

/// `ENTITY=ATTR[,ATTR...]`
fn parse_pick(s: &str) -> Result<AttributePick, String> {
    let (entity, attrs) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ENTITY=ATTR[,ATTR...], got '{s}'"))?;
    let entity = entity
        .trim()
        .parse()
        .map_err(|_| format!("invalid entity id '{entity}'"))?;
    let attributes = attrs
        .split(',')
        .filter(|a| !a.trim().is_empty())
        .map(|a| {
            a.trim()
                .parse()
                .map_err(|_| format!("invalid attribute id '{a}'"))
        })
        .collect::<Result<Vec<i64>, String>>()?;
    Ok(AttributePick { entity, attributes })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ENTITIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EntitiesArgs {
    #[command(subcommand)]
    pub command: EntitiesCommand,
}

#[derive(Debug, Subcommand)]
pub enum EntitiesCommand {
    /// List entities
    #[command(alias = "ls")]
    List {
        /// Show only entities imported from these files (manual entities
        /// are always shown)
        #[arg(long = "file", value_name = "FILE_ID")]
        files: Vec<i64>,

        /// Show only entities with field errors on them or their attributes
        #[arg(long)]
        errors: bool,
    },

    /// Show one entity with its validation messages
    Get {
        /// Entity ID
        entity: i64,
    },

    /// Set one field of an entity
    Set {
        /// Entity ID
        entity: i64,

        /// Field name (e.g. entityName, tableType, changeType)
        #[arg(value_parser = parse_entity_field)]
        field: EntityField,

        /// New value (omit to clear the field)
        value: Option<String>,
    },

    /// Create an empty entity
    Add,

    /// Copy an entity with all of its attributes
    Copy {
        /// Source entity ID
        entity: i64,
    },

    /// Delete an entity
    #[command(alias = "rm")]
    Remove {
        /// Entity ID
        entity: i64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ATTRIBUTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AttributesArgs {
    #[command(subcommand)]
    pub command: AttributesCommand,
}

#[derive(Debug, Subcommand)]
pub enum AttributesCommand {
    /// List the attributes of an entity
    #[command(alias = "ls")]
    List {
        /// Entity ID
        entity: i64,
    },

    /// Set one field of an attribute
    Set {
        /// Entity ID
        entity: i64,

        /// Attribute ID
        attribute: i64,

        /// Field name (e.g. attrName, attrType, attrSize)
        #[arg(value_parser = parse_attribute_field)]
        field: AttributeField,

        /// New value (omit to clear the field)
        value: Option<String>,
    },

    /// Add an empty attribute to an entity
    Add {
        /// Entity ID
        entity: i64,
    },

    /// Copy an attribute within its entity
    Copy {
        /// Entity ID
        entity: i64,

        /// Source attribute ID
        attribute: i64,
    },

    /// Delete an attribute
    #[command(alias = "rm")]
    Remove {
        /// Entity ID
        entity: i64,

        /// Attribute ID
        attribute: i64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FILES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct FilesArgs {
    #[command(subcommand)]
    pub command: FilesCommand,
}

#[derive(Debug, Subcommand)]
pub enum FilesCommand {
    /// List imported files
    #[command(alias = "ls")]
    List,

    /// Delete an imported file and every entity it produced
    #[command(alias = "rm")]
    Remove {
        /// File ID
        file: i64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DICTIONARIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DictsArgs {
    #[command(subcommand)]
    pub command: DictsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DictsCommand {
    /// Show how many entries each dictionary holds
    #[command(alias = "ls")]
    List,

    /// Show the entries of one dictionary
    Show {
        /// Dictionary (change-types, table-types, entity-types,
        /// storage-types, attribute-types, domains, connection-points)
        #[arg(value_parser = parse_dictionary_kind)]
        kind: DictionaryKind,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  EXPORT / VALIDATE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Entities and attributes that go into the document.
#[derive(Debug, Args)]
pub struct SelectionArgs {
    /// Entity to include (repeatable; nothing selected exports everything)
    #[arg(long = "entity", short = 'e', value_name = "ENTITY_ID")]
    pub entities: Vec<i64>,

    /// Attributes to include for an entity (repeatable)
    #[arg(long = "pick", value_name = "ENTITY=ATTR[,ATTR...]", value_parser = parse_pick)]
    pub picks: Vec<AttributePick>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Write the document to a file instead of stdout
    #[arg(long = "out", short = 'O')]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePick {
    pub entity: i64,
    pub attributes: Vec<i64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Print the config file location
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn pick_parses_entity_and_attributes() {
        let pick = parse_pick("7=70, 71").unwrap();
        assert_eq!(
            pick,
            AttributePick {
                entity: 7,
                attributes: vec![70, 71]
            }
        );
        assert!(parse_pick("7").is_err());
        assert!(parse_pick("x=1").is_err());
    }

    #[test]
    fn field_names_are_case_insensitive() {
        assert_eq!(
            parse_entity_field("ENTITYNAME").unwrap(),
            EntityField::EntityName
        );
        assert_eq!(
            parse_attribute_field("attrPk").unwrap(),
            AttributeField::AttrPk
        );
        assert!(parse_entity_field("attrPk").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
