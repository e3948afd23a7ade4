//! Dictionary command handlers.

use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;

use rowsync_core::{
    ConnectionPoint, Controller, Dictionaries, DictionaryKind, Domain, StorageType, TypeEntry,
};

use crate::cli::{DictsArgs, DictsCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Serialize)]
struct Summary {
    kind: DictionaryKind,
    entries: usize,
    loaded: bool,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Dictionary")]
    kind: String,
    #[tabled(rename = "Entries")]
    entries: usize,
    #[tabled(rename = "Loaded")]
    loaded: String,
}

#[derive(Tabled)]
struct TypeRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Description")]
    description: String,
}

#[derive(Tabled)]
struct StorageRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "System")]
    system_type: String,
}

#[derive(Tabled)]
struct DomainRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "Parent")]
    parent: String,
}

#[derive(Tabled)]
struct ConnectionRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Port")]
    port: String,
    #[tabled(rename = "Object")]
    object_name: String,
    #[tabled(rename = "Domain")]
    domain: String,
}

fn type_row(t: &TypeEntry) -> TypeRow {
    TypeRow {
        code: t.code.clone(),
        description: t.description.clone(),
    }
}

fn domain_owner(d: &Domain) -> String {
    match (&d.owner, d.owner_email.is_empty()) {
        (Some(name), false) => format!("{name} <{}>", d.owner_email),
        (Some(name), true) => name.clone(),
        (None, _) => d.owner_email.clone(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: DictsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let failed = controller.load_dictionaries().await?;
    for kind in &failed {
        output::print_status(&format!("warning: {kind} could not be loaded"), global.quiet);
    }
    let dicts = controller.dictionaries_snapshot();

    let out = match args.command {
        DictsCommand::List => {
            let summary: Vec<Summary> = DictionaryKind::iter()
                .map(|kind| Summary {
                    kind,
                    entries: dicts.len_of(kind),
                    loaded: !failed.contains(&kind),
                })
                .collect();
            output::render_list(
                &global.output,
                &summary,
                |s| SummaryRow {
                    kind: s.kind.to_string(),
                    entries: s.entries,
                    loaded: if s.loaded { "yes" } else { "no" }.into(),
                },
                |s| s.kind.to_string(),
            )
        }

        DictsCommand::Show { kind } => render_kind(&global.output, kind, &dicts),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

fn render_kind(
    format: &OutputFormat,
    kind: DictionaryKind,
    dicts: &Dictionaries,
) -> String {
    let code = |t: &TypeEntry| t.code.clone();
    match kind {
        DictionaryKind::ChangeTypes => {
            let entries: Vec<TypeEntry> = dicts
                .change_types
                .iter()
                .map(|(code, label)| TypeEntry {
                    code: code.clone(),
                    description: label.clone(),
                })
                .collect();
            output::render_list(format, &entries, type_row, code)
        }
        DictionaryKind::TableTypes => {
            output::render_list(format, &dicts.table_types, type_row, code)
        }
        DictionaryKind::EntityTypes => {
            output::render_list(format, &dicts.entity_types, type_row, code)
        }
        DictionaryKind::AttributeTypes => {
            output::render_list(format, &dicts.attribute_types, type_row, code)
        }
        DictionaryKind::StorageTypes => output::render_list(
            format,
            &dicts.storage_types,
            |s: &StorageType| StorageRow {
                code: s.code.clone(),
                description: s.description.clone(),
                system_type: s.system_type.clone(),
            },
            |s| s.code.clone(),
        ),
        DictionaryKind::Domains => output::render_list(
            format,
            &dicts.domains,
            |d: &Domain| DomainRow {
                code: d.code.clone(),
                name: d.name.clone(),
                owner: domain_owner(d),
                parent: d.parent.clone(),
            },
            |d| d.code.clone(),
        ),
        DictionaryKind::ConnectionPoints => output::render_list(
            format,
            &dicts.connection_points,
            |c: &ConnectionPoint| ConnectionRow {
                code: c.code.clone(),
                host: c.host.clone(),
                port: c.port.clone(),
                object_name: c.object_name.clone(),
                domain: c.domain.clone(),
            },
            |c| c.code.clone(),
        ),
    }
}
