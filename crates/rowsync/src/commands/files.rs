//! Imported file command handlers.

use std::sync::Arc;

use tabled::Tabled;

use rowsync_core::{Command as CoreCommand, Controller, EntityFilter, FileContainer, FileId};

use crate::cli::{FilesArgs, FilesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Loaded By")]
    created_by: String,
    #[tabled(rename = "Loaded At")]
    loaded_at: String,
    #[tabled(rename = "Entities")]
    entities: usize,
    #[tabled(rename = "Import")]
    status: String,
}

pub async fn handle(
    controller: &Controller,
    args: FilesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    controller.refresh().await?;
    let hierarchy = controller.hierarchy_snapshot();
    let produced = |id: FileId| {
        let filter = EntityFilter::ByFile(id);
        hierarchy.iter().filter(|e| filter.matches(e)).count()
    };

    match args.command {
        FilesCommand::List => {
            let files = controller.files_snapshot();
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                files.as_slice(),
                |f: &Arc<FileContainer>| FileRow {
                    id: f.id.get(),
                    name: f.full_name.clone(),
                    created_by: f.created_by.clone(),
                    loaded_at: f.loaded_at.clone(),
                    entities: produced(f.id),
                    status: output::error_marker(f.messages.len(), color),
                },
                |f| f.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FilesCommand::Remove { file } => {
            let file_id = FileId::new(file);
            let f = controller
                .store()
                .file_by_id(file_id)
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "file".into(),
                    identifier: file.to_string(),
                    list_command: "files list".into(),
                })?;
            let prompt = format!(
                "Delete file {} and the {} entities imported from it?",
                f.full_name,
                produced(file_id)
            );
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }
            controller
                .execute(CoreCommand::RemoveFile { file_id })
                .await?;
            output::print_status(&format!("File {file} deleted"), global.quiet);
            Ok(())
        }
    }
}
