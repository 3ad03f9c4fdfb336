//! Command requests handed to the task runner
//!
//! Resolves what a custom command runs and how. Spawning and supervising the
//! process belongs to the runner.

use std::path::PathBuf;

use crate::constants::names;
use crate::files::AuxFiles;
use crate::record::{CommandKind, Record, RunFlags};
use crate::registry::Registry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    pub name: String,
    pub label: Option<String>,
    pub kind: CommandKind,
    /// Command line, script path, application path or bookmark target
    pub command: String,
    pub run_as: Option<String>,
    pub flags: RunFlags,
}

impl TaskRequest {
    /// Request for the command record `name`, `None` for anything that is
    /// not a command
    pub fn for_record(registry: &Registry, name: &str) -> Option<Self> {
        let record = registry.exists(name)?;
        let cmd = record.command()?;
        let command = match cmd.kind {
            CommandKind::Line => cmd.line.clone().unwrap_or_default(),
            CommandKind::Script => script_path(registry, record).display().to_string(),
            CommandKind::App | CommandKind::Bookmark => cmd.target.clone().unwrap_or_default(),
        };
        Some(Self {
            name: name.to_string(),
            label: record.menu_label.clone(),
            kind: cmd.kind,
            command,
            run_as: cmd.run_as.clone().filter(|user| !user.trim().is_empty()),
            flags: registry.effective_run(name),
        })
    }

    pub fn in_terminal(&self) -> bool {
        self.flags.in_terminal.is_true()
    }

    pub fn as_task(&self) -> bool {
        self.flags.task.is_true()
    }
}

fn script_path(registry: &Registry, record: &Record) -> PathBuf {
    match &record.plugin {
        Some(source) => AuxFiles::plugin_script_dir(source).join(names::SCRIPT_FILE),
        None => registry.files().script_file(record.name()),
    }
}
