//! On-disk auxiliary files owned by records
//!
//! Custom commands may own a script directory and a plugin-data directory,
//! both named after the record. Plugin items keep their scripts inside the
//! plugin directory instead.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::{config, file, names};
use crate::record::PluginSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxFiles {
    scripts_dir: PathBuf,
    plugin_data_dir: PathBuf,
}

impl AuxFiles {
    /// Layout rooted at the settings directory
    pub fn new(settings_dir: &Path) -> Self {
        Self {
            scripts_dir: settings_dir.join(config::SCRIPTS_DIR),
            plugin_data_dir: settings_dir.join(config::PLUGIN_DATA_DIR),
        }
    }

    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }

    pub fn plugin_data_root(&self) -> &Path {
        &self.plugin_data_dir
    }

    /// Script directory of a custom record
    pub fn script_dir(&self, name: &str) -> PathBuf {
        self.scripts_dir.join(name)
    }

    pub fn script_file(&self, name: &str) -> PathBuf {
        self.script_dir(name).join(names::SCRIPT_FILE)
    }

    pub fn plugin_data_dir(&self, name: &str) -> PathBuf {
        self.plugin_data_dir.join(name)
    }

    /// Script directory of a plugin item: `<plugin>/files/<name>`, or `<plugin>/<name>` in older plugins
    pub fn plugin_script_dir(source: &PluginSource) -> PathBuf {
        let files = source.dir.join(file::PLUGIN_FILES_DIR).join(&source.name);
        if files.exists() {
            files
        } else {
            source.dir.join(&source.name)
        }
    }

    /// Write the script body of a script-kind command
    pub fn write_script(&self, name: &str, body: &str) -> Result<PathBuf> {
        let dir = self.script_dir(name);
        fs::create_dir_all(&dir)
            .context(format!("Failed to create script directory: {}", dir.display()))?;
        let path = dir.join(names::SCRIPT_FILE);
        fs::write(&path, body)
            .context(format!("Failed to write script to {}", path.display()))?;
        Ok(path)
    }

    /// Delete the script and plugin-data directories of a custom record
    pub fn remove_for(&self, name: &str) -> Result<()> {
        for dir in [self.script_dir(name), self.plugin_data_dir(name)] {
            if dir.exists() {
                fs::remove_dir_all(&dir)
                    .context(format!("Failed to remove {}", dir.display()))?;
                info!(name = %name, path = %dir.display(), "Removed auxiliary directory");
            }
        }
        Ok(())
    }
}

/// Recursively copy a directory; a missing source is not an error
pub fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_dir() {
        debug!(path = %src.display(), "No directory to copy");
        return Ok(());
    }
    fs::create_dir_all(dst)
        .context(format!("Failed to create directory: {}", dst.display()))?;
    for entry in fs::read_dir(src).context(format!("Failed to read {}", src.display()))? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&from, &to)?;
        } else {
            fs::copy(&from, &to)
                .context(format!("Failed to copy {} to {}", from.display(), to.display()))?;
        }
    }
    Ok(())
}
