//! Single owner of all registry state
//!
//! Holds the record store, the one-slot clipboard and the auxiliary file
//! layout. Tree edits, plugin handling and serialization are implemented as
//! `impl Registry` blocks in their own modules.

use std::path::Path;
use tracing::info;

use crate::files::AuxFiles;
use crate::record::Record;
use crate::store::Store;
use crate::tree::Clipboard;

#[derive(Debug)]
pub struct Registry {
    pub(crate) store: Store,
    pub(crate) clipboard: Option<Clipboard>,
    pub(crate) files: AuxFiles,
}

impl Registry {
    /// Empty registry whose auxiliary directories live under `settings_dir`
    pub fn init(settings_dir: &Path) -> Self {
        info!(settings_dir = %settings_dir.display(), "Registry initialized");
        Self {
            store: Store::new(),
            clipboard: None,
            files: AuxFiles::new(settings_dir),
        }
    }

    pub fn teardown(self) {
        info!(records = self.store.len(), "Registry torn down");
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn files(&self) -> &AuxFiles {
        &self.files
    }

    /// Get-or-create, see [`Store::get`]
    pub fn get(&mut self, name: &str) -> &mut Record {
        self.store.get(name)
    }

    pub fn exists(&self, name: &str) -> Option<&Record> {
        self.store.exists(name)
    }
}
