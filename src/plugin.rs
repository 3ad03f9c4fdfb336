//! Plugin overlay
//!
//! Plugin items are read-only: their content belongs to the plugin
//! directory. User changes to a plugin item (icon, shortcut, context rules,
//! run options) go to a mirror, a custom record linked to the plugin item
//! through `shared_key` in both directions. Mirrors outlive the plugin
//! records they shadow, so reinstalling a plugin restores the user's
//! customizations.

use anyhow::{Context, Result, bail};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::constants::{file, names};
use crate::error::EditError;
use crate::files;
use crate::record::{KeyBinding, MirrorTarget, PluginSource, Record, RunFlags};
use crate::registry::Registry;
use crate::session::{apply_field, plugin_file, write_atomic};

/// Registry name of a plugin item: `<plugin dir>/<local name>`
pub fn plugin_record_name(dir: &Path, local: &str) -> String {
    format!("{}/{}", dir.display(), local)
}

/// What [`Registry::clean_plugin_mirrors`] removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub mirrors: usize,
    pub data_dirs: usize,
}

impl Registry {
    /// Name of the record holding user state for `name`
    ///
    /// Plugin items get a mirror, created on first use. Any other record
    /// holds its own state and is returned as is.
    pub fn get_mirror(&mut self, name: &str) -> Result<String, EditError> {
        let record = self
            .store
            .exists(name)
            .ok_or_else(|| EditError::NotFound(name.to_string()))?;
        let Some(plugin) = record.plugin.clone() else {
            return Ok(name.to_string());
        };
        if let Some(key) = &record.shared_key
            && self.store.exists(key).is_some_and(Record::is_mirror)
        {
            return Ok(key.clone());
        }

        let run = record.run;
        let context = record.context.clone();
        let opener = record.opener;
        let mirror_name = self.store.new_custom();
        let mirror = self.store.get(&mirror_name);
        mirror.mirror_of = Some(MirrorTarget {
            plugin_dir: plugin.dir,
            plugin_name: plugin.name,
        });
        mirror.shared_key = Some(name.to_string());
        mirror.run = run;
        mirror.context = context;
        mirror.opener = opener;
        if let Some(record) = self.store.exists_mut(name) {
            record.shared_key = Some(mirror_name.clone());
        }
        info!(plugin_item = %name, mirror = %mirror_name, "Created plugin mirror");
        Ok(mirror_name)
    }

    /// Record holding the user state of `name`, without creating a mirror
    pub fn state_record(&self, name: &str) -> Option<&Record> {
        let record = self.store.exists(name)?;
        if record.is_plugin()
            && let Some(mirror) = record
                .shared_key
                .as_deref()
                .and_then(|key| self.store.exists(key))
                .filter(|m| m.is_mirror())
        {
            return Some(mirror);
        }
        Some(record)
    }

    /// Icon shown for `name`; plugin items fall back to the plugin's icon
    pub fn effective_icon(&self, name: &str) -> Option<String> {
        let record = self.store.exists(name)?;
        self.state_record(name)
            .and_then(|state| state.icon.clone())
            .or_else(|| record.icon.clone())
    }

    pub fn effective_key(&self, name: &str) -> KeyBinding {
        self.state_record(name).map(|r| r.key).unwrap_or_default()
    }

    pub fn effective_context(&self, name: &str) -> Option<String> {
        self.state_record(name).and_then(|r| r.context.clone())
    }

    pub fn effective_run(&self, name: &str) -> RunFlags {
        self.state_record(name).map(|r| r.run).unwrap_or_default()
    }

    pub fn set_icon(&mut self, name: &str, icon: Option<String>) -> Result<(), EditError> {
        let target = self.get_mirror(name)?;
        let record = self.store.get(&target);
        if record.lock {
            record.icon_customized = icon.is_some();
        }
        record.icon = icon;
        Ok(())
    }

    /// Plugin labels are part of the plugin and cannot be changed
    pub fn set_label(&mut self, name: &str, label: Option<String>) -> Result<(), EditError> {
        let record = self
            .store
            .exists_mut(name)
            .ok_or_else(|| EditError::NotFound(name.to_string()))?;
        if record.is_plugin() {
            return Err(EditError::ReadOnly(name.to_string()));
        }
        if record.lock {
            record.label_customized = label.is_some();
        }
        record.menu_label = label;
        Ok(())
    }

    pub fn set_key(&mut self, name: &str, key: KeyBinding) -> Result<(), EditError> {
        let target = self.get_mirror(name)?;
        self.store.get(&target).key = key;
        Ok(())
    }

    pub fn set_context(&mut self, name: &str, context: Option<String>) -> Result<(), EditError> {
        let target = self.get_mirror(name)?;
        self.store.get(&target).context = context;
        Ok(())
    }

    pub fn set_run_flags(&mut self, name: &str, run: RunFlags) -> Result<(), EditError> {
        let target = self.get_mirror(name)?;
        self.store.get(&target).run = run;
        Ok(())
    }

    /// Reconnect mirrors to loaded plugin items, returning how many were linked
    pub fn link_mirrors(&mut self) -> usize {
        self.link_mirrors_in(None)
    }

    /// Link mirrors targeting `dir`, or every plugin dir when `None`
    ///
    /// When several mirrors name the same item, the lowest name wins.
    fn link_mirrors_in(&mut self, dir: Option<&Path>) -> usize {
        let mut pairs: Vec<(String, String)> = self
            .store
            .iter()
            .filter_map(|record| {
                let target = record.mirror_of.as_ref()?;
                if dir.is_some_and(|dir| target.plugin_dir != dir) {
                    return None;
                }
                let item = plugin_record_name(&target.plugin_dir, &target.plugin_name);
                self.store
                    .exists(&item)
                    .filter(|r| r.is_plugin())
                    .map(|_| (record.name().to_string(), item))
            })
            .collect();
        pairs.sort();

        let mut linked = HashSet::new();
        for (mirror, item) in &pairs {
            if !linked.insert(item.clone()) {
                debug!(mirror = %mirror, item = %item, "Skipping duplicate mirror");
                continue;
            }
            self.store.get(mirror).shared_key = Some(item.clone());
            self.store.get(item).shared_key = Some(mirror.clone());
        }
        debug!(linked = linked.len(), "Linked plugin mirrors");
        linked.len()
    }

    fn mirror_target_exists(&self, mirror: &Record) -> bool {
        mirror.mirror_of.as_ref().is_some_and(|target| {
            self.store
                .exists(&plugin_record_name(&target.plugin_dir, &target.plugin_name))
                .is_some_and(Record::is_plugin)
        })
    }

    /// Remove mirrors whose plugin item is gone, then plugin-data
    /// directories of records that no longer exist
    pub fn clean_plugin_mirrors(&mut self) -> CleanReport {
        let mut report = CleanReport::default();
        loop {
            let orphan = self
                .store
                .iter()
                .find(|r| r.is_mirror() && !self.mirror_target_exists(r))
                .map(|r| r.name().to_string());
            let Some(orphan) = orphan else {
                break;
            };
            self.store.free(&orphan);
            if let Err(e) = self.files.remove_for(&orphan) {
                error!(mirror = %orphan, error = %e, "Failed to remove mirror files");
            }
            info!(mirror = %orphan, "Removed orphaned plugin mirror");
            report.mirrors += 1;
        }
        report.data_dirs = self.clean_plugin_data();
        report
    }

    fn clean_plugin_data(&self) -> usize {
        let root = self.files.plugin_data_root();
        let Ok(entries) = fs::read_dir(root) else {
            debug!(path = %root.display(), "No plugin data directory");
            return 0;
        };
        let mut removed = 0;
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(names::CUSTOM_PREFIX) || self.store.contains(&name) {
                continue;
            }
            match fs::remove_dir_all(entry.path()) {
                Ok(()) => {
                    info!(name = %name, "Removed orphaned plugin data");
                    removed += 1;
                }
                Err(e) => error!(name = %name, error = %e, "Failed to remove plugin data"),
            }
        }
        removed
    }

    /// Load `<dir>/plugin`, replacing any records previously loaded from `dir`
    ///
    /// Returns the plugin's top item: the one with neither `prev` nor `parent`.
    pub fn load_plugin(&mut self, dir: &Path) -> Result<Option<String>> {
        let path = dir.join(file::PLUGIN_FILE);
        let text = fs::read_to_string(&path)
            .context(format!("Failed to read plugin file {}", path.display()))?;
        self.unload_plugin(dir);

        let mut loaded = BTreeSet::new();
        for line in plugin_file::parse(&text) {
            let name = plugin_record_name(dir, &line.local);
            let value = if line.field.is_link() {
                plugin_record_name(dir, &line.value)
            } else {
                line.value
            };
            let record = self.store.get(&name);
            if record.plugin.is_none() {
                record.lock = false;
                record.plugin = Some(PluginSource {
                    dir: dir.to_path_buf(),
                    name: line.local.clone(),
                    top: false,
                });
            }
            apply_field(record, line.field, &value);
            loaded.insert(name);
        }

        let mut top = None;
        for name in &loaded {
            let Some(record) = self.store.exists_mut(name) else {
                continue;
            };
            record.normalize_payload();
            if top.is_none()
                && record.links.prev.is_none()
                && record.links.parent.is_none()
                && let Some(source) = record.plugin.as_mut()
            {
                source.top = true;
                top = Some(name.clone());
            }
        }
        let linked = self.link_mirrors_in(Some(dir));
        info!(dir = %dir.display(), records = loaded.len(), top = ?top, mirrors = linked, "Loaded plugin");
        Ok(top)
    }

    /// Drop every record loaded from `dir`, returning how many were dropped
    ///
    /// Mirrors stay behind so a reinstall picks them up again.
    pub fn unload_plugin(&mut self, dir: &Path) -> usize {
        let doomed: Vec<String> = self
            .store
            .iter()
            .filter(|r| r.plugin.as_ref().is_some_and(|p| p.dir == dir))
            .map(|r| r.name().to_string())
            .collect();
        for name in &doomed {
            if let Some(record) = self.store.free(name)
                && let Some(mirror) = record.shared_key.as_deref().and_then(|key| self.store.exists_mut(key))
            {
                mirror.shared_key = None;
            }
            if self.clipboard.as_ref().is_some_and(|clip| &clip.name == name) {
                self.clipboard = None;
            }
        }
        if !doomed.is_empty() {
            debug!(dir = %dir.display(), records = doomed.len(), "Unloaded plugin");
        }
        doomed.len()
    }

    /// Load every plugin directory directly under `root`
    pub fn load_plugins(&mut self, root: &Path) -> usize {
        let Ok(entries) = fs::read_dir(root) else {
            debug!(path = %root.display(), "No plugin directory");
            return 0;
        };
        let mut dirs: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.join(file::PLUGIN_FILE).is_file())
            .collect();
        dirs.sort();

        let mut count = 0;
        for dir in dirs {
            match self.load_plugin(&dir) {
                Ok(_) => count += 1,
                Err(e) => error!(dir = %dir.display(), error = %e, "Failed to load plugin"),
            }
        }
        count
    }

    fn plugin_top(&self, dir: &Path) -> Option<String> {
        self.store
            .iter()
            .find(|r| r.plugin.as_ref().is_some_and(|p| p.dir == dir && p.top))
            .map(|r| r.name().to_string())
    }

    /// Copy a plugin's top item into the user's tree after `anchor`
    ///
    /// A plugin that was not already loaded is loaded for the copy and
    /// dropped again afterwards.
    pub fn import_plugin(&mut self, dir: &Path, anchor: &str) -> Result<String> {
        self.editable(anchor)?;
        let installed = self.plugin_top(dir);
        let top = match &installed {
            Some(top) => Some(top.clone()),
            None => self.load_plugin(dir)?,
        };
        let Some(top) = top else {
            self.unload_plugin(dir);
            bail!("Plugin {} has no items", dir.display());
        };

        let result = match self.copy_subtree(&top, false) {
            Ok(copy) => match self.insert_after(anchor, &copy) {
                Ok(()) => Ok(copy),
                Err(e) => {
                    self.delete_subtree(&copy, false);
                    Err(e)
                }
            },
            Err(e) => Err(e),
        };
        if installed.is_none() {
            self.unload_plugin(dir);
        }
        let copy = result?;
        info!(dir = %dir.display(), copy = %copy, anchor = %anchor, "Imported plugin");
        Ok(copy)
    }

    /// Write `name` and its submenu contents as a plugin into `dir`
    pub fn export_plugin(&self, name: &str, dir: &Path) -> Result<()> {
        self.editable(name)?;
        let names = self.subtree(name);
        let mut records: Vec<Record> = names
            .iter()
            .filter_map(|n| self.store.exists(n).cloned())
            .collect();
        for record in &mut records {
            record.key = KeyBinding::default();
        }
        if let Some(top) = records.first_mut() {
            top.links.prev = None;
            top.links.next = None;
            top.links.parent = None;
        }

        let path = dir.join(file::PLUGIN_FILE);
        write_atomic(&path, &plugin_file::render(&records))
            .context(format!("Failed to write plugin file {}", path.display()))?;
        for item in &names {
            let target = dir.join(file::PLUGIN_FILES_DIR).join(item);
            files::copy_dir(&self.files.script_dir(item), &target)?;
        }
        info!(name = %name, dir = %dir.display(), records = records.len(), "Exported plugin");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CommandKind, MenuStyle, TriState};
    use crate::session::AppSettings;

    fn registry() -> Registry {
        Registry::init(&std::env::temp_dir().join("xset-plugin-tests-unused"))
    }

    fn plugin_item(registry: &mut Registry, dir: &str, local: &str) -> String {
        let name = plugin_record_name(Path::new(dir), local);
        let mut record = Record::new_custom(name.as_str());
        record.plugin = Some(PluginSource {
            dir: PathBuf::from(dir),
            name: local.to_string(),
            top: true,
        });
        record.icon = Some("plugin-icon".to_string());
        record.context = Some("0%%%%%0%%%%%".to_string());
        record.run.task = TriState::True;
        registry.store.insert(record);
        name
    }

    const PLUGIN_TEXT: &str = "[Plugin]\n\
        cstm_00000001-label=Tools\n\
        cstm_00000001-style=17\n\
        cstm_00000001-child=cstm_00000002\n\
        cstm_00000002-label=List\n\
        cstm_00000002-x=0\n\
        cstm_00000002-line=ls -l\n\
        cstm_00000002-parent=cstm_00000001\n\
        cstm_00000002-next=cstm_00000003\n\
        cstm_00000003-label=Count\n\
        cstm_00000003-x=1\n\
        cstm_00000003-prev=cstm_00000002\n";

    fn write_plugin(dir: &Path) {
        fs::create_dir_all(dir.join("files/cstm_00000003")).unwrap();
        fs::write(dir.join("plugin"), PLUGIN_TEXT).unwrap();
        fs::write(dir.join("files/cstm_00000003/exec.sh"), "wc -l\n").unwrap();
    }

    #[test]
    fn test_get_mirror_is_idempotent() {
        let mut registry = registry();
        let item = plugin_item(&mut registry, "/plugins/p", "cstm_00000001");
        let first = registry.get_mirror(&item).unwrap();
        let second = registry.get_mirror(&item).unwrap();
        assert_eq!(first, second);
        assert_eq!(registry.store.len(), 2);

        let mirror = registry.exists(&first).unwrap();
        assert!(mirror.is_mirror() && mirror.is_custom());
        assert_eq!(mirror.shared_key.as_deref(), Some(item.as_str()));
        assert_eq!(mirror.context.as_deref(), Some("0%%%%%0%%%%%"));
        assert_eq!(mirror.run.task, TriState::True);
        assert_eq!(registry.exists(&item).unwrap().shared_key.as_deref(), Some(first.as_str()));
    }

    #[test]
    fn test_get_mirror_of_plain_record_is_itself() {
        let mut registry = registry();
        let name = registry.store.new_custom();
        assert_eq!(registry.get_mirror(&name).unwrap(), name);
        assert!(matches!(registry.get_mirror("missing"), Err(EditError::NotFound(_))));
    }

    #[test]
    fn test_edits_route_to_mirror() {
        let mut registry = registry();
        let item = plugin_item(&mut registry, "/plugins/p", "cstm_00000001");
        assert_eq!(registry.effective_icon(&item).as_deref(), Some("plugin-icon"));

        registry.set_icon(&item, Some("user-icon".to_string())).unwrap();
        registry.set_key(&item, KeyBinding::new(120, 8)).unwrap();
        assert_eq!(registry.exists(&item).unwrap().icon.as_deref(), Some("plugin-icon"));
        assert!(!registry.exists(&item).unwrap().key.is_set());
        assert_eq!(registry.effective_icon(&item).as_deref(), Some("user-icon"));
        assert_eq!(registry.effective_key(&item), KeyBinding::new(120, 8));
        assert_eq!(
            registry.set_label(&item, Some("x".to_string())),
            Err(EditError::ReadOnly(item.clone()))
        );
    }

    #[test]
    fn test_builtin_icon_marks_customized() {
        let mut registry = registry();
        registry.get("main_terminal");
        registry.set_icon("main_terminal", Some("term".to_string())).unwrap();
        assert!(registry.exists("main_terminal").unwrap().icon_customized);
        registry.set_icon("main_terminal", None).unwrap();
        assert!(!registry.exists("main_terminal").unwrap().icon_customized);
    }

    #[test]
    fn test_load_plugin_prefixes_names_and_links() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("tools");
        write_plugin(&dir);

        let mut registry = Registry::init(tmp.path());
        let top = registry.load_plugin(&dir).unwrap().unwrap();
        assert_eq!(top, plugin_record_name(&dir, "cstm_00000001"));

        let record = registry.exists(&top).unwrap();
        assert!(record.is_plugin() && record.plugin.as_ref().unwrap().top);
        assert_eq!(record.menu_style, MenuStyle::Submenu);
        let children = registry.children(&top);
        assert_eq!(
            children,
            vec![
                plugin_record_name(&dir, "cstm_00000002"),
                plugin_record_name(&dir, "cstm_00000003"),
            ]
        );
        let list = registry.exists(&children[0]).unwrap();
        assert_eq!(list.command().unwrap().line.as_deref(), Some("ls -l"));
        assert!(registry.check_links().is_empty());

        // reloading replaces instead of duplicating
        registry.load_plugin(&dir).unwrap();
        assert_eq!(registry.store.len(), 3);
    }

    #[test]
    fn test_mirror_survives_reinstall() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("plugins/tools");
        write_plugin(&dir);
        let session = tmp.path().join("session");

        let mut registry = Registry::init(tmp.path());
        let top = registry.load_plugin(&dir).unwrap().unwrap();
        registry.set_icon(&top, Some("wrench".to_string())).unwrap();
        registry.save_session(&session, &AppSettings::default()).unwrap();

        let mut reloaded = Registry::init(tmp.path());
        reloaded.load_session(&session).unwrap();
        assert_eq!(reloaded.load_plugins(&tmp.path().join("plugins")), 1);
        assert_eq!(reloaded.link_mirrors(), 1);
        assert_eq!(reloaded.effective_icon(&top).as_deref(), Some("wrench"));
        assert_eq!(reloaded.clean_plugin_mirrors(), CleanReport::default());
    }

    #[test]
    fn test_reload_keeps_existing_mirror() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("tools");
        write_plugin(&dir);

        let mut registry = Registry::init(tmp.path());
        let top = registry.load_plugin(&dir).unwrap().unwrap();
        let mirror = registry.get_mirror(&top).unwrap();
        registry.set_icon(&top, Some("wrench".to_string())).unwrap();

        registry.load_plugin(&dir).unwrap();
        assert_eq!(registry.effective_icon(&top).as_deref(), Some("wrench"));
        assert_eq!(registry.get_mirror(&top).unwrap(), mirror);
        assert_eq!(registry.store.iter().filter(|r| r.is_mirror()).count(), 1);
    }

    #[test]
    fn test_link_mirrors_prefers_lowest_duplicate() {
        let mut registry = registry();
        let item = plugin_item(&mut registry, "/plugins/p", "cstm_00000001");
        for (name, icon) in [("cstm_000000b0", "second"), ("cstm_000000a0", "first")] {
            let mut mirror = Record::new_custom(name);
            mirror.mirror_of = Some(MirrorTarget {
                plugin_dir: PathBuf::from("/plugins/p"),
                plugin_name: "cstm_00000001".to_string(),
            });
            mirror.icon = Some(icon.to_string());
            registry.store.insert(mirror);
        }

        assert_eq!(registry.link_mirrors(), 1);
        assert_eq!(registry.exists(&item).unwrap().shared_key.as_deref(), Some("cstm_000000a0"));
        assert_eq!(registry.effective_icon(&item).as_deref(), Some("first"));
    }

    #[test]
    fn test_clean_removes_orphans() {
        let tmp = tempfile::tempdir().unwrap();
        let mut registry = Registry::init(tmp.path());
        let item = plugin_item(&mut registry, "/plugins/p", "cstm_00000001");
        let mirror = registry.get_mirror(&item).unwrap();
        let keeper = registry.store.new_custom();
        fs::create_dir_all(registry.files.plugin_data_dir(&keeper)).unwrap();
        fs::create_dir_all(registry.files.plugin_data_dir("cstm_deadbeef")).unwrap();

        assert_eq!(registry.clean_plugin_mirrors(), CleanReport { mirrors: 0, data_dirs: 1 });
        assert!(registry.files.plugin_data_dir(&keeper).exists());
        assert!(!registry.files.plugin_data_dir("cstm_deadbeef").exists());

        registry.unload_plugin(Path::new("/plugins/p"));
        assert_eq!(registry.clean_plugin_mirrors(), CleanReport { mirrors: 1, data_dirs: 0 });
        assert!(registry.exists(&mirror).is_none());
    }

    #[test]
    fn test_import_plugin_copies_into_custom_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("download");
        write_plugin(&dir);

        let mut registry = Registry::init(tmp.path());
        let anchor = registry.store.new_custom();
        let copy = registry.import_plugin(&dir, &anchor).unwrap();

        assert!(registry.store.iter().all(|r| !r.is_plugin()));
        assert_eq!(registry.siblings(&anchor), vec![anchor.clone(), copy.clone()]);
        let copied = registry.exists(&copy).unwrap();
        assert!(copied.is_custom() && copied.is_submenu());
        assert_eq!(copied.menu_label.as_deref(), Some("Tools"));
        let children = registry.children(&copy);
        assert_eq!(children.len(), 2);
        let script = registry.files.script_file(&children[1]);
        assert_eq!(fs::read_to_string(script).unwrap(), "wc -l\n");
        assert!(registry.check_links().is_empty());
    }

    #[test]
    fn test_export_then_import() {
        let tmp = tempfile::tempdir().unwrap();
        let mut registry = Registry::init(&tmp.path().join("a"));
        let anchor = registry.store.new_custom();
        let submenu = registry.new_submenu(&anchor, "Scripts").unwrap();
        let head = registry.children(&submenu)[0].clone();
        let script = registry.new_command(&head, "Hello", CommandKind::Script, "echo hello\n").unwrap();
        registry.set_key(&script, KeyBinding::new(104, 4)).unwrap();

        let out = tmp.path().join("export");
        registry.export_plugin(&submenu, &out).unwrap();
        let text = fs::read_to_string(out.join("plugin")).unwrap();
        assert!(text.starts_with("[Plugin]\n"));
        assert!(!text.contains(&format!("{submenu}-prev")));
        assert!(!text.contains("-key="));
        assert!(out.join("files").join(&script).join("exec.sh").exists());

        let mut other = Registry::init(&tmp.path().join("b"));
        let root = other.store.new_custom();
        let imported = other.import_plugin(&out, &root).unwrap();
        let children = other.children(&imported);
        assert_eq!(children.len(), 2);
        let hello = other.exists(&children[1]).unwrap();
        assert_eq!(hello.menu_label.as_deref(), Some("Hello"));
        assert_eq!(hello.command().unwrap().kind, CommandKind::Script);
        let body = fs::read_to_string(other.files.script_file(&children[1])).unwrap();
        assert_eq!(body, "echo hello\n");
    }

    #[test]
    fn test_export_refuses_builtin() {
        let tmp = tempfile::tempdir().unwrap();
        let mut registry = Registry::init(tmp.path());
        registry.get("main_terminal");
        assert!(registry.export_plugin("main_terminal", &tmp.path().join("out")).is_err());
    }
}
