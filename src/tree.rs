//! Tree navigator for the custom menu tree
//!
//! Custom records form sibling chains through `prev`/`next`. A submenu's
//! `child` names the head of its chain and only that head stores `parent`;
//! every other sibling finds its parent by walking back to the head.
//! Every edit below leaves the links symmetric and never leaves a submenu
//! without a child.

use std::collections::HashSet;
use tracing::{debug, error, info, warn};

use crate::constants::names;
use crate::error::EditError;
use crate::files::{self, AuxFiles};
use crate::record::{Command, CommandKind, MenuStyle, Payload, Record, Tool};
use crate::registry::Registry;

/// One-slot clipboard used by cut/copy/paste
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clipboard {
    pub name: String,
    /// Paste relocates instead of duplicating
    pub cut: bool,
}

/// Side effects of detaching a record from its chain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unlinked {
    /// Placeholder created because the record was the only item of a submenu
    pub placeholder: Option<String>,
}

/// A broken tree link reported by [`Registry::check_links`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkViolation {
    Dangling {
        name: String,
        field: &'static str,
        target: String,
    },
    /// `name.next` does not point back through its `prev`
    AsymmetricNext { name: String, next: String },
    /// `name.prev` does not point back through its `next`
    AsymmetricPrev { name: String, prev: String },
    Cycle { name: String },
    EmptySubmenu { name: String },
    /// `parent` and `child` disagree
    ParentMismatch { name: String, parent: String },
    ParentOnNonHead { name: String },
    LockedWithLinks { name: String },
}

fn refused(err: EditError) -> EditError {
    warn!(error = %err, "Refused tree edit");
    err
}

impl Registry {
    /// Record that tree edits may target: custom and not plugin-owned
    pub(crate) fn editable(&self, name: &str) -> Result<&Record, EditError> {
        let record = self
            .store
            .exists(name)
            .ok_or_else(|| EditError::NotFound(name.to_string()))?;
        if record.lock || record.is_plugin() {
            return Err(EditError::ReadOnly(name.to_string()));
        }
        Ok(record)
    }

    /// Follow a link only if it resolves
    fn resolved(&self, link: Option<&String>) -> Option<String> {
        link.filter(|name| self.store.contains(name)).cloned()
    }

    /// First sibling of the chain containing `name`
    pub fn head_of(&self, name: &str) -> String {
        let mut current = name.to_string();
        let mut seen = HashSet::new();
        while seen.insert(current.clone()) {
            let prev = self
                .store
                .exists(&current)
                .and_then(|r| self.resolved(r.links.prev.as_ref()));
            match prev {
                Some(prev) => current = prev,
                None => break,
            }
        }
        current
    }

    /// Submenu containing `name`, found through the head of its chain
    pub fn parent_of(&self, name: &str) -> Option<String> {
        let head = self.head_of(name);
        let record = self.store.exists(&head)?;
        self.resolved(record.links.parent.as_ref())
    }

    /// Names of the chain starting at `head`, in order
    pub fn siblings(&self, head: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(head.to_string());
        while let Some(name) = current {
            if !seen.insert(name.clone()) {
                debug!(name = %name, "Sibling chain loops back");
                break;
            }
            let Some(record) = self.store.exists(&name) else {
                break;
            };
            current = record.links.next.clone();
            chain.push(name);
        }
        chain
    }

    /// Items of a submenu, in order
    pub fn children(&self, submenu: &str) -> Vec<String> {
        self.store
            .exists(submenu)
            .and_then(|r| r.links.child.clone())
            .map(|child| self.siblings(&child))
            .unwrap_or_default()
    }

    /// `name` followed by everything below it, depth first
    pub fn subtree(&self, name: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.collect_subtree(name, &mut out, &mut seen);
        out
    }

    fn collect_subtree(&self, name: &str, out: &mut Vec<String>, seen: &mut HashSet<String>) {
        if !self.store.contains(name) || !seen.insert(name.to_string()) {
            return;
        }
        out.push(name.to_string());
        for child in self.children(name) {
            self.collect_subtree(&child, out, seen);
        }
    }

    /// True when `name` is `ancestor` or lies somewhere below it
    fn is_within(&self, name: &str, ancestor: &str) -> bool {
        let mut current = Some(name.to_string());
        let mut seen = HashSet::new();
        while let Some(name) = current {
            if name == ancestor {
                return true;
            }
            if !seen.insert(name.clone()) {
                break;
            }
            current = self.parent_of(&name);
        }
        false
    }

    /// True when `target` is the clipboard item or inside it
    pub fn is_in_clipboard_tree(&self, target: &str) -> bool {
        self.clipboard
            .as_ref()
            .is_some_and(|clip| self.is_within(target, &clip.name))
    }

    /// Splice `name` between `anchor` and `anchor.next`
    ///
    /// A record that is still linked elsewhere is detached first. Its toolbar
    /// role follows the anchor: toolbar items stay on the toolbar, menu items
    /// lose any toolbar role.
    pub fn insert_after(&mut self, anchor: &str, name: &str) -> Result<(), EditError> {
        let anchor_tool = self.editable(anchor).map_err(refused)?.tool;
        let record = self.editable(name).map_err(refused)?;
        if anchor_tool == Tool::None && record.tool.is_builtin() {
            return Err(refused(EditError::ToolIntoMenu(name.to_string())));
        }
        if self.is_within(anchor, name) {
            return Err(refused(EditError::PasteIntoSelf {
                clipboard: name.to_string(),
                target: anchor.to_string(),
            }));
        }
        let attached = record.links.prev.is_some() || record.links.next.is_some() || record.links.parent.is_some();
        if attached {
            self.unlink(name);
        }

        let anchor_next = self
            .store
            .exists(anchor)
            .and_then(|r| self.resolved(r.links.next.as_ref()));

        if let Some(record) = self.store.exists_mut(name) {
            record.links.prev = Some(anchor.to_string());
            record.links.next = anchor_next.clone();
            record.links.parent = None;
            if anchor_tool == Tool::None {
                record.tool = Tool::None;
            } else if record.tool == Tool::None {
                record.tool = Tool::Custom;
            }
        }
        if let Some(next) = &anchor_next
            && let Some(next_record) = self.store.exists_mut(next)
        {
            next_record.links.prev = Some(name.to_string());
        }
        if let Some(anchor_record) = self.store.exists_mut(anchor) {
            anchor_record.links.next = Some(name.to_string());
        }
        debug!(anchor = %anchor, name = %name, "Inserted record");
        Ok(())
    }

    /// Detach `name` from its chain, relinking the neighbors
    ///
    /// The record keeps its own `child`. Detaching the only item of a
    /// submenu gives that submenu a fresh placeholder child.
    fn unlink(&mut self, name: &str) -> Unlinked {
        let Some(record) = self.store.exists(name) else {
            return Unlinked::default();
        };
        let prev = self.resolved(record.links.prev.as_ref());
        let next = self.resolved(record.links.next.as_ref());
        let parent = self.resolved(record.links.parent.as_ref());
        let mut unlinked = Unlinked::default();

        match (&prev, &next) {
            (Some(prev), _) => {
                if let Some(prev_record) = self.store.exists_mut(prev) {
                    prev_record.links.next = next.clone();
                }
                if let Some(next) = &next
                    && let Some(next_record) = self.store.exists_mut(next)
                {
                    next_record.links.prev = Some(prev.clone());
                }
            }
            (None, Some(next)) => {
                // next becomes the head and takes over the parent link
                if let Some(next_record) = self.store.exists_mut(next) {
                    next_record.links.prev = None;
                    next_record.links.parent = parent.clone();
                }
                if let Some(parent) = &parent
                    && let Some(parent_record) = self.store.exists_mut(parent)
                {
                    parent_record.links.child = Some(next.clone());
                }
            }
            (None, None) => {
                if let Some(parent) = &parent {
                    unlinked.placeholder = Some(self.new_placeholder(parent));
                }
            }
        }

        if let Some(record) = self.store.exists_mut(name) {
            record.links.prev = None;
            record.links.next = None;
            record.links.parent = None;
        }
        unlinked
    }

    /// Give `submenu` a single placeholder child
    fn new_placeholder(&mut self, submenu: &str) -> String {
        let tool = self.store.exists(submenu).map(|r| r.tool).unwrap_or_default();
        let name = self.store.new_custom();
        if let Some(record) = self.store.exists_mut(&name) {
            record.menu_label = Some(names::PLACEHOLDER_LABEL.to_string());
            record.payload = Payload::Command(Command::default());
            record.links.parent = Some(submenu.to_string());
            if tool != Tool::None {
                record.tool = Tool::Custom;
            }
        }
        if let Some(parent) = self.store.exists_mut(submenu) {
            parent.links.child = Some(name.clone());
        }
        debug!(submenu = %submenu, placeholder = %name, "Created placeholder child");
        name
    }

    /// Remove a custom record, its submenu contents and its auxiliary files
    pub fn remove(&mut self, name: &str) -> Result<Unlinked, EditError> {
        self.editable(name).map_err(refused)?;
        let unlinked = self.unlink(name);
        self.delete_subtree(name, false);
        info!(name = %name, placeholder = ?unlinked.placeholder, "Removed record");
        Ok(unlinked)
    }

    /// Free `name`, everything below it and, with `with_siblings`, every
    /// following sibling
    ///
    /// Neighbors are not relinked; callers detach first.
    pub fn delete_subtree(&mut self, name: &str, with_siblings: bool) {
        let Some(record) = self.store.free(name) else {
            return;
        };
        if self.clipboard.as_ref().is_some_and(|clip| clip.name == name) {
            debug!(name = %name, "Clipboard item freed");
            self.clipboard = None;
        }
        // plugin items keep their files inside the plugin directory
        if !record.is_plugin()
            && let Err(e) = self.files.remove_for(name)
        {
            error!(name = %name, error = %e, "Failed to remove auxiliary files");
        }
        if let Some(child) = &record.links.child {
            self.delete_subtree(child, true);
        }
        if with_siblings && let Some(next) = &record.links.next {
            self.delete_subtree(next, true);
        }
    }

    /// Deep-copy `name` into fresh custom records
    ///
    /// Submenu contents are always copied; following siblings only with
    /// `copy_siblings`. The returned copy is detached and ready for
    /// [`Registry::insert_after`].
    pub fn copy_subtree(&mut self, name: &str, copy_siblings: bool) -> Result<String, EditError> {
        let mut visited = HashSet::new();
        let copy = self
            .copy_record(name, copy_siblings, &mut visited)
            .ok_or_else(|| EditError::NotFound(name.to_string()))?;
        info!(source = %name, copy = %copy, "Copied subtree");
        Ok(copy)
    }

    fn copy_record(&mut self, name: &str, copy_siblings: bool, visited: &mut HashSet<String>) -> Option<String> {
        if !visited.insert(name.to_string()) {
            return None;
        }
        let source = self.store.exists(name)?.clone();
        let new_name = self.store.unique_custom_name();
        let mut copy = source.duplicate_as(new_name.as_str());

        // user state of a plugin item lives on its mirror
        if source.is_plugin()
            && let Some(mirror) = source.shared_key.as_deref().and_then(|key| self.store.exists(key))
        {
            copy.run = mirror.run;
            copy.context = mirror.context.clone();
            copy.opener = mirror.opener;
            if mirror.icon.is_some() {
                copy.icon = mirror.icon.clone();
            }
        }
        copy.normalize_payload();
        self.store.insert(copy);
        self.copy_aux_files(&source, &new_name);

        if let Some(child) = source.links.child.as_deref()
            && let Some(new_child) = self.copy_record(child, true, visited)
        {
            if let Some(record) = self.store.exists_mut(&new_child) {
                record.links.parent = Some(new_name.clone());
            }
            if let Some(record) = self.store.exists_mut(&new_name) {
                record.links.child = Some(new_child);
            }
        }
        if copy_siblings
            && let Some(next) = source.links.next.as_deref()
            && let Some(new_next) = self.copy_record(next, true, visited)
        {
            if let Some(record) = self.store.exists_mut(&new_next) {
                record.links.prev = Some(new_name.clone());
            }
            if let Some(record) = self.store.exists_mut(&new_name) {
                record.links.next = Some(new_next);
            }
        }
        Some(new_name)
    }

    fn copy_aux_files(&self, source: &Record, new_name: &str) {
        let (script_src, data_owner) = match &source.plugin {
            Some(plugin) => (AuxFiles::plugin_script_dir(plugin), source.shared_key.as_deref()),
            None => (self.files.script_dir(source.name()), Some(source.name())),
        };
        if let Err(e) = files::copy_dir(&script_src, &self.files.script_dir(new_name)) {
            error!(source = %source.name(), copy = %new_name, error = %e, "Failed to copy script directory");
        }
        if let Some(owner) = data_owner
            && let Err(e) = files::copy_dir(&self.files.plugin_data_dir(owner), &self.files.plugin_data_dir(new_name))
        {
            error!(source = %source.name(), copy = %new_name, error = %e, "Failed to copy plugin data");
        }
    }

    pub fn clipboard(&self) -> Option<&Clipboard> {
        self.clipboard.as_ref()
    }

    pub fn clear_clipboard(&mut self) {
        self.clipboard = None;
    }

    /// Put a custom record on the clipboard for relocation
    pub fn cut(&mut self, name: &str) -> Result<(), EditError> {
        self.editable(name).map_err(refused)?;
        self.clipboard = Some(Clipboard {
            name: name.to_string(),
            cut: true,
        });
        debug!(name = %name, "Cut to clipboard");
        Ok(())
    }

    /// Put a custom or plugin record on the clipboard for duplication
    pub fn copy(&mut self, name: &str) -> Result<(), EditError> {
        let record = self
            .store
            .exists(name)
            .ok_or_else(|| refused(EditError::NotFound(name.to_string())))?;
        if record.lock {
            return Err(refused(EditError::ReadOnly(name.to_string())));
        }
        self.clipboard = Some(Clipboard {
            name: name.to_string(),
            cut: false,
        });
        debug!(name = %name, "Copied to clipboard");
        Ok(())
    }

    fn check_paste(&self, target: &str) -> Result<Clipboard, EditError> {
        let clip = self.clipboard.clone().ok_or(EditError::EmptyClipboard)?;
        let target_tool = self.editable(target)?.tool;
        let source = self
            .store
            .exists(&clip.name)
            .ok_or_else(|| EditError::NotFound(clip.name.clone()))?;
        if source.tool.is_builtin() && target_tool == Tool::None {
            return Err(EditError::ToolIntoMenu(clip.name.clone()));
        }
        let into_self = (clip.cut && clip.name == target) || (source.is_submenu() && self.is_within(target, &clip.name));
        if into_self {
            return Err(EditError::PasteIntoSelf {
                clipboard: clip.name.clone(),
                target: target.to_string(),
            });
        }
        Ok(clip)
    }

    /// Paste the clipboard after `target`, returning the pasted record's name
    pub fn paste(&mut self, target: &str) -> Result<String, EditError> {
        let clip = self.check_paste(target).map_err(refused)?;
        if clip.cut {
            self.unlink(&clip.name);
            self.insert_after(target, &clip.name)?;
            self.clipboard = None;
            info!(name = %clip.name, target = %target, "Moved record");
            Ok(clip.name)
        } else {
            let copy = self.copy_subtree(&clip.name, false)?;
            self.insert_after(target, &copy)?;
            info!(source = %clip.name, copy = %copy, target = %target, "Pasted copy");
            Ok(copy)
        }
    }

    /// New custom command after `anchor`
    ///
    /// `text` is the command line, the script body, the application path or
    /// the bookmark target depending on `kind`.
    pub fn new_command(&mut self, anchor: &str, label: &str, kind: CommandKind, text: &str) -> Result<String, EditError> {
        self.editable(anchor).map_err(refused)?;
        let name = self.store.new_custom();
        let mut command = Command {
            kind,
            ..Command::default()
        };
        match kind {
            CommandKind::Line => command.line = Some(text.to_string()),
            CommandKind::Script => {
                if let Err(e) = self.files.write_script(&name, text) {
                    error!(name = %name, error = %e, "Failed to write script");
                }
            }
            CommandKind::App | CommandKind::Bookmark => command.target = Some(text.to_string()),
        }
        let record = self.store.get(&name);
        record.menu_label = Some(label.to_string());
        record.payload = Payload::Command(command);
        self.insert_after(anchor, &name)?;
        Ok(name)
    }

    pub fn new_separator(&mut self, anchor: &str) -> Result<String, EditError> {
        self.editable(anchor).map_err(refused)?;
        let name = self.store.new_custom();
        self.store.get(&name).menu_style = MenuStyle::Separator;
        self.insert_after(anchor, &name)?;
        Ok(name)
    }

    /// New submenu after `anchor`, holding one placeholder command
    pub fn new_submenu(&mut self, anchor: &str, label: &str) -> Result<String, EditError> {
        self.editable(anchor).map_err(refused)?;
        let name = self.store.new_custom();
        let record = self.store.get(&name);
        record.menu_style = MenuStyle::Submenu;
        record.menu_label = Some(label.to_string());
        self.insert_after(anchor, &name)?;
        self.new_placeholder(&name);
        Ok(name)
    }

    /// Every broken link in the store, in name order
    pub fn check_links(&self) -> Vec<LinkViolation> {
        let mut violations = Vec::new();
        for name in self.store.names() {
            let Some(record) = self.store.exists(&name) else {
                continue;
            };
            let links = &record.links;
            if record.lock {
                if !links.is_empty() {
                    violations.push(LinkViolation::LockedWithLinks { name });
                }
                continue;
            }

            for (field, target) in [
                ("prev", &links.prev),
                ("next", &links.next),
                ("parent", &links.parent),
                ("child", &links.child),
            ] {
                if let Some(target) = target
                    && !self.store.contains(target)
                {
                    violations.push(LinkViolation::Dangling {
                        name: name.clone(),
                        field,
                        target: target.clone(),
                    });
                }
            }

            if let Some(next) = &links.next
                && let Some(next_record) = self.store.exists(next)
                && next_record.links.prev.as_deref() != Some(name.as_str())
            {
                violations.push(LinkViolation::AsymmetricNext {
                    name: name.clone(),
                    next: next.clone(),
                });
            }
            if let Some(prev) = &links.prev
                && let Some(prev_record) = self.store.exists(prev)
                && prev_record.links.next.as_deref() != Some(name.as_str())
            {
                violations.push(LinkViolation::AsymmetricPrev {
                    name: name.clone(),
                    prev: prev.clone(),
                });
            }

            if let Some(parent) = &links.parent {
                if links.prev.is_some() {
                    violations.push(LinkViolation::ParentOnNonHead { name: name.clone() });
                } else if let Some(parent_record) = self.store.exists(parent)
                    && parent_record.links.child.as_deref() != Some(name.as_str())
                {
                    violations.push(LinkViolation::ParentMismatch {
                        name: name.clone(),
                        parent: parent.clone(),
                    });
                }
            }

            if record.is_submenu() {
                match &links.child {
                    None => violations.push(LinkViolation::EmptySubmenu { name: name.clone() }),
                    Some(child) => {
                        if let Some(child_record) = self.store.exists(child)
                            && child_record.links.parent.as_deref() != Some(name.as_str())
                        {
                            violations.push(LinkViolation::ParentMismatch {
                                name: child.clone(),
                                parent: name.clone(),
                            });
                        }
                    }
                }
            }

            if self.next_chain_returns_to(&name) {
                violations.push(LinkViolation::Cycle { name });
            }
        }
        violations
    }

    fn next_chain_returns_to(&self, name: &str) -> bool {
        let mut current = self.store.exists(name).and_then(|r| r.links.next.clone());
        let mut steps = 0;
        while let Some(next) = current {
            if next == name {
                return true;
            }
            steps += 1;
            if steps > self.store.len() {
                return false;
            }
            current = self.store.exists(&next).and_then(|r| r.links.next.clone());
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{PluginSource, TriState};
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn test_registry() -> Registry {
        Registry::init(&std::env::temp_dir().join("xset-tree-tests-unused"))
    }

    /// Top-level chain of `n` line commands
    fn chain(registry: &mut Registry, n: usize) -> Vec<String> {
        let first = registry.store.new_custom();
        registry.store.get(&first).menu_label = Some("item 0".to_string());
        let mut names = vec![first];
        for i in 1..n {
            let anchor = names[i - 1].clone();
            let name = registry
                .new_command(&anchor, &format!("item {i}"), CommandKind::Line, "true")
                .unwrap();
            names.push(name);
        }
        names
    }

    fn next_of(registry: &Registry, name: &str) -> Option<String> {
        registry.exists(name).unwrap().links.next.clone()
    }

    fn prev_of(registry: &Registry, name: &str) -> Option<String> {
        registry.exists(name).unwrap().links.prev.clone()
    }

    #[test]
    fn test_insert_after_links_both_neighbors() {
        let mut registry = test_registry();
        let names = chain(&mut registry, 2);
        let new = registry.store.new_custom();
        registry.insert_after(&names[0], &new).unwrap();

        assert_eq!(registry.siblings(&names[0]), vec![names[0].clone(), new.clone(), names[1].clone()]);
        assert_eq!(prev_of(&registry, &new).as_deref(), Some(names[0].as_str()));
        assert_eq!(prev_of(&registry, &names[1]).as_deref(), Some(new.as_str()));
        assert!(registry.check_links().is_empty());
    }

    #[test]
    fn test_remove_middle_splices_neighbors() {
        let mut registry = test_registry();
        let names = chain(&mut registry, 3);
        registry.remove(&names[1]).unwrap();

        assert!(registry.exists(&names[1]).is_none());
        assert_eq!(next_of(&registry, &names[0]).as_deref(), Some(names[2].as_str()));
        assert_eq!(prev_of(&registry, &names[2]).as_deref(), Some(names[0].as_str()));
        assert!(registry.check_links().is_empty());
    }

    #[test]
    fn test_remove_head_promotes_next() {
        let mut registry = test_registry();
        let names = chain(&mut registry, 1);
        let submenu = registry.new_submenu(&names[0], "Tools").unwrap();
        let head = registry.children(&submenu)[0].clone();
        let second = registry.new_command(&head, "Second", CommandKind::Line, "ls").unwrap();

        registry.remove(&head).unwrap();
        assert_eq!(registry.children(&submenu), vec![second.clone()]);
        let promoted = registry.exists(&second).unwrap();
        assert_eq!(promoted.links.parent.as_deref(), Some(submenu.as_str()));
        assert!(promoted.links.prev.is_none());
        assert!(registry.check_links().is_empty());
    }

    #[test]
    fn test_remove_sole_child_creates_placeholder() {
        let mut registry = test_registry();
        let names = chain(&mut registry, 1);
        let submenu = registry.new_submenu(&names[0], "Tools").unwrap();
        let only = registry.children(&submenu)[0].clone();

        let unlinked = registry.remove(&only).unwrap();
        let children = registry.children(&submenu);
        assert_eq!(children.len(), 1);
        assert_eq!(unlinked.placeholder.as_ref(), Some(&children[0]));
        assert_ne!(children[0], only);
        let placeholder = registry.exists(&children[0]).unwrap();
        assert_eq!(placeholder.menu_label.as_deref(), Some(names::PLACEHOLDER_LABEL));
        assert_eq!(placeholder.command().map(|c| c.kind), Some(CommandKind::Line));
        assert_eq!(placeholder.links.parent.as_deref(), Some(submenu.as_str()));
        assert!(registry.check_links().is_empty());
    }

    #[test]
    fn test_remove_refuses_builtin_and_plugin() {
        let mut registry = test_registry();
        registry.get("main_terminal");
        assert_eq!(
            registry.remove("main_terminal"),
            Err(EditError::ReadOnly("main_terminal".to_string()))
        );

        let plugin_item = "/plugins/p/cstm_00000001";
        registry.store.insert(Record::new_custom(plugin_item));
        registry.store.get(plugin_item).plugin = Some(PluginSource {
            dir: PathBuf::from("/plugins/p"),
            name: "cstm_00000001".to_string(),
            top: true,
        });
        assert!(matches!(registry.remove(plugin_item), Err(EditError::ReadOnly(_))));
        assert!(matches!(registry.remove("missing"), Err(EditError::NotFound(_))));
    }

    #[test]
    fn test_remove_submenu_frees_contents_and_files() {
        let tmp = tempfile::tempdir().unwrap();
        let mut registry = Registry::init(tmp.path());
        let names = chain(&mut registry, 1);
        let submenu = registry.new_submenu(&names[0], "Scripts").unwrap();
        let head = registry.children(&submenu)[0].clone();
        let script = registry.new_command(&head, "Run", CommandKind::Script, "echo hi\n").unwrap();
        assert!(registry.files.script_file(&script).exists());
        registry.copy(&script).unwrap();

        registry.remove(&submenu).unwrap();
        assert!(registry.exists(&head).is_none());
        assert!(registry.exists(&script).is_none());
        assert!(!registry.files.script_dir(&script).exists());
        assert!(registry.clipboard().is_none());
        assert_eq!(registry.siblings(&names[0]), vec![names[0].clone()]);
    }

    #[test]
    fn test_copy_subtree_is_isomorphic() {
        let mut registry = test_registry();
        let names = chain(&mut registry, 1);
        let submenu = registry.new_submenu(&names[0], "Tools").unwrap();
        let head = registry.children(&submenu)[0].clone();
        registry.new_command(&head, "List", CommandKind::Line, "ls").unwrap();
        registry.store.get(&head).key = crate::record::KeyBinding::new(65, 4);
        let before = registry.store.len();

        let copy = registry.copy_subtree(&submenu, false).unwrap();
        assert_eq!(registry.store.len(), before + 3);

        let source_children = registry.children(&submenu);
        let copy_children = registry.children(&copy);
        assert_eq!(copy_children.len(), source_children.len());
        for (src, dst) in source_children.iter().zip(&copy_children) {
            assert_ne!(src, dst);
            let (a, b) = (registry.exists(src).unwrap(), registry.exists(dst).unwrap());
            assert_eq!(a.menu_label, b.menu_label);
            assert_eq!(a.payload, b.payload);
            assert!(!b.key.is_set());
        }
        let copied = registry.exists(&copy).unwrap();
        assert!(copied.links.prev.is_none() && copied.links.next.is_none());
        assert_eq!(copied.menu_label.as_deref(), Some("Tools"));
    }

    #[test]
    fn test_copy_subtree_with_siblings() {
        let mut registry = test_registry();
        let names = chain(&mut registry, 3);
        let copy = registry.copy_subtree(&names[0], true).unwrap();
        assert_eq!(registry.siblings(&copy).len(), 3);
        let single = registry.copy_subtree(&names[0], false).unwrap();
        assert_eq!(registry.siblings(&single).len(), 1);
    }

    #[test]
    fn test_copy_plugin_item_takes_mirror_state() {
        let mut registry = test_registry();
        let plugin_item = "/plugins/p/cstm_00000001";
        let mut record = Record::new_custom(plugin_item);
        record.plugin = Some(PluginSource {
            dir: PathBuf::from("/plugins/p"),
            name: "cstm_00000001".to_string(),
            top: true,
        });
        record.icon = Some("plugin-icon".to_string());
        record.menu_label = Some("Plugin Item".to_string());
        record.shared_key = Some("cstm_mirror01".to_string());
        registry.store.insert(record);

        let mut mirror = Record::new_custom("cstm_mirror01");
        mirror.icon = Some("user-icon".to_string());
        mirror.context = Some("0%%%%%0%%%%%".to_string());
        mirror.run.in_terminal = TriState::True;
        registry.store.insert(mirror);

        let copy = registry.copy_subtree(plugin_item, false).unwrap();
        let copied = registry.exists(&copy).unwrap();
        assert!(copied.is_custom() && !copied.is_plugin());
        assert_eq!(copied.menu_label.as_deref(), Some("Plugin Item"));
        assert_eq!(copied.icon.as_deref(), Some("user-icon"));
        assert_eq!(copied.context.as_deref(), Some("0%%%%%0%%%%%"));
        assert_eq!(copied.run.in_terminal, TriState::True);
    }

    #[test]
    fn test_copy_duplicates_script_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let mut registry = Registry::init(tmp.path());
        let names = chain(&mut registry, 1);
        let script = registry.new_command(&names[0], "Run", CommandKind::Script, "echo hi\n").unwrap();
        let copy = registry.copy_subtree(&script, false).unwrap();
        let copied_script = std::fs::read_to_string(registry.files.script_file(&copy)).unwrap();
        assert_eq!(copied_script, "echo hi\n");
    }

    #[test]
    fn test_paste_cut_relocates() {
        let mut registry = test_registry();
        let names = chain(&mut registry, 3);
        registry.cut(&names[0]).unwrap();
        let pasted = registry.paste(&names[2]).unwrap();

        assert_eq!(pasted, names[0]);
        assert_eq!(
            registry.siblings(&names[1]),
            vec![names[1].clone(), names[2].clone(), names[0].clone()]
        );
        assert!(registry.clipboard().is_none());
        assert!(registry.check_links().is_empty());
    }

    #[test]
    fn test_paste_copy_duplicates() {
        let mut registry = test_registry();
        let names = chain(&mut registry, 2);
        registry.copy(&names[1]).unwrap();
        let pasted = registry.paste(&names[0]).unwrap();

        assert_ne!(pasted, names[1]);
        assert_eq!(registry.siblings(&names[0]).len(), 3);
        assert_eq!(registry.exists(&pasted).unwrap().menu_label.as_deref(), Some("item 1"));
        // a copy clipboard stays available
        assert!(registry.clipboard().is_some());
        assert!(registry.check_links().is_empty());
    }

    #[test]
    fn test_paste_into_own_submenu_refused() {
        let mut registry = test_registry();
        let names = chain(&mut registry, 1);
        let submenu = registry.new_submenu(&names[0], "Tools").unwrap();
        let inner = registry.children(&submenu)[0].clone();
        let nested = registry.new_submenu(&inner, "Nested").unwrap();
        let deep = registry.children(&nested)[0].clone();

        registry.cut(&submenu).unwrap();
        for target in [&inner, &nested, &deep, &submenu] {
            assert!(registry.is_in_clipboard_tree(target));
            assert!(matches!(registry.paste(target), Err(EditError::PasteIntoSelf { .. })));
        }
        assert!(!registry.is_in_clipboard_tree(&names[0]));
        assert!(registry.check_links().is_empty());
    }

    #[test]
    fn test_paste_cut_after_itself_refused() {
        let mut registry = test_registry();
        let names = chain(&mut registry, 2);
        registry.cut(&names[1]).unwrap();
        assert!(matches!(registry.paste(&names[1]), Err(EditError::PasteIntoSelf { .. })));
    }

    #[test]
    fn test_builtin_tool_into_menu_refused() {
        let mut registry = test_registry();
        let names = chain(&mut registry, 2);
        registry.store.get(&names[1]).tool = Tool::Home;
        registry.copy(&names[1]).unwrap();
        assert_eq!(
            registry.paste(&names[0]),
            Err(EditError::ToolIntoMenu(names[1].clone()))
        );
    }

    #[test]
    fn test_insert_into_toolbar_marks_custom_tool() {
        let mut registry = test_registry();
        let names = chain(&mut registry, 1);
        registry.store.get(&names[0]).tool = Tool::Custom;
        let name = registry.new_command(&names[0], "Tool", CommandKind::Line, "ls").unwrap();
        assert_eq!(registry.exists(&name).unwrap().tool, Tool::Custom);
    }

    #[test]
    fn test_empty_clipboard() {
        let mut registry = test_registry();
        let names = chain(&mut registry, 1);
        assert_eq!(registry.paste(&names[0]), Err(EditError::EmptyClipboard));
    }

    #[test]
    fn test_parent_of_walks_to_head() {
        let mut registry = test_registry();
        let names = chain(&mut registry, 1);
        let submenu = registry.new_submenu(&names[0], "Tools").unwrap();
        let head = registry.children(&submenu)[0].clone();
        let second = registry.new_command(&head, "b", CommandKind::Line, "b").unwrap();
        let third = registry.new_command(&second, "c", CommandKind::Line, "c").unwrap();

        assert_eq!(registry.head_of(&third), head);
        assert_eq!(registry.parent_of(&third).as_deref(), Some(submenu.as_str()));
        assert!(registry.exists(&third).unwrap().links.parent.is_none());
        assert_eq!(registry.parent_of(&names[0]), None);
    }

    #[test]
    fn test_check_links_reports_breakage() {
        let mut registry = test_registry();
        let names = chain(&mut registry, 2);
        registry.store.get(&names[1]).links.prev = None;
        registry.store.get("main_terminal").links.next = Some(names[0].clone());
        let submenu = registry.store.new_custom();
        registry.store.get(&submenu).menu_style = MenuStyle::Submenu;

        let violations = registry.check_links();
        assert!(violations.contains(&LinkViolation::AsymmetricNext {
            name: names[0].clone(),
            next: names[1].clone(),
        }));
        assert!(violations.contains(&LinkViolation::LockedWithLinks {
            name: "main_terminal".to_string()
        }));
        assert!(violations.contains(&LinkViolation::EmptySubmenu { name: submenu }));
    }

    #[test]
    fn test_check_links_reports_cycle() {
        let mut registry = test_registry();
        let names = chain(&mut registry, 2);
        registry.store.get(&names[1]).links.next = Some(names[0].clone());
        registry.store.get(&names[0]).links.prev = Some(names[1].clone());
        let violations = registry.check_links();
        assert!(violations.contains(&LinkViolation::Cycle { name: names[0].clone() }));
        // walkers still terminate
        assert_eq!(registry.siblings(&names[0]).len(), 2);
        assert!(names.contains(&registry.head_of(&names[0])));
    }

    #[derive(Debug, Clone)]
    enum Op {
        NewCommand(usize),
        NewSeparator(usize),
        NewSubmenu(usize),
        Remove(usize),
        Cut(usize),
        Copy(usize),
        Paste(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<usize>().prop_map(Op::NewCommand),
            any::<usize>().prop_map(Op::NewSeparator),
            any::<usize>().prop_map(Op::NewSubmenu),
            any::<usize>().prop_map(Op::Remove),
            any::<usize>().prop_map(Op::Cut),
            any::<usize>().prop_map(Op::Copy),
            any::<usize>().prop_map(Op::Paste),
        ]
    }

    proptest! {
        #[test]
        fn prop_links_stay_symmetric(ops in proptest::collection::vec(op_strategy(), 1..40)) {
            let mut registry = test_registry();
            chain(&mut registry, 3);
            for op in ops {
                let names = registry.store.names();
                if names.is_empty() {
                    break;
                }
                let pick = |i: usize| names[i % names.len()].clone();
                let _ = match op {
                    Op::NewCommand(i) => registry.new_command(&pick(i), "cmd", CommandKind::Line, "true").map(drop),
                    Op::NewSeparator(i) => registry.new_separator(&pick(i)).map(drop),
                    Op::NewSubmenu(i) => registry.new_submenu(&pick(i), "menu").map(drop),
                    Op::Remove(i) => registry.remove(&pick(i)).map(drop),
                    Op::Cut(i) => registry.cut(&pick(i)),
                    Op::Copy(i) => registry.copy(&pick(i)),
                    Op::Paste(i) => registry.paste(&pick(i)).map(drop),
                };
                prop_assert_eq!(registry.check_links(), Vec::<LinkViolation>::new());
            }
        }
    }
}
