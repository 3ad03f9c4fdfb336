//! Menu model handed to the UI layer
//!
//! Walks a sibling chain, evaluates each item's context rules against the
//! current snapshot and returns plain entries. Turning them into widgets is
//! the caller's business.

use std::collections::HashSet;

use crate::context::ContextSnapshot;
use crate::record::{KeyBinding, MenuStyle};
use crate::registry::Registry;
use crate::rules::{self, Decision};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub name: String,
    pub label: Option<String>,
    pub icon: Option<String>,
    pub style: MenuStyle,
    pub decision: Decision,
    pub key: KeyBinding,
    /// Checkbox and radio state
    pub checked: bool,
    /// Submenu contents, empty for other styles
    pub children: Vec<MenuEntry>,
}

impl MenuEntry {
    pub fn is_visible(&self) -> bool {
        self.decision != Decision::Hide
    }

    pub fn is_enabled(&self) -> bool {
        self.decision == Decision::Show
    }
}

/// Entries for the chain starting at `head`, in sibling order
pub fn build(registry: &Registry, head: &str, snapshot: &ContextSnapshot) -> Vec<MenuEntry> {
    let mut seen = HashSet::new();
    build_chain(registry, head, snapshot, &mut seen)
}

fn build_chain(
    registry: &Registry,
    head: &str,
    snapshot: &ContextSnapshot,
    seen: &mut HashSet<String>,
) -> Vec<MenuEntry> {
    let mut entries = Vec::new();
    for name in registry.siblings(head) {
        if !seen.insert(name.clone()) {
            continue;
        }
        let Some(record) = registry.exists(&name) else {
            continue;
        };
        let decision = registry
            .effective_context(&name)
            .map(|rules| rules::evaluate(&rules, snapshot, record.disable))
            .unwrap_or(Decision::Show);
        let children = match (&record.links.child, record.is_submenu()) {
            (Some(child), true) => build_chain(registry, child, snapshot, seen),
            _ => Vec::new(),
        };
        entries.push(MenuEntry {
            label: record.menu_label.clone(),
            icon: registry.effective_icon(&name),
            style: record.menu_style,
            decision,
            key: registry.effective_key(&name),
            checked: record.b.is_true(),
            children,
            name,
        });
    }
    entries
}
