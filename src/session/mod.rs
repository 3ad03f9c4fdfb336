//! Session file reader and writer
//!
//! The session file is UTF-8 text made of `[Section]` headers and
//! `name-field=value` lines. Registry records live in the `[MOD]` section;
//! application settings use `[General]`, `[Window]` and `[Interface]`.
//!
//! Built-in records only store what the user changed. Custom records store
//! everything, including their tree links. Plugin records are never written:
//! their content comes from the plugin directory and their user state lives
//! on the mirror.

pub mod field;
pub mod general;
pub mod plugin_file;

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::{file, names};
use crate::record::{MenuStyle, MirrorTarget, Record, Slot, Tool, TriState};
use crate::registry::Registry;

pub use field::Field;
pub use general::AppSettings;

/// One `key=value` line and the section it appeared in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Entry<'a> {
    pub section: &'a str,
    pub key: &'a str,
    pub value: &'a str,
}

/// Split text into entries, skipping blank lines, comments and lines
/// without `=`
pub(crate) fn entries(text: &str) -> Vec<Entry<'_>> {
    let mut section = "";
    let mut out = Vec::new();
    for raw in text.lines() {
        let line = raw.trim_end_matches('\r');
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            section = name;
            continue;
        }
        match line.split_once('=') {
            Some((key, value)) => out.push(Entry {
                section,
                key: key.trim(),
                value,
            }),
            None => debug!(line = %line, "Skipped line without '='"),
        }
    }
    out
}

/// Split `name-field` at the last `-`
pub(crate) fn split_key(key: &str) -> Option<(&str, Field)> {
    let Some((name, suffix)) = key.rsplit_once('-') else {
        debug!(key = %key, "Skipped key without field suffix");
        return None;
    };
    if name.is_empty() {
        debug!(key = %key, "Skipped key without record name");
        return None;
    }
    match suffix.parse::<Field>() {
        Ok(field) => Some((name, field)),
        Err(unknown) => {
            debug!(key = %key, field = %unknown.0, "Ignored unknown field");
            None
        }
    }
}

fn parse_or_log<T: std::str::FromStr>(field: Field, value: &str) -> Option<T> {
    let parsed = value.trim().parse::<T>().ok();
    if parsed.is_none() {
        debug!(field = %field, value = %value, "Ignored malformed value");
    }
    parsed
}

/// Apply one field read from disk
pub(crate) fn apply_field(record: &mut Record, field: Field, value: &str) {
    let text = Some(value.to_string());
    match field {
        Field::S => record.set_slot(Slot::S, text),
        Field::X => record.set_slot(Slot::X, text),
        Field::Y => record.set_slot(Slot::Y, text),
        Field::Z => record.set_slot(Slot::Z, text),
        Field::Line => record.set_slot(Slot::Line, text),
        Field::Label => record.menu_label = text,
        Field::Lbl => {
            record.menu_label = text;
            record.label_customized = true;
        }
        Field::Icon => record.icon = text,
        Field::Icn => {
            record.icon = text;
            record.icon_customized = true;
        }
        Field::B => record.b = TriState::from_code(value),
        Field::Key => {
            if let Some(key) = parse_or_log(field, value) {
                record.key.key = key;
            }
        }
        Field::KeyMod => {
            if let Some(modifiers) = parse_or_log(field, value) {
                record.key.modifiers = modifiers;
            }
        }
        Field::Style => {
            record.menu_style = parse_or_log::<i32>(field, value)
                .and_then(MenuStyle::from_code)
                .unwrap_or_else(|| {
                    debug!(value = %value, "Unknown menu style, using normal");
                    MenuStyle::Normal
                });
        }
        Field::Tool => match parse_or_log::<i32>(field, value).and_then(Tool::from_code) {
            Some(tool) => record.tool = tool,
            None => debug!(value = %value, "Ignored unknown tool code"),
        },
        Field::Desc => record.desc = text,
        Field::Title => record.title = text,
        Field::Next => record.links.next = text,
        Field::Prev => record.links.prev = text,
        Field::Parent => record.links.parent = text,
        Field::Child => record.links.child = text,
        Field::Context => record.context = text,
        Field::Task => record.run.task = TriState::from_code(value),
        Field::TaskPop => record.run.task_pop = TriState::from_code(value),
        Field::TaskErr => record.run.task_err = TriState::from_code(value),
        Field::TaskOut => record.run.task_out = TriState::from_code(value),
        Field::Term => record.run.in_terminal = TriState::from_code(value),
        Field::Keep => record.run.keep_terminal = TriState::from_code(value),
        Field::Scroll => record.run.scroll_lock = TriState::from_code(value),
        Field::Opener => {
            if let Some(opener) = parse_or_log(field, value) {
                record.opener = opener;
            }
        }
    }
}

fn put(lines: &mut Vec<(Field, String)>, field: Field, value: Option<&str>) {
    if let Some(value) = value {
        lines.push((field, value.replace('\n', " ")));
    }
}

fn put_flag(lines: &mut Vec<(Field, String)>, field: Field, value: TriState) {
    if let Some(code) = value.code() {
        lines.push((field, code.to_string()));
    }
}

/// Fields of a record as written to disk, empty when nothing differs from
/// the defaults
pub(crate) fn record_lines(record: &Record) -> Vec<(Field, String)> {
    let mut lines = Vec::new();
    let slots = record.payload.to_slots();

    if record.lock {
        put(&mut lines, Field::S, slots.s.as_deref());
        put(&mut lines, Field::X, slots.x.as_deref());
        put(&mut lines, Field::Y, slots.y.as_deref());
        put(&mut lines, Field::Z, slots.z.as_deref());
        put_flag(&mut lines, Field::B, record.b);
        if record.key.is_set() {
            lines.push((Field::Key, record.key.key.to_string()));
            lines.push((Field::KeyMod, record.key.modifiers.to_string()));
        }
        if record.tool != Tool::None {
            lines.push((Field::Tool, record.tool.code().to_string()));
        }
        if record.label_customized {
            put(&mut lines, Field::Lbl, record.menu_label.as_deref());
        }
        if record.icon_customized {
            put(&mut lines, Field::Icn, record.icon.as_deref());
        }
        return lines;
    }

    put(&mut lines, Field::Label, record.menu_label.as_deref());
    put(&mut lines, Field::Icon, record.icon.as_deref());
    put(&mut lines, Field::S, slots.s.as_deref());
    put(&mut lines, Field::X, slots.x.as_deref());
    put(&mut lines, Field::Y, slots.y.as_deref());
    put(&mut lines, Field::Z, slots.z.as_deref());
    put_flag(&mut lines, Field::B, record.b);
    if record.key.is_set() {
        lines.push((Field::Key, record.key.key.to_string()));
        lines.push((Field::KeyMod, record.key.modifiers.to_string()));
    }
    if record.menu_style != MenuStyle::Normal {
        lines.push((Field::Style, record.menu_style.code().to_string()));
    }
    match &record.mirror_of {
        Some(target) => {
            put(&mut lines, Field::Desc, Some(names::MIRROR_DESC));
            put(&mut lines, Field::Parent, Some(&target.plugin_dir.display().to_string()));
            put(&mut lines, Field::Child, Some(&target.plugin_name));
        }
        None => {
            put(&mut lines, Field::Desc, record.desc.as_deref());
            put(&mut lines, Field::Parent, record.links.parent.as_deref());
            put(&mut lines, Field::Child, record.links.child.as_deref());
        }
    }
    put(&mut lines, Field::Title, record.title.as_deref());
    put(&mut lines, Field::Next, record.links.next.as_deref());
    put(&mut lines, Field::Prev, record.links.prev.as_deref());
    put(&mut lines, Field::Context, record.context.as_deref());
    put(&mut lines, Field::Line, slots.line.as_deref());
    if record.tool != Tool::None {
        lines.push((Field::Tool, record.tool.code().to_string()));
    }
    put_flag(&mut lines, Field::Task, record.run.task);
    put_flag(&mut lines, Field::TaskPop, record.run.task_pop);
    put_flag(&mut lines, Field::TaskErr, record.run.task_err);
    put_flag(&mut lines, Field::TaskOut, record.run.task_out);
    put_flag(&mut lines, Field::Term, record.run.in_terminal);
    put_flag(&mut lines, Field::Keep, record.run.keep_terminal);
    put_flag(&mut lines, Field::Scroll, record.run.scroll_lock);
    if record.opener != 0 {
        lines.push((Field::Opener, record.opener.to_string()));
    }
    lines
}

/// Append every line of `record` under its own name
pub(crate) fn write_record(out: &mut String, name: &str, record: &Record) {
    for (field, value) in record_lines(record) {
        let _ = writeln!(out, "{name}-{field}={value}");
    }
}

/// Replace `path` with `text` through a temporary sibling file
pub fn write_atomic(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .context(format!("Failed to create directory: {}", parent.display()))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(file::TMP_SUFFIX);
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, text).context(format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .context(format!("Failed to move {} to {}", tmp.display(), path.display()))?;
    Ok(())
}

impl Registry {
    /// Merge session text into the registry, returning the app settings it holds
    pub fn read_session(&mut self, text: &str) -> AppSettings {
        let mut settings = AppSettings::default();
        let mut lines = 0usize;
        for entry in entries(text) {
            if entry.section == file::SECTION_RECORDS {
                let Some((name, field)) = split_key(entry.key) else {
                    continue;
                };
                let record = self.store.get(name);
                if name.starts_with(names::CUSTOM_PREFIX) {
                    record.lock = false;
                }
                apply_field(record, field, entry.value);
                lines += 1;
            } else if AppSettings::is_section(entry.section) {
                settings.apply(entry.section, entry.key, entry.value);
            } else {
                debug!(section = %entry.section, key = %entry.key, "Ignored line in unknown section");
            }
        }
        self.finish_records();
        info!(lines = lines, records = self.store.len(), "Read session");
        settings
    }

    /// Turn raw fields into typed state after a load
    fn finish_records(&mut self) {
        for record in self.store.iter_mut() {
            if record.lock || record.is_plugin() {
                continue;
            }
            if record.desc.as_deref() == Some(names::MIRROR_DESC) {
                record.mirror_of = Some(MirrorTarget {
                    plugin_dir: PathBuf::from(record.links.parent.take().unwrap_or_default()),
                    plugin_name: record.links.child.take().unwrap_or_default(),
                });
                record.desc = None;
            }
            record.normalize_payload();
        }
    }

    /// Read the session file; a missing file yields default settings
    pub fn load_session(&mut self, path: &Path) -> Result<AppSettings> {
        if !path.exists() {
            info!(path = %path.display(), "No session file, starting empty");
            return Ok(AppSettings::default());
        }
        let text = fs::read_to_string(path)
            .context(format!("Failed to read session from {}", path.display()))?;
        Ok(self.read_session(&text))
    }

    /// Serialize settings and every non-plugin record, sorted by name
    pub fn session_text(&self, settings: &AppSettings) -> String {
        let mut out = String::from("# xset session\n");
        settings.write(&mut out);
        let _ = writeln!(out, "\n[{}]", file::SECTION_RECORDS);
        for name in self.store.names() {
            let Some(record) = self.store.exists(&name) else {
                continue;
            };
            if record.is_plugin() {
                continue;
            }
            write_record(&mut out, &name, record);
        }
        out
    }

    pub fn save_session(&self, path: &Path, settings: &AppSettings) -> Result<()> {
        let text = self.session_text(settings);
        write_atomic(path, &text).context(format!("Failed to save session to {}", path.display()))?;
        info!(path = %path.display(), bytes = text.len(), "Saved session");
        Ok(())
    }
}
