//! Plugin description files
//!
//! A plugin directory holds a `plugin` file: a `[Plugin]` header followed by
//! `name-field=value` lines using the plugin's own local names.

use tracing::debug;

use super::{Field, entries, split_key, write_record};
use crate::constants::file;
use crate::record::Record;

/// One parsed line of a plugin file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginLine {
    pub local: String,
    pub field: Field,
    pub value: String,
}

/// Parse the `[Plugin]` section, skipping anything malformed
pub fn parse(text: &str) -> Vec<PluginLine> {
    entries(text)
        .into_iter()
        .filter(|entry| {
            let keep = entry.section == file::SECTION_PLUGIN;
            if !keep {
                debug!(section = %entry.section, key = %entry.key, "Ignored line outside plugin section");
            }
            keep
        })
        .filter_map(|entry| {
            split_key(entry.key).map(|(local, field)| PluginLine {
                local: local.to_string(),
                field,
                value: entry.value.to_string(),
            })
        })
        .collect()
}

/// Render records as a plugin file, keyed by their own names
pub fn render<'a>(records: impl IntoIterator<Item = &'a Record>) -> String {
    let mut out = format!("[{}]\n", file::SECTION_PLUGIN);
    for record in records {
        write_record(&mut out, record.name(), record);
    }
    out
}
