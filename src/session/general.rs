//! Application-wide settings stored in the `[General]`, `[Window]` and
//! `[Interface]` sections
//!
//! Only values that differ from the defaults are written.

use std::fmt::Write as _;
use tracing::debug;

use crate::constants::file;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    // [General]
    pub show_thumbnail: bool,
    /// Largest file to thumbnail, in KiB
    pub max_thumb_size: u32,
    pub big_icon_size: u32,
    pub small_icon_size: u32,
    /// 0 picks the theme's toolbar size
    pub tool_icon_size: u32,
    pub single_click: bool,
    pub single_hover: bool,
    pub use_si_prefix: bool,
    pub no_execute: bool,
    pub no_confirm: bool,
    pub no_confirm_trash: bool,
    pub date_format: String,

    // [Window]
    pub width: u32,
    pub height: u32,
    pub maximized: bool,

    // [Interface]
    pub always_show_tabs: bool,
    pub show_close_tab_buttons: bool,
    pub new_tab_here: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            show_thumbnail: true,
            max_thumb_size: 8192,
            big_icon_size: 48,
            small_icon_size: 22,
            tool_icon_size: 0,
            single_click: false,
            single_hover: false,
            use_si_prefix: false,
            no_execute: true,
            no_confirm: false,
            no_confirm_trash: false,
            date_format: "%Y-%m-%d %H:%M".to_string(),
            width: 640,
            height: 480,
            maximized: false,
            always_show_tabs: true,
            show_close_tab_buttons: false,
            new_tab_here: false,
        }
    }
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}

impl AppSettings {
    /// Every setting as `(section, key, value)`, in file order
    fn entries(&self) -> Vec<(&'static str, &'static str, String)> {
        use crate::constants::file::{SECTION_GENERAL as G, SECTION_INTERFACE as I, SECTION_WINDOW as W};
        vec![
            (G, "show_thumbnail", flag(self.show_thumbnail)),
            (G, "max_thumb_size", self.max_thumb_size.to_string()),
            (G, "big_icon_size", self.big_icon_size.to_string()),
            (G, "small_icon_size", self.small_icon_size.to_string()),
            (G, "tool_icon_size", self.tool_icon_size.to_string()),
            (G, "single_click", flag(self.single_click)),
            (G, "single_hover", flag(self.single_hover)),
            (G, "use_si_prefix", flag(self.use_si_prefix)),
            (G, "no_execute", flag(self.no_execute)),
            (G, "no_confirm", flag(self.no_confirm)),
            (G, "no_confirm_trash", flag(self.no_confirm_trash)),
            (G, "date_format", self.date_format.clone()),
            (W, "width", self.width.to_string()),
            (W, "height", self.height.to_string()),
            (W, "maximized", flag(self.maximized)),
            (I, "always_show_tabs", flag(self.always_show_tabs)),
            (I, "show_close_tab_buttons", flag(self.show_close_tab_buttons)),
            (I, "new_tab_here", flag(self.new_tab_here)),
        ]
    }

    /// Apply one `key=value` line of a settings section
    ///
    /// Returns false when the line was not understood; the setting keeps its
    /// current value.
    pub fn apply(&mut self, section: &str, key: &str, value: &str) -> bool {
        let applied = match (section, key) {
            (file::SECTION_GENERAL, "show_thumbnail") => parse_flag(value).map(|v| self.show_thumbnail = v),
            (file::SECTION_GENERAL, "max_thumb_size") => value.trim().parse().ok().map(|v| self.max_thumb_size = v),
            (file::SECTION_GENERAL, "big_icon_size") => value.trim().parse().ok().map(|v| self.big_icon_size = v),
            (file::SECTION_GENERAL, "small_icon_size") => value.trim().parse().ok().map(|v| self.small_icon_size = v),
            (file::SECTION_GENERAL, "tool_icon_size") => value.trim().parse().ok().map(|v| self.tool_icon_size = v),
            (file::SECTION_GENERAL, "single_click") => parse_flag(value).map(|v| self.single_click = v),
            (file::SECTION_GENERAL, "single_hover") => parse_flag(value).map(|v| self.single_hover = v),
            (file::SECTION_GENERAL, "use_si_prefix") => parse_flag(value).map(|v| self.use_si_prefix = v),
            (file::SECTION_GENERAL, "no_execute") => parse_flag(value).map(|v| self.no_execute = v),
            (file::SECTION_GENERAL, "no_confirm") => parse_flag(value).map(|v| self.no_confirm = v),
            (file::SECTION_GENERAL, "no_confirm_trash") => parse_flag(value).map(|v| self.no_confirm_trash = v),
            (file::SECTION_GENERAL, "date_format") => {
                self.date_format = value.to_string();
                Some(())
            }
            (file::SECTION_WINDOW, "width") => value.trim().parse().ok().map(|v| self.width = v),
            (file::SECTION_WINDOW, "height") => value.trim().parse().ok().map(|v| self.height = v),
            (file::SECTION_WINDOW, "maximized") => parse_flag(value).map(|v| self.maximized = v),
            (file::SECTION_INTERFACE, "always_show_tabs") => parse_flag(value).map(|v| self.always_show_tabs = v),
            (file::SECTION_INTERFACE, "show_close_tab_buttons") => {
                parse_flag(value).map(|v| self.show_close_tab_buttons = v)
            }
            (file::SECTION_INTERFACE, "new_tab_here") => parse_flag(value).map(|v| self.new_tab_here = v),
            _ => None,
        };
        if applied.is_none() {
            debug!(section = %section, key = %key, value = %value, "Ignored setting");
        }
        applied.is_some()
    }

    /// Append the non-default settings, grouped by section
    pub fn write(&self, out: &mut String) {
        let defaults = Self::default().entries();
        let mut current_section = None;
        for ((section, key, value), (_, _, default)) in self.entries().into_iter().zip(defaults) {
            if value == default {
                continue;
            }
            if current_section != Some(section) {
                let _ = writeln!(out, "\n[{section}]");
                current_section = Some(section);
            }
            let _ = writeln!(out, "{key}={}", value.replace('\n', " "));
        }
    }

    pub fn is_section(section: &str) -> bool {
        matches!(
            section,
            file::SECTION_GENERAL | file::SECTION_WINDOW | file::SECTION_INTERFACE
        )
    }
}
