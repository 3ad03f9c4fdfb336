//! Refusals returned by tree edits
//!
//! An edit that would break the menu tree is rejected before anything is
//! mutated. I/O problems use `anyhow` instead.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("no record named '{0}'")]
    NotFound(String),

    /// Built-in and plugin records cannot be edited in place
    #[error("record '{0}' is read-only")]
    ReadOnly(String),

    #[error("cannot paste '{clipboard}' at '{target}': target is inside the clipboard item")]
    PasteIntoSelf { clipboard: String, target: String },

    #[error("clipboard is empty")]
    EmptyClipboard,

    #[error("built-in toolbar item '{0}' cannot be placed in a menu")]
    ToolIntoMenu(String),
}
