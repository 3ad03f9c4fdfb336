//! xset: the settings and custom-command registry of a file manager
//!
//! A [`Registry`] owns every record, the clipboard and the on-disk layout of
//! script and plugin-data directories. Records form menus through named
//! links; plugins overlay read-only records whose user state lives in
//! mirror records; the session file persists it all.

#![forbid(unsafe_code)]

pub mod autosave;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod files;
pub mod menu;
pub mod plugin;
pub mod record;
pub mod registry;
pub mod rules;
pub mod session;
pub mod store;
pub mod task;
pub mod tree;

pub use autosave::{Autosave, SaveReport};
pub use config::Config;
pub use context::{ContextSnapshot, Subject};
pub use error::EditError;
pub use menu::MenuEntry;
pub use record::Record;
pub use registry::Registry;
pub use rules::{ContextRules, Decision};
pub use session::AppSettings;
pub use task::TaskRequest;
