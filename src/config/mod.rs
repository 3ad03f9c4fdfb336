//! Configuration management for xset
//!
//! Only process-level settings live here. Everything the user edits in the
//! application goes to the session file instead.

pub mod settings;

pub use settings::Config;
