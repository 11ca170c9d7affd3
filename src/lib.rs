//! Per-user UI preferences for lazyssh.
//!
//! Preferences are stored as JSON in `~/.lazyssh/settings.json`. Start with
//! [`Settings::open`] and read or write individual preferences through it.

pub mod config;
pub mod error;
pub mod sort_mode;

pub use config::{DEFAULT_SORT_MODE, Document, Settings, SettingsStore};
pub use error::{LoadFailure, SettingsError};
pub use sort_mode::{ParseSortModeError, SortMode};
