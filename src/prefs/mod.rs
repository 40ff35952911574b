//! UI Preferences
//!
//! - **Store**: the key-value persistence port and its file/memory adapters
//! - **Preferences**: typed accessors with change subscription

mod preferences;
mod store;

pub use preferences::{
    Preferences, SidebarTheme, UiPreferences, DEFAULT_ACTIVE_ITEM, KEY_ACTIVE_ITEM,
    KEY_SIDEBAR_THEME, KEY_THEME,
};
pub use store::{FileStore, KeyValueStore, MemoryStore, PrefsError};
