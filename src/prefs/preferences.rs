//! Typed UI Preferences
//!
//! Sidebar theme, dark mode and the last active navigation item, read from a
//! `KeyValueStore` at startup and written back on every change. Changes are
//! also pushed to subscribers so open views can restyle immediately.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tokio::sync::watch;

use super::store::{KeyValueStore, PrefsError};

pub const KEY_SIDEBAR_THEME: &str = "sidebarTheme";
pub const KEY_THEME: &str = "theme";
pub const KEY_ACTIVE_ITEM: &str = "activeSidebarItem";

pub const DEFAULT_ACTIVE_ITEM: &str = "dashboard";

/// Colour scheme of the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarTheme {
    #[default]
    Blue,
    BlueBlack,
    Green,
    Gray,
}

impl SidebarTheme {
    pub const ALL: [SidebarTheme; 4] = [
        SidebarTheme::Blue,
        SidebarTheme::BlueBlack,
        SidebarTheme::Green,
        SidebarTheme::Gray,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SidebarTheme::Blue => "blue",
            SidebarTheme::BlueBlack => "blueblack",
            SidebarTheme::Green => "green",
            SidebarTheme::Gray => "gray",
        }
    }

    /// Label shown in the settings picker
    pub fn label(&self) -> &'static str {
        match self {
            SidebarTheme::Blue => "Bleu",
            SidebarTheme::BlueBlack => "Bleu & noir",
            SidebarTheme::Green => "Vert",
            SidebarTheme::Gray => "Gris",
        }
    }
}

impl fmt::Display for SidebarTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SidebarTheme {
    type Err = PrefsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SidebarTheme::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| PrefsError::InvalidValue {
                key: KEY_SIDEBAR_THEME.to_string(),
                value: s.to_string(),
            })
    }
}

/// Snapshot of all UI preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiPreferences {
    pub sidebar_theme: SidebarTheme,
    pub dark_mode: bool,
    pub active_item: String,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            sidebar_theme: SidebarTheme::default(),
            dark_mode: false,
            active_item: DEFAULT_ACTIVE_ITEM.to_string(),
        }
    }
}

/// Preferences bound to a backing store
pub struct Preferences {
    store: Box<dyn KeyValueStore>,
    tx: watch::Sender<UiPreferences>,
}

impl Preferences {
    /// Load preferences; unknown or missing values fall back to defaults
    pub fn load(store: Box<dyn KeyValueStore>) -> Result<Self, PrefsError> {
        let mut prefs = UiPreferences::default();

        if let Some(raw) = store.get(KEY_SIDEBAR_THEME)? {
            match raw.parse() {
                Ok(theme) => prefs.sidebar_theme = theme,
                Err(e) => tracing::warn!(error = %e, "Ignoring stored sidebar theme"),
            }
        }
        if let Some(raw) = store.get(KEY_THEME)? {
            prefs.dark_mode = raw == "dark";
        }
        if let Some(raw) = store.get(KEY_ACTIVE_ITEM)? {
            if !raw.is_empty() {
                prefs.active_item = raw;
            }
        }

        let (tx, _) = watch::channel(prefs);
        Ok(Self { store, tx })
    }

    pub fn current(&self) -> UiPreferences {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiPreferences> {
        self.tx.subscribe()
    }

    pub fn sidebar_theme(&self) -> SidebarTheme {
        self.tx.borrow().sidebar_theme
    }

    pub fn set_sidebar_theme(&self, theme: SidebarTheme) -> Result<(), PrefsError> {
        self.store.set(KEY_SIDEBAR_THEME, theme.as_str())?;
        self.tx.send_modify(|p| p.sidebar_theme = theme);
        Ok(())
    }

    pub fn dark_mode(&self) -> bool {
        self.tx.borrow().dark_mode
    }

    pub fn set_dark_mode(&self, enabled: bool) -> Result<(), PrefsError> {
        self.store
            .set(KEY_THEME, if enabled { "dark" } else { "light" })?;
        self.tx.send_modify(|p| p.dark_mode = enabled);
        Ok(())
    }

    pub fn active_item(&self) -> String {
        self.tx.borrow().active_item.clone()
    }

    pub fn set_active_item(&self, item: &str) -> Result<(), PrefsError> {
        self.store.set(KEY_ACTIVE_ITEM, item)?;
        self.tx.send_modify(|p| p.active_item = item.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::store::MemoryStore;
    use std::sync::Arc;

    /// Lets a test inspect what Preferences wrote
    struct Shared(Arc<MemoryStore>);

    impl KeyValueStore for Shared {
        fn get(&self, key: &str) -> Result<Option<String>, PrefsError> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
            self.0.set(key, value)
        }
    }

    #[test]
    fn test_defaults() {
        let prefs = Preferences::load(Box::new(MemoryStore::new())).unwrap();
        assert_eq!(prefs.current(), UiPreferences::default());
        assert_eq!(prefs.sidebar_theme(), SidebarTheme::Blue);
        assert!(!prefs.dark_mode());
        assert_eq!(prefs.active_item(), "dashboard");
    }

    #[test]
    fn test_reads_stored_values() {
        let store = MemoryStore::new();
        store.set(KEY_SIDEBAR_THEME, "blueblack").unwrap();
        store.set(KEY_THEME, "dark").unwrap();
        store.set(KEY_ACTIVE_ITEM, "settings").unwrap();

        let prefs = Preferences::load(Box::new(store)).unwrap();
        assert_eq!(prefs.sidebar_theme(), SidebarTheme::BlueBlack);
        assert!(prefs.dark_mode());
        assert_eq!(prefs.active_item(), "settings");
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        for stored in ["rainbow", "purple", "indigo"] {
            let store = MemoryStore::new();
            store.set(KEY_SIDEBAR_THEME, stored).unwrap();
            let prefs = Preferences::load(Box::new(store)).unwrap();
            assert_eq!(prefs.sidebar_theme(), SidebarTheme::Blue);
        }
    }

    #[test]
    fn test_setters_write_through() {
        let backing = Arc::new(MemoryStore::new());
        let prefs = Preferences::load(Box::new(Shared(Arc::clone(&backing)))).unwrap();

        prefs.set_sidebar_theme(SidebarTheme::Green).unwrap();
        prefs.set_dark_mode(true).unwrap();
        prefs.set_active_item("administration").unwrap();

        assert_eq!(backing.get(KEY_SIDEBAR_THEME).unwrap().as_deref(), Some("green"));
        assert_eq!(backing.get(KEY_THEME).unwrap().as_deref(), Some("dark"));
        assert_eq!(
            backing.get(KEY_ACTIVE_ITEM).unwrap().as_deref(),
            Some("administration")
        );

        prefs.set_dark_mode(false).unwrap();
        assert_eq!(backing.get(KEY_THEME).unwrap().as_deref(), Some("light"));
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let prefs = Preferences::load(Box::new(MemoryStore::new())).unwrap();
        let mut rx = prefs.subscribe();

        prefs.set_sidebar_theme(SidebarTheme::Gray).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().sidebar_theme, SidebarTheme::Gray);
    }

    #[test]
    fn test_theme_parse() {
        assert_eq!("GREEN".parse::<SidebarTheme>().unwrap(), SidebarTheme::Green);
        assert_eq!(
            "blueblack".parse::<SidebarTheme>().unwrap(),
            SidebarTheme::BlueBlack
        );
        assert_eq!(SidebarTheme::BlueBlack.label(), "Bleu & noir");
        assert_eq!(
            serde_json::to_value(SidebarTheme::BlueBlack).unwrap(),
            serde_json::json!("blueblack")
        );
        assert!(matches!(
            "teal".parse::<SidebarTheme>(),
            Err(PrefsError::InvalidValue { .. })
        ));
    }
}
