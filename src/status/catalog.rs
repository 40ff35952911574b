//! Status Catalog
//!
//! Static mapping between internal status keys and the display labels the
//! backend reports in session snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label the backend uses for "no active session"
pub const OFFLINE_LABEL: &str = "Hors ligne";

/// Broad grouping of a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Available,
    Pause,
    Offline,
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub key: String,
    pub label: String,
    pub category: StatusCategory,
}

impl StatusEntry {
    pub fn new(key: impl Into<String>, label: impl Into<String>, category: StatusCategory) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            category,
        }
    }
}

/// Kind of pause sent along with a pause status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseKind {
    Short,
    Lunch,
    Training,
    Meeting,
    Other,
}

impl PauseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PauseKind::Short => "short",
            PauseKind::Lunch => "lunch",
            PauseKind::Training => "training",
            PauseKind::Meeting => "meeting",
            PauseKind::Other => "other",
        }
    }
}

impl fmt::Display for PauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PauseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(PauseKind::Short),
            "lunch" => Ok(PauseKind::Lunch),
            "training" => Ok(PauseKind::Training),
            "meeting" => Ok(PauseKind::Meeting),
            "other" => Ok(PauseKind::Other),
            other => Err(format!(
                "Unknown pause kind: {}. Use: short, lunch, training, meeting, other",
                other
            )),
        }
    }
}

/// Ordered list of known statuses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCatalog {
    entries: Vec<StatusEntry>,
}

impl StatusCatalog {
    pub fn new(entries: Vec<StatusEntry>) -> Self {
        Self { entries }
    }

    /// Build a catalog from `(key, label)` pairs; category is inferred
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let entries = pairs
            .into_iter()
            .map(|(key, label)| {
                let category = if label == OFFLINE_LABEL {
                    StatusCategory::Offline
                } else if key == "available" || key == "avail" {
                    StatusCategory::Available
                } else {
                    StatusCategory::Pause
                };
                StatusEntry::new(key, label, category)
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[StatusEntry] {
        &self.entries
    }

    /// Resolve a display label to its entry
    pub fn by_label(&self, label: &str) -> Option<&StatusEntry> {
        self.entries.iter().find(|e| e.label == label)
    }

    pub fn by_key(&self, key: &str) -> Option<&StatusEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Resolve user input given either as a key or a label
    pub fn resolve(&self, key_or_label: &str) -> Option<&StatusEntry> {
        self.by_key(key_or_label)
            .or_else(|| self.by_label(key_or_label))
    }
}

impl Default for StatusCatalog {
    fn default() -> Self {
        Self::new(vec![
            StatusEntry::new("available", "Disponible", StatusCategory::Available),
            StatusEntry::new("pause", "Pause", StatusCategory::Pause),
            StatusEntry::new("lunch", "Déjeuner", StatusCategory::Pause),
            StatusEntry::new("training", "Formation", StatusCategory::Pause),
            StatusEntry::new("meeting", "Réunion", StatusCategory::Pause),
            StatusEntry::new("offline", OFFLINE_LABEL, StatusCategory::Offline),
        ])
    }
}
