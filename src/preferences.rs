//! Small key-value store for UI preferences that survive restarts.
//!
//! Values are strings in a flat JSON object. Every write goes straight to
//! disk; unknown or malformed values read back as defaults.

use crate::models::Task;
use crate::theme::ThemeMode;
use log::warn;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

pub const SIDEBAR_COLLAPSED: &str = "sidebar_collapsed";
pub const SORT_ORDER: &str = "sort_order";
pub const NOTIFICATIONS: &str = "notifications";
pub const THEME: &str = "theme";

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to write preferences to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl PreferenceStore {
    /// Opens the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values: BTreeMap<String, String> = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!("event=preferences_discarded path={} err={}", path.display(), err);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        PreferenceStore {
            path: Some(path),
            values,
        }
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        PreferenceStore::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), PreferencesError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    pub fn remove(&mut self, key: &str) -> Result<(), PreferencesError> {
        self.values.remove(key);
        self.flush()
    }

    fn flush(&self) -> Result<(), PreferencesError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let io_err = |source| PreferencesError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let raw = serde_json::to_string_pretty(&self.values)?;
        fs::write(path, raw).map_err(io_err)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Scheduled tasks first, by date then time; unscheduled last.
    #[default]
    Date,
    Title,
    /// Newest first.
    Created,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Date => "date",
            SortOrder::Title => "title",
            SortOrder::Created => "created",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "date" => Some(SortOrder::Date),
            "title" => Some(SortOrder::Title),
            "created" => Some(SortOrder::Created),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            SortOrder::Date => SortOrder::Title,
            SortOrder::Title => SortOrder::Created,
            SortOrder::Created => SortOrder::Date,
        }
    }

    pub fn sort(self, tasks: &mut [Task]) {
        match self {
            SortOrder::Date => tasks.sort_by(|a, b| {
                (a.date.is_none(), a.date, a.time.is_none(), a.time)
                    .cmp(&(b.date.is_none(), b.date, b.time.is_none(), b.time))
                    .then_with(|| a.created_at.cmp(&b.created_at))
            }),
            SortOrder::Title => tasks.sort_by(|a, b| {
                a.title
                    .to_lowercase()
                    .cmp(&b.title.to_lowercase())
                    .then_with(|| a.created_at.cmp(&b.created_at))
            }),
            SortOrder::Created => tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
    }
}

/// Typed view over the preference keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Preferences {
    pub sidebar_collapsed: bool,
    pub sort_order: SortOrder,
    pub notifications: bool,
    pub theme: ThemeMode,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            sidebar_collapsed: false,
            sort_order: SortOrder::default(),
            notifications: true,
            theme: ThemeMode::default(),
        }
    }
}

impl Preferences {
    pub fn load(store: &PreferenceStore) -> Self {
        let defaults = Preferences::default();
        let flag = |key: &str, default: bool| match store.get(key) {
            Some("true") => true,
            Some("false") => false,
            _ => default,
        };
        Preferences {
            sidebar_collapsed: flag(SIDEBAR_COLLAPSED, defaults.sidebar_collapsed),
            sort_order: store
                .get(SORT_ORDER)
                .and_then(SortOrder::parse)
                .unwrap_or(defaults.sort_order),
            notifications: flag(NOTIFICATIONS, defaults.notifications),
            theme: store
                .get(THEME)
                .and_then(ThemeMode::parse)
                .unwrap_or(defaults.theme),
        }
    }

    pub fn save(&self, store: &mut PreferenceStore) -> Result<(), PreferencesError> {
        store.set(SIDEBAR_COLLAPSED, bool_str(self.sidebar_collapsed))?;
        store.set(SORT_ORDER, self.sort_order.as_str())?;
        store.set(NOTIFICATIONS, bool_str(self.notifications))?;
        store.set(THEME, self.theme.as_str())
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
