//! Collaborators the reader consumes but does not own.

use crate::book::BookData;
use crate::theme::ThemeSettings;
use std::sync::Mutex;
use tracing::info;

pub trait Navigator: Send + Sync {
    fn push(&self, path: &str);
}

/// Records pushed routes; the shell can replay them into real navigation.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    entries: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl Navigator for HistoryNavigator {
    fn push(&self, path: &str) {
        info!(path, "Navigating");
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(path.to_string());
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookState {
    pub data: Option<BookData>,
    pub current_chapter: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub theme: ThemeSettings,
    pub font_size: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: ThemeSettings::default(),
            font_size: 0,
        }
    }
}

/// The slice of application state the reader reacts to.
#[derive(Debug, Clone, Default)]
pub struct AppStateSnapshot {
    pub book: BookState,
    pub settings: Settings,
}
