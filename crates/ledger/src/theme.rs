//! Dashboard theme preference.

use std::fmt;

use common::Error;
use tracing::warn;

use crate::store::{KvStore, THEME_KEY};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Stored preference, `Dark` when absent or unreadable.
    pub fn load(store: &dyn KvStore) -> Self {
        match store.get(THEME_KEY) {
            Ok(Some(raw)) => Theme::parse(&raw).unwrap_or_else(|| {
                warn!("Unknown stored theme {:?}; using dark", raw);
                Theme::Dark
            }),
            Ok(None) => Theme::Dark,
            Err(e) => {
                warn!("Could not read theme preference: {}", e);
                Theme::Dark
            }
        }
    }

    pub fn save(self, store: &mut dyn KvStore) -> Result<(), Error> {
        store.set(THEME_KEY, self.as_str())
    }

    /// Flip the stored preference and persist it.
    pub fn toggle(store: &mut dyn KvStore) -> Result<Self, Error> {
        let next = Theme::load(&*store).toggled();
        next.save(store)?;
        Ok(next)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_default_and_toggle_persist() {
        let mut store = MemoryStore::new();
        assert_eq!(Theme::load(&store), Theme::Dark);
        assert_eq!(Theme::toggle(&mut store).unwrap(), Theme::Light);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("light"));
        assert_eq!(Theme::toggle(&mut store).unwrap(), Theme::Dark);
        assert_eq!(Theme::load(&store), Theme::Dark);
    }

    #[test]
    fn test_unknown_value_falls_back_to_dark() {
        let mut store = MemoryStore::new();
        store.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(Theme::load(&store), Theme::Dark);
    }
}
