//! Theme preference service.
//!
//! Persists the light/dark choice under its own slot, independent of the
//! task collection.

use crate::model::theme::Theme;
use crate::repo::slot_repo::SlotRepository;
use crate::store::persisted::PersistedStore;
use log::debug;

/// Slot key holding the serialized theme preference.
pub const THEME_SLOT_KEY: &str = "theme";

/// Session owner of the theme preference.
pub struct ThemeService<R: SlotRepository> {
    store: PersistedStore<Theme, R>,
}

impl<R: SlotRepository> ThemeService<R> {
    /// Loads the stored theme, defaulting to `Theme::Light`.
    pub fn open(repo: R) -> Self {
        Self {
            store: PersistedStore::open(repo, THEME_SLOT_KEY, Theme::default()),
        }
    }

    /// Whether the stored preference could not be read on open.
    pub fn load_failed(&self) -> bool {
        self.store.load_failed()
    }

    pub fn theme(&self) -> Theme {
        *self.store.get()
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.store.set(theme);
        debug!("event=theme_set module=service status=ok theme={}", theme.as_str());
    }

    /// Switches to the opposite theme and returns it.
    pub fn toggle_theme(&mut self) -> Theme {
        let theme = *self.store.update(|current| current.toggled());
        debug!("event=theme_toggle module=service status=ok theme={}", theme.as_str());
        theme
    }
}
