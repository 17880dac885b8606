use std::sync::{Arc, Mutex};

use log::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::PersistenceError;
use crate::events::{Publisher, StateEvent, StateSink};
use crate::models::{Language, Settings, Theme};
use crate::state::{lock, write_value};
use crate::storage::KeyValueStore;

/// Theme and language preference. Each value lives under its own key as a
/// bare string ("dark", "zh").
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<Mutex<Settings>>,
    storage: Arc<dyn KeyValueStore>,
    events: Arc<Publisher>,
    theme_key: Arc<str>,
    language_key: Arc<str>,
}

impl SettingsStore {
    pub fn load(
        storage: Arc<dyn KeyValueStore>,
        sink: Arc<dyn StateSink>,
        config: &StoreConfig,
    ) -> Self {
        let defaults = config.default_settings;
        let theme = read_value(storage.as_ref(), &config.theme_key, Theme::parse)
            .unwrap_or(defaults.theme);
        let language = read_value(storage.as_ref(), &config.language_key, Language::parse)
            .unwrap_or(defaults.language);
        info!(
            "settings loaded theme={} language={}",
            theme.as_str(),
            language.as_str()
        );
        Self {
            inner: Arc::new(Mutex::new(Settings { theme, language })),
            storage,
            events: Arc::new(Publisher::new(sink)),
            theme_key: Arc::from(config.theme_key.as_str()),
            language_key: Arc::from(config.language_key.as_str()),
        }
    }

    pub fn settings(&self) -> Settings {
        *lock(&self.inner)
    }

    pub fn theme(&self) -> Theme {
        lock(&self.inner).theme
    }

    pub fn language(&self) -> Language {
        lock(&self.inner).language
    }

    /// Flips light/dark and returns the new theme.
    pub fn toggle_theme(&self) -> Result<Theme, PersistenceError> {
        let updated = self.update(&self.theme_key, |settings| {
            settings.theme = settings.theme.toggled();
            Some(settings.theme.as_str())
        })?;
        Ok(updated.theme)
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), PersistenceError> {
        self.update(&self.theme_key, |settings| {
            if settings.theme == theme {
                return None;
            }
            settings.theme = theme;
            Some(theme.as_str())
        })?;
        Ok(())
    }

    pub fn set_language(&self, language: Language) -> Result<(), PersistenceError> {
        self.update(&self.language_key, |settings| {
            if settings.language == language {
                return None;
            }
            settings.language = language;
            Some(language.as_str())
        })?;
        Ok(())
    }

    /// `apply` returns the string to store under `key`, or `None` when nothing
    /// changed.
    fn update(
        &self,
        key: &str,
        apply: impl FnOnce(&mut Settings) -> Option<&'static str>,
    ) -> Result<Settings, PersistenceError> {
        let (written, version, snapshot) = {
            let mut settings = lock(&self.inner);
            let Some(value) = apply(&mut *settings) else {
                return Ok(*settings);
            };
            debug!("settings {key}={value}");
            let written = write_value(self.storage.as_ref(), key, value);
            (written, self.events.stamp(), *settings)
        };
        self.events.publish(version, StateEvent::SettingsUpdated(snapshot));
        written.map(|()| snapshot)
    }
}

fn read_value<T>(
    storage: &dyn KeyValueStore,
    key: &str,
    parse: fn(&str) -> Option<T>,
) -> Option<T> {
    match storage.get(key) {
        Ok(Some(raw)) => {
            let parsed = parse(&raw);
            if parsed.is_none() {
                warn!("unknown value for key={key}: {raw:?}; using default");
            }
            parsed
        }
        Ok(None) => None,
        Err(err) => {
            warn!("read failed key={key} err={err}; using default");
            None
        }
    }
}
