use crate::models::{Category, Icon, Settings};

pub const TASKS_KEY: &str = "tasks";
pub const CATEGORIES_KEY: &str = "categories";
pub const THEME_KEY: &str = "theme";
pub const LANGUAGE_KEY: &str = "language";

/// Storage keys and first-run seeds for the stores.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub tasks_key: String,
    pub categories_key: String,
    pub theme_key: String,
    pub language_key: String,
    /// Used when nothing (or nothing readable) is stored under `categories_key`.
    pub default_categories: Vec<Category>,
    /// Used per key when the stored theme or language is absent or unknown.
    pub default_settings: Settings,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            tasks_key: TASKS_KEY.to_string(),
            categories_key: CATEGORIES_KEY.to_string(),
            theme_key: THEME_KEY.to_string(),
            language_key: LANGUAGE_KEY.to_string(),
            default_categories: default_categories(),
            default_settings: Settings::default(),
        }
    }
}

impl StoreConfig {
    /// No seeded categories.
    pub fn minimal() -> Self {
        Self {
            default_categories: Vec::new(),
            ..Self::default()
        }
    }

    /// Defaults whose first-run theme follows the OS color scheme.
    pub fn detected() -> Self {
        Self::default().with_default_settings(Settings::detect())
    }

    pub fn with_default_settings(mut self, settings: Settings) -> Self {
        self.default_settings = settings;
        self
    }
}

pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("gym", "gym", Icon::emoji("🏋️")),
        Category::new("run", "run", Icon::emoji("🏃")),
        Category::new("work", "work", Icon::emoji("💼")),
        Category::new("design", "design", Icon::emoji("🎨")),
    ]
}
