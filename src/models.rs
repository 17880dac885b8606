use chrono::{DateTime, Utc};

pub type Timestamp = DateTime<Utc>;

/// Icon shown for tasks whose category reference dangles.
pub const FALLBACK_ICON: &str = "📝";

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Category id. Not enforced as a foreign key.
    pub category: String,
    pub due_date: Option<Timestamp>,
    pub completed: bool,
    pub important: bool,
    pub created_at: Timestamp,
}

impl Task {
    pub fn is_overdue(&self, now: Timestamp) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < now)
    }
}

/// Caller-supplied fields for a new task. The store fills in id, creation time
/// and completion state.
///
/// The store does not check the title; callers are expected to reject blank
/// titles (see [`TaskDraft::has_title`]) before calling `add`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub due_date: Option<Timestamp>,
    pub important: bool,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// Partial update for an existing task. `id` and `created_at` are not patchable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    /// `Some(None)` clears the due date.
    pub due_date: Option<Option<Timestamp>>,
    pub completed: Option<bool>,
    pub important: Option<bool>,
}

impl TaskPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn due_date(mut self, due_date: Option<Timestamp>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn important(mut self, important: bool) -> Self {
        self.important = Some(important);
        self
    }

    pub(crate) fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(important) = self.important {
            task.important = important;
        }
    }
}

/// Category icon. Persisted as a single string; the variant is recovered from
/// its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Icon {
    None,
    /// One emoji grapheme. May span several scalar values (e.g. "🏋️").
    Emoji(String),
    /// Symbolic icon name resolved by the presentation layer, e.g. "dumbbell".
    Symbolic(String),
}

impl Icon {
    pub fn emoji(value: impl Into<String>) -> Self {
        Self::Emoji(value.into())
    }

    pub fn symbolic(name: impl Into<String>) -> Self {
        Self::Symbolic(name.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "",
            Self::Emoji(value) | Self::Symbolic(value) => value,
        }
    }
}

impl From<&str> for Icon {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            return Self::None;
        }
        let symbolic = value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'));
        if symbolic {
            Self::Symbolic(value.to_string())
        } else {
            Self::Emoji(value.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    /// Opaque to the store; collaborators translate it.
    pub label: String,
    pub icon: Icon,
}

impl Category {
    pub fn new(id: impl Into<String>, label: impl Into<String>, icon: Icon) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon,
        }
    }

    /// Builds a category whose id is derived from `label`.
    pub fn labeled(label: impl Into<String>, icon: Icon) -> Self {
        let label = label.into();
        Self {
            id: category_id_from_label(&label),
            label,
            icon,
        }
    }
}

/// Lower-cases `label` and joins its whitespace-separated words with `-`.
///
/// Distinct labels can collide ("Foo Bar", "foo-bar", "  FOO   bar"); the
/// store only rejects the exact duplicate id.
pub fn category_id_from_label(label: &str) -> String {
    label
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// The OS color-scheme preference. Light when the platform reports none.
    pub fn detect() -> Self {
        match dark_light::detect() {
            Ok(mode) => Self::from_mode(mode),
            Err(err) => {
                log::debug!("color scheme detection failed: {err:?}");
                Self::default()
            }
        }
    }

    fn from_mode(mode: dark_light::Mode) -> Self {
        match mode {
            dark_light::Mode::Dark => Self::Dark,
            dark_light::Mode::Light | dark_light::Mode::Unspecified => Self::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    Id,
    Zh,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Id => "id",
            Self::Zh => "zh",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "en" => Some(Self::En),
            "id" => Some(Self::Id),
            "zh" => Some(Self::Zh),
            _ => None,
        }
    }

    /// Maps a BCP-47-ish locale tag ("zh-CN", "id_ID", "en-US") to a supported language.
    pub fn from_locale(locale: &str) -> Self {
        let normalized = locale.trim().to_lowercase();
        if normalized.starts_with("zh") {
            Self::Zh
        } else if normalized.starts_with("id") || normalized.starts_with("in") {
            Self::Id
        } else {
            Self::En
        }
    }

    /// Guesses the language from the OS locale. Not used for defaults; hosts
    /// that want it pass it in through their config.
    pub fn detect() -> Self {
        sys_locale::get_locale()
            .map(|locale| Self::from_locale(&locale))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settings {
    pub theme: Theme,
    pub language: Language,
}

impl Settings {
    /// First-run settings: theme from the OS color scheme, language English.
    pub fn detect() -> Self {
        Self {
            theme: Theme::detect(),
            language: Language::default(),
        }
    }
}
