//! Record codec for the persisted collections.
//!
//! Tasks are stored as a JSON array of records whose `dueDate` and `createdAt`
//! fields are ISO-8601 strings (`null` for a missing due date; an empty string
//! reads as missing). Categories are stored as a plain array of
//! `{id, label, icon}` records. Field names match the layout browser builds of
//! the app wrote to local storage, so existing data loads unchanged.
//!
//! An icon is written as a bare string whenever reading it back yields the same
//! variant. Otherwise it is tagged, e.g. `{"symbolic": "my icon"}`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::models::{Category, Icon, Task, Timestamp};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    important: bool,
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CategoryRecord {
    id: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    icon: IconRecord,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum IconRecord {
    Bare(String),
    Tagged(TaggedIcon),
}

impl Default for IconRecord {
    fn default() -> Self {
        Self::Bare(String::new())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TaggedIcon {
    Emoji(String),
    Symbolic(String),
}

impl From<&Icon> for IconRecord {
    fn from(icon: &Icon) -> Self {
        let bare = icon.as_str();
        if Icon::from(bare) == *icon {
            return Self::Bare(bare.to_string());
        }
        match icon {
            Icon::Emoji(value) => Self::Tagged(TaggedIcon::Emoji(value.clone())),
            Icon::Symbolic(name) => Self::Tagged(TaggedIcon::Symbolic(name.clone())),
            Icon::None => Self::Bare(String::new()),
        }
    }
}

impl From<IconRecord> for Icon {
    fn from(record: IconRecord) -> Self {
        match record {
            IconRecord::Bare(value) => Icon::from(value.as_str()),
            IconRecord::Tagged(TaggedIcon::Emoji(value)) => Icon::Emoji(value),
            IconRecord::Tagged(TaggedIcon::Symbolic(name)) => Icon::Symbolic(name),
        }
    }
}

pub fn encode_timestamp(value: &Timestamp) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn decode_timestamp(field: &'static str, value: &str) -> Result<Timestamp, DecodeError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DecodeError::Timestamp {
            field,
            value: value.to_string(),
            source,
        })
}

// Browser builds wrote "" for a cleared date.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            category: task.category.clone(),
            due_date: task.due_date.as_ref().map(encode_timestamp),
            completed: task.completed,
            important: task.important,
            created_at: Some(encode_timestamp(&task.created_at)),
        }
    }
}

impl TryFrom<TaskRecord> for Task {
    type Error = DecodeError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let due_date = present(record.due_date.as_deref())
            .map(|value| decode_timestamp("dueDate", value))
            .transpose()?;
        // Records written without a creation time sort as the oldest.
        let created_at = match present(record.created_at.as_deref()) {
            Some(value) => decode_timestamp("createdAt", value)?,
            None => Timestamp::default(),
        };
        Ok(Self {
            id: record.id,
            title: record.title,
            description: record.description,
            category: record.category,
            due_date,
            completed: record.completed,
            important: record.important,
            created_at,
        })
    }
}

impl From<&Category> for CategoryRecord {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.clone(),
            label: category.label.clone(),
            icon: IconRecord::from(&category.icon),
        }
    }
}

impl From<CategoryRecord> for Category {
    fn from(record: CategoryRecord) -> Self {
        Self {
            id: record.id,
            label: record.label,
            icon: Icon::from(record.icon),
        }
    }
}

pub fn encode_tasks(tasks: &[Task]) -> Result<String, serde_json::Error> {
    let records: Vec<TaskRecord> = tasks.iter().map(TaskRecord::from).collect();
    serde_json::to_string(&records)
}

pub fn decode_tasks(raw: &str) -> Result<Vec<Task>, DecodeError> {
    let records: Vec<TaskRecord> = serde_json::from_str(raw)?;
    records.into_iter().map(Task::try_from).collect()
}

pub fn encode_categories(categories: &[Category]) -> Result<String, serde_json::Error> {
    let records: Vec<CategoryRecord> = categories.iter().map(CategoryRecord::from).collect();
    serde_json::to_string(&records)
}

pub fn decode_categories(raw: &str) -> Result<Vec<Category>, DecodeError> {
    let records: Vec<CategoryRecord> = serde_json::from_str(raw)?;
    Ok(records.into_iter().map(Category::from).collect())
}
