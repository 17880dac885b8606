//! Task and category state for a single-user to-do list, mirrored to a durable
//! key-value store.
//!
//! Construct the stores once with [`Stores::open`] (or [`Stores::open_dir`] for
//! on-disk storage) and hand them to whatever renders them. Subscribe to an
//! [`EventBus`] to hear about changes; call [`ordering::sort_tasks`] (or
//! [`TaskStore::sorted`]) for display order.

pub mod categories;
pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod ordering;
pub mod settings;
mod state;
pub mod storage;
pub mod tasks;

use std::path::PathBuf;
use std::sync::Arc;

pub use crate::categories::CategoryStore;
pub use crate::config::StoreConfig;
pub use crate::error::{
    CategoryError, DecodeError, DuplicateCategoryError, PersistenceError, StorageError,
    UnsavedTaskError,
};
pub use crate::events::{EventBus, ListenerId, NoopSink, StateEvent, StateSink};
pub use crate::models::{
    Category, Icon, Language, Settings, Task, TaskDraft, TaskPatch, Theme, Timestamp,
};
pub use crate::settings::SettingsStore;
pub use crate::storage::{FileStore, KeyValueStore, MemoryStore};
pub use crate::tasks::TaskStore;

/// The three stores of one session, sharing a storage backend and a sink.
#[derive(Clone)]
pub struct Stores {
    pub tasks: TaskStore,
    pub categories: CategoryStore,
    pub settings: SettingsStore,
}

impl Stores {
    pub fn open(
        storage: Arc<dyn KeyValueStore>,
        sink: Arc<dyn StateSink>,
        config: &StoreConfig,
    ) -> Self {
        let tasks = TaskStore::load(Arc::clone(&storage), Arc::clone(&sink), &config.tasks_key);
        let categories = CategoryStore::load(
            Arc::clone(&storage),
            Arc::clone(&sink),
            &config.categories_key,
            config.default_categories.clone(),
        );
        let settings = SettingsStore::load(storage, sink, config);
        Self {
            tasks,
            categories,
            settings,
        }
    }

    /// Opens the stores on a [`FileStore`] rooted at `root`, creating it if needed.
    pub fn open_dir(
        root: PathBuf,
        sink: Arc<dyn StateSink>,
        config: &StoreConfig,
    ) -> Result<Self, StorageError> {
        let storage = FileStore::new(root);
        storage.ensure_dirs()?;
        log::info!("opening stores root={}", storage.root().display());
        Ok(Self::open(Arc::new(storage), sink, config))
    }
}
