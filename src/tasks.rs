use std::sync::{Arc, Mutex};

use chrono::Utc;
use log::{debug, info};
use uuid::Uuid;

use crate::codec;
use crate::error::{PersistenceError, UnsavedTaskError};
use crate::events::{Publisher, StateEvent, StateSink};
use crate::models::{Task, TaskDraft, TaskPatch};
use crate::ordering;
use crate::state::{load_collection, lock, persist_collection};
use crate::storage::KeyValueStore;

/// Owner of the task collection.
///
/// Every effective mutation rewrites the whole collection under the store's key
/// while holding the store lock, then emits [`StateEvent::TasksUpdated`]. Calls
/// that match no task change nothing: no write, no event.
///
/// When the write fails the mutation stays applied in memory and the event is
/// still emitted; the caller gets the [`PersistenceError`] (for `add`, an
/// [`UnsavedTaskError`] carrying the new task). The next effective mutation
/// writes the full collection again.
#[derive(Clone)]
pub struct TaskStore {
    inner: Arc<Mutex<Vec<Task>>>,
    storage: Arc<dyn KeyValueStore>,
    events: Arc<Publisher>,
    key: Arc<str>,
}

impl TaskStore {
    /// Restores the collection stored under `key`. Absent or corrupt data
    /// yields an empty collection.
    pub fn load(storage: Arc<dyn KeyValueStore>, sink: Arc<dyn StateSink>, key: &str) -> Self {
        let tasks = load_collection(storage.as_ref(), key, codec::decode_tasks).unwrap_or_default();
        info!("tasks loaded key={key} count={}", tasks.len());
        Self {
            inner: Arc::new(Mutex::new(tasks)),
            storage,
            events: Arc::new(Publisher::new(sink)),
            key: Arc::from(key),
        }
    }

    pub fn tasks(&self) -> Vec<Task> {
        lock(&self.inner).clone()
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        lock(&self.inner).iter().find(|t| t.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.inner).is_empty()
    }

    /// Current collection in display order.
    pub fn sorted(&self) -> Vec<Task> {
        ordering::sort_tasks(&lock(&self.inner))
    }

    pub fn add(&self, draft: TaskDraft) -> Result<Task, UnsavedTaskError> {
        let mut task = Task {
            id: String::new(),
            title: draft.title,
            description: draft.description,
            category: draft.category,
            due_date: draft.due_date,
            completed: false,
            important: draft.important,
            created_at: Utc::now(),
        };
        let written = self.mutate("add", |tasks| {
            task.id = fresh_id(tasks);
            tasks.push(task.clone());
            Some(())
        });
        match written {
            Ok(_) => Ok(task),
            Err(source) => Err(UnsavedTaskError { task, source }),
        }
    }

    /// Merges `patch` into the task with `id`. Returns whether a task matched.
    pub fn update(&self, id: &str, patch: TaskPatch) -> Result<bool, PersistenceError> {
        let found = self.mutate("update", |tasks| {
            let task = tasks.iter_mut().find(|t| t.id == id)?;
            patch.apply(task);
            Some(())
        })?;
        Ok(found.is_some())
    }

    pub fn remove(&self, id: &str) -> Result<bool, PersistenceError> {
        let found = self.mutate("remove", |tasks| {
            let index = tasks.iter().position(|t| t.id == id)?;
            tasks.remove(index);
            Some(())
        })?;
        Ok(found.is_some())
    }

    pub fn toggle_completed(&self, id: &str) -> Result<bool, PersistenceError> {
        let found = self.mutate("toggle_completed", |tasks| {
            let task = tasks.iter_mut().find(|t| t.id == id)?;
            task.completed = !task.completed;
            Some(())
        })?;
        Ok(found.is_some())
    }

    pub fn toggle_important(&self, id: &str) -> Result<bool, PersistenceError> {
        let found = self.mutate("toggle_important", |tasks| {
            let task = tasks.iter_mut().find(|t| t.id == id)?;
            task.important = !task.important;
            Some(())
        })?;
        Ok(found.is_some())
    }

    /// Runs `op` under the lock. `op` returns `None` when it changed nothing.
    fn mutate<R>(
        &self,
        name: &str,
        op: impl FnOnce(&mut Vec<Task>) -> Option<R>,
    ) -> Result<Option<R>, PersistenceError> {
        let (outcome, written, version, snapshot) = {
            let mut tasks = lock(&self.inner);
            let Some(outcome) = op(&mut *tasks) else {
                debug!("tasks {name}: no matching task");
                return Ok(None);
            };
            let written = persist_collection(
                self.storage.as_ref(),
                &self.key,
                tasks.as_slice(),
                codec::encode_tasks,
            );
            (outcome, written, self.events.stamp(), tasks.clone())
        };
        debug!("tasks {name}: count={} persisted={}", snapshot.len(), written.is_ok());
        self.events.publish(version, StateEvent::TasksUpdated(snapshot));
        written.map(|()| Some(outcome))
    }
}

fn fresh_id(tasks: &[Task]) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if tasks.iter().all(|t| t.id != id) {
            return id;
        }
    }
}
