use std::sync::{Arc, Mutex};

use log::{debug, info, warn};

use crate::codec;
use crate::error::{CategoryError, DuplicateCategoryError};
use crate::events::{Publisher, StateEvent, StateSink};
use crate::models::{Category, Icon, FALLBACK_ICON};
use crate::state::{load_collection, lock, persist_collection};
use crate::storage::KeyValueStore;

/// Owner of the category collection. Ids are unique; there is no removal.
#[derive(Clone)]
pub struct CategoryStore {
    inner: Arc<Mutex<Vec<Category>>>,
    storage: Arc<dyn KeyValueStore>,
    events: Arc<Publisher>,
    key: Arc<str>,
}

impl CategoryStore {
    /// Restores the collection stored under `key`, or starts from `defaults`
    /// when nothing readable is stored. The seed is not written until the
    /// first `add`.
    pub fn load(
        storage: Arc<dyn KeyValueStore>,
        sink: Arc<dyn StateSink>,
        key: &str,
        defaults: Vec<Category>,
    ) -> Self {
        let categories = match load_collection(storage.as_ref(), key, codec::decode_categories) {
            Some(categories) => categories,
            None => {
                debug!("categories key={key} seeded with {} defaults", defaults.len());
                defaults
            }
        };
        info!("categories loaded key={key} count={}", categories.len());
        Self {
            inner: Arc::new(Mutex::new(categories)),
            storage,
            events: Arc::new(Publisher::new(sink)),
            key: Arc::from(key),
        }
    }

    pub fn categories(&self) -> Vec<Category> {
        lock(&self.inner).clone()
    }

    pub fn get(&self, id: &str) -> Option<Category> {
        lock(&self.inner).iter().find(|c| c.id == id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        lock(&self.inner).iter().any(|c| c.id == id)
    }

    /// Icon for a task's category reference; dangling references get the
    /// fallback icon.
    pub fn icon_for(&self, category_id: &str) -> Icon {
        self.get(category_id)
            .map(|c| c.icon)
            .unwrap_or_else(|| Icon::emoji(FALLBACK_ICON))
    }

    /// Appends `category` unless its id is taken.
    ///
    /// On [`CategoryError::Persistence`] the category has still been added.
    pub fn add(&self, category: Category) -> Result<Category, CategoryError> {
        let (written, version, snapshot) = {
            let mut categories = lock(&self.inner);
            if categories.iter().any(|c| c.id == category.id) {
                warn!("category add rejected: duplicate id={}", category.id);
                return Err(DuplicateCategoryError { id: category.id }.into());
            }
            categories.push(category.clone());
            let written = persist_collection(
                self.storage.as_ref(),
                &self.key,
                categories.as_slice(),
                codec::encode_categories,
            );
            (written, self.events.stamp(), categories.clone())
        };
        debug!(
            "category added id={} count={} persisted={}",
            category.id,
            snapshot.len(),
            written.is_ok()
        );
        self.events.publish(version, StateEvent::CategoriesUpdated(snapshot));
        written?;
        Ok(category)
    }

    /// Adds a category whose id is derived from `label`
    /// (see [`crate::models::category_id_from_label`]).
    pub fn add_labeled(&self, label: &str, icon: Icon) -> Result<Category, CategoryError> {
        self.add(Category::labeled(label, icon))
    }
}
