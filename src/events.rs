use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::models::{Category, Settings, Task};

pub const EVENT_TASKS_UPDATED: &str = "tasks_updated";
pub const EVENT_CATEGORIES_UPDATED: &str = "categories_updated";
pub const EVENT_SETTINGS_UPDATED: &str = "settings_updated";

/// Full snapshot of a collection after a mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    TasksUpdated(Vec<Task>),
    CategoriesUpdated(Vec<Category>),
    SettingsUpdated(Settings),
}

impl StateEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TasksUpdated(_) => EVENT_TASKS_UPDATED,
            Self::CategoriesUpdated(_) => EVENT_CATEGORIES_UPDATED,
            Self::SettingsUpdated(_) => EVENT_SETTINGS_UPDATED,
        }
    }
}

/// Receives state snapshots from the stores.
///
/// Stores call `emit` after releasing their lock, so implementations may read
/// from or mutate the stores again. Per store, snapshots arrive in mutation
/// order; one superseded before it could be delivered is skipped, so the last
/// event a sink sees always matches the store's current state.
pub trait StateSink: Send + Sync {
    fn emit(&self, event: &StateEvent);
}

pub struct NoopSink;

impl StateSink for NoopSink {
    fn emit(&self, _event: &StateEvent) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&StateEvent) + Send + Sync>;

/// Fans each event out to every subscribed listener, in subscription order.
#[derive(Default)]
pub struct EventBus {
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&StateEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(ListenerId, Listener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StateSink for EventBus {
    fn emit(&self, event: &StateEvent) {
        // Snapshot so listeners can subscribe/unsubscribe from inside a callback.
        let listeners: Vec<Listener> = self
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        log::trace!(
            "emit event={} listeners={}",
            event.name(),
            listeners.len()
        );
        for listener in listeners {
            listener(event);
        }
    }
}

/// Per-store delivery queue in front of a [`StateSink`].
///
/// A store stamps each snapshot while it still holds its own lock, then
/// publishes after releasing it. Whoever finds no delivery in progress drains
/// the queue; everyone else leaves the newest snapshot behind and returns.
pub(crate) struct Publisher {
    sink: Arc<dyn StateSink>,
    stamps: AtomicU64,
    queue: Mutex<Queue>,
}

#[derive(Default)]
struct Queue {
    delivered: u64,
    pending: Option<(u64, StateEvent)>,
    draining: bool,
}

impl Publisher {
    pub(crate) fn new(sink: Arc<dyn StateSink>) -> Self {
        Self {
            sink,
            stamps: AtomicU64::new(0),
            queue: Mutex::new(Queue::default()),
        }
    }

    /// Must be called with the owning store's lock held.
    pub(crate) fn stamp(&self) -> u64 {
        self.stamps.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn publish(&self, version: u64, event: StateEvent) {
        let mut queue = self.lock();
        let newer_pending = queue
            .pending
            .as_ref()
            .is_some_and(|(pending, _)| *pending > version);
        if version <= queue.delivered || newer_pending {
            log::trace!("skip superseded event={} version={version}", event.name());
            return;
        }
        queue.pending = Some((version, event));
        if queue.draining {
            return;
        }
        queue.draining = true;
        let _reset = DrainGuard(&self.queue);
        loop {
            let Some((version, event)) = queue.pending.take() else {
                break;
            };
            drop(queue);
            self.sink.emit(&event);
            queue = self.lock();
            queue.delivered = version;
        }
        queue.draining = false;
    }

    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// A panicking sink must not leave the queue stuck in the draining state.
struct DrainGuard<'a>(&'a Mutex<Queue>);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .draining = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Theme;
    use crate::state::testing::RecordingSink;

    #[test]
    fn bus_delivers_to_all_listeners_until_unsubscribed() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |event| seen.lock().unwrap().push(format!("a:{}", event.name())))
        };
        {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |event| seen.lock().unwrap().push(format!("b:{}", event.name())));
        }
        assert_eq!(bus.listener_count(), 2);

        bus.emit(&StateEvent::TasksUpdated(Vec::new()));
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["a:tasks_updated".to_string(), "b:tasks_updated".to_string()]
        );

        assert!(bus.unsubscribe(first));
        assert!(!bus.unsubscribe(first));
        bus.emit(&StateEvent::CategoriesUpdated(Vec::new()));
        assert_eq!(seen.lock().unwrap().last().unwrap(), "b:categories_updated");
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[test]
    fn listener_may_subscribe_during_emit() {
        let bus = Arc::new(EventBus::new());
        {
            let inner = Arc::clone(&bus);
            bus.subscribe(move |_| {
                inner.subscribe(|_| {});
            });
        }
        bus.emit(&StateEvent::SettingsUpdated(Settings {
            theme: Theme::Dark,
            ..Settings::default()
        }));
        assert_eq!(bus.listener_count(), 2);
    }

    fn tasks_event(len: usize) -> StateEvent {
        StateEvent::TasksUpdated(vec![
            Task {
                id: String::new(),
                title: String::new(),
                description: String::new(),
                category: String::new(),
                due_date: None,
                completed: false,
                important: false,
                created_at: Default::default(),
            };
            len
        ])
    }

    fn delivered_lengths(sink: &RecordingSink) -> Vec<usize> {
        sink.events
            .lock()
            .unwrap()
            .iter()
            .map(|event| match event {
                StateEvent::TasksUpdated(tasks) => tasks.len(),
                other => panic!("unexpected event {other:?}"),
            })
            .collect()
    }

    #[test]
    fn publisher_skips_snapshots_older_than_the_last_delivery() {
        let sink = Arc::new(RecordingSink::default());
        let publisher = Publisher::new(sink.clone());
        let first = publisher.stamp();
        let second = publisher.stamp();

        publisher.publish(second, tasks_event(2));
        publisher.publish(first, tasks_event(1));
        assert_eq!(delivered_lengths(&sink), vec![2]);

        let third = publisher.stamp();
        publisher.publish(third, tasks_event(3));
        assert_eq!(delivered_lengths(&sink), vec![2, 3]);
    }

    struct Republisher {
        publisher: Mutex<Option<Arc<Publisher>>>,
        seen: Mutex<Vec<usize>>,
    }

    impl StateSink for Republisher {
        fn emit(&self, event: &StateEvent) {
            if let StateEvent::TasksUpdated(tasks) = event {
                self.seen.lock().unwrap().push(tasks.len());
            }
            // Publish once from inside the callback.
            if let Some(publisher) = self.publisher.lock().unwrap().take() {
                let version = publisher.stamp();
                publisher.publish(version, tasks_event(9));
            }
        }
    }

    #[test]
    fn publishing_from_inside_a_sink_is_delivered_afterwards() {
        let sink = Arc::new(Republisher {
            publisher: Mutex::new(None),
            seen: Mutex::new(Vec::new()),
        });
        let publisher = Arc::new(Publisher::new(sink.clone()));
        *sink.publisher.lock().unwrap() = Some(Arc::clone(&publisher));

        let version = publisher.stamp();
        publisher.publish(version, tasks_event(1));
        assert_eq!(*sink.seen.lock().unwrap(), vec![1, 9]);
    }

    #[test]
    fn event_names_are_stable() {
        assert_eq!(
            StateEvent::SettingsUpdated(Settings::default()).name(),
            EVENT_SETTINGS_UPDATED
        );
        NoopSink.emit(&StateEvent::TasksUpdated(Vec::new()));
    }
}
