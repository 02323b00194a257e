//! Feeds of OS events that can change which day should be displayed.
//!
//! Hosts that have native notifications (sleep/wake, calendar day changed)
//! bridge them through a [`ManualEventSource`]. [`ClockJumpWatcher`] derives
//! the same events portably by watching the clocks.

mod watcher;

pub use watcher::{ClockJumpWatcher, JumpDetector};

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemEvent {
    /// The machine woke from sleep, or the wall clock jumped.
    Wake,
    /// The local calendar day changed.
    DayChanged,
}

pub type EventCallback = Arc<dyn Fn(SystemEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub trait SystemEventSource: Send {
    fn subscribe(&mut self, callback: EventCallback) -> SubscriptionId;
    fn unsubscribe(&mut self, id: SubscriptionId);
}

/// Registry of callbacks shared between a source and its emitting side.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: AtomicU64,
    callbacks: Mutex<HashMap<SubscriptionId, EventCallback>>,
}

impl Subscribers {
    fn lock(&self) -> MutexGuard<'_, HashMap<SubscriptionId, EventCallback>> {
        self.callbacks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn add(&self, callback: EventCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().insert(id, callback);
        id
    }

    pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
        self.lock().remove(&id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub(crate) fn emit(&self, event: SystemEvent) {
        // Callbacks run outside the lock so they may (un)subscribe.
        let callbacks: Vec<EventCallback> = self.lock().values().cloned().collect();
        for callback in callbacks {
            callback(event);
        }
    }
}

/// In-process event source. Clones share subscribers, so one clone can be
/// handed to the scheduler while another emits.
#[derive(Clone, Default)]
pub struct ManualEventSource {
    subscribers: Arc<Subscribers>,
}

impl ManualEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: SystemEvent) {
        self.subscribers.emit(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl SystemEventSource for ManualEventSource {
    fn subscribe(&mut self, callback: EventCallback) -> SubscriptionId {
        self.subscribers.add(callback)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.remove(id);
    }
}
