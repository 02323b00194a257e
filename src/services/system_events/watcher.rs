use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::{EventCallback, Subscribers, SubscriptionId, SystemEvent, SystemEventSource};
use crate::utils::clock::Clock;
use crate::utils::date::{DateKey, ZonedCalendar};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_JUMP_THRESHOLD: Duration = Duration::from_secs(10);

/// Compares successive wall-clock and monotonic readings.
///
/// The monotonic clock stops while the machine sleeps, so a wall-clock
/// advance well beyond the monotonic one means a wake (or a manual clock
/// change, which needs the same handling).
#[derive(Debug, Clone)]
pub struct JumpDetector {
    calendar: ZonedCalendar,
    threshold: chrono::Duration,
    last_wall: DateTime<Utc>,
    last_mono: Instant,
    last_key: DateKey,
}

impl JumpDetector {
    pub fn new(
        calendar: ZonedCalendar,
        threshold: Duration,
        wall: DateTime<Utc>,
        mono: Instant,
    ) -> Self {
        Self {
            calendar,
            threshold: chrono::Duration::from_std(threshold).unwrap_or(chrono::Duration::MAX),
            last_wall: wall,
            last_mono: mono,
            last_key: calendar.key_for(&wall),
        }
    }

    pub fn observe(&mut self, wall: DateTime<Utc>, mono: Instant) -> Vec<SystemEvent> {
        let mut events = Vec::new();

        let wall_elapsed = wall - self.last_wall;
        let mono_elapsed = chrono::Duration::from_std(mono.saturating_duration_since(self.last_mono))
            .unwrap_or(chrono::Duration::MAX);
        let drift = wall_elapsed
            .checked_sub(&mono_elapsed)
            .map(|drift| drift.abs())
            .unwrap_or(chrono::Duration::MAX);
        if drift > self.threshold {
            events.push(SystemEvent::Wake);
        }

        let key = self.calendar.key_for(&wall);
        if key != self.last_key {
            events.push(SystemEvent::DayChanged);
        }

        self.last_wall = wall;
        self.last_mono = mono;
        self.last_key = key;
        events
    }
}

/// Polling event source for hosts without native sleep/day notifications.
/// The polling task runs only while someone is subscribed.
pub struct ClockJumpWatcher {
    calendar: ZonedCalendar,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    threshold: Duration,
    subscribers: Arc<Subscribers>,
    task: Option<JoinHandle<()>>,
}

impl ClockJumpWatcher {
    pub fn new(calendar: ZonedCalendar, clock: Arc<dyn Clock>) -> Self {
        Self::with_timing(calendar, clock, DEFAULT_POLL_INTERVAL, DEFAULT_JUMP_THRESHOLD)
    }

    pub fn with_timing(
        calendar: ZonedCalendar,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
        threshold: Duration,
    ) -> Self {
        Self {
            calendar,
            clock,
            poll_interval: poll_interval.max(Duration::from_millis(100)),
            threshold,
            subscribers: Arc::new(Subscribers::default()),
            task: None,
        }
    }

    pub fn is_polling(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn start_polling(&mut self) {
        if self.is_polling() {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            log::warn!("No async runtime; wake detection disabled");
            return;
        };

        let clock = self.clock.clone();
        let subscribers = self.subscribers.clone();
        let poll_interval = self.poll_interval;
        let mut detector = JumpDetector::new(self.calendar, self.threshold, clock.now(), Instant::now());

        self.task = Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                for event in detector.observe(clock.now(), Instant::now()) {
                    log::debug!("Clock watcher detected {:?}", event);
                    subscribers.emit(event);
                }
            }
        }));
    }

    fn stop_polling(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl SystemEventSource for ClockJumpWatcher {
    fn subscribe(&mut self, callback: EventCallback) -> SubscriptionId {
        let id = self.subscribers.add(callback);
        self.start_polling();
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.remove(id);
        if self.subscribers.is_empty() {
            self.stop_polling();
        }
    }
}

impl Drop for ClockJumpWatcher {
    fn drop(&mut self) {
        self.stop_polling();
    }
}
