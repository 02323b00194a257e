use std::sync::Arc;

use tokio::sync::mpsc;

use super::midnight::{wait_until_midnight, MidnightTimer};
use super::NamedayRefresher;
use crate::models::display::DisplayState;
use crate::services::login_item::LoginItemController;
use crate::services::presenter::DisplaySink;
use crate::services::system_events::{SubscriptionId, SystemEvent, SystemEventSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Not started; no wait pending.
    Idle,
    /// Waiting for the next local midnight.
    Scheduled,
    /// Handling an elapsed midnight wait.
    Firing,
    /// Torn down. Nothing will run again.
    Cancelled,
}

/// Why a refresh was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Startup,
    Midnight,
    Wake,
    DayChanged,
    Manual,
}

#[derive(Debug)]
enum SchedulerMessage {
    Refresh(RefreshTrigger),
    System(SystemEvent),
    MidnightElapsed { generation: u64 },
    SetLaunchAtLogin(bool),
    Shutdown,
}

/// Cloneable command surface for the presentation layer and OS bridges.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    tx: mpsc::UnboundedSender<SchedulerMessage>,
}

impl SchedulerHandle {
    fn send(&self, message: SchedulerMessage) -> bool {
        self.tx.send(message).is_ok()
    }

    pub fn refresh(&self) -> bool {
        self.send(SchedulerMessage::Refresh(RefreshTrigger::Manual))
    }

    /// Forwards an OS notification received outside any event source.
    pub fn notify(&self, event: SystemEvent) -> bool {
        self.send(SchedulerMessage::System(event))
    }

    pub fn set_launch_at_login(&self, enabled: bool) -> bool {
        self.send(SchedulerMessage::SetLaunchAtLogin(enabled))
    }

    pub fn shutdown(&self) -> bool {
        self.send(SchedulerMessage::Shutdown)
    }
}

/// Drives refreshes from midnight waits, OS events and commands.
///
/// Every message arrives on one channel and is handled by one task, so the
/// display state has a single writer.
pub struct RefreshScheduler {
    refresher: NamedayRefresher,
    login: LoginItemController,
    sink: Box<dyn DisplaySink>,
    events: Box<dyn SystemEventSource>,
    subscriptions: Vec<SubscriptionId>,
    midnight: MidnightTimer,
    tx: mpsc::UnboundedSender<SchedulerMessage>,
    rx: mpsc::UnboundedReceiver<SchedulerMessage>,
    state: SchedulerState,
}

impl RefreshScheduler {
    pub fn new(
        refresher: NamedayRefresher,
        login: LoginItemController,
        sink: Box<dyn DisplaySink>,
        events: Box<dyn SystemEventSource>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            refresher,
            login,
            sink,
            events,
            subscriptions: Vec::new(),
            midnight: MidnightTimer::new(),
            tx,
            rx,
            state: SchedulerState::Idle,
        }
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn display(&self) -> &DisplayState {
        self.refresher.state()
    }

    pub fn launch_at_login(&self) -> bool {
        self.login.is_enabled()
    }

    pub fn refresher(&self) -> &NamedayRefresher {
        &self.refresher
    }

    pub fn midnight_timer(&self) -> &MidnightTimer {
        &self.midnight
    }

    /// Installs listeners, arms the midnight wait and queues the first
    /// refresh. Must be called inside a tokio runtime.
    pub fn start(&mut self) {
        if self.state == SchedulerState::Cancelled {
            log::warn!("Ignoring start on a torn down scheduler");
            return;
        }

        self.install_listeners();
        let enabled = self.login.sync();
        self.sink.show_launch_at_login(enabled);

        self.reschedule();
        self.state = SchedulerState::Scheduled;
        let _ = self.tx.send(SchedulerMessage::Refresh(RefreshTrigger::Startup));
    }

    /// Subscribes to wake and day-change events once.
    fn install_listeners(&mut self) {
        if !self.subscriptions.is_empty() {
            return;
        }

        let tx = self.tx.clone();
        let id = self.events.subscribe(Arc::new(move |event: SystemEvent| {
            let _ = tx.send(SchedulerMessage::System(event));
        }));
        self.subscriptions.push(id);
    }

    /// Cancels any pending wait and arms a new one for the next midnight.
    pub fn reschedule(&mut self) {
        let now = self.refresher.clock().now();
        let (deadline, wait) = wait_until_midnight(self.refresher.calendar(), &now);
        let tx = self.tx.clone();

        self.midnight.arm(deadline, wait, move |generation| {
            let _ = tx.send(SchedulerMessage::MidnightElapsed { generation });
        });
        log::debug!("Next refresh at {} (in {:?})", deadline, wait);
    }

    fn refresh(&mut self, trigger: RefreshTrigger) {
        log::debug!("Refreshing ({:?})", trigger);
        // Failures are logged by the refresher and retried by the next trigger.
        let _ = self.refresher.refresh();
        self.sink.show_names(self.refresher.state());
    }

    fn handle_message(&mut self, message: SchedulerMessage) -> bool {
        if self.state == SchedulerState::Cancelled {
            return false;
        }

        match message {
            SchedulerMessage::Refresh(trigger) => self.refresh(trigger),
            SchedulerMessage::System(SystemEvent::DayChanged) => {
                self.refresh(RefreshTrigger::DayChanged)
            }
            SchedulerMessage::System(SystemEvent::Wake) => self.handle_wake(),
            SchedulerMessage::MidnightElapsed { generation } => {
                if generation != self.midnight.generation() {
                    log::debug!("Ignoring stale midnight wait {}", generation);
                    return true;
                }
                self.state = SchedulerState::Firing;
                self.refresh(RefreshTrigger::Midnight);
                self.reschedule();
                self.state = SchedulerState::Scheduled;
            }
            SchedulerMessage::SetLaunchAtLogin(enabled) => {
                let actual = self.login.set_enabled(enabled);
                self.sink.show_launch_at_login(actual);
            }
            SchedulerMessage::Shutdown => {
                self.teardown();
                return false;
            }
        }

        true
    }

    /// Refreshes only if the day moved on; the midnight wait is re-armed
    /// on every wake.
    fn handle_wake(&mut self) {
        if self.refresher.is_stale() {
            self.refresh(RefreshTrigger::Wake);
        } else {
            log::debug!("Woke on the same day; keeping current text");
        }
        self.reschedule();
        if self.state == SchedulerState::Idle {
            self.state = SchedulerState::Scheduled;
        }
    }

    /// Handles every queued message without waiting. Returns how many were
    /// handled. Lets a host event loop drive the scheduler from its own tick.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.rx.try_recv() {
            handled += 1;
            if !self.handle_message(message) {
                break;
            }
        }
        handled
    }

    /// Starts and handles messages until shutdown.
    pub async fn run(mut self) {
        self.start();
        while let Some(message) = self.rx.recv().await {
            if !self.handle_message(message) {
                break;
            }
        }
        self.teardown();
    }

    /// Cancels the wait and removes every subscription. Idempotent.
    pub fn teardown(&mut self) {
        if self.state == SchedulerState::Cancelled {
            return;
        }

        self.midnight.cancel();
        for id in self.subscriptions.drain(..) {
            self.events.unsubscribe(id);
        }
        self.state = SchedulerState::Cancelled;
        log::info!("Refresh scheduler stopped");
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.teardown();
    }
}
