use std::time::Duration as StdDuration;

use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use tokio::task::JoinHandle;

use crate::utils::date::ZonedCalendar;

/// Shortest wait ever scheduled, so a clock sitting exactly on midnight
/// cannot spin.
pub const MIN_WAIT: StdDuration = StdDuration::from_secs(1);

/// Next local midnight after `now` and how long to sleep until it.
pub fn wait_until_midnight<T: TimeZone>(
    calendar: &ZonedCalendar,
    now: &DateTime<T>,
) -> (DateTime<Tz>, StdDuration) {
    let midnight = calendar.next_midnight(now);
    let wait = (midnight - now.with_timezone(&calendar.time_zone()))
        .to_std()
        .unwrap_or(MIN_WAIT)
        .max(MIN_WAIT);
    (midnight, wait)
}

/// At most one pending one-shot wait. Arming again cancels the previous wait.
#[derive(Debug, Default)]
pub struct MidnightTimer {
    handle: Option<JoinHandle<()>>,
    generation: u64,
    deadline: Option<DateTime<Tz>>,
}

impl MidnightTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a task that sleeps for `wait` and then calls `on_elapsed`
    /// with this arming's generation. Must be called inside a tokio runtime.
    pub fn arm<F>(&mut self, deadline: DateTime<Tz>, wait: StdDuration, on_elapsed: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        self.generation += 1;
        self.deadline = Some(deadline);

        let generation = self.generation;
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            on_elapsed(generation);
        }));
        generation
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Generation of the most recent arming; stale ones compare unequal.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn deadline(&self) -> Option<&DateTime<Tz>> {
        self.deadline.as_ref()
    }
}

impl Drop for MidnightTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_wait_is_under_a_day_and_positive() {
        let calendar = ZonedCalendar::default();
        // 23:59:59 in Prague (CET).
        let now = Utc.with_ymd_and_hms(2025, 1, 10, 22, 59, 59).unwrap();
        let (midnight, wait) = wait_until_midnight(&calendar, &now);

        assert_eq!(wait, StdDuration::from_secs(1));
        assert_eq!(calendar.key_for(&midnight).to_string(), "01-11");
    }

    #[test]
    fn test_wait_from_just_after_midnight() {
        let calendar = ZonedCalendar::default();
        let now = Utc.with_ymd_and_hms(2025, 1, 10, 23, 0, 1).unwrap();
        let (_, wait) = wait_until_midnight(&calendar, &now);

        assert_eq!(wait, StdDuration::from_secs(24 * 3600 - 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearming_cancels_previous_wait() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let calendar = ZonedCalendar::default();
        let deadline = calendar.next_midnight(&Utc::now());
        let mut timer = MidnightTimer::new();

        let first = {
            let fired = fired.clone();
            timer.arm(deadline, StdDuration::from_secs(5), move |g| fired.lock().unwrap().push(g))
        };
        let second = {
            let fired = fired.clone();
            timer.arm(deadline, StdDuration::from_secs(10), move |g| fired.lock().unwrap().push(g))
        };
        assert_ne!(first, second);
        assert!(timer.is_armed());

        tokio::time::sleep(StdDuration::from_secs(11)).await;
        assert_eq!(*fired.lock().unwrap(), vec![second]);
        assert!(!timer.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_wait_never_fires() {
        let fired = Arc::new(Mutex::new(false));
        let mut timer = MidnightTimer::new();
        let deadline = ZonedCalendar::default().next_midnight(&Utc::now());

        {
            let fired = fired.clone();
            timer.arm(deadline, StdDuration::from_secs(1), move |_| *fired.lock().unwrap() = true);
        }
        timer.cancel();
        assert!(timer.deadline().is_none());

        tokio::time::sleep(StdDuration::from_secs(2)).await;
        assert!(!*fired.lock().unwrap());
    }
}
