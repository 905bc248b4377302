//! Rest countdown and the scheduling seam it runs on.
//!
//! The countdown never sleeps on its own. It asks a [`Scheduler`] for a
//! repeating one-second task and is advanced by whoever delivers those
//! ticks. Cancelling is explicit: a restart cancels the previous task
//! before a new one is scheduled, and ticks carrying a stale handle are
//! ignored.

use std::collections::BTreeMap;
use std::time::Duration;

/// Rest duration used when nothing else is configured
pub const DEFAULT_REST_SECONDS: u32 = 90;

/// Interval between countdown ticks
pub const TICK: Duration = Duration::from_secs(1);

/// Identifies one scheduled repeating task
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskHandle(u64);

/// Source of repeating, cancellable tasks
pub trait Scheduler {
    /// Schedule a task that fires every `period` until cancelled
    fn schedule_repeating(&mut self, period: Duration) -> TaskHandle;
    fn cancel(&mut self, handle: TaskHandle);
}

/// Sink for the fire-and-forget "rest complete" notice
pub trait Notifier {
    fn rest_complete(&mut self, exercise_index: usize, exercise_name: &str);
}

/// Notifier that only writes a log line
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn rest_complete(&mut self, exercise_index: usize, exercise_name: &str) {
        tracing::info!(
            "Rest complete for exercise {} ({}): time for the next set",
            exercise_index + 1,
            exercise_name
        );
    }
}

#[derive(Clone, Debug)]
struct Task {
    period_ms: u64,
    next_due_ms: u64,
}

/// Scheduler driven by explicit time advancement
///
/// Used by tests and by the CLI, which advances it once per real second.
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    now_ms: u64,
    next_id: u64,
    tasks: BTreeMap<TaskHandle, Task>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward and return the handles that fired, in firing order
    pub fn advance(&mut self, by: Duration) -> Vec<TaskHandle> {
        let until = self.now_ms + by.as_millis() as u64;
        let mut fired: Vec<(u64, TaskHandle)> = Vec::new();

        for (handle, task) in self.tasks.iter_mut() {
            while task.next_due_ms <= until {
                fired.push((task.next_due_ms, *handle));
                task.next_due_ms += task.period_ms;
            }
        }

        self.now_ms = until;
        fired.sort();
        fired.into_iter().map(|(_, h)| h).collect()
    }

    pub fn is_active(&self, handle: TaskHandle) -> bool {
        self.tasks.contains_key(&handle)
    }

    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&mut self, period: Duration) -> TaskHandle {
        let period_ms = (period.as_millis() as u64).max(1);
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.tasks.insert(
            handle,
            Task {
                period_ms,
                next_due_ms: self.now_ms + period_ms,
            },
        );
        handle
    }

    fn cancel(&mut self, handle: TaskHandle) {
        self.tasks.remove(&handle);
    }
}

/// Countdown between sets
#[derive(Clone, Debug)]
pub struct RestTimer {
    configured_seconds: u32,
    remaining_seconds: u32,
    running: bool,
    handle: Option<TaskHandle>,
}

impl Default for RestTimer {
    fn default() -> Self {
        Self::new(DEFAULT_REST_SECONDS)
    }
}

impl RestTimer {
    pub fn new(configured_seconds: u32) -> Self {
        Self {
            configured_seconds: normalize(configured_seconds),
            remaining_seconds: 0,
            running: false,
            handle: None,
        }
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn configured_seconds(&self) -> u32 {
        self.configured_seconds
    }

    /// Duration used by the next automatic start; 0 falls back to the default
    pub fn set_configured_seconds(&mut self, seconds: u32) {
        self.configured_seconds = normalize(seconds);
    }

    pub fn handle(&self) -> Option<TaskHandle> {
        self.handle
    }

    /// Start (or restart) the countdown from `seconds`
    pub fn start<S: Scheduler + ?Sized>(&mut self, seconds: u32, scheduler: &mut S) {
        self.cancel_task(scheduler);
        self.remaining_seconds = seconds;
        self.running = true;
        self.handle = Some(scheduler.schedule_repeating(TICK));
        tracing::debug!("Rest timer started: {}s", seconds);
    }

    /// Start from the configured duration
    pub fn start_configured<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        self.start(self.configured_seconds, scheduler);
    }

    /// Halt the countdown and zero the remaining time
    pub fn stop<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        self.cancel_task(scheduler);
        self.running = false;
        self.remaining_seconds = 0;
    }

    /// Apply one tick. Returns true on the tick that finishes the countdown.
    pub fn tick<S: Scheduler + ?Sized>(&mut self, handle: TaskHandle, scheduler: &mut S) -> bool {
        if !self.running || self.handle != Some(handle) {
            return false;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return false;
        }

        self.cancel_task(scheduler);
        self.running = false;
        tracing::debug!("Rest timer finished");
        true
    }

    fn cancel_task<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.handle.take() {
            scheduler.cancel(handle);
        }
    }
}

fn normalize(seconds: u32) -> u32 {
    if seconds == 0 {
        DEFAULT_REST_SECONDS
    } else {
        seconds
    }
}

/// Format seconds as `m:ss`
pub fn format_countdown(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
