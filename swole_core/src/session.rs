//! Per-exercise session tracker.
//!
//! One tracker exists per exercise of a workout instance. It moves between
//! `Idle` and `Logging` while sets are entered, owns the rest countdown, and
//! becomes `Completed` once the fifth set is committed. Completion is
//! announced over a channel so the workout orchestrator can aggregate it.

use crate::clock::Clock;
use crate::setlog::{log_key, read_sets, write_sets};
use crate::store::Store;
use crate::timer::{Notifier, RestTimer, Scheduler, TaskHandle};
use crate::types::{GeneratedExercise, LoggedSet, SetEntry};
use crate::{Error, Result};
use std::sync::mpsc::Sender;

/// Sets required before an exercise counts as complete
pub const SETS_PER_EXERCISE: u32 = 5;

/// Logging state of one exercise
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// No entry pending
    Idle,
    /// An entry form is open; no set recorded yet
    Logging,
    /// All sets done; logging is disabled
    Completed,
}

/// Emitted by a tracker towards its orchestrator
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    ExerciseComplete { index: usize },
}

/// State machine for one exercise of one workout
#[derive(Debug)]
pub struct SessionTracker {
    index: usize,
    name: String,
    key: String,
    sets: Vec<LoggedSet>,
    phase: SessionPhase,
    rest: RestTimer,
    events: Sender<SessionEvent>,
}

impl SessionTracker {
    /// Create a tracker, resuming any sets already stored for
    /// (`workout_id`, exercise position)
    pub fn load<S: Store + ?Sized>(
        store: &S,
        workout_id: &str,
        exercise: &GeneratedExercise,
        rest_seconds: u32,
        events: Sender<SessionEvent>,
    ) -> Result<Self> {
        let key = log_key(workout_id, exercise.index);
        let sets = read_sets(store, &key)?;

        let phase = if sets.len() as u32 >= SETS_PER_EXERCISE {
            SessionPhase::Completed
        } else {
            SessionPhase::Idle
        };

        if !sets.is_empty() {
            tracing::debug!("Resumed {} with {} logged sets", key, sets.len());
        }

        Ok(Self {
            index: exercise.index,
            name: exercise.name.clone(),
            key,
            sets,
            phase,
            rest: RestTimer::new(rest_seconds),
            events,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store key of this exercise's set log
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn sets(&self) -> &[LoggedSet] {
        &self.sets
    }

    pub fn sets_completed(&self) -> u32 {
        self.sets.len() as u32
    }

    pub fn is_complete(&self) -> bool {
        self.sets_completed() >= SETS_PER_EXERCISE
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn rest(&self) -> &RestTimer {
        &self.rest
    }

    /// Rest duration used by the automatic start after each set
    pub fn set_rest_duration(&mut self, seconds: u32) {
        self.rest.set_configured_seconds(seconds);
    }

    /// Open an entry for the next set
    pub fn request_log(&mut self) -> Result<()> {
        if self.phase == SessionPhase::Completed || self.is_complete() {
            return Err(Error::Session(format!(
                "{} already has {} sets logged",
                self.name, SETS_PER_EXERCISE
            )));
        }
        self.phase = SessionPhase::Logging;
        Ok(())
    }

    /// Discard the pending entry without persisting anything
    pub fn cancel_log(&mut self) {
        if self.phase == SessionPhase::Logging {
            self.phase = SessionPhase::Idle;
        }
    }

    /// Record the pending set
    ///
    /// Persists the whole sequence, starts the rest countdown from the
    /// configured duration, and on the fifth set announces completion.
    pub fn commit_log<S, Sch, C>(
        &mut self,
        entry: SetEntry,
        store: &mut S,
        scheduler: &mut Sch,
        clock: &C,
    ) -> Result<&LoggedSet>
    where
        S: Store + ?Sized,
        Sch: Scheduler + ?Sized,
        C: Clock + ?Sized,
    {
        if self.phase != SessionPhase::Logging {
            return Err(Error::Session(format!(
                "no set is being logged for {}",
                self.name
            )));
        }

        let weight = entry.weight.unwrap_or(0.0);
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::Session(format!("invalid weight {}", weight)));
        }
        let rpe = entry.rpe.unwrap_or(0);
        if rpe > 10 {
            return Err(Error::Session(format!("RPE {} is outside 1-10", rpe)));
        }

        let set = LoggedSet {
            set_number: self.sets_completed() + 1,
            weight,
            reps: entry.reps.unwrap_or(0),
            rpe,
            timestamp: Some(clock.now()),
        };

        let mut updated = self.sets.clone();
        updated.push(set);
        write_sets(store, &self.key, &updated)?;
        self.sets = updated;

        tracing::debug!(
            "Logged set {} of {}: {} x {}",
            self.sets_completed(),
            self.name,
            weight,
            self.sets[self.sets.len() - 1].reps
        );

        self.rest.start_configured(scheduler);

        if self.is_complete() {
            self.phase = SessionPhase::Completed;
            tracing::info!("Exercise {} ({}) complete", self.index + 1, self.name);
            if self
                .events
                .send(SessionEvent::ExerciseComplete { index: self.index })
                .is_err()
            {
                tracing::debug!("No listener for completion of {}", self.key);
            }
        } else {
            self.phase = SessionPhase::Idle;
        }

        Ok(&self.sets[self.sets.len() - 1])
    }

    /// Start the countdown manually; restarts if already running
    pub fn start_rest<Sch: Scheduler + ?Sized>(&mut self, seconds: u32, scheduler: &mut Sch) {
        self.rest.start(seconds, scheduler);
    }

    pub fn stop_rest<Sch: Scheduler + ?Sized>(&mut self, scheduler: &mut Sch) {
        self.rest.stop(scheduler);
    }

    /// Deliver a scheduler tick. Returns true if it finished the rest, in
    /// which case the notifier has been told.
    pub fn on_tick<Sch, N>(&mut self, handle: TaskHandle, scheduler: &mut Sch, notifier: &mut N) -> bool
    where
        Sch: Scheduler + ?Sized,
        N: Notifier + ?Sized,
    {
        if !self.rest.tick(handle, scheduler) {
            return false;
        }
        notifier.rest_complete(self.index, &self.name);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;
    use crate::timer::ManualScheduler;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::mpsc::{channel, Receiver};
    use std::time::Duration as StdDuration;

    #[derive(Default)]
    struct RecordingNotifier {
        notices: Vec<usize>,
    }

    impl Notifier for RecordingNotifier {
        fn rest_complete(&mut self, exercise_index: usize, _exercise_name: &str) {
            self.notices.push(exercise_index);
        }
    }

    fn exercise(index: usize) -> GeneratedExercise {
        GeneratedExercise {
            index,
            name: "Bench Press".into(),
            muscles: vec!["chest".into()],
            kind: crate::types::ExerciseKind::Compound,
            sets: 5,
            reps: "3-5".into(),
            unit: "reps".into(),
            rest: "2-3 min".into(),
            tempo: "2-0-1".into(),
            description: String::new(),
        }
    }

    struct Harness {
        store: MemoryStore,
        scheduler: ManualScheduler,
        clock: ManualClock,
        rx: Receiver<SessionEvent>,
        tracker: SessionTracker,
    }

    fn harness() -> Harness {
        crate::logging::init_test();
        let store = MemoryStore::new();
        let (tx, rx) = channel();
        let tracker = SessionTracker::load(&store, "w1", &exercise(2), 90, tx).unwrap();
        Harness {
            store,
            scheduler: ManualScheduler::new(),
            clock: ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()),
            rx,
            tracker,
        }
    }

    fn log(h: &mut Harness, weight: f64, reps: u32) -> Result<()> {
        h.tracker.request_log()?;
        h.tracker
            .commit_log(SetEntry::new(weight, reps, 8), &mut h.store, &mut h.scheduler, &h.clock)?;
        h.clock.advance(Duration::minutes(2));
        Ok(())
    }

    #[test]
    fn test_set_numbers_are_contiguous() {
        let mut h = harness();
        for i in 0..4 {
            log(&mut h, 100.0 + i as f64, 8).unwrap();
        }
        let numbers: Vec<u32> = h.tracker.sets().iter().map(|s| s.set_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(h.tracker.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_commit_persists_under_log_key() {
        let mut h = harness();
        log(&mut h, 135.0, 5).unwrap();

        let raw = h.store.get("exercise_w1_2").unwrap().unwrap();
        let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored[0]["set"], 1);
        assert_eq!(stored[0]["weight"], 135.0);
        assert_eq!(stored[0]["reps"], 5);
        assert_eq!(stored[0]["rpe"], 8);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let mut h = harness();
        h.tracker.request_log().unwrap();
        let set = h
            .tracker
            .commit_log(SetEntry::default(), &mut h.store, &mut h.scheduler, &h.clock)
            .unwrap()
            .clone();
        assert_eq!(set.weight, 0.0);
        assert_eq!(set.reps, 0);
        assert_eq!(set.rpe(), None);
    }

    #[test]
    fn test_fifth_set_completes_once() {
        let mut h = harness();
        for _ in 0..4 {
            log(&mut h, 100.0, 5).unwrap();
        }
        assert!(h.rx.try_recv().is_err());

        log(&mut h, 100.0, 5).unwrap();
        assert_eq!(h.tracker.phase(), SessionPhase::Completed);
        assert_eq!(h.rx.try_recv(), Ok(SessionEvent::ExerciseComplete { index: 2 }));

        // Logging is now disabled and nothing else is emitted
        assert!(matches!(h.tracker.request_log(), Err(Error::Session(_))));
        assert!(h.rx.try_recv().is_err());
        assert_eq!(h.tracker.sets_completed(), 5);
    }

    #[test]
    fn test_cancel_discards_entry() {
        let mut h = harness();
        h.tracker.request_log().unwrap();
        assert_eq!(h.tracker.phase(), SessionPhase::Logging);
        h.tracker.cancel_log();
        assert_eq!(h.tracker.phase(), SessionPhase::Idle);
        assert!(h.store.is_empty());

        let result =
            h.tracker
                .commit_log(SetEntry::new(1.0, 1, 1), &mut h.store, &mut h.scheduler, &h.clock);
        assert!(matches!(result, Err(Error::Session(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut h = harness();
        h.tracker.request_log().unwrap();
        let bad_weight =
            h.tracker
                .commit_log(SetEntry::new(-5.0, 5, 5), &mut h.store, &mut h.scheduler, &h.clock);
        assert!(bad_weight.is_err());
        let bad_rpe =
            h.tracker
                .commit_log(SetEntry::new(5.0, 5, 11), &mut h.store, &mut h.scheduler, &h.clock);
        assert!(bad_rpe.is_err());
        assert_eq!(h.tracker.sets_completed(), 0);
        assert_eq!(h.tracker.phase(), SessionPhase::Logging);
    }

    #[test]
    fn test_commit_starts_configured_rest() {
        let mut h = harness();
        h.tracker.set_rest_duration(60);
        log(&mut h, 100.0, 5).unwrap();

        assert!(h.tracker.rest().is_running());
        assert_eq!(h.tracker.rest().remaining_seconds(), 60);
        assert_eq!(h.scheduler.active_count(), 1);
    }

    #[test]
    fn test_rest_completion_notifies() {
        let mut h = harness();
        let mut notifier = RecordingNotifier::default();
        h.tracker.start_rest(3, &mut h.scheduler);

        let mut finished = 0;
        for handle in h.scheduler.advance(StdDuration::from_secs(10)) {
            if h.tracker.on_tick(handle, &mut h.scheduler, &mut notifier) {
                finished += 1;
            }
        }
        assert_eq!(finished, 1);
        assert_eq!(notifier.notices, vec![2]);
        assert!(!h.tracker.rest().is_running());
    }

    #[test]
    fn test_logging_during_rest_restarts_timer() {
        let mut h = harness();
        log(&mut h, 100.0, 5).unwrap();
        h.scheduler.advance(StdDuration::from_secs(30));
        log(&mut h, 100.0, 5).unwrap();

        assert_eq!(h.scheduler.active_count(), 1);
        assert_eq!(h.tracker.rest().remaining_seconds(), 90);
    }

    #[test]
    fn test_resume_from_store() {
        let mut h = harness();
        for _ in 0..3 {
            log(&mut h, 80.0, 10).unwrap();
        }

        let (tx, _rx) = channel();
        let resumed = SessionTracker::load(&h.store, "w1", &exercise(2), 90, tx).unwrap();
        assert_eq!(resumed.sets_completed(), 3);
        assert_eq!(resumed.phase(), SessionPhase::Idle);

        let (tx, _rx) = channel();
        let other = SessionTracker::load(&h.store, "w2", &exercise(2), 90, tx).unwrap();
        assert_eq!(other.sets_completed(), 0);
    }

    #[test]
    fn test_resume_completed_exercise() {
        let mut h = harness();
        for _ in 0..5 {
            log(&mut h, 80.0, 10).unwrap();
        }
        let (tx, rx) = channel();
        let mut resumed = SessionTracker::load(&h.store, "w1", &exercise(2), 90, tx).unwrap();
        assert_eq!(resumed.phase(), SessionPhase::Completed);
        assert!(resumed.request_log().is_err());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_corrupt_log_resumes_empty() {
        let mut store = MemoryStore::new();
        store.set("exercise_w1_2", "{{{").unwrap();
        let (tx, _rx) = channel();
        let tracker = SessionTracker::load(&store, "w1", &exercise(2), 90, tx).unwrap();
        assert_eq!(tracker.sets_completed(), 0);
    }
}
