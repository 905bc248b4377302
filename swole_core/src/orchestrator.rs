//! Workout orchestrator.
//!
//! Owns one [`SessionTracker`] per exercise of a workout instance, collects
//! their completion events and announces whole-workout completion exactly
//! once. Creating a workout through [`WorkoutOrchestrator::generate`] also
//! records it in the history list.

use crate::clock::Clock;
use crate::generator::generate;
use crate::history::{entry_for, record_workout};
use crate::session::{SessionEvent, SessionTracker};
use crate::store::{Store, ACTIVE_WORKOUT_KEY};
use crate::timer::{Notifier, Scheduler, TaskHandle};
use crate::types::{ActiveWorkout, Catalog, GeneratedExercise, LoggedSet, SetEntry, WorkoutRequest};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::sync::mpsc::{channel, Receiver};
use uuid::Uuid;

/// Events visible to collaborators of a workout
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkoutEvent {
    ExerciseComplete { index: usize },
    WorkoutComplete { workout_id: String },
}

/// Fresh id for a workout instance; contains no `_` so it can be embedded
/// in log keys
pub fn new_workout_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Coordinates the trackers of one workout instance
#[derive(Debug)]
pub struct WorkoutOrchestrator {
    workout_id: String,
    exercises: Vec<GeneratedExercise>,
    trackers: Vec<SessionTracker>,
    completion: BTreeMap<usize, bool>,
    announced: bool,
    events: Receiver<SessionEvent>,
}

impl WorkoutOrchestrator {
    /// Generate a workout, record it in history and make it the active one
    pub fn generate<S, C>(
        catalog: &Catalog,
        request: &WorkoutRequest,
        store: &mut S,
        clock: &C,
        rest_seconds: u32,
    ) -> Result<Self>
    where
        S: Store + ?Sized,
        C: Clock + ?Sized,
    {
        let exercises = generate(catalog, request)?;
        record_workout(store, entry_for(request, &exercises, clock.now()))?;
        Self::begin(store, exercises, rest_seconds)
    }

    /// Start a workout from an already parameterized exercise list
    ///
    /// Positions are renumbered from 0. Nothing is written to history.
    pub fn begin<S: Store + ?Sized>(
        store: &mut S,
        exercises: Vec<GeneratedExercise>,
        rest_seconds: u32,
    ) -> Result<Self> {
        if exercises.is_empty() {
            return Err(Error::InvalidSelection("workout has no exercises".into()));
        }

        let exercises: Vec<GeneratedExercise> = exercises
            .into_iter()
            .enumerate()
            .map(|(index, mut e)| {
                e.index = index;
                e
            })
            .collect();

        let active = ActiveWorkout {
            workout_id: new_workout_id(),
            exercises,
        };
        store.set(ACTIVE_WORKOUT_KEY, &serde_json::to_string(&active)?)?;
        tracing::info!(
            "Started workout {} with {} exercises",
            active.workout_id,
            active.exercises.len()
        );

        Self::resume(&*store, active, rest_seconds)
    }

    /// Rebuild the orchestrator for an existing workout id
    ///
    /// Exercises that already hold all their sets start out complete. If
    /// every exercise is complete the workout counts as already announced.
    pub fn resume<S: Store + ?Sized>(
        store: &S,
        active: ActiveWorkout,
        rest_seconds: u32,
    ) -> Result<Self> {
        let (tx, rx) = channel();

        let trackers = active
            .exercises
            .iter()
            .map(|e| SessionTracker::load(store, &active.workout_id, e, rest_seconds, tx.clone()))
            .collect::<Result<Vec<_>>>()?;

        let completion: BTreeMap<usize, bool> = trackers
            .iter()
            .map(|t| (t.index(), t.is_complete()))
            .collect();
        let announced =
            completion.len() == active.exercises.len() && completion.values().all(|done| *done);

        Ok(Self {
            workout_id: active.workout_id,
            exercises: active.exercises,
            trackers,
            completion,
            announced,
            events: rx,
        })
    }

    /// Load the active workout from the store, if any
    pub fn load_active<S: Store + ?Sized>(store: &S, rest_seconds: u32) -> Result<Option<Self>> {
        let Some(raw) = store.get(ACTIVE_WORKOUT_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str::<ActiveWorkout>(&raw) {
            Ok(active) if !active.exercises.is_empty() => {
                Ok(Some(Self::resume(store, active, rest_seconds)?))
            }
            Ok(_) => Ok(None),
            Err(e) => {
                tracing::warn!("Failed to parse active workout: {}. Ignoring it.", e);
                Ok(None)
            }
        }
    }

    pub fn workout_id(&self) -> &str {
        &self.workout_id
    }

    pub fn exercises(&self) -> &[GeneratedExercise] {
        &self.exercises
    }

    pub fn trackers(&self) -> &[SessionTracker] {
        &self.trackers
    }

    pub fn tracker(&self, index: usize) -> Result<&SessionTracker> {
        self.trackers.get(index).ok_or_else(|| no_exercise(index))
    }

    pub fn tracker_mut(&mut self, index: usize) -> Result<&mut SessionTracker> {
        self.trackers.get_mut(index).ok_or_else(|| no_exercise(index))
    }

    /// Completion flag per exercise position
    pub fn completion(&self) -> &BTreeMap<usize, bool> {
        &self.completion
    }

    pub fn is_complete(&self) -> bool {
        self.completion.len() == self.exercises.len() && self.completion.values().all(|d| *d)
    }

    pub fn request_log(&mut self, index: usize) -> Result<()> {
        self.tracker_mut(index)?.request_log()
    }

    pub fn cancel_log(&mut self, index: usize) -> Result<()> {
        self.tracker_mut(index)?.cancel_log();
        Ok(())
    }

    /// Commit the pending set of one exercise and collect resulting events
    pub fn commit_log<S, Sch, C>(
        &mut self,
        index: usize,
        entry: SetEntry,
        store: &mut S,
        scheduler: &mut Sch,
        clock: &C,
    ) -> Result<(LoggedSet, Vec<WorkoutEvent>)>
    where
        S: Store + ?Sized,
        Sch: Scheduler + ?Sized,
        C: Clock + ?Sized,
    {
        let set = self
            .tracker_mut(index)?
            .commit_log(entry, store, scheduler, clock)?
            .clone();
        Ok((set, self.pump()))
    }

    /// Open and commit a set in one step
    pub fn log_set<S, Sch, C>(
        &mut self,
        index: usize,
        entry: SetEntry,
        store: &mut S,
        scheduler: &mut Sch,
        clock: &C,
    ) -> Result<(LoggedSet, Vec<WorkoutEvent>)>
    where
        S: Store + ?Sized,
        Sch: Scheduler + ?Sized,
        C: Clock + ?Sized,
    {
        self.request_log(index)?;
        self.commit_log(index, entry, store, scheduler, clock)
    }

    pub fn start_rest<Sch: Scheduler + ?Sized>(
        &mut self,
        index: usize,
        seconds: u32,
        scheduler: &mut Sch,
    ) -> Result<()> {
        self.tracker_mut(index)?.start_rest(seconds, scheduler);
        Ok(())
    }

    pub fn stop_rest<Sch: Scheduler + ?Sized>(&mut self, index: usize, scheduler: &mut Sch) -> Result<()> {
        self.tracker_mut(index)?.stop_rest(scheduler);
        Ok(())
    }

    /// Route a scheduler tick to the tracker that owns it
    ///
    /// Returns the position whose rest finished on this tick, if any.
    pub fn on_tick<Sch, N>(&mut self, handle: TaskHandle, scheduler: &mut Sch, notifier: &mut N) -> Option<usize>
    where
        Sch: Scheduler + ?Sized,
        N: Notifier + ?Sized,
    {
        let tracker = self
            .trackers
            .iter_mut()
            .find(|t| t.rest().handle() == Some(handle))?;
        tracker
            .on_tick(handle, scheduler, notifier)
            .then(|| tracker.index())
    }

    /// True while any exercise has a rest countdown running
    pub fn is_resting(&self) -> bool {
        self.trackers.iter().any(|t| t.rest().is_running())
    }

    /// Drain tracker events and derive workout completion
    ///
    /// Repeated completion reports for the same position, and any call after
    /// the workout was announced, produce no further workout event.
    pub fn pump(&mut self) -> Vec<WorkoutEvent> {
        let mut out = Vec::new();

        while let Ok(event) = self.events.try_recv() {
            match event {
                SessionEvent::ExerciseComplete { index } => {
                    let flag = self.completion.entry(index).or_insert(false);
                    if !*flag {
                        *flag = true;
                        out.push(WorkoutEvent::ExerciseComplete { index });
                    }
                }
            }
        }

        if !self.announced && self.is_complete() {
            self.announced = true;
            tracing::info!("Workout {} complete", self.workout_id);
            out.push(WorkoutEvent::WorkoutComplete {
                workout_id: self.workout_id.clone(),
            });
        }

        out
    }
}

fn no_exercise(index: usize) -> Error {
    Error::Session(format!("no exercise at position {}", index + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;
    use crate::clock::ManualClock;
    use crate::history::load_history;
    use crate::store::MemoryStore;
    use crate::timer::{LogNotifier, ManualScheduler};
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    struct Fixture {
        store: MemoryStore,
        scheduler: ManualScheduler,
        clock: ManualClock,
    }

    fn fixture() -> Fixture {
        Fixture {
            store: MemoryStore::new(),
            scheduler: ManualScheduler::new(),
            clock: ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()),
        }
    }

    fn request(muscles: &[&str]) -> WorkoutRequest {
        WorkoutRequest {
            workout_type: "individual".into(),
            muscles: muscles.iter().map(|m| m.to_string()).collect(),
            goal: "strength_power".into(),
        }
    }

    fn finish_exercise(o: &mut WorkoutOrchestrator, f: &mut Fixture, index: usize) -> Vec<WorkoutEvent> {
        let mut events = Vec::new();
        for _ in 0..5 {
            let (_, mut e) = o
                .log_set(index, SetEntry::new(50.0, 10, 7), &mut f.store, &mut f.scheduler, &f.clock)
                .unwrap();
            events.append(&mut e);
        }
        events
    }

    #[test]
    fn test_generate_records_history_at_start() {
        let mut f = fixture();
        let o = WorkoutOrchestrator::generate(
            get_default_catalog(),
            &request(&["calves"]),
            &mut f.store,
            &f.clock,
            90,
        )
        .unwrap();

        let history = load_history(&f.store).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].muscle_group, "calves");
        assert_eq!(history[0].exercises, vec!["Calf Raises", "Seated Calf Raise"]);
        assert_eq!(o.completion().len(), 2);
        assert!(o.completion().values().all(|d| !d));
    }

    #[test]
    fn test_workout_complete_fires_once_after_all() {
        let mut f = fixture();
        let mut o = WorkoutOrchestrator::generate(
            get_default_catalog(),
            &request(&["calves"]),
            &mut f.store,
            &f.clock,
            90,
        )
        .unwrap();

        let first = finish_exercise(&mut o, &mut f, 0);
        assert_eq!(first, vec![WorkoutEvent::ExerciseComplete { index: 0 }]);
        assert!(!o.is_complete());

        let second = finish_exercise(&mut o, &mut f, 1);
        assert_eq!(
            second,
            vec![
                WorkoutEvent::ExerciseComplete { index: 1 },
                WorkoutEvent::WorkoutComplete {
                    workout_id: o.workout_id().to_string()
                },
            ]
        );

        // Re-pumping the same state is idempotent
        assert!(o.pump().is_empty());
        assert!(o.pump().is_empty());
    }

    #[test]
    fn test_out_of_range_index() {
        let mut f = fixture();
        let mut o = WorkoutOrchestrator::generate(
            get_default_catalog(),
            &request(&["calves"]),
            &mut f.store,
            &f.clock,
            90,
        )
        .unwrap();
        assert!(matches!(o.request_log(7), Err(Error::Session(_))));
    }

    #[test]
    fn test_load_active_resumes_progress() {
        let mut f = fixture();
        let mut o = WorkoutOrchestrator::generate(
            get_default_catalog(),
            &request(&["calves"]),
            &mut f.store,
            &f.clock,
            90,
        )
        .unwrap();
        finish_exercise(&mut o, &mut f, 0);
        o.log_set(1, SetEntry::new(40.0, 12, 6), &mut f.store, &mut f.scheduler, &f.clock)
            .unwrap();
        let id = o.workout_id().to_string();

        let mut resumed = WorkoutOrchestrator::load_active(&f.store, 90).unwrap().unwrap();
        assert_eq!(resumed.workout_id(), id);
        assert!(resumed.completion()[&0]);
        assert_eq!(resumed.tracker(1).unwrap().sets_completed(), 1);

        let mut events = Vec::new();
        for _ in 0..4 {
            let (_, mut e) = resumed
                .log_set(1, SetEntry::new(40.0, 12, 6), &mut f.store, &mut f.scheduler, &f.clock)
                .unwrap();
            events.append(&mut e);
        }
        assert!(events.contains(&WorkoutEvent::WorkoutComplete { workout_id: id }));
    }

    #[test]
    fn test_resume_finished_workout_does_not_reannounce() {
        let mut f = fixture();
        let mut o = WorkoutOrchestrator::generate(
            get_default_catalog(),
            &request(&["calves"]),
            &mut f.store,
            &f.clock,
            90,
        )
        .unwrap();
        finish_exercise(&mut o, &mut f, 0);
        finish_exercise(&mut o, &mut f, 1);

        let mut resumed = WorkoutOrchestrator::load_active(&f.store, 90).unwrap().unwrap();
        assert!(resumed.is_complete());
        assert!(resumed.pump().is_empty());
    }

    #[test]
    fn test_begin_renumbers_and_skips_history() {
        let mut f = fixture();
        let mut exercises = crate::generate(get_default_catalog(), &request(&["abs"])).unwrap();
        exercises.reverse();

        let o = WorkoutOrchestrator::begin(&mut f.store, exercises, 90).unwrap();
        assert_eq!(o.exercises()[0].name, "Cable Crunch");
        assert_eq!(o.exercises()[0].index, 0);
        assert!(load_history(&f.store).unwrap().is_empty());
        assert!(f.store.get(ACTIVE_WORKOUT_KEY).unwrap().is_some());
    }

    #[test]
    fn test_begin_rejects_empty_workout() {
        let mut f = fixture();
        assert!(matches!(
            WorkoutOrchestrator::begin(&mut f.store, Vec::new(), 90),
            Err(Error::InvalidSelection(_))
        ));
    }

    #[test]
    fn test_workout_ids_do_not_collide() {
        let a = new_workout_id();
        let b = new_workout_id();
        assert_ne!(a, b);
        assert!(!a.contains('_'));
    }

    #[test]
    fn test_ticks_routed_to_owning_tracker() {
        let mut f = fixture();
        let mut o = WorkoutOrchestrator::generate(
            get_default_catalog(),
            &request(&["calves"]),
            &mut f.store,
            &f.clock,
            90,
        )
        .unwrap();
        o.start_rest(0, 2, &mut f.scheduler).unwrap();
        o.start_rest(1, 5, &mut f.scheduler).unwrap();

        let mut notifier = LogNotifier;
        let mut finished = Vec::new();
        for handle in f.scheduler.advance(Duration::from_secs(5)) {
            if let Some(i) = o.on_tick(handle, &mut f.scheduler, &mut notifier) {
                finished.push(i);
            }
        }
        assert_eq!(finished, vec![0, 1]);
        assert!(!o.is_resting());
    }
}
