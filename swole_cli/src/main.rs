use clap::{Parser, Subcommand};
use std::path::PathBuf;
use swole_core::custom::{
    build_exercises, delete_custom_workout, list_custom_workouts, save_custom_workout,
    search_exercises, start_custom_workout,
};
use swole_core::session::SETS_PER_EXERCISE;
use swole_core::timer::{format_countdown, TICK};
use swole_core::*;

#[derive(Parser)]
#[command(name = "swole")]
#[command(about = "Workout generator and set logger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Show debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List workout types, their muscle options and goals
    Catalog {
        /// Show the explanation for one exercise instead
        #[arg(long)]
        explain: Option<String>,
    },

    /// Generate a workout and make it the active one
    Generate {
        /// Workout type (individual, bro_split, bodybuilder_split, upper_lower)
        #[arg(long = "type")]
        workout_type: Option<String>,

        /// Muscle groups or category, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        muscles: Vec<String>,

        /// Goal (strength_power, growth_hypertrophy, cardiovascular_endurance)
        #[arg(long)]
        goal: Option<String>,
    },

    /// Log one set for an exercise of the active workout
    Log {
        /// Exercise number as shown by `status` (1-based)
        #[arg(long, short)]
        exercise: usize,

        #[arg(long, short)]
        weight: Option<f64>,

        #[arg(long, short)]
        reps: Option<u32>,

        /// Rate of perceived exertion, 1-10
        #[arg(long)]
        rpe: Option<u8>,

        /// Wait for the rest countdown to finish
        #[arg(long)]
        wait: bool,
    },

    /// Run a rest countdown for an exercise of the active workout
    Rest {
        /// Exercise number (1-based)
        #[arg(long, short, default_value_t = 1)]
        exercise: usize,

        /// Countdown length; defaults to the configured rest
        #[arg(long, short)]
        seconds: Option<u32>,
    },

    /// Show the active workout and logged sets
    Status,

    /// Show recent workouts
    History {
        /// Remove all history entries
        #[arg(long)]
        clear: bool,
    },

    /// Show training statistics
    Stats {
        /// Print the full snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export all logged sets to CSV
    Export {
        #[arg(long)]
        out: PathBuf,
    },

    /// Manage saved custom workouts
    Custom {
        #[command(subcommand)]
        command: CustomCommands,
    },
}

#[derive(Subcommand)]
enum CustomCommands {
    /// List saved custom workouts
    List,

    /// Search exercises by name or muscle
    Search { term: String },

    /// Save a custom workout from catalog exercises
    Save {
        #[arg(long)]
        name: String,

        /// Exercise name; repeat for each exercise
        #[arg(long = "exercise", required = true)]
        exercises: Vec<String>,
    },

    /// Delete a custom workout by id
    Delete { id: i64 },

    /// Start a custom workout as the active workout
    Start { id: i64 },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep command output clean unless asked
    swole_core::logging::init_with_level(if cli.verbose { "debug" } else { "warn" });

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);
    let mut store = FileStore::new(data_dir.join("store.json"));

    match cli.command {
        Commands::Catalog { explain } => cmd_catalog(explain),
        Commands::Generate {
            workout_type,
            muscles,
            goal,
        } => cmd_generate(&mut store, &config, workout_type, muscles, goal),
        Commands::Log {
            exercise,
            weight,
            reps,
            rpe,
            wait,
        } => cmd_log(
            &mut store,
            &config,
            exercise,
            SetEntry { weight, reps, rpe },
            wait,
        ),
        Commands::Rest { exercise, seconds } => cmd_rest(&store, &config, exercise, seconds),
        Commands::Status => cmd_status(&store, &config),
        Commands::History { clear } => cmd_history(&mut store, clear),
        Commands::Stats { json } => cmd_stats(&store, json),
        Commands::Export { out } => cmd_export(&store, &out),
        Commands::Custom { command } => cmd_custom(&mut store, &config, command),
    }
}

fn cmd_catalog(explain: Option<String>) -> Result<()> {
    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Config("Invalid catalog".into()));
    }

    if let Some(name) = explain {
        println!("{}", explanation(&name));
        return Ok(());
    }

    println!("Workout types:");
    for workout_type in &catalog.workout_types {
        println!("  {:<18} {}", workout_type.id, workout_type.options().join(", "));
    }

    println!();
    println!("Goals:");
    for goal in &catalog.goals {
        let s = &goal.scheme;
        println!(
            "  {:<26} {} sets x {} reps, rest {}, tempo {}",
            goal.id, s.sets, s.reps, s.rest, s.tempo
        );
    }

    Ok(())
}

fn cmd_generate(
    store: &mut FileStore,
    config: &Config,
    workout_type: Option<String>,
    muscles: Vec<String>,
    goal: Option<String>,
) -> Result<()> {
    let catalog = get_default_catalog();
    let workout_type = workout_type.unwrap_or_else(|| config.defaults.workout_type.clone());
    let goal = goal.unwrap_or_else(|| config.defaults.goal.clone());

    let mut selection = MuscleSelection::new(catalog, &workout_type)?;
    for muscle in &muscles {
        if selection.toggle(catalog, muscle.trim())? == ToggleOutcome::Rejected {
            eprintln!(
                "Ignoring {}: at most {} muscle groups per workout",
                muscle,
                swole_core::selection::MAX_INDIVIDUAL_MUSCLES
            );
        }
    }

    let request = selection.into_request(&goal)?;
    let orchestrator = WorkoutOrchestrator::generate(
        catalog,
        &request,
        store,
        &SystemClock,
        config.session.rest_seconds,
    )?;

    println!("✓ Workout generated ({})", orchestrator.workout_id());
    println!("  {} / {}", request.muscles.join(", "), request.goal);
    println!();
    display_exercises(&orchestrator);
    Ok(())
}

fn cmd_log(
    store: &mut FileStore,
    config: &Config,
    exercise: usize,
    entry: SetEntry,
    wait: bool,
) -> Result<()> {
    let mut orchestrator = active_workout(&*store, config)?;
    let index = exercise_index(exercise)?;
    let mut scheduler = ManualScheduler::new();

    let (set, events) = orchestrator.log_set(index, entry, store, &mut scheduler, &SystemClock)?;
    let tracker = orchestrator.tracker(index)?;

    println!(
        "✓ Logged set {}/{} for {}: {} x {}{}",
        set.set_number,
        SETS_PER_EXERCISE,
        tracker.name(),
        set.weight,
        set.reps,
        set.rpe().map(|r| format!(" @ RPE {}", r)).unwrap_or_default()
    );

    for event in events {
        match event {
            WorkoutEvent::ExerciseComplete { index } => {
                println!("✓ Exercise {} complete", index + 1);
            }
            WorkoutEvent::WorkoutComplete { .. } => {
                println!("🏆 Workout complete!");
            }
        }
    }

    if wait && orchestrator.is_resting() {
        run_countdown(&mut orchestrator, &mut scheduler);
    } else {
        println!(
            "  Rest {}",
            format_countdown(tracker.rest().remaining_seconds())
        );
    }

    Ok(())
}

fn cmd_rest(store: &FileStore, config: &Config, exercise: usize, seconds: Option<u32>) -> Result<()> {
    let mut orchestrator = active_workout(store, config)?;
    let index = exercise_index(exercise)?;
    let seconds = seconds.unwrap_or(config.session.rest_seconds);

    let mut scheduler = ManualScheduler::new();
    orchestrator.start_rest(index, seconds, &mut scheduler)?;
    run_countdown(&mut orchestrator, &mut scheduler);
    Ok(())
}

fn cmd_status(store: &FileStore, config: &Config) -> Result<()> {
    let Some(orchestrator) = WorkoutOrchestrator::load_active(store, config.session.rest_seconds)?
    else {
        println!("No active workout. Run `swole generate` to start one.");
        return Ok(());
    };

    println!("Workout {}", orchestrator.workout_id());
    println!();
    display_exercises(&orchestrator);

    if orchestrator.is_complete() {
        println!("🏆 Workout complete!");
    }
    Ok(())
}

fn cmd_history(store: &mut FileStore, clear: bool) -> Result<()> {
    if clear {
        clear_history(store)?;
        println!("✓ History cleared");
        return Ok(());
    }

    let history = load_history(&*store)?;
    if history.is_empty() {
        println!("No workouts yet.");
        return Ok(());
    }

    for entry in history {
        println!(
            "{}  {:<18} {:<26} {}",
            entry.date.format("%Y-%m-%d %H:%M"),
            entry.workout_type,
            entry.objective,
            entry.muscle_group
        );
        println!("    {}", entry.exercises.join(", "));
    }
    Ok(())
}

fn cmd_stats(store: &FileStore, json: bool) -> Result<()> {
    let snapshot = compute_snapshot(store)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("Workouts:     {}", snapshot.total_workouts);
    println!("Total volume: {}", snapshot.total_volume);

    if !snapshot.exercise_frequency.is_empty() {
        println!();
        println!("Sets per exercise:");
        for (label, count) in &snapshot.exercise_frequency {
            println!("  {:<6} {}", label, count);
        }
    }

    if !snapshot.volume_by_date.is_empty() {
        println!();
        println!("Volume by day:");
        for day in &snapshot.volume_by_date {
            println!("  {}  {}", day.date, day.total_volume);
        }
    }
    Ok(())
}

fn cmd_export(store: &FileStore, out: &std::path::Path) -> Result<()> {
    let count = export_sets_csv(store, out)?;
    println!("✓ Exported {} sets to CSV", count);
    println!("  CSV: {}", out.display());
    Ok(())
}

fn cmd_custom(store: &mut FileStore, config: &Config, command: CustomCommands) -> Result<()> {
    let catalog = get_default_catalog();

    match command {
        CustomCommands::List => {
            let workouts = list_custom_workouts(&*store)?;
            if workouts.is_empty() {
                println!("No custom workouts saved.");
            }
            for w in workouts {
                let names: Vec<&str> = w.exercises.iter().map(|e| e.name.as_str()).collect();
                println!("{}  {}  ({})", w.id, w.name, names.join(", "));
            }
        }
        CustomCommands::Search { term } => {
            for e in search_exercises(catalog, &term) {
                let kind = format!("{:?}", e.kind).to_lowercase();
                println!("{:<24} {:<11} {}", e.name, kind, e.muscles.join(", "));
            }
        }
        CustomCommands::Save { name, exercises } => {
            let exercises = build_exercises(catalog, &exercises)?;
            let saved = save_custom_workout(store, &SystemClock, &name, exercises)?;
            println!("✓ Saved custom workout {} ({})", saved.name, saved.id);
        }
        CustomCommands::Delete { id } => {
            if delete_custom_workout(store, id)? {
                println!("✓ Deleted custom workout {}", id);
            } else {
                println!("No custom workout with id {}", id);
            }
        }
        CustomCommands::Start { id } => {
            let orchestrator = start_custom_workout(store, id, config.session.rest_seconds)?;
            println!("✓ Workout started ({})", orchestrator.workout_id());
            println!();
            display_exercises(&orchestrator);
        }
    }
    Ok(())
}

fn active_workout(store: &FileStore, config: &Config) -> Result<WorkoutOrchestrator> {
    WorkoutOrchestrator::load_active(store, config.session.rest_seconds)?
        .ok_or_else(|| Error::Session("no active workout; run `swole generate` first".into()))
}

fn exercise_index(number: usize) -> Result<usize> {
    number
        .checked_sub(1)
        .ok_or_else(|| Error::Session("exercise numbers start at 1".into()))
}

fn display_exercises(orchestrator: &WorkoutOrchestrator) {
    for (exercise, tracker) in orchestrator.exercises().iter().zip(orchestrator.trackers()) {
        let mark = if tracker.is_complete() { "✓" } else { " " };
        println!(
            "{} {}. {}  ({}/{} sets logged)",
            mark,
            exercise.index + 1,
            exercise.name,
            tracker.sets_completed(),
            SETS_PER_EXERCISE
        );
        println!(
            "     {} x {} {}, rest {}, tempo {}",
            exercise.sets, exercise.reps, exercise.unit(), exercise.rest, exercise.tempo
        );
        for set in tracker.sets() {
            println!("     set {}: {} x {}", set.set_number, set.weight, set.reps);
        }
    }
    println!();
}

/// Prints rest-complete notices to the terminal
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn rest_complete(&mut self, exercise_index: usize, exercise_name: &str) {
        println!(
            "\n⏰ Rest complete! Time for the next set of {} (exercise {})",
            exercise_name,
            exercise_index + 1
        );
    }
}

/// Drive the scheduler in real time until no rest countdown is running
fn run_countdown(orchestrator: &mut WorkoutOrchestrator, scheduler: &mut ManualScheduler) {
    use std::io::Write;

    let mut notifier = TerminalNotifier;
    while orchestrator.is_resting() {
        if let Some(remaining) = orchestrator
            .trackers()
            .iter()
            .find(|t| t.rest().is_running())
            .map(|t| t.rest().remaining_seconds())
        {
            print!("\r  Rest {} ", format_countdown(remaining));
            let _ = std::io::stdout().flush();
        }

        std::thread::sleep(TICK);
        for handle in scheduler.advance(TICK) {
            orchestrator.on_tick(handle, scheduler, &mut notifier);
        }
    }
}
