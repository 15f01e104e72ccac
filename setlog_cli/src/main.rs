use clap::{Parser, Subcommand};
use setlog_core::*;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "setlog")]
#[command(about = "Personal workout logging system", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an active workout session (default)
    Session {
        /// Semicolon-separated commands to run instead of reading stdin
        #[arg(long)]
        script: Option<String>,
    },

    /// Browse the exercise library
    Exercises {
        /// Case-insensitive name search
        #[arg(long)]
        search: Option<String>,

        /// Restrict to one category (chest, back, shoulders, ...)
        #[arg(long)]
        category: Option<String>,
    },

    /// Seed the default exercise catalog if not already seeded
    Seed,

    /// List recent workouts with their summaries
    History {
        /// Look-back window in days
        #[arg(long, default_value_t = 30)]
        days: i64,
    },

    /// Export workout history to CSV
    Export {
        /// Output path (defaults to history.csv in the data directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    setlog_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    std::fs::create_dir_all(&data_dir)?;

    match cli.command {
        Some(Commands::Session { script }) => cmd_session(&data_dir, &config, script),
        Some(Commands::Exercises { search, category }) => {
            cmd_exercises(&data_dir, search, category)
        }
        Some(Commands::Seed) => cmd_seed(&data_dir),
        Some(Commands::History { days }) => cmd_history(&data_dir, days),
        Some(Commands::Export { output }) => cmd_export(&data_dir, output),
        None => cmd_session(&data_dir, &config, None),
    }
}

fn open_seeded_store(data_dir: &Path) -> Result<JsonStore> {
    let mut store = JsonStore::open(data_dir.join("log.json"))?;
    let mut prefs = Prefs::open(data_dir.join("prefs.json"))?;
    seed_if_needed(&mut store, &mut prefs)?;
    Ok(store)
}

fn cmd_seed(data_dir: &Path) -> Result<()> {
    let mut store = JsonStore::open(data_dir.join("log.json"))?;
    let mut prefs = Prefs::open(data_dir.join("prefs.json"))?;
    let inserted = seed_if_needed(&mut store, &mut prefs)?;

    if inserted > 0 {
        println!("✓ Seeded {} default exercises", inserted);
    } else {
        println!("Catalog already seeded - nothing to do.");
    }
    Ok(())
}

fn cmd_exercises(data_dir: &Path, search: Option<String>, category: Option<String>) -> Result<()> {
    let store = open_seeded_store(data_dir)?;
    let exercises = store.exercises()?;

    let mut filter = LibraryFilter::new();
    if let Some(search) = search {
        filter.search_text = search;
    }
    if let Some(ref name) = category {
        match parse_category(name) {
            Some(category) => filter.selected_category = Some(category),
            None => eprintln!("Unknown category: {}. Showing all.", name),
        }
    }

    let groups = filter.grouped_by_category(&exercises);
    if groups.is_empty() {
        println!("No exercises match.");
        return Ok(());
    }

    for (category, bucket) in groups {
        println!("\n{}", category.display_name());
        for exercise in bucket {
            println!("  {} ({})", exercise.name, exercise.equipment.display_name());
        }
    }
    Ok(())
}

fn cmd_history(data_dir: &Path, days: i64) -> Result<()> {
    let store = JsonStore::open(data_dir.join("log.json"))?;
    let entries = recent_workouts(&store, days)?;

    if entries.is_empty() {
        println!("No workouts in the last {} days.", days);
        return Ok(());
    }

    for (workout, summary) in entries {
        let status = if workout.completed_at.is_some() {
            "done"
        } else {
            "in progress"
        };
        println!(
            "{}  {:>11}  {} sets  {:.0} volume  {}",
            workout.started_at.format("%Y-%m-%d %H:%M"),
            status,
            summary.completed_set_count,
            summary.logged_volume,
            format_duration(summary.duration_seconds),
        );
    }
    Ok(())
}

fn cmd_export(data_dir: &Path, output: Option<PathBuf>) -> Result<()> {
    let store = JsonStore::open(data_dir.join("log.json"))?;
    let csv_path = output.unwrap_or_else(|| data_dir.join("history.csv"));

    let count = export_history(&store, &csv_path)?;
    if count > 0 {
        println!("✓ Exported {} workouts to {}", count, csv_path.display());
    } else {
        println!("No workouts to export.");
    }
    Ok(())
}

fn cmd_session(data_dir: &Path, config: &Config, script: Option<String>) -> Result<()> {
    let store = open_seeded_store(data_dir)?;
    let mut engine =
        SessionEngine::new(store).with_default_rest_seconds(config.session.rest_seconds);

    engine.start_session();
    if let Some(message) = engine.start_error() {
        eprintln!("{}", message);
        engine.dismiss_start_error();
        return Err(Error::Store("could not start session".into()));
    }
    println!("Workout started. Type 'h' for help.");

    let mut lines = session_input(script);
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        match run_session_command(&mut engine, config, &line) {
            SessionFlow::Continue => {}
            SessionFlow::Finished => break,
        }
    }

    Ok(())
}

enum SessionFlow {
    Continue,
    Finished,
}

fn run_session_command<S: WorkoutStore>(
    engine: &mut SessionEngine<S>,
    config: &Config,
    line: &str,
) -> SessionFlow {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match command {
        "a" => {
            let name = line[1..].trim();
            if name.is_empty() {
                eprintln!("Usage: a <exercise name>");
                return SessionFlow::Continue;
            }
            add_exercise_by_name(engine, config, name);
        }
        "s" => with_group(engine, &args, |engine, group| {
            engine.add_set(&group);
        }),
        "d" => {
            let positions: Vec<usize> = args
                .iter()
                .skip(1)
                .filter_map(|a| a.parse().ok())
                .collect();
            with_group(engine, &args, |engine, group| {
                engine.delete_sets(group.exercise_order, &positions);
            });
        }
        "c" => with_set(engine, &args, |engine, set_id| {
            engine.toggle_set_completion(set_id, true);
            if let Some(remaining) = engine.rest_remaining_seconds() {
                println!("Rest timer: {}s", remaining);
            }
        }),
        "u" => with_set(engine, &args, |engine, set_id| {
            engine.toggle_set_completion(set_id, false);
        }),
        "w" => with_set(engine, &args, |engine, set_id| {
            engine.update_set_weight(set_id, args.get(2).and_then(|a| a.parse().ok()));
        }),
        "r" => with_set(engine, &args, |engine, set_id| {
            engine.update_set_reps(set_id, args.get(2).and_then(|a| a.parse().ok()));
        }),
        "e" => with_set(engine, &args, |engine, set_id| {
            engine.update_set_rpe(set_id, args.get(2).and_then(|a| a.parse().ok()));
        }),
        "p" => {
            // p <group> <source> <target>
            let groups = engine.grouped_sets();
            let resolved = args.first().and_then(|a| a.parse::<usize>().ok()).and_then(
                |group_idx| {
                    let group = groups.get(group_idx)?;
                    let source = group.sets.get(args.get(1)?.parse::<usize>().ok()?)?;
                    let target = group.sets.get(args.get(2)?.parse::<usize>().ok()?)?;
                    Some((source.id, target.id))
                },
            );
            match resolved {
                Some((source, target)) => engine.copy_values(source, target),
                None => eprintln!("Usage: p <group> <source set> <target set>"),
            }
        }
        "t" => {
            let duration = args.first().and_then(|a| a.parse().ok());
            engine.start_rest_timer(duration, None);
        }
        "adj" => match args.first().and_then(|a| a.parse().ok()) {
            Some(delta) => engine.adjust_rest_timer(delta),
            None => eprintln!("Usage: adj <seconds>"),
        },
        "skip" => engine.skip_rest_timer(),
        "v" => display_session(engine),
        "f" => {
            if let Some(summary) = engine.finish_session() {
                display_summary(&summary);
            }
            return SessionFlow::Finished;
        }
        "q" => return SessionFlow::Finished,
        "h" => display_help(),
        other => eprintln!("Unknown command: {} (type 'h' for help)", other),
    }

    SessionFlow::Continue
}

fn add_exercise_by_name<S: WorkoutStore>(
    engine: &mut SessionEngine<S>,
    config: &Config,
    name: &str,
) {
    let library = match engine.store().exercises() {
        Ok(exercises) => exercises,
        Err(e) => {
            eprintln!("Could not read exercise library: {}", e);
            return;
        }
    };

    let mut filter = LibraryFilter::new();
    filter.search_text = name.to_string();
    let matched = filter.filtered(&library).first().map(|e| (*e).clone());

    let exercise = matched.unwrap_or_else(|| {
        let mut custom = Exercise::new(name, ExerciseCategory::Other, Equipment::Other);
        custom.is_custom = true;
        custom
    });

    engine.add_exercise(&exercise, config.session.default_set_count);
    println!("Added {}", exercise.name);
}

fn with_group<S, F>(engine: &mut SessionEngine<S>, args: &[&str], apply: F)
where
    S: WorkoutStore,
    F: FnOnce(&mut SessionEngine<S>, ExerciseGroup),
{
    let groups = engine.grouped_sets();
    match args.first().and_then(|a| a.parse::<usize>().ok()) {
        Some(idx) if idx < groups.len() => apply(engine, groups[idx].clone()),
        _ => eprintln!("Expected a group index 0..{}", groups.len()),
    }
}

fn with_set<S, F>(engine: &mut SessionEngine<S>, args: &[&str], apply: F)
where
    S: WorkoutStore,
    F: FnOnce(&mut SessionEngine<S>, uuid::Uuid),
{
    let groups = engine.grouped_sets();
    let set_id = args
        .first()
        .and_then(|a| a.parse::<usize>().ok())
        .and_then(|g| groups.get(g))
        .and_then(|group| {
            args.get(1)
                .and_then(|a| a.parse::<usize>().ok())
                .and_then(|s| group.sets.get(s))
        })
        .map(|set| set.id);

    match set_id {
        Some(id) => apply(engine, id),
        None => eprintln!("Expected <group> <set> indices"),
    }
}

fn parse_category(name: &str) -> Option<ExerciseCategory> {
    match name.to_lowercase().as_str() {
        "chest" => Some(ExerciseCategory::Chest),
        "back" => Some(ExerciseCategory::Back),
        "shoulders" => Some(ExerciseCategory::Shoulders),
        "biceps" => Some(ExerciseCategory::Biceps),
        "triceps" => Some(ExerciseCategory::Triceps),
        "legs" => Some(ExerciseCategory::Legs),
        "glutes" => Some(ExerciseCategory::Glutes),
        "core" => Some(ExerciseCategory::Core),
        "cardio" => Some(ExerciseCategory::Cardio),
        "other" => Some(ExerciseCategory::Other),
        _ => None,
    }
}

fn session_input(script: Option<String>) -> Box<dyn Iterator<Item = String>> {
    match script {
        Some(script) => Box::new(
            script
                .split(';')
                .map(|s| s.trim().to_string())
                .collect::<Vec<_>>()
                .into_iter(),
        ),
        None => Box::new(io::stdin().lock().lines().map_while(|l| l.ok())),
    }
}

fn display_session<S: WorkoutStore>(engine: &SessionEngine<S>) {
    let groups = engine.grouped_sets();
    if groups.is_empty() {
        println!("No exercises yet.");
        return;
    }

    for (group_idx, group) in groups.iter().enumerate() {
        println!("[{}] {}", group_idx, group.exercise.name);
        for set in &group.sets {
            let mark = if set.is_completed { "x" } else { " " };
            println!(
                "  [{}] set {}  {}  {} reps  rpe {}",
                mark,
                set.set_order,
                set.weight.map_or("-".into(), |w| format!("{:.1}", w)),
                set.reps.map_or("-".into(), |r| r.to_string()),
                set.rpe.map_or("-".into(), |r| format!("{:.1}", r)),
            );
        }
    }

    if let Some(remaining) = engine.rest_remaining_seconds() {
        println!("Rest: {}s remaining", remaining);
    }
}

fn display_summary(summary: &WorkoutSummary) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  WORKOUT SAVED");
    println!("╰─────────────────────────────────────────╯");
    println!("  Duration:       {}", format_duration(summary.duration_seconds));
    println!("  Completed sets: {}", summary.completed_set_count);
    println!("  Logged volume:  {:.0}", summary.logged_volume);
    println!();
}

fn display_help() {
    println!("Session commands:");
    println!("  a <name>              add exercise (library match or custom)");
    println!("  s <group>             add a set to an exercise group");
    println!("  d <group> <i...>      delete sets at positions");
    println!("  c <group> <i>         mark set complete (starts rest timer)");
    println!("  u <group> <i>         mark set incomplete");
    println!("  w <group> <i> <kg>    set weight");
    println!("  r <group> <i> <n>     set reps");
    println!("  e <group> <i> <rpe>   set RPE (0-10)");
    println!("  p <group> <src> <dst> copy weight/reps/RPE between sets");
    println!("  t [seconds]           start rest timer");
    println!("  adj <delta>           adjust rest timer");
    println!("  skip                  skip rest timer");
    println!("  v                     view session");
    println!("  f                     finish workout");
    println!("  q                     quit without finishing");
}

fn format_duration(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let rest = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, rest)
    } else {
        format!("{:02}:{:02}", minutes, rest)
    }
}
