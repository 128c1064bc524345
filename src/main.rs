// src/main.rs

use lingo_trainer_lib::constants::*;
use lingo_trainer_lib::difficulty::difficulty_label;
use lingo_trainer_lib::placement::{
    complete_assessment, skip_assessment, PlacementProber, QuestionBank, QuestionKind, SubmitOutcome,
};
use lingo_trainer_lib::repository::{
    load_profile_or_default, ContentSource, ProfileStore, SqliteContent, SqliteProfileStore,
};
use lingo_trainer_lib::session::PracticeSession;
use lingo_trainer_lib::{database, estimator, DifficultyOverride, EngineResult, LearnerProfile, PracticeMode};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rusqlite::Connection;
use std::env;
use std::io::{self, BufRead, Write};

use log::{error, info};

const DEFAULT_DB_PATH: &str = "lingo_trainer.db";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting Lingo Trainer...");
    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> EngineResult<()> {
    let db_path = env::var("LINGO_DB").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    info!("Database path: {}", db_path);
    let conn = Connection::open(&db_path)?;
    database::init_db(&conn)?;

    let store = SqliteProfileStore::new(&conn);
    let content = SqliteContent::new(&conn);
    let mut profile = load_profile_or_default(&store)?;

    let mut rng = match env::var("LINGO_SEED").ok().and_then(|s| s.parse::<u64>().ok()) {
        Some(seed) => {
            info!("Using fixed seed {}", seed);
            ChaCha8Rng::seed_from_u64(seed)
        }
        None => ChaCha8Rng::from_entropy(),
    };

    let mode = match env::args().nth(1) {
        Some(arg) => arg.parse::<PracticeMode>().unwrap_or_else(|e| {
            error!("{}; practicing garden instead", e);
            PracticeMode::Garden
        }),
        None => PracticeMode::Garden,
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();

    if profile.needs_assessment() {
        run_assessment(&mut profile, &mut input, &mut rng)?;
        store.save(PROFILE_KEY, &profile)?;
    }

    let pool = content.pool(mode)?;
    practice(&mut profile, mode, &pool, &mut input, &mut rng, &store)?;
    store.save(PROFILE_KEY, &profile)?;
    Ok(())
}

fn prompt_line(input: &mut impl BufRead, text: &str) -> EngineResult<Option<String>> {
    print!("{}", text);
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

// --- Placement ---

fn run_assessment(
    profile: &mut LearnerProfile,
    input: &mut impl BufRead,
    rng: &mut ChaCha8Rng,
) -> EngineResult<()> {
    let answer = prompt_line(input, "Take the placement test? [Y/n] ")?.unwrap_or_default();
    if answer.eq_ignore_ascii_case("n") {
        skip_assessment(profile);
        println!("Starting everyone at level {}.", SKIP_PLACEMENT_LEVEL);
        return Ok(());
    }

    let bank = QuestionBank::builtin()?;
    let mut prober = PlacementProber::new(&bank);
    let mut played = false;

    while let Some(question) = prober.next_question(rng) {
        let question = question.clone();
        println!("\n[{}] {}", prober.state().questions_asked + 1, question.prompt);
        if !question.options.is_empty() {
            println!("  options: {}", question.options.join(" | "));
        }
        if question.kind == QuestionKind::Listening {
            println!("  (type 'play' to hear the clip)");
        }

        let Some(response) = prompt_line(input, "> ")? else {
            println!("Input closed; placement abandoned.");
            return Ok(());
        };

        if question.kind == QuestionKind::Listening && response.eq_ignore_ascii_case("play") {
            match question.playback_clip() {
                Some(clip) => println!("  ♪ {}", clip),
                None => println!("  Clip unavailable; answer from the prompt."),
            }
            played = true;
            continue;
        }

        match prober.submit(&response, &played) {
            SubmitOutcome::AwaitingAudio => println!("  Play the clip first."),
            SubmitOutcome::Graded { correct, .. } => {
                played = false;
                if correct {
                    println!("  ✓");
                } else {
                    println!("  ✗ {}", question.answer);
                }
            }
            SubmitOutcome::NoQuestion => break,
        }
    }

    let level = prober.final_level();
    complete_assessment(profile, level);
    println!("\nPlacement level: {} ({})", level, difficulty_label(level));
    Ok(())
}

// --- Practice ---

fn practice(
    profile: &mut LearnerProfile,
    mode: PracticeMode,
    pool: &[lingo_trainer_lib::Item],
    input: &mut impl BufRead,
    rng: &mut ChaCha8Rng,
    store: &dyn ProfileStore,
) -> EngineResult<()> {
    println!(
        "\n{} mode, level {} ({}). Commands: :easy :normal :hard :reset :q",
        mode,
        estimator::effective_level(profile, mode),
        difficulty_label(estimator::effective_level(profile, mode))
    );

    let mut session = PracticeSession::start(mode);

    loop {
        let Some(item) = session.next(profile, pool, rng) else {
            println!("Nothing to practice here yet.");
            break;
        };
        let prompt = item.prompt.clone();

        let Some(line) = prompt_line(input, &format!("\n{}\n> ", prompt))? else {
            break;
        };

        match line.as_str() {
            ":q" => break,
            ":reset" => {
                estimator::reset_progress(profile);
                println!("Progress reset.");
                continue;
            }
            cmd if cmd.starts_with(':') => {
                match cmd[1..].parse::<DifficultyOverride>() {
                    Ok(ov) => {
                        estimator::set_override(profile, mode, ov);
                        println!(
                            "Difficulty {:?}, now practicing at level {}.",
                            ov,
                            estimator::effective_level(profile, mode)
                        );
                    }
                    Err(e) => println!("{}", e),
                }
                continue;
            }
            _ => {}
        }

        if let Some(result) = session.submit(profile, &line) {
            if result.correct {
                println!("  ✓ (streak {})", result.streak);
            } else {
                println!("  ✗ {}", result.expected);
            }
            println!(
                "  level {} · {:.0}% to next",
                result.level,
                estimator::progress(profile, mode)
            );
            store.save(PROFILE_KEY, profile)?;
        }
    }

    let summary = session.finish(profile);
    println!(
        "\nReviewed {} items, {} correct ({:.0}%), best streak {}.",
        summary.reviewed,
        summary.correct,
        summary.accuracy() * 100.0,
        summary.best_streak
    );
    Ok(())
}
