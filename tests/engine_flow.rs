use lingo_trainer_lib::constants::*;
use lingo_trainer_lib::database::init_db;
use lingo_trainer_lib::estimator;
use lingo_trainer_lib::placement::{complete_assessment_at, run_placement, QuestionBank};
use lingo_trainer_lib::repository::{
    load_profile_or_default, ContentSource, ProfileStore, SqliteContent, SqliteProfileStore,
};
use lingo_trainer_lib::sampler::FailureChange;
use lingo_trainer_lib::session::PracticeSession;
use lingo_trainer_lib::sync::merge_profiles;
use lingo_trainer_lib::{DifficultyOverride, PracticeMode};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rusqlite::Connection;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    init_db(&conn).unwrap();
    conn
}

#[test]
fn new_learner_places_practices_and_persists() {
    let conn = setup();
    let store = SqliteProfileStore::new(&conn);
    let content = SqliteContent::new(&conn);
    let mut rng = ChaCha8Rng::seed_from_u64(2024);

    let mut profile = load_profile_or_default(&store).unwrap();
    assert!(profile.needs_assessment());

    let bank = QuestionBank::builtin().unwrap();
    let level = run_placement(&bank, &mut rng, |q| q.answer.clone());
    complete_assessment_at(&mut profile, level, 1_000);
    assert_eq!(estimator::current_level(&profile, PracticeMode::Garden), level);
    assert_eq!(
        estimator::current_level(&profile, PracticeMode::Fog),
        (level + FOG_PLACEMENT_BONUS).min(LEVEL_MAX)
    );

    let pool = content.pool(PracticeMode::Garden).unwrap();
    let mut session = PracticeSession::start_at(PracticeMode::Garden, 0);
    for i in 0..15 {
        let item = session.next(&profile, &pool, &mut rng).unwrap().clone();
        let guess = if i % 5 == 0 {
            "zzzzzzzz".to_string()
        } else {
            item.answer.primary.clone()
        };
        let result = session.submit_at(&mut profile, &guess, 1_000 + i).unwrap();
        assert_eq!(result.correct, i % 5 != 0);
    }
    let summary = session.finish_at(&mut profile, 5 * MINUTE_MILLIS);
    assert_eq!(summary.reviewed, 15);
    assert_eq!(summary.minutes, 5);
    assert_eq!(profile.stats.items_reviewed, 15);
    assert_eq!(profile.stats.errors_harvested, 3);
    assert_eq!(profile.stats.garden_minutes, 5);

    store.save(PROFILE_KEY, &profile).unwrap();
    let reloaded = load_profile_or_default(&store).unwrap();
    assert_eq!(reloaded, profile);
    assert!(!reloaded.needs_assessment());
}

#[test]
fn missed_item_is_cleared_by_a_correct_answer() {
    let conn = setup();
    let pool = SqliteContent::new(&conn).pool(PracticeMode::Chaos).unwrap();
    let mut profile = lingo_trainer_lib::LearnerProfile::default();
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let mut session = PracticeSession::start_at(PracticeMode::Chaos, 0);

    let missed = session.next(&profile, &pool, &mut rng).unwrap().clone();
    session.submit_at(&mut profile, "", 1);
    let chaos_failures = |p: &lingo_trainer_lib::LearnerProfile| {
        p.mode(PracticeMode::Chaos).unwrap().failures.clone()
    };
    assert_eq!(chaos_failures(&profile)[&missed.key].wrong_count, 1);

    // Keep drawing until the sampler serves the missed item back.
    let mut cleared = false;
    for t in 2..200 {
        let item = session.next(&profile, &pool, &mut rng).unwrap().clone();
        let result = session
            .submit_at(&mut profile, &item.answer.primary, t)
            .unwrap();
        if item.key == missed.key {
            assert_eq!(result.failure_change, FailureChange::Removed);
            cleared = true;
            break;
        }
    }
    assert!(cleared);
    assert!(!chaos_failures(&profile).contains_key(&missed.key));
}

#[test]
fn override_shifts_served_difficulty() {
    let conn = setup();
    let pool = SqliteContent::new(&conn).pool(PracticeMode::Fog).unwrap();
    let mut profile = lingo_trainer_lib::LearnerProfile::default();
    profile.mode_mut(PracticeMode::Fog).level = 9;
    estimator::set_override(&mut profile, PracticeMode::Fog, DifficultyOverride::Easy);
    assert_eq!(estimator::effective_level(&profile, PracticeMode::Fog), 7);

    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let mut session = PracticeSession::start_at(PracticeMode::Fog, 0);
    for _ in 0..30 {
        let item = session.next(&profile, &pool, &mut rng).unwrap();
        assert!((5..=9).contains(&item.difficulty), "served d={}", item.difficulty);
        let answer = item.answer.primary.clone();
        session.submit_at(&mut profile, &answer, 0);
    }
}

#[test]
fn devices_merge_without_losing_misses() {
    let conn = setup();
    let pool = SqliteContent::new(&conn).pool(PracticeMode::Garden).unwrap();
    let mut phone = lingo_trainer_lib::LearnerProfile::default();
    let mut laptop = lingo_trainer_lib::LearnerProfile::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    for profile in [&mut phone, &mut laptop] {
        let mut session = PracticeSession::start_at(PracticeMode::Garden, 0);
        session.next(profile, &pool, &mut rng);
        session.submit_at(profile, "", 10);
        session.finish_at(profile, MINUTE_MILLIS);
    }

    let merged = merge_profiles(&phone, &laptop);
    let garden = |p: &lingo_trainer_lib::LearnerProfile| p.mode(PracticeMode::Garden).unwrap().clone();
    for key in garden(&phone).failures.keys().chain(garden(&laptop).failures.keys()) {
        assert!(garden(&merged).failures.contains_key(key));
    }
    assert_eq!(merged.stats.total_sessions, 1);
    assert_eq!(garden(&merged).attempts, garden(&phone).attempts);
    assert_eq!(garden(&merged).sessions, garden(&phone).sessions);
}

#[test]
fn misses_replay_only_in_their_own_mode() {
    let conn = setup();
    let content = SqliteContent::new(&conn);
    let forge_pool = content.pool(PracticeMode::Forge).unwrap();
    let garden_pool = content.pool(PracticeMode::Garden).unwrap();
    let chaos_pool = content.pool(PracticeMode::Chaos).unwrap();
    let mut profile = lingo_trainer_lib::LearnerProfile::default();
    let mut rng = ChaCha8Rng::seed_from_u64(22);

    let mut forge = PracticeSession::start_at(PracticeMode::Forge, 0);
    let missed = forge.next(&profile, &forge_pool, &mut rng).unwrap().clone();
    forge.submit_at(&mut profile, "", 1);
    forge.finish_at(&mut profile, 2);
    assert!(profile.mode(PracticeMode::Forge).unwrap().failures.contains_key(&missed.key));

    for round in 0..20 {
        let mut garden = PracticeSession::start_at(PracticeMode::Garden, 0);
        let item = garden.next(&profile, &garden_pool, &mut rng).unwrap().clone();
        assert_ne!(item.key, missed.key, "forge miss served in garden on round {}", round);
        garden.submit_at(&mut profile, &item.answer.primary, 3);
    }
    let garden_state = profile.mode(PracticeMode::Garden).unwrap();
    assert!(garden_state.failures.is_empty());
    assert_eq!(garden_state.attempts.len(), 20);
    assert_eq!(profile.mode(PracticeMode::Forge).unwrap().failures.len(), 1);

    // Chaos and Fog share sentence keys but not misses.
    let mut chaos = PracticeSession::start_at(PracticeMode::Chaos, 0);
    let chaos_miss = chaos.next(&profile, &chaos_pool, &mut rng).unwrap().clone();
    chaos.submit_at(&mut profile, "", 4);
    assert!(profile.mode(PracticeMode::Fog).unwrap().failures.is_empty());
    assert!(profile.mode(PracticeMode::Chaos).unwrap().failures.contains_key(&chaos_miss.key));
}

#[test]
fn reset_keeps_placement() {
    let mut profile = lingo_trainer_lib::LearnerProfile::default();
    complete_assessment_at(&mut profile, 7, 0);
    for i in 0..12 {
        estimator::record_attempt_at(&mut profile, PracticeMode::Forge, 7, true, i);
    }
    estimator::reset_progress(&mut profile);
    assert_eq!(estimator::current_level(&profile, PracticeMode::Forge), DEFAULT_LEVEL);
    assert_eq!(estimator::current_level(&profile, PracticeMode::Fog), DEFAULT_FOG_LEVEL);
    assert!(profile.mode(PracticeMode::Forge).unwrap().attempts.is_empty());
    assert!(!profile.needs_assessment());
}
