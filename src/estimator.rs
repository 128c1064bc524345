// src/estimator.rs

use crate::constants::*;
use crate::models::{
    clamp_level, AttemptRecord, DifficultyOverride, LearnerProfile, ModeState, PracticeMode,
    SessionRecord,
};
use chrono::Utc;
use log::{debug, info};
use std::collections::VecDeque;

// --- Public Interface ---

pub fn current_level(profile: &LearnerProfile, mode: PracticeMode) -> u8 {
    profile
        .mode(mode)
        .map(|s| clamp_level(s.level as i32))
        .unwrap_or_else(|| mode.default_level())
}

pub fn effective_level(profile: &LearnerProfile, mode: PracticeMode) -> u8 {
    let ov = profile
        .mode(mode)
        .map(|s| s.difficulty_override)
        .unwrap_or_default();
    apply_override(current_level(profile, mode), ov)
}

pub fn apply_override(level: u8, ov: DifficultyOverride) -> u8 {
    clamp_level(level as i32 + ov.offset())
}

pub fn set_override(profile: &mut LearnerProfile, mode: PracticeMode, ov: DifficultyOverride) {
    info!("[Estimator] {} override -> {:?}", mode, ov);
    profile.mode_mut(mode).difficulty_override = ov;
}

/// Records one graded attempt and returns the mode's level afterwards.
pub fn record_attempt(
    profile: &mut LearnerProfile,
    mode: PracticeMode,
    difficulty: u8,
    correct: bool,
) -> u8 {
    record_attempt_at(profile, mode, difficulty, correct, Utc::now().timestamp_millis())
}

pub fn record_attempt_at(
    profile: &mut LearnerProfile,
    mode: PracticeMode,
    difficulty: u8,
    correct: bool,
    now: i64,
) -> u8 {
    let state = profile.mode_mut(mode);
    push_capped(
        &mut state.attempts,
        AttemptRecord {
            difficulty: clamp_level(difficulty as i32),
            correct,
            timestamp: now,
        },
        ATTEMPT_WINDOW_SIZE,
    );

    let old_level = clamp_level(state.level as i32);
    state.level = calculate_level(&state.attempts, old_level);

    if state.level != old_level {
        info!(
            "[Estimator] {} level {} -> {} (window: {})",
            mode,
            old_level,
            state.level,
            state.attempts.len()
        );
    } else {
        debug!(
            "[Estimator] {} attempt d={} correct={} level stays {}",
            mode, difficulty, correct, state.level
        );
    }
    state.level
}

/// Records a timed session. Sessions never move the level.
pub fn record_session(profile: &mut LearnerProfile, mode: PracticeMode, level: u8, minutes: u32) {
    record_session_at(profile, mode, level, minutes, Utc::now().timestamp_millis());
}

pub fn record_session_at(
    profile: &mut LearnerProfile,
    mode: PracticeMode,
    level: u8,
    minutes: u32,
    now: i64,
) {
    debug!("[Estimator] {} session at level {} for {}m", mode, level, minutes);
    push_capped(
        &mut profile.mode_mut(mode).sessions,
        SessionRecord {
            level: clamp_level(level as i32),
            duration_minutes: minutes,
            timestamp: now,
        },
        SESSION_WINDOW_SIZE,
    );
}

/// Percentage of the way to the next level. 100 means "ready", it does not level up by itself.
pub fn progress(profile: &LearnerProfile, mode: PracticeMode) -> f64 {
    profile
        .mode(mode)
        .map(|s| level_progress(&s.attempts))
        .unwrap_or(0.0)
}

/// Wipes levels, overrides, histories and failure sets. The assessment stays done.
pub fn reset_progress(profile: &mut LearnerProfile) {
    info!("[Estimator] Resetting all practice progress");
    for mode in PracticeMode::ALL {
        profile.modes.insert(mode, ModeState::new(mode));
    }
}

// --- Internal Algorithm Logic ---

fn push_capped<T>(history: &mut VecDeque<T>, record: T, cap: usize) {
    history.push_back(record);
    while history.len() > cap {
        history.pop_front();
    }
}

/// Recency- and difficulty-weighted accuracy. Later and harder attempts count more.
pub fn weighted_accuracy(attempts: &VecDeque<AttemptRecord>) -> f64 {
    let n = attempts.len() as f64;
    let (mut weighted_correct, mut total_weight) = (0.0, 0.0);

    for (idx, attempt) in attempts.iter().enumerate() {
        let recency = (idx as f64 + 1.0) / n;
        let difficulty = attempt.difficulty as f64 / LEVEL_MAX as f64;
        let weight = recency * (0.5 + difficulty * 0.5);

        total_weight += weight;
        if attempt.correct {
            weighted_correct += weight;
        }
    }

    if total_weight > 0.0 {
        weighted_correct / total_weight
    } else {
        NEUTRAL_ACCURACY
    }
}

pub fn mean_difficulty(attempts: &VecDeque<AttemptRecord>) -> f64 {
    if attempts.is_empty() {
        return 0.0;
    }
    attempts.iter().map(|a| a.difficulty as f64).sum::<f64>() / attempts.len() as f64
}

/// One step up when accuracy is high on material at or above the level,
/// one step down when accuracy is low, otherwise unchanged.
pub fn calculate_level(attempts: &VecDeque<AttemptRecord>, current: u8) -> u8 {
    let current = clamp_level(current as i32) as i32;
    if attempts.len() < MIN_ATTEMPTS_FOR_ADJUSTMENT {
        return current as u8;
    }

    let recent: VecDeque<AttemptRecord> = attempts
        .iter()
        .skip(attempts.len().saturating_sub(ATTEMPT_WINDOW_SIZE))
        .copied()
        .collect();

    let accuracy = weighted_accuracy(&recent);
    let attempted = mean_difficulty(&recent).round() as i32;

    debug!(
        "[Estimator Input] weighted accuracy {:.3}, mean difficulty {}, level {}",
        accuracy, attempted, current
    );

    let next = if accuracy >= INCREASE_THRESHOLD && attempted >= current {
        current + MAX_LEVEL_CHANGE
    } else if accuracy <= DECREASE_THRESHOLD {
        current - MAX_LEVEL_CHANGE
    } else {
        current
    };

    clamp_level(next)
}

pub fn level_progress(attempts: &VecDeque<AttemptRecord>) -> f64 {
    if attempts.len() < MIN_ATTEMPTS_FOR_PROGRESS {
        return 0.0;
    }

    let recent = attempts
        .iter()
        .skip(attempts.len().saturating_sub(ATTEMPT_WINDOW_SIZE));
    let total = attempts.len().min(ATTEMPT_WINDOW_SIZE) as f64;
    let accuracy = recent.filter(|a| a.correct).count() as f64 / total;

    if accuracy <= DECREASE_THRESHOLD {
        return 0.0;
    }
    if accuracy >= INCREASE_THRESHOLD {
        return 100.0;
    }

    let span = INCREASE_THRESHOLD - DECREASE_THRESHOLD;
    ((accuracy - DECREASE_THRESHOLD) / span * 100.0).round()
}
