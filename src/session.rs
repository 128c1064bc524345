// src/session.rs

use crate::constants::*;
use crate::estimator;
use crate::matcher;
use crate::models::{FailureSet, Item, LearnerProfile, PracticeMode};
use crate::sampler::{self, FailureChange, Pick, PickSource};
use chrono::{DateTime, Utc};
use log::{debug, info};
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeResult {
    pub correct: bool,
    pub expected: String,
    pub source: PickSource,
    pub failure_change: FailureChange,
    pub level: u8,
    pub streak: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub mode: PracticeMode,
    pub level: u8,
    pub minutes: u32,
    pub reviewed: u32,
    pub correct: u32,
    pub best_streak: u32,
}

impl SessionSummary {
    pub fn accuracy(&self) -> f64 {
        if self.reviewed == 0 {
            return 0.0;
        }
        self.correct as f64 / self.reviewed as f64
    }
}

/// One sitting in a single mode. Holds the item on screen and the running tallies.
#[derive(Debug, Clone)]
pub struct PracticeSession {
    mode: PracticeMode,
    started_at: i64,
    current: Option<Pick>,
    reviewed: u32,
    correct: u32,
    streak: u32,
    best_streak: u32,
}

impl PracticeSession {
    pub fn start(mode: PracticeMode) -> Self {
        Self::start_at(mode, Utc::now().timestamp_millis())
    }

    pub fn start_at(mode: PracticeMode, now: i64) -> Self {
        info!("[Session] Starting {} session", mode);
        PracticeSession {
            mode,
            started_at: now,
            current: None,
            reviewed: 0,
            correct: 0,
            streak: 0,
            best_streak: 0,
        }
    }

    pub fn mode(&self) -> PracticeMode {
        self.mode
    }

    pub fn current(&self) -> Option<&Item> {
        self.current.as_ref().map(|p| &p.item)
    }

    pub fn reviewed(&self) -> u32 {
        self.reviewed
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Serves the next item at the mode's effective level. A pending unanswered item is kept.
    pub fn next<R: Rng + ?Sized>(
        &mut self,
        profile: &LearnerProfile,
        pool: &[Item],
        rng: &mut R,
    ) -> Option<&Item> {
        if self.current.is_none() {
            let level = estimator::effective_level(profile, self.mode);
            let no_failures = FailureSet::new();
            let failures = profile
                .mode(self.mode)
                .map(|s| &s.failures)
                .unwrap_or(&no_failures);
            self.current = sampler::next_item(pool, failures, level, rng);
            if self.current.is_none() {
                info!("[Session] Nothing to practice in {}", self.mode);
            }
        }
        self.current()
    }

    pub fn submit(&mut self, profile: &mut LearnerProfile, guess: &str) -> Option<ExchangeResult> {
        self.submit_at(profile, guess, Utc::now().timestamp_millis())
    }

    /// Grades the pending item and feeds the outcome to the estimator and the failure set.
    pub fn submit_at(
        &mut self,
        profile: &mut LearnerProfile,
        guess: &str,
        now: i64,
    ) -> Option<ExchangeResult> {
        let pick = self.current.take()?;
        let item = &pick.item;

        let correct = matcher::is_correct(guess, &item.answer, self.mode.answer_mode());
        let level = estimator::record_attempt_at(profile, self.mode, item.difficulty, correct, now);
        let failures = &mut profile.mode_mut(self.mode).failures;
        let failure_change = sampler::record_outcome(failures, item, correct, now);

        self.reviewed += 1;
        if correct {
            self.correct += 1;
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
        } else {
            self.streak = 0;
            profile.stats.errors_harvested = profile.stats.errors_harvested.saturating_add(1);
        }

        debug!(
            "[Session] '{}' ({:?}) graded {} -> level {}, streak {}",
            item.key, pick.source, correct, level, self.streak
        );

        Some(ExchangeResult {
            correct,
            expected: item.answer.primary.clone(),
            source: pick.source,
            failure_change,
            level,
            streak: self.streak,
        })
    }

    pub fn finish(self, profile: &mut LearnerProfile) -> SessionSummary {
        self.finish_at(profile, Utc::now().timestamp_millis())
    }

    /// Closes the session: logs it at the effective level and rolls the tallies into the stats.
    pub fn finish_at(self, profile: &mut LearnerProfile, now: i64) -> SessionSummary {
        let minutes = u32::try_from((now - self.started_at).max(0) / MINUTE_MILLIS).unwrap_or(u32::MAX);
        let level = estimator::effective_level(profile, self.mode);
        estimator::record_session_at(profile, self.mode, level, minutes, now);

        let stats = &mut profile.stats;
        stats.add_minutes(self.mode, minutes);
        stats.total_sessions = stats.total_sessions.saturating_add(1);
        stats.items_reviewed = stats.items_reviewed.saturating_add(self.reviewed);
        stats.last_session_date = DateTime::<Utc>::from_timestamp_millis(now)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .or(stats.last_session_date.take());

        info!(
            "[Session] {} finished: {}/{} correct in {}m at level {}",
            self.mode, self.correct, self.reviewed, minutes, level
        );

        SessionSummary {
            mode: self.mode,
            level,
            minutes,
            reviewed: self.reviewed,
            correct: self.correct,
            best_streak: self.best_streak,
        }
    }
}
