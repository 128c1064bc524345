// src/placement.rs

//! Adaptive placement: a short walk over the level scale that finds where a
//! new learner should start.
//!
//! The prober starts at the midpoint, steps one level up after a correct
//! answer and one level down after a miss, and stops once the last few levels
//! settle (after a minimum number of questions) or at a hard ceiling. The
//! final level is a correctness-weighted average of the probed levels, capped
//! at the highest level the learner actually answered correctly.

use crate::constants::*;
use crate::error::{EngineError, EngineResult};
use crate::matcher;
use crate::models::{clamp_level, AnswerSpec, LearnerProfile, PracticeMode};
use chrono::Utc;
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

// --- Question Bank ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Recognition,
    Translation,
    Production,
    Listening,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementQuestion {
    pub id: String,
    pub level: u8,
    pub kind: QuestionKind,
    pub prompt: String,
    pub answer: String,
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub clip: Option<String>,
}

impl PlacementQuestion {
    pub fn answer_spec(&self) -> AnswerSpec {
        AnswerSpec::with_alternatives(self.answer.clone(), self.alternatives.clone())
    }

    pub fn requires_audio(&self) -> bool {
        self.kind == QuestionKind::Listening
    }

    /// The clip to play for a listening question. Never falls back to the answer text.
    pub fn playback_clip(&self) -> Option<&str> {
        self.clip.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    /// Multiple choice must match exactly; typed answers get the strict typo tolerance.
    pub fn grade(&self, response: &str) -> bool {
        let spec = self.answer_spec();
        match self.kind {
            QuestionKind::Recognition => matcher::is_exact(response, &spec),
            QuestionKind::Translation | QuestionKind::Production | QuestionKind::Listening => {
                matcher::is_correct_strict(response, &spec)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    by_level: BTreeMap<u8, Vec<PlacementQuestion>>,
}

impl QuestionBank {
    pub fn new(questions: Vec<PlacementQuestion>) -> Self {
        let mut by_level: BTreeMap<u8, Vec<PlacementQuestion>> = BTreeMap::new();
        for mut q in questions {
            q.level = clamp_level(q.level as i32);
            by_level.entry(q.level).or_default().push(q);
        }
        QuestionBank { by_level }
    }

    pub fn from_json(json: &str) -> EngineResult<Self> {
        let questions: Vec<PlacementQuestion> = serde_json::from_str(json)?;
        if let Some(q) = questions.iter().find(|q| q.answer.trim().is_empty()) {
            return Err(EngineError::InvalidContent(format!(
                "placement question '{}' has no answer",
                q.id
            )));
        }
        if let Some(q) = questions.iter().find(|q| q.requires_audio() && q.playback_clip().is_none()) {
            return Err(EngineError::InvalidContent(format!(
                "listening question '{}' has no clip",
                q.id
            )));
        }
        Ok(Self::new(questions))
    }

    /// The bank shipped with the binary.
    pub fn builtin() -> EngineResult<Self> {
        Self::from_json(include_str!("data/placement.json"))
    }

    pub fn at_level(&self, level: u8) -> &[PlacementQuestion] {
        self.by_level.get(&level).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_level.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The requested level if it has questions, otherwise the closest one that does
    /// (ties go to the lower level).
    fn nearest_stocked_level(&self, level: u8) -> Option<u8> {
        self.by_level
            .iter()
            .filter(|(_, qs)| !qs.is_empty())
            .map(|(&l, _)| l)
            .min_by_key(|&l| ((l as i32 - level as i32).abs(), l))
    }
}

// --- Audio Gate ---

/// Reports whether the clip for the current listening question has been played.
pub trait AudioGate {
    fn has_played_clip(&self) -> bool;
}

impl AudioGate for bool {
    fn has_played_clip(&self) -> bool {
        *self
    }
}

// --- Assessment State ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelTally {
    pub correct: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentState {
    pub current_level: u8,
    pub questions_asked: u32,
    pub level_history: Vec<u8>,
    pub per_level_tally: BTreeMap<u8, LevelTally>,
}

impl Default for AssessmentState {
    fn default() -> Self {
        AssessmentState {
            current_level: PLACEMENT_START_LEVEL,
            questions_asked: 0,
            level_history: vec![PLACEMENT_START_LEVEL],
            per_level_tally: BTreeMap::new(),
        }
    }
}

impl AssessmentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tallies an answer at the current level and moves to the next level.
    pub fn record(&mut self, correct: bool) -> u8 {
        let level = self.current_level;
        let tally = self.per_level_tally.entry(level).or_default();
        tally.total += 1;
        if correct {
            tally.correct += 1;
        }
        self.questions_asked += 1;

        let next = if correct && level < LEVEL_MAX {
            level + 1
        } else if !correct && level > LEVEL_MIN {
            level - 1
        } else {
            level
        };

        self.level_history.push(next);
        self.current_level = next;
        next
    }

    /// The last few recorded levels, the freshly chosen one included, all sit
    /// within one step of the current level. The newest entry has not been probed yet.
    pub fn is_stable(&self) -> bool {
        if self.level_history.len() < PLACEMENT_STABILITY_WINDOW {
            return false;
        }
        let current = self.current_level as i32;
        self.level_history[self.level_history.len() - PLACEMENT_STABILITY_WINDOW..]
            .iter()
            .all(|&l| (l as i32 - current).abs() <= PLACEMENT_STABILITY_SPREAD)
    }

    pub fn is_complete(&self) -> bool {
        if self.questions_asked >= PLACEMENT_MAX_QUESTIONS {
            return true;
        }
        self.questions_asked >= PLACEMENT_MIN_QUESTIONS && self.is_stable()
    }

    pub fn highest_level_with_correct(&self) -> Option<u8> {
        self.per_level_tally
            .iter()
            .filter(|(_, t)| t.correct > 0)
            .map(|(&l, _)| l)
            .max()
    }

    pub fn weighted_average(&self) -> f64 {
        let (mut weighted_sum, mut total_weight) = (0.0, 0.0);
        for (&level, tally) in &self.per_level_tally {
            if tally.total == 0 {
                continue;
            }
            let accuracy = tally.correct as f64 / tally.total as f64;
            weighted_sum += level as f64 * accuracy * tally.total as f64;
            total_weight += tally.total as f64;
        }
        if total_weight > 0.0 {
            weighted_sum / total_weight
        } else {
            PLACEMENT_DEFAULT_AVERAGE
        }
    }

    /// Rounded weighted average, never above the highest level answered correctly.
    pub fn final_level(&self) -> u8 {
        let average = self.weighted_average().round() as i32;
        let capped = match self.highest_level_with_correct() {
            Some(highest) => average.min(highest as i32),
            None if self.per_level_tally.is_empty() => average,
            None => LEVEL_MIN as i32,
        };
        clamp_level(capped)
    }
}

// --- Prober ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No question is pending (placement finished or nothing was drawn).
    NoQuestion,
    /// Listening question whose clip has not been played yet. Nothing changed.
    AwaitingAudio,
    Graded {
        correct: bool,
        next_level: u8,
        finished: bool,
    },
}

pub struct PlacementProber<'a> {
    bank: &'a QuestionBank,
    state: AssessmentState,
    pending: Option<PlacementQuestion>,
    asked_ids: HashSet<String>,
}

impl<'a> PlacementProber<'a> {
    pub fn new(bank: &'a QuestionBank) -> Self {
        info!("[Placement] Starting at level {}", PLACEMENT_START_LEVEL);
        PlacementProber {
            bank,
            state: AssessmentState::new(),
            pending: None,
            asked_ids: HashSet::new(),
        }
    }

    pub fn state(&self) -> &AssessmentState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_complete()
    }

    pub fn pending(&self) -> Option<&PlacementQuestion> {
        self.pending.as_ref()
    }

    /// Draws the next question at the current level, or returns the one still
    /// awaiting an answer. `None` once placement is over or the bank is empty.
    pub fn next_question<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&PlacementQuestion> {
        if self.is_finished() {
            return None;
        }
        if self.pending.is_none() {
            self.pending = self.draw(rng);
        }
        self.pending.as_ref()
    }

    pub fn submit(&mut self, response: &str, gate: &dyn AudioGate) -> SubmitOutcome {
        let Some(question) = self.pending.as_ref() else {
            return SubmitOutcome::NoQuestion;
        };

        if question.requires_audio() && !gate.has_played_clip() {
            debug!("[Placement] '{}' waiting for clip playback", question.id);
            return SubmitOutcome::AwaitingAudio;
        }

        let correct = question.grade(response);
        let probed = self.state.current_level;
        let next_level = self.state.record(correct);
        let finished = self.state.is_complete();

        info!(
            "[Placement] Q{} '{}' at level {}: {} -> next {}",
            self.state.questions_asked,
            question.id,
            probed,
            if correct { "correct" } else { "wrong" },
            next_level
        );
        self.pending = None;

        if finished {
            info!(
                "[Placement] Finished after {} questions, level {}",
                self.state.questions_asked,
                self.state.final_level()
            );
        }

        SubmitOutcome::Graded {
            correct,
            next_level,
            finished,
        }
    }

    pub fn final_level(&self) -> u8 {
        self.state.final_level()
    }

    fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<PlacementQuestion> {
        let bank = self.bank;
        let Some(level) = bank.nearest_stocked_level(self.state.current_level) else {
            warn!("[Placement] Question bank is empty");
            return None;
        };
        let stock = bank.at_level(level);

        let listening_turn = (self.state.questions_asked + 1) % LISTENING_EVERY == 0;
        let (listening, other): (Vec<&PlacementQuestion>, Vec<&PlacementQuestion>) =
            stock.iter().partition(|q| q.requires_audio());

        let candidates = if listening_turn && !listening.is_empty() {
            listening
        } else if !other.is_empty() {
            other
        } else {
            listening
        };

        let fresh: Vec<&PlacementQuestion> = candidates
            .iter()
            .copied()
            .filter(|q| !self.asked_ids.contains(&q.id))
            .collect();

        let chosen = if fresh.is_empty() {
            candidates.choose(rng)
        } else {
            fresh.choose(rng)
        }?;

        debug!(
            "[Placement] Drew '{}' ({:?}) for level {}",
            chosen.id, chosen.kind, self.state.current_level
        );
        self.asked_ids.insert(chosen.id.clone());
        Some((*chosen).clone())
    }
}

/// Runs a whole placement with a synchronous responder, treating every clip as played.
pub fn run_placement<R, F>(bank: &QuestionBank, rng: &mut R, mut respond: F) -> u8
where
    R: Rng + ?Sized,
    F: FnMut(&PlacementQuestion) -> String,
{
    let mut prober = PlacementProber::new(bank);
    while let Some(question) = prober.next_question(rng) {
        let response = respond(question);
        prober.submit(&response, &true);
    }
    prober.final_level()
}

// --- Profile Updates ---

/// Seeds every mode from the placement result. Fog starts a few levels higher.
pub fn complete_assessment(profile: &mut LearnerProfile, level: u8) {
    complete_assessment_at(profile, level, Utc::now().timestamp_millis());
}

pub fn complete_assessment_at(profile: &mut LearnerProfile, level: u8, now: i64) {
    let level = clamp_level(level as i32);
    for mode in PracticeMode::ALL {
        let seeded = match mode {
            PracticeMode::Fog => clamp_level(level as i32 + FOG_PLACEMENT_BONUS as i32),
            _ => level,
        };
        profile.mode_mut(mode).level = seeded;
    }
    profile.assessment.completed = true;
    profile.assessment.completed_at = Some(now);
    profile.assessment.initial_level = Some(level);
    info!("[Placement] Assessment completed at level {}", level);
}

pub fn skip_assessment(profile: &mut LearnerProfile) {
    info!("[Placement] Skipped, using level {}", SKIP_PLACEMENT_LEVEL);
    complete_assessment(profile, SKIP_PLACEMENT_LEVEL);
}
