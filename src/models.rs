// src/models.rs

use crate::constants::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::str::FromStr;

/// Clamps any intermediate level computation back onto the 1..=10 scale.
pub fn clamp_level(value: i32) -> u8 {
    value.clamp(LEVEL_MIN as i32, LEVEL_MAX as i32) as u8
}

// --- Modes ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeMode {
    Chaos,
    Garden,
    Fog,
    Forge,
}

impl PracticeMode {
    pub const ALL: [PracticeMode; 4] = [
        PracticeMode::Chaos,
        PracticeMode::Garden,
        PracticeMode::Fog,
        PracticeMode::Forge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PracticeMode::Chaos => "chaos",
            PracticeMode::Garden => "garden",
            PracticeMode::Fog => "fog",
            PracticeMode::Forge => "forge",
        }
    }

    pub fn default_level(&self) -> u8 {
        match self {
            PracticeMode::Fog => DEFAULT_FOG_LEVEL,
            _ => DEFAULT_LEVEL,
        }
    }

    /// How strictly answers given in this mode are graded.
    pub fn answer_mode(&self) -> AnswerMode {
        match self {
            PracticeMode::Garden => AnswerMode::Word,
            PracticeMode::Forge => AnswerMode::Production,
            PracticeMode::Chaos | PracticeMode::Fog => AnswerMode::Sentence,
        }
    }
}

impl FromStr for PracticeMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chaos" => Ok(PracticeMode::Chaos),
            "garden" => Ok(PracticeMode::Garden),
            "fog" => Ok(PracticeMode::Fog),
            "forge" => Ok(PracticeMode::Forge),
            other => Err(format!("unknown practice mode '{}'", other)),
        }
    }
}

impl fmt::Display for PracticeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerMode {
    Word,
    Sentence,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyOverride {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl DifficultyOverride {
    pub fn offset(&self) -> i32 {
        match self {
            DifficultyOverride::Easy => EASY_OFFSET,
            DifficultyOverride::Normal => 0,
            DifficultyOverride::Hard => HARD_OFFSET,
        }
    }
}

impl FromStr for DifficultyOverride {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(DifficultyOverride::Easy),
            "normal" => Ok(DifficultyOverride::Normal),
            "hard" => Ok(DifficultyOverride::Hard),
            other => Err(format!("unknown difficulty override '{}'", other)),
        }
    }
}

// --- History Records ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub difficulty: u8,
    pub correct: bool,
    pub timestamp: i64,
}

/// Timed sessions (chaos/fog) have no per-item grading, only a level and a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub level: u8,
    pub duration_minutes: u32,
    pub timestamp: i64,
}

// --- Content ---

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnswerSpec {
    pub primary: String,
    #[serde(default)]
    pub alternatives: Vec<String>,
}

impl AnswerSpec {
    pub fn new(primary: impl Into<String>) -> Self {
        AnswerSpec {
            primary: primary.into(),
            alternatives: Vec::new(),
        }
    }

    pub fn with_alternatives(primary: impl Into<String>, alternatives: Vec<String>) -> Self {
        AnswerSpec {
            primary: primary.into(),
            alternatives,
        }
    }

    /// Splits a catalog answer like `"hello/good"` into a primary and its alternates.
    pub fn from_slashed(raw: &str) -> Self {
        let mut parts = raw
            .split('/')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from);
        let primary = parts.next().unwrap_or_default();
        AnswerSpec {
            primary,
            alternatives: parts.collect(),
        }
    }

    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.alternatives.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identity used by the failure set. Unique per prompt direction.
    pub key: String,
    pub prompt: String,
    pub answer: AnswerSpec,
    pub difficulty: u8,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEntry {
    pub item: Item,
    pub wrong_count: u32,
    pub added_at: i64,
}

/// Previously missed items, keyed by `Item::key`.
pub type FailureSet = BTreeMap<String, FailureEntry>;

// --- Learner State ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeState {
    pub level: u8,
    #[serde(default, rename = "override")]
    pub difficulty_override: DifficultyOverride,
    #[serde(default)]
    pub attempts: VecDeque<AttemptRecord>,
    #[serde(default)]
    pub sessions: VecDeque<SessionRecord>,
    /// Misses made in this mode. Only this mode's sessions replay them.
    #[serde(default)]
    pub failures: FailureSet,
}

impl ModeState {
    pub fn new(mode: PracticeMode) -> Self {
        ModeState {
            level: mode.default_level(),
            difficulty_override: DifficultyOverride::Normal,
            attempts: VecDeque::new(),
            sessions: VecDeque::new(),
            failures: FailureSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssessmentStatus {
    pub completed: bool,
    pub completed_at: Option<i64>,
    pub initial_level: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerStats {
    pub chaos_minutes: u32,
    pub garden_minutes: u32,
    pub fog_minutes: u32,
    pub forge_minutes: u32,
    pub total_sessions: u32,
    pub items_reviewed: u32,
    pub errors_harvested: u32,
    pub last_session_date: Option<String>,
}

impl LearnerStats {
    pub fn add_minutes(&mut self, mode: PracticeMode, minutes: u32) {
        let counter = match mode {
            PracticeMode::Chaos => &mut self.chaos_minutes,
            PracticeMode::Garden => &mut self.garden_minutes,
            PracticeMode::Fog => &mut self.fog_minutes,
            PracticeMode::Forge => &mut self.forge_minutes,
        };
        *counter = counter.saturating_add(minutes);
    }
}

/// Everything the engine knows about one learner. Components take it by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerProfile {
    pub modes: BTreeMap<PracticeMode, ModeState>,
    pub assessment: AssessmentStatus,
    pub stats: LearnerStats,
    pub version: u32,
}

impl Default for LearnerProfile {
    fn default() -> Self {
        LearnerProfile {
            modes: PracticeMode::ALL
                .iter()
                .map(|&m| (m, ModeState::new(m)))
                .collect(),
            assessment: AssessmentStatus::default(),
            stats: LearnerStats::default(),
            version: PROFILE_VERSION,
        }
    }
}

impl LearnerProfile {
    pub fn mode(&self, mode: PracticeMode) -> Option<&ModeState> {
        self.modes.get(&mode)
    }

    pub fn mode_mut(&mut self, mode: PracticeMode) -> &mut ModeState {
        self.modes
            .entry(mode)
            .or_insert_with(|| ModeState::new(mode))
    }

    pub fn needs_assessment(&self) -> bool {
        !self.assessment.completed
    }

    /// Level lookup by raw storage key. Unknown keys read as the default level.
    pub fn level_for_key(&self, key: &str) -> u8 {
        key.parse::<PracticeMode>()
            .ok()
            .and_then(|m| self.mode(m).map(|s| s.level))
            .unwrap_or(DEFAULT_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_has_mode_defaults() {
        let profile = LearnerProfile::default();
        assert_eq!(profile.mode(PracticeMode::Chaos).unwrap().level, 3);
        assert_eq!(profile.mode(PracticeMode::Garden).unwrap().level, 3);
        assert_eq!(profile.mode(PracticeMode::Fog).unwrap().level, 6);
        assert_eq!(profile.mode(PracticeMode::Forge).unwrap().level, 3);
        assert!(profile.needs_assessment());
    }

    #[test]
    fn unknown_mode_key_reads_default_level() {
        let profile = LearnerProfile::default();
        assert_eq!(profile.level_for_key("fog"), 6);
        assert_eq!(profile.level_for_key("karaoke"), 3);
        assert!("karaoke".parse::<PracticeMode>().is_err());
    }

    #[test]
    fn slashed_answers_split_into_alternatives() {
        let spec = AnswerSpec::from_slashed("sorry / excuse me");
        assert_eq!(spec.primary, "sorry");
        assert_eq!(spec.alternatives, vec!["excuse me".to_string()]);
        assert_eq!(spec.candidates().count(), 2);
    }

    #[test]
    fn override_offsets() {
        assert_eq!(DifficultyOverride::Easy.offset(), -2);
        assert_eq!(DifficultyOverride::Normal.offset(), 0);
        assert_eq!(DifficultyOverride::Hard.offset(), 2);
        assert_eq!("HARD".parse::<DifficultyOverride>(), Ok(DifficultyOverride::Hard));
    }

    #[test]
    fn profile_json_round_trip_keeps_mode_keys() {
        let mut profile = LearnerProfile::default();
        profile.mode_mut(PracticeMode::Forge).level = 7;
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"forge\""));
        let back: LearnerProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn partial_profile_json_fills_defaults() {
        let back: LearnerProfile = serde_json::from_str(r#"{"version": 1}"#).unwrap();
        assert_eq!(back.modes.len(), 4);
        assert!(back.modes.values().all(|m| m.failures.is_empty()));
    }

    #[test]
    fn clamp_level_bounds() {
        assert_eq!(clamp_level(-4), 1);
        assert_eq!(clamp_level(14), 10);
        assert_eq!(clamp_level(7), 7);
    }
}
