// src/constants.rs

// --- Level Scale ---
pub const LEVEL_MIN: u8 = 1;
pub const LEVEL_MAX: u8 = 10;
pub const DEFAULT_LEVEL: u8 = 3;
pub const DEFAULT_FOG_LEVEL: u8 = 6;
pub const SKIP_PLACEMENT_LEVEL: u8 = 3;
pub const FOG_PLACEMENT_BONUS: u8 = 3; // Fog starts above the placed level

// --- Difficulty Override Offsets ---
pub const EASY_OFFSET: i32 = -2;
pub const HARD_OFFSET: i32 = 2;

// --- Skill Estimator ---
pub const ATTEMPT_WINDOW_SIZE: usize = 50;
pub const SESSION_WINDOW_SIZE: usize = 20;
pub const MIN_ATTEMPTS_FOR_ADJUSTMENT: usize = 10;
pub const MIN_ATTEMPTS_FOR_PROGRESS: usize = 5;
pub const INCREASE_THRESHOLD: f64 = 0.80;
pub const DECREASE_THRESHOLD: f64 = 0.50;
pub const MAX_LEVEL_CHANGE: i32 = 1;
pub const NEUTRAL_ACCURACY: f64 = 0.5;

// --- Sampler ---
pub const CONTENT_RANGE: i32 = 2; // Items within +/- of the effective level
pub const REINFORCEMENT_PROBABILITY: f64 = 0.5;

// --- Fuzzy Matcher ---
pub const MAX_TYPO_DIFF: usize = 2;
pub const MAX_LENGTH_DELTA: usize = 2;
pub const SENTENCE_MIN_GUESS_CHARS: usize = 5; // Guesses this short are rejected
pub const SENTENCE_PREFIX_CHARS: usize = 10;
pub const STRICT_TOLERANCE_DIVISOR: usize = 4;

// --- Placement ---
pub const PLACEMENT_START_LEVEL: u8 = 5;
pub const PLACEMENT_MIN_QUESTIONS: u32 = 8;
pub const PLACEMENT_MAX_QUESTIONS: u32 = 12;
pub const PLACEMENT_STABILITY_WINDOW: usize = 3;
pub const PLACEMENT_STABILITY_SPREAD: i32 = 1;
pub const LISTENING_EVERY: u32 = 4;
pub const PLACEMENT_DEFAULT_AVERAGE: f64 = 5.0;

// --- Content Scales ---
pub const VOCABULARY_SCALE: u8 = 5;
pub const CONTENT_SCALE: u8 = 10;

// --- Time ---
pub const MINUTE_MILLIS: i64 = 60_000;

// --- Persistence ---
pub const PROFILE_KEY: &str = "cl-profile";
pub const PROFILE_VERSION: u32 = 1;
