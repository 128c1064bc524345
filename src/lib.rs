// src/lib.rs

pub mod constants;
pub mod database;
pub mod difficulty;
pub mod error;
pub mod estimator;
pub mod matcher;
pub mod models;
pub mod normalize;
pub mod placement;
pub mod repository;
pub mod sampler;
pub mod session;
pub mod sync;

pub use error::{EngineError, EngineResult};
pub use models::{AnswerMode, AnswerSpec, DifficultyOverride, Item, LearnerProfile, PracticeMode};
