// src/repository.rs

use crate::constants::*;
use crate::database::{KIND_SENTENCE, KIND_VOCABULARY};
use crate::error::EngineResult;
use crate::models::{AnswerSpec, Item, LearnerProfile, PracticeMode};
use chrono::Utc;
use log::{debug, info, warn};
use rusqlite::{params, Connection, OptionalExtension};

// --- Profile Storage ---

/// Whole-profile key/value persistence. Saving the same profile twice is a no-op.
pub trait ProfileStore {
    fn load(&self, key: &str) -> EngineResult<Option<LearnerProfile>>;
    fn save(&self, key: &str, profile: &LearnerProfile) -> EngineResult<()>;
}

pub struct SqliteProfileStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteProfileStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        SqliteProfileStore { conn }
    }
}

impl ProfileStore for SqliteProfileStore<'_> {
    fn load(&self, key: &str) -> EngineResult<Option<LearnerProfile>> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?", [key], |row| row.get(0))
            .optional()?;

        let Some(raw) = raw else {
            debug!("[DB] No stored value for '{}'", key);
            return Ok(None);
        };

        match serde_json::from_str::<LearnerProfile>(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!("[DB] Stored profile '{}' is unreadable, starting fresh: {}", key, e);
                Ok(None)
            }
        }
    }

    fn save(&self, key: &str, profile: &LearnerProfile) -> EngineResult<()> {
        let value = serde_json::to_string(profile)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?, ?, ?)",
            params![key, value, Utc::now().timestamp_millis()],
        )?;
        debug!("[DB] Saved '{}' ({} bytes)", key, value.len());
        Ok(())
    }
}

/// The stored profile under the default key, or a fresh one.
pub fn load_profile_or_default(store: &dyn ProfileStore) -> EngineResult<LearnerProfile> {
    match store.load(PROFILE_KEY)? {
        Some(profile) => {
            info!(
                "[DB] Loaded profile (assessment done: {})",
                profile.assessment.completed
            );
            Ok(profile)
        }
        None => {
            info!("[DB] No saved profile. Starting a new one.");
            Ok(LearnerProfile::default())
        }
    }
}

// --- Content ---

/// Supplies the practice pool for a mode.
pub trait ContentSource {
    fn pool(&self, mode: PracticeMode) -> EngineResult<Vec<Item>>;
}

pub struct SqliteContent<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteContent<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        SqliteContent { conn }
    }
}

impl ContentSource for SqliteContent<'_> {
    /// Garden drills vocabulary, Forge asks for Romanian from English, the rest translate sentences.
    fn pool(&self, mode: PracticeMode) -> EngineResult<Vec<Item>> {
        let kind = match mode {
            PracticeMode::Garden => KIND_VOCABULARY,
            _ => KIND_SENTENCE,
        };

        let mut stmt = self.conn.prepare(
            "SELECT key, romanian, english, difficulty, category
             FROM items WHERE kind = ? ORDER BY key",
        )?;
        let rows = stmt.query_map([kind], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u8>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut items = Vec::new();
        for row in rows {
            let (key, romanian, english, difficulty, category) = row?;
            let item = match mode {
                PracticeMode::Garden => Item {
                    key,
                    prompt: romanian,
                    answer: AnswerSpec::from_slashed(&english),
                    difficulty,
                    category,
                },
                PracticeMode::Forge => Item {
                    key: format!("{}:ro", key),
                    prompt: english,
                    answer: AnswerSpec::new(romanian),
                    difficulty,
                    category,
                },
                PracticeMode::Chaos | PracticeMode::Fog => Item {
                    key,
                    prompt: romanian,
                    answer: AnswerSpec::new(english),
                    difficulty,
                    category,
                },
            };
            items.push(item);
        }

        debug!("[DB] {} pool: {} items", mode, items.len());
        Ok(items)
    }
}
