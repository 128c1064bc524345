// src/database.rs

use crate::constants::*;
use crate::difficulty::{normalize_difficulty, sentence_difficulty};
use crate::error::EngineResult;
use log::{debug, info};
use rusqlite::{params, Connection};
use serde::Deserialize;

pub const KIND_VOCABULARY: &str = "vocabulary";
pub const KIND_SENTENCE: &str = "sentence";

#[derive(Debug, Deserialize)]
struct JsonWord {
    ro: String,
    en: String,
    difficulty: u8,
    #[serde(default)]
    category: String,
}

#[derive(Debug, Deserialize)]
struct JsonSentence {
    id: String,
    romanian: String,
    english: String,
    #[serde(default)]
    difficulty: Option<u8>,
}

pub fn init_db(conn: &Connection) -> EngineResult<()> {
    debug!("[DB] Checking database schema...");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS items (
            key TEXT PRIMARY KEY,
            kind TEXT NOT NULL CHECK (kind IN ('vocabulary','sentence')),
            romanian TEXT NOT NULL,
            english TEXT NOT NULL,
            difficulty INTEGER NOT NULL CHECK (difficulty BETWEEN 1 AND 10),
            category TEXT NOT NULL DEFAULT ''
        );
        CREATE INDEX IF NOT EXISTS idx_items_kind ON items (kind);
        ",
    )?;

    let count: i64 = conn.query_row("SELECT count(*) FROM items", [], |row| row.get(0))?;
    if count == 0 {
        info!("[DB] Content table empty. Seeding data...");
        seed_data(conn)?;
    }

    Ok(())
}

fn seed_data(conn: &Connection) -> EngineResult<()> {
    let words: Vec<JsonWord> = serde_json::from_str(include_str!("data/vocabulary.json"))?;
    let sentences: Vec<JsonSentence> = serde_json::from_str(include_str!("data/sentences.json"))?;

    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT OR REPLACE INTO items (key, kind, romanian, english, difficulty, category)
             VALUES (?, ?, ?, ?, ?, ?)",
        )?;

        for w in &words {
            let difficulty = normalize_difficulty(w.difficulty, VOCABULARY_SCALE);
            stmt.execute(params![
                format!("vocab:{}", w.ro),
                KIND_VOCABULARY,
                w.ro,
                w.en,
                difficulty,
                w.category
            ])?;
        }

        for s in &sentences {
            let difficulty = match s.difficulty {
                Some(d) => normalize_difficulty(d, CONTENT_SCALE),
                None => sentence_difficulty(&s.romanian),
            };
            stmt.execute(params![
                s.id,
                KIND_SENTENCE,
                s.romanian,
                s.english,
                difficulty,
                ""
            ])?;
        }
    }
    tx.commit()?;

    info!(
        "[DB] Seeded {} words and {} sentences",
        words.len(),
        sentences.len()
    );
    Ok(())
}
