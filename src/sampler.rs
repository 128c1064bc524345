// src/sampler.rs

use crate::constants::*;
use crate::models::{clamp_level, FailureEntry, FailureSet, Item};
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickSource {
    /// Drawn from the failure set, ignoring level.
    Reinforcement,
    /// Drawn from pool items near the effective level.
    Level,
    /// Nothing near the level; drawn from the whole pool.
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pick {
    pub item: Item,
    pub source: PickSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureChange {
    Added,
    Incremented(u32),
    Removed,
    Unchanged,
}

// --- Public Interface ---

/// Picks the next practice item. Returns `None` only when there is nothing at all to practice.
pub fn next_item<R: Rng + ?Sized>(
    pool: &[Item],
    failures: &FailureSet,
    effective_level: u8,
    rng: &mut R,
) -> Option<Pick> {
    if !failures.is_empty() && rng.gen_bool(REINFORCEMENT_PROBABILITY) {
        return pick_failure(failures, rng);
    }

    let near = filter_by_level(pool, effective_level);
    if let Some(item) = near.choose(rng) {
        debug!("[Sampler] Level pick '{}' (d={})", item.key, item.difficulty);
        return Some(Pick {
            item: (*item).clone(),
            source: PickSource::Level,
        });
    }

    if let Some(item) = pool.choose(rng) {
        info!(
            "[Sampler] No items within {} of level {}. Falling back to full pool.",
            CONTENT_RANGE, effective_level
        );
        return Some(Pick {
            item: item.clone(),
            source: PickSource::Fallback,
        });
    }

    // Empty pool but outstanding misses: keep practicing those.
    pick_failure(failures, rng)
}

/// Items whose difficulty lies within `CONTENT_RANGE` of the level, inclusive.
pub fn filter_by_level(pool: &[Item], effective_level: u8) -> Vec<&Item> {
    let level = effective_level as i32;
    let min = clamp_level(level - CONTENT_RANGE);
    let max = clamp_level(level + CONTENT_RANGE);
    pool.iter()
        .filter(|item| (min..=max).contains(&item.difficulty))
        .collect()
}

/// Correct answers drop the item from the failure set; misses add it or bump its count.
pub fn record_outcome(failures: &mut FailureSet, item: &Item, correct: bool, now: i64) -> FailureChange {
    if correct {
        return match failures.remove(&item.key) {
            Some(entry) => {
                info!(
                    "[Sampler] '{}' recovered after {} misses",
                    item.key, entry.wrong_count
                );
                FailureChange::Removed
            }
            None => FailureChange::Unchanged,
        };
    }

    match failures.get_mut(&item.key) {
        Some(entry) => {
            entry.wrong_count += 1;
            debug!("[Sampler] '{}' missed again (x{})", item.key, entry.wrong_count);
            FailureChange::Incremented(entry.wrong_count)
        }
        None => {
            failures.insert(
                item.key.clone(),
                FailureEntry {
                    item: item.clone(),
                    wrong_count: 1,
                    added_at: now,
                },
            );
            debug!("[Sampler] '{}' added to failure set", item.key);
            FailureChange::Added
        }
    }
}

// --- Internal ---

fn pick_failure<R: Rng + ?Sized>(failures: &FailureSet, rng: &mut R) -> Option<Pick> {
    if failures.is_empty() {
        return None;
    }
    let idx = rng.gen_range(0..failures.len());
    failures.values().nth(idx).map(|entry| {
        debug!(
            "[Sampler] Reinforcement pick '{}' (x{})",
            entry.item.key, entry.wrong_count
        );
        Pick {
            item: entry.item.clone(),
            source: PickSource::Reinforcement,
        }
    })
}
