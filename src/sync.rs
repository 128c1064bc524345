// src/sync.rs

use crate::models::{FailureEntry, LearnerProfile, LearnerStats};
use log::info;
use std::collections::btree_map::Entry;

/// Folds a remote copy of the profile into the local one.
///
/// Counters keep the larger side, each mode's failure set is unioned with the
/// same mode's remote set, and a placement done on either device counts.
/// Levels and histories always come from `local`.
pub fn merge_profiles(local: &LearnerProfile, remote: &LearnerProfile) -> LearnerProfile {
    let mut merged = local.clone();

    merged.stats = merge_stats(&local.stats, &remote.stats);

    let mut adopted = 0;
    for (&mode, remote_state) in &remote.modes {
        let failures = &mut merged.mode_mut(mode).failures;
        for (key, theirs) in &remote_state.failures {
            match failures.entry(key.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(theirs.clone());
                    adopted += 1;
                }
                Entry::Occupied(mut slot) => merge_failure(slot.get_mut(), theirs),
            }
        }
    }

    if !local.assessment.completed && remote.assessment.completed {
        merged.assessment = remote.assessment.clone();
    }

    info!(
        "[Sync] Merged remote profile: {} failures adopted, {} total",
        adopted,
        merged.modes.values().map(|m| m.failures.len()).sum::<usize>()
    );
    merged
}

fn merge_failure(ours: &mut FailureEntry, theirs: &FailureEntry) {
    ours.wrong_count = ours.wrong_count.max(theirs.wrong_count);
    ours.added_at = ours.added_at.min(theirs.added_at);
}

fn merge_stats(a: &LearnerStats, b: &LearnerStats) -> LearnerStats {
    LearnerStats {
        chaos_minutes: a.chaos_minutes.max(b.chaos_minutes),
        garden_minutes: a.garden_minutes.max(b.garden_minutes),
        fog_minutes: a.fog_minutes.max(b.fog_minutes),
        forge_minutes: a.forge_minutes.max(b.forge_minutes),
        total_sessions: a.total_sessions.max(b.total_sessions),
        items_reviewed: a.items_reviewed.max(b.items_reviewed),
        errors_harvested: a.errors_harvested.max(b.errors_harvested),
        // ISO dates compare lexically.
        last_session_date: a.last_session_date.clone().max(b.last_session_date.clone()),
    }
}
