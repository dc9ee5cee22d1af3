//! Collaborative-similarity heuristic over behavior events
//!
//! This is a heuristic, not a trained model: peers whose conservation goals
//! overlap enough with the target user "vote" on a species through their
//! recorded reactions to it.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::engine::weights::{NEUTRAL_LIKELIHOOD, SIMILARITY_THRESHOLD};
use crate::models::BehaviorEvent;

fn normalized(goals: &BTreeSet<String>) -> BTreeSet<String> {
    goals
        .iter()
        .map(|g| g.trim().to_lowercase())
        .filter(|g| !g.is_empty())
        .collect()
}

/// Jaccard index of two goal sets, ignoring case and surrounding
/// whitespace; 0.0 when both are empty
pub fn jaccard_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let (a, b) = (normalized(a), normalized(b));
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(&b).count();
    intersection as f64 / union as f64
}

/// Another user's goals and events for the species under consideration
#[derive(Debug, Clone)]
pub struct PeerHistory {
    pub user_id: Uuid,
    pub goals: BTreeSet<String>,
    pub events: Vec<BehaviorEvent>,
}

/// The peer's latest reaction to the species, if any
fn latest_reaction(events: &[BehaviorEvent], tree_id: &str) -> Option<bool> {
    events
        .iter()
        .filter(|e| e.tree_id == tree_id)
        .max_by_key(|e| e.timestamp)
        .map(|e| e.action.is_positive())
}

/// Fraction of similar peers whose latest reaction to `tree_id` was positive.
///
/// Returns [`NEUTRAL_LIKELIHOOD`] when no similar peer reacted to the species.
pub fn similar_user_likelihood(
    user_id: Uuid,
    goals: &BTreeSet<String>,
    tree_id: &str,
    peers: &[PeerHistory],
) -> f64 {
    let reactions: Vec<bool> = peers
        .iter()
        .filter(|peer| peer.user_id != user_id)
        .filter(|peer| jaccard_similarity(goals, &peer.goals) > SIMILARITY_THRESHOLD)
        .filter_map(|peer| latest_reaction(&peer.events, tree_id))
        .collect();

    if reactions.is_empty() {
        return NEUTRAL_LIKELIHOOD;
    }

    let liked = reactions.iter().filter(|liked| **liked).count();
    liked as f64 / reactions.len() as f64
}
