//! Behavior events used for collaborative biasing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a user did with a species
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BehaviorAction {
    Liked,
    Disliked,
    PlantedOutcome { survived: bool },
}

impl BehaviorAction {
    /// Whether the action expresses a positive reaction
    pub fn is_positive(&self) -> bool {
        matches!(
            self,
            BehaviorAction::Liked | BehaviorAction::PlantedOutcome { survived: true }
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorAction::Liked => "liked",
            BehaviorAction::Disliked => "disliked",
            BehaviorAction::PlantedOutcome { survived: true } => "planted_survived",
            BehaviorAction::PlantedOutcome { survived: false } => "planted_failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "liked" => Some(BehaviorAction::Liked),
            "disliked" => Some(BehaviorAction::Disliked),
            "planted_survived" => Some(BehaviorAction::PlantedOutcome { survived: true }),
            "planted_failed" => Some(BehaviorAction::PlantedOutcome { survived: false }),
            _ => None,
        }
    }
}

/// Append-only behavior log entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BehaviorEvent {
    pub user_id: Uuid,
    pub tree_id: String,
    pub action: BehaviorAction,
    pub timestamp: DateTime<Utc>,
    pub region: Option<String>,
    pub agro_zone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_string_round_trip() {
        for action in [
            BehaviorAction::Liked,
            BehaviorAction::Disliked,
            BehaviorAction::PlantedOutcome { survived: true },
            BehaviorAction::PlantedOutcome { survived: false },
        ] {
            assert_eq!(BehaviorAction::parse(action.as_str()), Some(action));
        }
        assert_eq!(BehaviorAction::parse("shared"), None);
    }

    #[test]
    fn test_positive_actions() {
        assert!(BehaviorAction::Liked.is_positive());
        assert!(BehaviorAction::PlantedOutcome { survived: true }.is_positive());
        assert!(!BehaviorAction::Disliked.is_positive());
        assert!(!BehaviorAction::PlantedOutcome { survived: false }.is_positive());
    }

    #[test]
    fn test_action_wire_format() {
        let json = serde_json::to_value(BehaviorAction::PlantedOutcome { survived: true }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "planted_outcome", "survived": true}));

        let liked: BehaviorAction = serde_json::from_str(r#"{"type":"liked"}"#).unwrap();
        assert_eq!(liked, BehaviorAction::Liked);
    }
}
