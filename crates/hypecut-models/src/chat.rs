//! Chat event input model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single chat message reduced to the fields the detector needs.
///
/// Events arrive chronologically ordered from the log-fetching collaborator;
/// ordering violations are an input-contract error surfaced by the binner,
/// never repaired here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChatEvent {
    /// Seconds from stream start.
    pub timestamp: f64,

    /// Contribution of this event to its bin. Plain messages carry 1.0;
    /// upstream keyword emphasis may raise it.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl ChatEvent {
    /// Create an event with unit weight.
    pub fn at(timestamp: f64) -> Self {
        Self {
            timestamp,
            weight: 1.0,
        }
    }

    /// Create an event with an explicit weight.
    pub fn weighted(timestamp: f64, weight: f64) -> Self {
        Self { timestamp, weight }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weight_on_deserialize() {
        let ev: ChatEvent = serde_json::from_str(r#"{"timestamp": 12.5}"#).unwrap();
        assert_eq!(ev.weight, 1.0);
        assert_eq!(ev.timestamp, 12.5);
    }
}
