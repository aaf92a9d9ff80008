//! Tunables for the economy.
//!
//! Every field has a default taken from the shipped game balance, so a
//! configuration file only needs to mention the values it changes.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Economy-wide configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Seed for the master RNG. Entropy-seeded when absent.
    pub seed: Option<u64>,
    pub rules: ProductionRules,
}

/// Balance numbers used by the production cycles and containers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionRules {
    /// Length of one production cycle, split into two halves around the
    /// transform step.
    pub cycle_ms: u64,
    /// How long a node rests after handing over output before it may fetch
    /// new input.
    pub delivery_cooldown_ms: u64,

    pub factory_worker_damage: f64,
    pub factory_accident_chance: f64,
    pub field_accident_chance: f64,

    pub flat_viability_increase: f64,
    /// Chance that a flat which just got one worker tries for a second.
    pub flat_second_worker_chance: f64,

    pub diner_min_viability_gain: f64,
    pub diner_max_viability_gain: f64,
    pub diner_poison_chance: f64,
    /// Multiplier applied to the drawn gain on food poisoning.
    pub diner_poison_factor: f64,

    /// Damage a worker takes entering a road, per worker already on it.
    pub road_damage_per_worker: f64,
}

impl Default for ProductionRules {
    fn default() -> Self {
        Self {
            cycle_ms: 1000,
            delivery_cooldown_ms: 200,
            factory_worker_damage: 0.1,
            factory_accident_chance: 0.05,
            field_accident_chance: 0.05,
            flat_viability_increase: 0.25,
            flat_second_worker_chance: 0.4,
            diner_min_viability_gain: 0.2,
            diner_max_viability_gain: 0.7,
            diner_poison_chance: 0.2,
            diner_poison_factor: -0.5,
            road_damage_per_worker: 0.02,
        }
    }
}

impl ProductionRules {
    pub fn cycle(&self) -> Duration {
        Duration::from_millis(self.cycle_ms)
    }

    pub fn delivery_cooldown(&self) -> Duration {
        Duration::from_millis(self.delivery_cooldown_ms)
    }

    /// Rules with no randomness and no waiting: no accidents, no poisoning,
    /// instant cycles. Handy for tests that need exact outcomes.
    pub fn deterministic() -> Self {
        Self {
            cycle_ms: 0,
            delivery_cooldown_ms: 0,
            factory_accident_chance: 0.0,
            field_accident_chance: 0.0,
            flat_second_worker_chance: 0.0,
            diner_poison_chance: 0.0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_game_balance() {
        let r = ProductionRules::default();
        assert_eq!(r.cycle(), Duration::from_secs(1));
        assert_eq!(r.delivery_cooldown(), Duration::from_millis(200));
        assert_eq!(r.factory_accident_chance, 0.05);
        assert_eq!(r.road_damage_per_worker, 0.02);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg: EconomyConfig =
            serde_json::from_str(r#"{ "seed": 9, "rules": { "cycle_ms": 10 } }"#).unwrap();
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.rules.cycle_ms, 10);
        assert_eq!(cfg.rules.diner_poison_chance, 0.2);
    }

    #[test]
    fn empty_object_is_default() {
        let cfg: EconomyConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, EconomyConfig::default());
    }
}
