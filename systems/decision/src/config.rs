//! Tuning knobs for the per-frame policy.

use pacpilot_core::Direction;
use serde::Deserialize;
use thiserror::Error;

/// Ghost speed per level, in tiles per agent-speed unit, saturating at the last entry.
const DEFAULT_GHOST_SPEEDS: [f64; 9] = [4.0, 6.0, 7.0, 7.0, 7.5, 7.5, 7.5, 7.5, 8.0];

/// Aggregated tuning knobs controlling every adjustable aspect of the policy.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Direction emitted whenever the agent stands on a teleport.
    pub escape_direction: Direction,
    /// Recovery countdown separating huntable ghosts from threatening ones.
    pub hunt_recovery_threshold: u32,
    /// Manhattan radius (exclusive) inside which frightened ghosts are hunted.
    pub hunt_radius: u32,
    /// Remembered targets are chased only while their route is shorter than this.
    pub hunt_route_limit: usize,
    /// Number of nearest items examined per frame.
    pub dot_candidate_limit: usize,
    /// Agent speed used when comparing arrival times.
    pub agent_speed: f64,
    /// Extra time granted to ghosts when testing for interception.
    pub safety_margin: f64,
    /// Non-decreasing ghost speed table indexed by level.
    pub ghost_speeds: Vec<f64>,
    /// Follow the remembered route across frames instead of re-planning.
    pub commit_to_corridor: bool,
    /// Seed of the random source used by the fallback branch.
    pub rng_seed: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            escape_direction: Direction::Left,
            hunt_recovery_threshold: 5,
            hunt_radius: 5,
            hunt_route_limit: 5,
            dot_candidate_limit: 5,
            agent_speed: 8.0,
            safety_margin: 0.5,
            ghost_speeds: DEFAULT_GHOST_SPEEDS.to_vec(),
            commit_to_corridor: false,
            rng_seed: 0x5eed_9ac0_1d2e_4f60,
        }
    }
}

/// Reasons a policy configuration may be rejected.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The ghost speed table holds no entries.
    #[error("ghost speed table must not be empty")]
    EmptyGhostSpeeds,
    /// A speed is zero, negative or not a number.
    #[error("speed {value} must be positive")]
    NonPositiveSpeed {
        /// Offending value.
        value: f64,
    },
    /// The ghost speed table decreases at `index`.
    #[error("ghost speed table decreases at level {index}")]
    DecreasingGhostSpeeds {
        /// Level index whose speed is lower than its predecessor's.
        index: usize,
    },
}

impl PolicyConfig {
    /// Checks the invariants the policy relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.agent_speed > 0.0) {
            return Err(ConfigError::NonPositiveSpeed {
                value: self.agent_speed,
            });
        }

        let first = *self
            .ghost_speeds
            .first()
            .ok_or(ConfigError::EmptyGhostSpeeds)?;
        if !(first > 0.0) {
            return Err(ConfigError::NonPositiveSpeed { value: first });
        }

        for (index, pair) in self.ghost_speeds.windows(2).enumerate() {
            if pair[1] < pair[0] {
                return Err(ConfigError::DecreasingGhostSpeeds { index: index + 1 });
            }
        }

        Ok(())
    }

    /// Ghost speed for `level`, saturating at the last table entry.
    #[must_use]
    pub fn ghost_speed(&self, level: u32) -> f64 {
        let index = usize::try_from(level).unwrap_or(usize::MAX);
        self.ghost_speeds
            .get(index)
            .or_else(|| self.ghost_speeds.last())
            .copied()
            .unwrap_or(self.agent_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ghost_speed_saturates_past_the_table() {
        let config = PolicyConfig::default();
        assert_eq!(config.ghost_speed(0), 4.0);
        assert_eq!(config.ghost_speed(1), 6.0);
        assert_eq!(config.ghost_speed(8), 8.0);
        assert_eq!(config.ghost_speed(40), 8.0);
    }

    #[test]
    fn validation_rejects_broken_tables() {
        assert_eq!(PolicyConfig::default().validate(), Ok(()));

        let mut config = PolicyConfig::default();
        config.ghost_speeds.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyGhostSpeeds));

        config.ghost_speeds = vec![4.0, 6.0, 5.0];
        assert_eq!(
            config.validate(),
            Err(ConfigError::DecreasingGhostSpeeds { index: 2 })
        );

        config.ghost_speeds = vec![0.0, 6.0];
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositiveSpeed { value: 0.0 })
        );

        let config = PolicyConfig {
            agent_speed: -1.0,
            ..PolicyConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositiveSpeed { value: -1.0 })
        );
    }
}
