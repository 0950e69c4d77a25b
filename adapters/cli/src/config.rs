use std::{fs, path::Path};

use anyhow::{Context, Result};
use pacpilot_system_decision::PolicyConfig;
use serde::Deserialize;

/// Settings file consumed by the headless harness.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct HarnessConfig {
    /// Tuning knobs forwarded to the pilot.
    pub(crate) policy: PolicyConfig,
    /// Rules of the simulated game.
    pub(crate) harness: HarnessSettings,
}

/// Rules of the simulated game surrounding the pilot.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct HarnessSettings {
    /// Lives granted at the start of the run.
    pub(crate) lives: u32,
    /// Frames a power dot keeps every ghost frightened.
    pub(crate) frightened_frames: u32,
    /// Frames simulated before the run stops.
    pub(crate) frames: u64,
    /// Seed of the random source steering the ghosts.
    pub(crate) ghost_seed: u64,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            lives: 3,
            frightened_frames: 40,
            frames: 2_000,
            ghost_seed: 0x0000_9405_7000_0001,
        }
    }
}

impl HarnessConfig {
    /// Reads and validates the settings file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read harness config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid harness config at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse harness config toml contents")?;
        config
            .policy
            .validate()
            .context("policy section rejected")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacpilot_core::Direction;

    #[test]
    fn empty_file_uses_defaults() {
        let config = HarnessConfig::parse("").expect("empty config parses");
        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn sections_override_individual_fields() {
        let config = HarnessConfig::parse(
            r#"
            [policy]
            escape_direction = "Right"
            commit_to_corridor = true
            ghost_speeds = [5.0, 9.0]
            rng_seed = 99

            [harness]
            lives = 1
            frames = 50
            "#,
        )
        .expect("config parses");

        assert_eq!(config.policy.escape_direction, Direction::Right);
        assert!(config.policy.commit_to_corridor);
        assert_eq!(config.policy.ghost_speeds, vec![5.0, 9.0]);
        assert_eq!(config.policy.rng_seed, 99);
        assert_eq!(config.policy.hunt_radius, 5);
        assert_eq!(config.harness.lives, 1);
        assert_eq!(config.harness.frames, 50);
        assert_eq!(config.harness.frightened_frames, 40);
    }

    #[test]
    fn rejects_unknown_keys_and_invalid_policies() {
        assert!(HarnessConfig::parse("[policy]\nhunt_raduis = 3\n").is_err());
        assert!(HarnessConfig::parse("[harness]\nlifes = 3\n").is_err());

        let error = HarnessConfig::parse("[policy]\nghost_speeds = []\n")
            .expect_err("empty speed table is rejected");
        assert!(format!("{error:#}").contains("ghost speed table must not be empty"));
    }
}
