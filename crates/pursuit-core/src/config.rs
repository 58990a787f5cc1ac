//! Simulation configuration loading and validation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::rng::SplitMix64;

/// Run configuration, loadable from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid side length (the world is `side`³ cells)
    #[serde(alias = "N")]
    pub side: u32,

    /// Fraction of free cells (informational; the void fraction decides carving)
    pub pfree: f64,

    /// Fraction of void cells; `floor(side³ · pvacio)` cells are carved
    pub pvacio: f64,

    /// Number of robots
    #[serde(alias = "n_robots")]
    pub robots: usize,

    /// Number of monsters
    #[serde(alias = "n_monsters")]
    pub monsters: usize,

    /// Seed for the run; `None` draws one from OS entropy
    pub seed: Option<u64>,

    /// Monster reflex parameters
    pub monster: MonsterConfig,

    /// Tick budget for `Simulation::run`
    pub max_ticks: u64,

    /// Window used by loop detection in reports
    pub loop_window: usize,

    /// Window used by per-robot episode analysis in reports
    pub episode_window: usize,
}

/// Reflex parameters shared by every monster of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonsterConfig {
    /// Monsters consider moving only on ticks divisible by this (K)
    #[serde(alias = "K")]
    pub frequency: u64,

    /// Probability of moving on an eligible tick (p)
    #[serde(alias = "p")]
    pub move_probability: f64,
}

impl Default for MonsterConfig {
    fn default() -> Self {
        Self {
            frequency: 3,
            move_probability: 0.7,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            side: 5,
            pfree: 0.7,
            pvacio: 0.3,
            robots: 3,
            monsters: 5,
            seed: Some(42),
            monster: MonsterConfig::default(),
            max_ticks: 200,
            loop_window: 10,
            episode_window: 15,
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject parameter values no run can honor.
    ///
    /// Agent counts are checked later against the carved grid, since only then is the number
    /// of free cells known.
    pub fn validate(&self) -> Result<()> {
        crate::grid::check_side(self.side)?;
        check_fraction("pfree", self.pfree)?;
        check_fraction("pvacio", self.pvacio)?;
        check_fraction("monster.move_probability", self.monster.move_probability)?;
        if self.monster.frequency == 0 {
            return Err(SimError::InvalidConfig(
                "monster.frequency must be at least 1".into(),
            ));
        }
        if (self.pfree + self.pvacio - 1.0).abs() > 1e-9 {
            tracing::warn!(
                pfree = self.pfree,
                pvacio = self.pvacio,
                "pfree and pvacio do not sum to 1; void carving uses pvacio only"
            );
        }
        Ok(())
    }

    pub fn cell_count(&self) -> usize {
        (self.side as usize).pow(3)
    }

    /// Number of void cells carved at construction: `floor(side³ · pvacio)`.
    pub fn void_count(&self) -> usize {
        (self.cell_count() as f64 * self.pvacio).floor() as usize
    }

    pub fn rng(&self) -> SplitMix64 {
        match self.seed {
            Some(seed) => SplitMix64::new(seed),
            None => SplitMix64::from_entropy(),
        }
    }
}

fn check_fraction(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::InvalidConfig(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}
