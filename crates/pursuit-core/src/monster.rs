use serde::{Deserialize, Serialize};

use crate::config::MonsterConfig;
use crate::rng::{self, DeterministicRng};
use crate::world::Terrain;
use crate::{MonsterId, Position};

/// Simple reflex agent: every `frequency` ticks, with probability `move_probability`, step to a
/// random valid neighbor. No memory, no sensing of other agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    id: MonsterId,
    position: Position,
    alive: bool,
    behavior: MonsterConfig,
}

impl Monster {
    pub fn new(id: MonsterId, position: Position, behavior: MonsterConfig) -> Self {
        Self {
            id,
            position,
            alive: true,
            behavior,
        }
    }

    pub fn id(&self) -> MonsterId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn frequency(&self) -> u64 {
        self.behavior.frequency
    }

    pub fn move_probability(&self) -> f64 {
        self.behavior.move_probability
    }

    pub(crate) fn kill(&mut self) {
        self.alive = false;
    }

    /// Reflex cycle for `tick`. Returns the new position when the monster moved.
    pub fn cycle<T, R>(&mut self, tick: u64, terrain: &T, rng: &mut R) -> Option<Position>
    where
        T: Terrain + ?Sized,
        R: DeterministicRng + ?Sized,
    {
        if !self.alive || tick % self.behavior.frequency.max(1) != 0 {
            return None;
        }
        if !rng.chance(self.behavior.move_probability) {
            return None;
        }

        let candidates = terrain.valid_neighbors(self.position);
        let next = *rng::choose(rng, &candidates)?;
        tracing::trace!(monster = %self.id, from = %self.position, to = %next, "monster moved");
        self.position = next;
        Some(next)
    }
}
