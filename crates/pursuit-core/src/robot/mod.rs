//! Memory-based robot agent: sense → decide → act → learn.

mod analysis;
mod memory;
mod perception;
mod policy;

pub use analysis::{
    EpisodeAnalysis, EpisodeVerdict, PerceptionActionSummary, Rationality, TableRow,
    DEFAULT_EPISODE_WINDOW, DEFAULT_LOOP_WINDOW,
};
pub use memory::{
    effectiveness, CellBelief, CommunicationRecord, Memory, MemoryEntry, RationalityCounters,
};
pub use perception::{Outcome, Perception, RuleKey};
pub use policy::{Action, Decision, Rule, REVISIT_ROTATE_PROBABILITY, RULES};

use crate::monster::Monster;
use crate::rng::{self, DeterministicRng};
use crate::world::{Terrain, WorldView};
use crate::{Orientation, Position, RobotId};

pub const KILL_REWARD: i64 = 1000;
pub const SELF_DESTRUCT_PENALTY: i64 = 1000;
pub const STEP_COST: i64 = 10;
pub const COLLISION_PENALTY: i64 = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct Robot {
    id: RobotId,
    position: Position,
    orientation: Orientation,
    alive: bool,
    memory: Memory,
    score: i64,
    kills: u32,
    moves: u32,
    collisions: u32,
}

impl Robot {
    pub fn new(id: RobotId, position: Position, orientation: Orientation) -> Self {
        Self {
            id,
            position,
            orientation,
            alive: true,
            memory: Memory::new(position),
            score: 0,
            kills: 0,
            moves: 0,
            collisions: 0,
        }
    }

    pub fn id(&self) -> RobotId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn collisions(&self) -> u32 {
        self.collisions
    }

    pub fn forward(&self) -> Position {
        self.position.step(self.orientation)
    }

    pub fn backward(&self) -> Position {
        self.position.step_back(self.orientation)
    }

    pub fn history(&self) -> &[MemoryEntry] {
        self.memory.history()
    }

    pub fn rationality(&self) -> f64 {
        self.memory.rationality()
    }

    pub fn detect_loop(&self, window: usize) -> bool {
        self.memory.detect_loop(window)
    }

    /// Sense the surroundings. The snapshot never reports a void collision; that is an outcome
    /// merged in after acting.
    pub fn perceive<W>(&self, world: &W, tick: u64) -> Perception
    where
        W: WorldView + ?Sized,
    {
        let forward = self.forward();
        let backward = self.backward();

        let monster_nearby = self
            .position
            .neighbors()
            .into_iter()
            .filter(|n| *n != backward)
            .any(|n| world.is_valid(n) && world.monster_at(n));

        Perception {
            orientation: self.orientation,
            monster_nearby,
            monster_in_cell: world.monster_at(self.position),
            robot_ahead: world.is_valid(forward) && world.robot_at(forward),
            void_collision: false,
            tick,
        }
    }

    pub fn decide<W, R>(&self, perception: &Perception, world: &W, rng: &mut R) -> Decision
    where
        W: WorldView + ?Sized,
        R: DeterministicRng + ?Sized,
    {
        policy::decide(self, perception, world, rng)
    }

    /// Execute `action` against the world. Monsters are passed separately so the environment
    /// can lend out its roster while the robot mutates itself.
    pub fn act<T, R>(
        &mut self,
        action: Action,
        terrain: &T,
        monsters: &mut [Monster],
        rng: &mut R,
    ) -> Outcome
    where
        T: Terrain + ?Sized,
        R: DeterministicRng + ?Sized,
    {
        let mut outcome = Outcome::default();
        if !self.alive {
            return outcome;
        }

        match action {
            Action::Destroy => {
                let here = self.position;
                if let Some(monster) = monsters
                    .iter_mut()
                    .find(|m| m.is_alive() && m.position() == here)
                {
                    monster.kill();
                    self.kills += 1;
                    self.score += KILL_REWARD;
                    outcome.destroyed = Some(monster.id());
                    tracing::info!(robot = %self.id, monster = %monster.id(), at = %here, "monster destroyed");
                }
                self.alive = false;
                self.score -= SELF_DESTRUCT_PENALTY;
                tracing::info!(robot = %self.id, at = %here, "robot self-destructed");
            }
            Action::MoveForward => {
                let forward = self.forward();
                if terrain.is_valid(forward) {
                    self.memory
                        .note_move(self.position, forward, self.orientation.vector());
                    self.position = forward;
                    self.moves += 1;
                    self.score -= STEP_COST;
                } else {
                    self.memory.note_void(forward);
                    self.collisions += 1;
                    self.score -= COLLISION_PENALTY;
                    outcome.void_collision = true;
                }
            }
            Action::Rotate => {
                // Only horizontal headings are drawn, so a vertical heading is never regained.
                if let Some(heading) = rng::choose(rng, &Orientation::HORIZONTAL) {
                    self.orientation = *heading;
                }
                self.score -= STEP_COST;
            }
            Action::Wait => {}
        }

        outcome
    }

    /// Learning step, run after every action with the outcome-merged perception.
    pub fn learn(&mut self, perception: Perception, action: Action) {
        self.memory.record(perception, action);
    }

    pub(crate) fn note_communication(&mut self, tick: u64, peer: RobotId, action: Action) {
        self.memory.note_communication(tick, peer, action);
    }
}
