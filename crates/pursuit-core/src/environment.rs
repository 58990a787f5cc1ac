//! The world: grid, agent roster, tick counter and the run's random source.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::{MonsterConfig, SimulationConfig};
use crate::error::{Result, SimError};
use crate::grid::Grid;
use crate::monster::Monster;
use crate::rng::{self, DistinctSampler, SplitMix64};
use crate::robot::{Action, Robot};
use crate::world::{Terrain, WorldView};
use crate::{AgentId, MonsterId, Orientation, Position, RobotId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub tick: u64,
    pub robots_alive: usize,
    pub monsters_alive: usize,
    pub monsters_destroyed: u64,
    pub total_score: i64,
}

/// Exclusively owns all world state. Agents refer to each other only through ids.
#[derive(Debug, Clone)]
pub struct Environment {
    grid: Grid,
    robots: Vec<Robot>,
    monsters: Vec<Monster>,
    tick: u64,
    rng: SplitMix64,
}

/// Borrowed read view used while a robot senses and decides.
struct Occupancy<'a> {
    grid: &'a Grid,
    robots: &'a [Robot],
    monsters: &'a [Monster],
}

impl Terrain for Occupancy<'_> {
    fn is_valid(&self, pos: Position) -> bool {
        self.grid.is_valid(pos)
    }
}

impl WorldView for Occupancy<'_> {
    fn monster_at(&self, pos: Position) -> bool {
        self.monsters
            .iter()
            .any(|m| m.is_alive() && m.position() == pos)
    }

    fn robot_id_at(&self, pos: Position) -> Option<RobotId> {
        self.robots
            .iter()
            .find(|r| r.is_alive() && r.position() == pos)
            .map(Robot::id)
    }
}

impl Environment {
    /// Build a randomized world: carve voids, then place robots (each followed by its heading
    /// draw) and monsters on distinct free cells, all from one seeded stream.
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = config.rng();

        let grid = Grid::generate(config.side, config.void_count(), &mut rng)?;
        let requested = config.robots + config.monsters;
        if grid.free_count() < requested {
            return Err(SimError::InsufficientFreeCells {
                free: grid.free_count(),
                requested,
            });
        }

        let mut free = DistinctSampler::new(grid.free_positions());
        let mut robots = Vec::with_capacity(config.robots);
        for i in 0..config.robots {
            let position = free
                .draw(&mut rng)
                .ok_or(SimError::InsufficientFreeCells {
                    free: grid.free_count(),
                    requested,
                })?;
            let orientation = *rng::choose(&mut rng, &Orientation::ALL)
                .ok_or_else(|| SimError::InvalidConfig("no orientations".into()))?;
            robots.push(Robot::new(RobotId(i as u32), position, orientation));
        }

        let monsters = free
            .draw_many(&mut rng, config.monsters)
            .into_iter()
            .enumerate()
            .map(|(i, position)| Monster::new(MonsterId(i as u32), position, config.monster))
            .collect::<Vec<_>>();

        tracing::info!(
            side = config.side,
            voids = grid.void_count(),
            robots = robots.len(),
            monsters = monsters.len(),
            seed = ?config.seed,
            "environment created"
        );

        Ok(Self {
            grid,
            robots,
            monsters,
            tick: 0,
            rng,
        })
    }

    /// Build a world with an explicit layout. Ids follow slice order.
    pub fn from_layout(
        grid: Grid,
        robots: &[(Position, Orientation)],
        monsters: &[Position],
        behavior: MonsterConfig,
        seed: u64,
    ) -> Result<Self> {
        let mut occupied = BTreeSet::new();
        let cells = robots.iter().map(|(p, _)| *p).chain(monsters.iter().copied());
        for position in cells {
            if !grid.is_valid(position) {
                return Err(SimError::InvalidPlacement {
                    position,
                    reason: "cell is void or outside the grid",
                });
            }
            if !occupied.insert(position) {
                return Err(SimError::InvalidPlacement {
                    position,
                    reason: "cell already occupied",
                });
            }
        }

        let robots = robots
            .iter()
            .enumerate()
            .map(|(i, (p, o))| Robot::new(RobotId(i as u32), *p, *o))
            .collect();
        let monsters = monsters
            .iter()
            .enumerate()
            .map(|(i, p)| Monster::new(MonsterId(i as u32), *p, behavior))
            .collect();

        Ok(Self {
            grid,
            robots,
            monsters,
            tick: 0,
            rng: SplitMix64::new(seed),
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub fn monsters(&self) -> &[Monster] {
        &self.monsters
    }

    pub fn robot(&self, id: RobotId) -> Option<&Robot> {
        self.robots.get(id.index())
    }

    pub fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.get(id.index())
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn neighbors(&self, pos: Position) -> [Position; 6] {
        self.grid.neighbors(pos)
    }

    pub fn stats(&self) -> Stats {
        Stats {
            tick: self.tick,
            robots_alive: self.robots.iter().filter(|r| r.is_alive()).count(),
            monsters_alive: self.monsters.iter().filter(|m| m.is_alive()).count(),
            monsters_destroyed: self.robots.iter().map(|r| r.kills() as u64).sum(),
            total_score: self.robots.iter().map(Robot::score).sum(),
        }
    }

    /// Advance one tick: every living robot runs a full cycle in creation order, then every
    /// living monster runs its reflex cycle on the resulting world.
    pub fn tick(&mut self) {
        self.tick += 1;

        for index in 0..self.robots.len() {
            if self.robots[index].is_alive() {
                self.run_robot_cycle(index);
            }
        }

        for monster in self.monsters.iter_mut().filter(|m| m.is_alive()) {
            monster.cycle(self.tick, &self.grid, &mut self.rng);
        }
    }

    fn run_robot_cycle(&mut self, index: usize) {
        let tick = self.tick;
        let view = Occupancy {
            grid: &self.grid,
            robots: &self.robots,
            monsters: &self.monsters,
        };
        let robot = &self.robots[index];
        let perception = robot.perceive(&view, tick);
        let decision = robot.decide(&perception, &view, &mut self.rng);

        let robot = &mut self.robots[index];
        tracing::debug!(
            robot = %robot.id(),
            tick,
            at = %robot.position(),
            rule = ?decision.rule,
            action = %decision.action,
            "robot decided"
        );
        if let Some(peer) = decision.peer {
            robot.note_communication(tick, peer, decision.action);
        }

        let outcome = robot.act(decision.action, &self.grid, &mut self.monsters, &mut self.rng);
        robot.learn(perception.with_outcome(&outcome), decision.action);
    }

    /// Convenience for callers driving a single robot by hand.
    pub fn perceive(&self, id: RobotId) -> Option<crate::robot::Perception> {
        let robot = self.robot(id)?;
        Some(robot.perceive(self, self.tick))
    }

    pub fn decide(&mut self, id: RobotId) -> Option<Action> {
        let index = id.index();
        let perception = self.perceive(id)?;
        let view = Occupancy {
            grid: &self.grid,
            robots: &self.robots,
            monsters: &self.monsters,
        };
        let decision = self.robots[index].decide(&perception, &view, &mut self.rng);
        Some(decision.action)
    }

    fn occupancy(&self) -> Occupancy<'_> {
        Occupancy {
            grid: &self.grid,
            robots: &self.robots,
            monsters: &self.monsters,
        }
    }
}

impl Terrain for Environment {
    fn is_valid(&self, pos: Position) -> bool {
        self.grid.is_valid(pos)
    }
}

impl WorldView for Environment {
    fn monster_at(&self, pos: Position) -> bool {
        self.occupancy().monster_at(pos)
    }

    fn robot_id_at(&self, pos: Position) -> Option<RobotId> {
        self.occupancy().robot_id_at(pos)
    }
}
