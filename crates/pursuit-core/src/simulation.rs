//! Simulation controller: tick loop, terminal conditions and the final report.

use serde::Serialize;

use crate::config::SimulationConfig;
use crate::environment::{Environment, Stats};
use crate::error::Result;
use crate::robot::{
    CommunicationRecord, EpisodeAnalysis, PerceptionActionSummary, Rationality, Robot, TableRow,
    DEFAULT_EPISODE_WINDOW, DEFAULT_LOOP_WINDOW,
};
use crate::{Orientation, Position, RobotId};

/// Progress is logged every this many iterations.
const PROGRESS_EVERY: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Every monster was destroyed.
    AllMonstersDestroyed,
    /// Every robot was destroyed first.
    AllRobotsDestroyed,
    /// The tick budget ran out and both sides are still alive.
    TickBudgetExhausted,
}

impl Termination {
    /// Terminal condition reached by `stats`, if any. Success is checked first.
    pub fn reached(stats: &Stats) -> Option<Self> {
        if stats.monsters_alive == 0 {
            Some(Termination::AllMonstersDestroyed)
        } else if stats.robots_alive == 0 {
            Some(Termination::AllRobotsDestroyed)
        } else {
            None
        }
    }
}

/// Per-robot section of the report; only living robots are reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobotReport {
    pub id: RobotId,
    pub position: Position,
    pub orientation: Orientation,
    pub score: i64,
    pub kills: u32,
    pub moves: u32,
    pub collisions: u32,
    pub total_actions: usize,
    pub rules_learned: usize,
    pub rationality: Rationality,
    pub in_loop: bool,
    pub episode: EpisodeAnalysis,
    pub mapping: PerceptionActionSummary,
}

impl RobotReport {
    fn new(robot: &Robot, loop_window: usize, episode_window: usize) -> Self {
        let memory = robot.memory();
        Self {
            id: robot.id(),
            position: robot.position(),
            orientation: robot.orientation(),
            score: robot.score(),
            kills: robot.kills(),
            moves: robot.moves(),
            collisions: robot.collisions(),
            total_actions: memory.total_actions(),
            rules_learned: memory.rules().len(),
            rationality: memory.rationality_breakdown(),
            in_loop: robot.detect_loop(loop_window),
            episode: memory.episode_analysis(episode_window),
            mapping: memory.perception_action_summary(),
        }
    }
}

/// Task-environment properties of the world as seen by one kind of agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnvironmentProfile {
    /// The agent senses the whole world state.
    pub accessible: bool,
    /// The next state follows from the current state and the agent's action alone.
    pub deterministic: bool,
    /// Each decision is independent of earlier ones.
    pub episodic: bool,
    /// The world changes while the agent deliberates.
    pub dynamic: bool,
    /// Positions and time are integer-indexed.
    pub discrete: bool,
}

/// Environment classification per agent kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnvironmentProfiles {
    pub robot: EnvironmentProfile,
    pub monster: EnvironmentProfile,
}

impl EnvironmentProfiles {
    /// Robots sense locally and share a world with randomly moving monsters, so only their
    /// episodic entry depends on the run. Monsters sense nothing and always carry out the move
    /// they pick, with no memory between moves.
    pub fn classify(robots_episodic: bool) -> Self {
        Self {
            robot: EnvironmentProfile {
                accessible: false,
                deterministic: false,
                episodic: robots_episodic,
                dynamic: true,
                discrete: true,
            },
            monster: EnvironmentProfile {
                accessible: false,
                deterministic: true,
                episodic: true,
                dynamic: true,
                discrete: true,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub termination: Termination,
    pub stats: Stats,
    pub robots: Vec<RobotReport>,
    /// True iff at least one living robot is not currently loop-flagged.
    pub episodic: bool,
    pub loops_detected: usize,
    /// Mean rationality over living robots (0 when none survive).
    pub mean_rationality: f64,
    /// Monsters destroyed as a percentage of monsters placed.
    pub success_rate: f64,
    /// Monsters destroyed per tick.
    pub efficiency: f64,
    pub environment: EnvironmentProfiles,
}

/// Full per-robot trace: communication log and perception-action table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobotDetails {
    pub id: RobotId,
    pub communications: Vec<CommunicationRecord>,
    pub table: Vec<TableRow>,
}

impl RobotDetails {
    fn new(robot: &Robot) -> Self {
        let memory = robot.memory();
        Self {
            id: robot.id(),
            communications: memory.communications().to_vec(),
            table: memory.perception_action_table(),
        }
    }
}

pub struct Simulation {
    env: Environment,
    history: Vec<Stats>,
    loop_window: usize,
    episode_window: usize,
}

impl Simulation {
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            history: Vec::new(),
            loop_window: DEFAULT_LOOP_WINDOW,
            episode_window: DEFAULT_EPISODE_WINDOW,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        Ok(Self::new(Environment::new(config)?)
            .with_loop_window(config.loop_window)
            .with_episode_window(config.episode_window))
    }

    pub fn with_loop_window(mut self, window: usize) -> Self {
        self.loop_window = window;
        self
    }

    pub fn with_episode_window(mut self, window: usize) -> Self {
        self.episode_window = window;
        self
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Stats sampled at the start of every loop iteration so far.
    pub fn stats_history(&self) -> &[Stats] {
        &self.history
    }

    /// Run up to `max_ticks` iterations, stopping early on a terminal condition.
    ///
    /// A side emptied by the last budgeted tick still ends the run with that side's
    /// termination, not `TickBudgetExhausted`.
    pub fn run(&mut self, max_ticks: u64) -> SimulationReport {
        tracing::info!(max_ticks, "simulation started");

        let mut termination = None;
        for i in 0..max_ticks {
            let stats = self.env.stats();
            self.history.push(stats);

            if i % PROGRESS_EVERY == 0 {
                tracing::info!(
                    tick = stats.tick,
                    robots = stats.robots_alive,
                    monsters = stats.monsters_alive,
                    destroyed = stats.monsters_destroyed,
                    score = stats.total_score,
                    "progress"
                );
            }

            if let Some(reached) = Termination::reached(&stats) {
                termination = Some(reached);
                break;
            }

            self.env.tick();
        }

        let termination = termination
            .or_else(|| Termination::reached(&self.env.stats()))
            .unwrap_or(Termination::TickBudgetExhausted);
        let report = self.report(termination);
        tracing::info!(
            termination = ?report.termination,
            tick = report.stats.tick,
            destroyed = report.stats.monsters_destroyed,
            survivors = report.stats.robots_alive,
            episodic = report.episodic,
            "simulation finished"
        );
        report
    }

    pub fn report(&self, termination: Termination) -> SimulationReport {
        let stats = self.env.stats();
        let robots: Vec<RobotReport> = self
            .living_robots()
            .map(|r| RobotReport::new(r, self.loop_window, self.episode_window))
            .collect();

        let loops_detected = robots.iter().filter(|r| r.in_loop).count();
        let mean_rationality = if robots.is_empty() {
            0.0
        } else {
            robots.iter().map(|r| r.rationality.total).sum::<f64>() / robots.len() as f64
        };
        let placed = self.env.monsters().len();
        let success_rate = if placed == 0 {
            0.0
        } else {
            stats.monsters_destroyed as f64 / placed as f64 * 100.0
        };
        let episodic = robots.iter().any(|r| !r.in_loop);

        SimulationReport {
            termination,
            stats,
            episodic,
            loops_detected,
            mean_rationality,
            success_rate,
            efficiency: stats.monsters_destroyed as f64 / stats.tick.max(1) as f64,
            environment: EnvironmentProfiles::classify(episodic),
            robots,
        }
    }

    /// Communication logs and perception-action tables of the living robots.
    pub fn robot_details(&self) -> Vec<RobotDetails> {
        self.living_robots().map(RobotDetails::new).collect()
    }

    fn living_robots(&self) -> impl Iterator<Item = &Robot> + '_ {
        self.env.robots().iter().filter(|r| r.is_alive())
    }
}
