//! Deterministic robot/monster pursuit on a bounded 3D grid.
//!
//! Robots are memory-based agents running a sense → decide → act → learn cycle; monsters are
//! simple reflex agents. The [`Environment`] owns all world state and advances it one tick at a
//! time, and the [`Simulation`] drives ticks until a terminal condition or the tick budget.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod config;
pub mod environment;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod monster;
pub mod rng;
pub mod robot;
pub mod simulation;
pub mod world;

pub use agent::{AgentId, MonsterId, RobotId};
pub use config::{MonsterConfig, SimulationConfig};
pub use environment::{Environment, Stats};
pub use error::{Result, SimError};
pub use geometry::{Orientation, Position};
pub use grid::{Cell, Grid};
pub use monster::Monster;
pub use rng::{DeterministicRng, SplitMix64};
pub use robot::{Action, Perception, Robot};
pub use simulation::{
    EnvironmentProfile, EnvironmentProfiles, RobotDetails, RobotReport, Simulation,
    SimulationReport, Termination,
};
pub use world::{Terrain, WorldView};
