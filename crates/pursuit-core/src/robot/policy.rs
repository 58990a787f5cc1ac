//! Hierarchical decision policy.
//!
//! Rules are a ranked guard list evaluated top-down; the first rule whose guard matches the
//! perception resolves the action. Order: destroy > communicate > hunt > explore.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::rng::DeterministicRng;
use crate::world::WorldView;
use crate::{Robot, RobotId};

/// Probability of turning away from an already-visited cell while exploring.
pub const REVISIT_ROTATE_PROBABILITY: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Destroy,
    MoveForward,
    Rotate,
    /// No-op; never chosen by the rule table.
    Wait,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Destroy => "DESTROY",
            Action::MoveForward => "MOVE_FORWARD",
            Action::Rotate => "ROTATE",
            Action::Wait => "WAIT",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rule {
    Destroy,
    Communicate,
    Hunt,
    Explore,
}

/// Rules in priority order.
pub const RULES: [Rule; 4] = [Rule::Destroy, Rule::Communicate, Rule::Hunt, Rule::Explore];

impl Rule {
    pub fn applies(self, perception: &super::Perception) -> bool {
        match self {
            Rule::Destroy => perception.monster_in_cell,
            Rule::Communicate => perception.robot_ahead,
            Rule::Hunt => perception.monster_nearby,
            Rule::Explore => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub action: Action,
    pub rule: Rule,
    /// Robot the communication protocol resolved against, if any.
    pub peer: Option<RobotId>,
}

impl Decision {
    fn by(rule: Rule, action: Action) -> Self {
        Self {
            action,
            rule,
            peer: None,
        }
    }
}

pub(crate) fn decide<W, R>(
    robot: &Robot,
    perception: &super::Perception,
    world: &W,
    rng: &mut R,
) -> Decision
where
    W: WorldView + ?Sized,
    R: DeterministicRng + ?Sized,
{
    let rule = RULES
        .into_iter()
        .find(|rule| rule.applies(perception))
        .unwrap_or(Rule::Explore);

    match rule {
        Rule::Destroy => Decision::by(rule, Action::Destroy),
        Rule::Communicate => communicate(robot, world),
        Rule::Hunt => Decision::by(rule, hunt(robot, world)),
        Rule::Explore => Decision::by(rule, explore(robot, rng)),
    }
}

/// Identity-ordered pass/yield: the lower id keeps going, the higher id turns away.
fn communicate<W>(robot: &Robot, world: &W) -> Decision
where
    W: WorldView + ?Sized,
{
    let peer = world
        .robot_id_at(robot.forward())
        .filter(|other| *other != robot.id());

    let action = match peer {
        Some(other) if robot.id() < other => Action::MoveForward,
        _ => Action::Rotate,
    };
    Decision {
        action,
        rule: Rule::Communicate,
        peer,
    }
}

fn hunt<W>(robot: &Robot, world: &W) -> Action
where
    W: WorldView + ?Sized,
{
    let forward = robot.forward();
    if !robot.memory().is_known_void(forward) && world.is_valid(forward) {
        Action::MoveForward
    } else {
        Action::Rotate
    }
}

fn explore<R>(robot: &Robot, rng: &mut R) -> Action
where
    R: DeterministicRng + ?Sized,
{
    let forward = robot.forward();
    let memory = robot.memory();
    if memory.is_known_void(forward) {
        return Action::Rotate;
    }
    if memory.belief(forward).is_none() {
        return Action::MoveForward;
    }
    if rng.chance(REVISIT_ROTATE_PROBABILITY) {
        Action::Rotate
    } else {
        Action::MoveForward
    }
}
