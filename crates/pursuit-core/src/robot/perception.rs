use serde::{Deserialize, Serialize};

use crate::Orientation;

/// What a robot sensed at the start of its cycle, possibly merged with the outcome of the
/// action it then took.
///
/// `void_collision` is never sensed: it is only ever set by [`Perception::with_outcome`] after a
/// failed move, so the stored record reflects what happened on that tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perception {
    pub orientation: Orientation,
    pub monster_nearby: bool,
    pub monster_in_cell: bool,
    pub robot_ahead: bool,
    pub void_collision: bool,
    pub tick: u64,
}

impl Perception {
    pub fn with_outcome(self, outcome: &Outcome) -> Self {
        Self {
            void_collision: outcome.void_collision,
            ..self
        }
    }

    pub fn rule_key(&self) -> RuleKey {
        RuleKey {
            monster_nearby: self.monster_nearby,
            robot_ahead: self.robot_ahead,
            monster_in_cell: self.monster_in_cell,
            void_collision: self.void_collision,
        }
    }
}

/// Effects of acting that feed back into the stored perception.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub void_collision: bool,
    pub destroyed: Option<crate::MonsterId>,
}

/// Learned-rule key: the boolean perception flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleKey {
    pub monster_nearby: bool,
    pub robot_ahead: bool,
    pub monster_in_cell: bool,
    pub void_collision: bool,
}
