use core::fmt::{self, Debug, Display};

use serde::{Deserialize, Serialize};

/// Stable identifier for an agent.
///
/// Deterministic simulation requires:
/// - stable ordering (`Ord`), which is also creation order
/// - a stable numeric ID (`stable_id`) for logs and roster lookups
pub trait AgentId: Copy + Ord + Eq + Debug {
    fn stable_id(self) -> u64;

    fn index(self) -> usize {
        self.stable_id() as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RobotId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonsterId(pub u32);

impl AgentId for RobotId {
    fn stable_id(self) -> u64 {
        self.0 as u64
    }
}

impl AgentId for MonsterId {
    fn stable_id(self) -> u64 {
        self.0 as u64
    }
}

impl Display for RobotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "robot-{}", self.0)
    }
}

impl Display for MonsterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "monster-{}", self.0)
    }
}
