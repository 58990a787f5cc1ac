use crate::{Position, RobotId};

/// Static terrain queries.
///
/// Monsters consume nothing else, which keeps their reflex cycle independent of the agent
/// roster.
pub trait Terrain {
    /// True iff `pos` is inside the cube and the cell is free.
    fn is_valid(&self, pos: Position) -> bool;

    fn valid_neighbors(&self, pos: Position) -> Vec<Position> {
        pos.neighbors()
            .into_iter()
            .filter(|n| self.is_valid(*n))
            .collect()
    }
}

/// Read-only world access for sensing and deciding.
///
/// Occupancy queries only ever report living agents.
pub trait WorldView: Terrain {
    fn monster_at(&self, pos: Position) -> bool;

    fn robot_id_at(&self, pos: Position) -> Option<RobotId>;

    fn robot_at(&self, pos: Position) -> bool {
        self.robot_id_at(pos).is_some()
    }
}
