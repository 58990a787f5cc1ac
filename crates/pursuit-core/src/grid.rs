use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::rng::{DeterministicRng, DistinctSampler};
use crate::world::Terrain;
use crate::Position;

/// Largest supported side length. Coordinates must fit in `i32` and the cube in memory.
pub const MAX_SIDE: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Free,
    Void,
}

/// Fixed N×N×N cube of cells.
///
/// Everything outside the cube reads as `Void`, so agents can never leave it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    side: i32,
    cells: Vec<Cell>,
    void_count: usize,
}

impl Grid {
    /// All-free grid with void cells carved at `voids`.
    pub fn with_voids(side: u32, voids: impl IntoIterator<Item = Position>) -> Result<Self> {
        check_side(side)?;
        let n = side as usize;
        let mut grid = Self {
            side: side as i32,
            cells: vec![Cell::Free; n * n * n],
            void_count: 0,
        };
        for pos in voids {
            let idx = grid.idx(pos).ok_or(SimError::InvalidPlacement {
                position: pos,
                reason: "void cell outside the grid",
            })?;
            if grid.cells[idx] == Cell::Free {
                grid.cells[idx] = Cell::Void;
                grid.void_count += 1;
            }
        }
        Ok(grid)
    }

    /// Carve exactly `void_count` distinct void cells, sampled uniformly without replacement
    /// over the x-major enumeration of the cube.
    pub fn generate<R>(side: u32, void_count: usize, rng: &mut R) -> Result<Self>
    where
        R: DeterministicRng + ?Sized,
    {
        let blank = Self::with_voids(side, [])?;
        if void_count > blank.cell_count() {
            return Err(SimError::InvalidConfig(format!(
                "cannot carve {void_count} void cells out of {}",
                blank.cell_count()
            )));
        }
        let mut sampler = DistinctSampler::new(blank.positions().collect());
        let voids = sampler.draw_many(rng, void_count);
        Self::with_voids(side, voids)
    }

    pub fn side(&self) -> u32 {
        self.side as u32
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn void_count(&self) -> usize {
        self.void_count
    }

    pub fn free_count(&self) -> usize {
        self.cells.len() - self.void_count
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        let range = 0..self.side;
        range.contains(&pos.x) && range.contains(&pos.y) && range.contains(&pos.z)
    }

    pub fn cell(&self, pos: Position) -> Cell {
        self.idx(pos).map(|idx| self.cells[idx]).unwrap_or(Cell::Void)
    }

    /// The 6 axis-adjacent cells, valid or not.
    pub fn neighbors(&self, pos: Position) -> [Position; 6] {
        pos.neighbors()
    }

    /// Every cell of the cube, x-major then y then z.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let side = self.side;
        (0..side).flat_map(move |x| {
            (0..side).flat_map(move |y| (0..side).map(move |z| Position::new(x, y, z)))
        })
    }

    pub fn free_positions(&self) -> Vec<Position> {
        self.positions()
            .filter(|pos| self.cell(*pos) == Cell::Free)
            .collect()
    }

    fn idx(&self, pos: Position) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        let side = self.side as usize;
        Some((pos.x as usize * side + pos.y as usize) * side + pos.z as usize)
    }
}

pub(crate) fn check_side(side: u32) -> Result<()> {
    if side == 0 {
        return Err(SimError::InvalidConfig("side must be positive".into()));
    }
    if side > MAX_SIDE {
        return Err(SimError::InvalidConfig(format!(
            "side must be at most {MAX_SIDE}, got {side}"
        )));
    }
    Ok(())
}

impl Terrain for Grid {
    fn is_valid(&self, pos: Position) -> bool {
        self.cell(pos) == Cell::Free
    }
}
