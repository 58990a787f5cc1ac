use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{Action, Perception, RuleKey};
use crate::{Position, RobotId};

/// Exponential forgetting: `confidence = RETENTION * old + LEARNING_RATE * effectiveness`.
const RETENTION: f64 = 0.9;
const LEARNING_RATE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellBelief {
    Visited,
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub perception: Perception,
    pub action: Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunicationRecord {
    pub tick: u64,
    pub peer: RobotId,
    pub action: Action,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RationalityCounters {
    pub successful_moves: u64,
    pub collisions: u64,
    pub hunt_actions: u64,
    pub comm_successes: u64,
}

/// Append-only robot memory. Nothing is ever evicted or reordered.
#[derive(Debug, Clone, PartialEq)]
pub struct Memory {
    history: Vec<MemoryEntry>,
    beliefs: BTreeMap<Position, CellBelief>,
    displacement: Position,
    last_position: Position,
    known_voids: BTreeSet<Position>,
    rules: BTreeMap<RuleKey, f64>,
    counters: RationalityCounters,
    communications: Vec<CommunicationRecord>,
}

/// How well `action` served the situation in `perception`, in [0, 1].
pub fn effectiveness(perception: &Perception, action: Action) -> f64 {
    match action {
        Action::Destroy if perception.monster_in_cell => 1.0,
        Action::MoveForward if !perception.void_collision => 0.8,
        Action::Rotate if perception.robot_ahead => 0.7,
        Action::MoveForward => 0.1,
        _ => 0.5,
    }
}

impl Memory {
    pub fn new(start: Position) -> Self {
        Self {
            history: Vec::new(),
            beliefs: BTreeMap::new(),
            displacement: Position::ORIGIN,
            last_position: start,
            known_voids: BTreeSet::new(),
            rules: BTreeMap::new(),
            counters: RationalityCounters::default(),
            communications: Vec::new(),
        }
    }

    pub fn history(&self) -> &[MemoryEntry] {
        &self.history
    }

    pub fn total_actions(&self) -> usize {
        self.history.len()
    }

    pub fn beliefs(&self) -> &BTreeMap<Position, CellBelief> {
        &self.beliefs
    }

    pub fn belief(&self, pos: Position) -> Option<CellBelief> {
        self.beliefs.get(&pos).copied()
    }

    pub fn known_voids(&self) -> &BTreeSet<Position> {
        &self.known_voids
    }

    pub fn is_known_void(&self, pos: Position) -> bool {
        self.known_voids.contains(&pos)
    }

    /// Dead-reckoned displacement from the starting cell.
    pub fn displacement(&self) -> Position {
        self.displacement
    }

    pub fn last_position(&self) -> Position {
        self.last_position
    }

    pub fn rules(&self) -> &BTreeMap<RuleKey, f64> {
        &self.rules
    }

    pub fn confidence(&self, key: RuleKey) -> Option<f64> {
        self.rules.get(&key).copied()
    }

    pub fn counters(&self) -> RationalityCounters {
        self.counters
    }

    pub fn communications(&self) -> &[CommunicationRecord] {
        &self.communications
    }

    pub(crate) fn note_move(&mut self, from: Position, to: Position, step: (i32, i32, i32)) {
        self.displacement = self.displacement.offset(step);
        self.last_position = from;
        self.beliefs.insert(to, CellBelief::Visited);
    }

    pub(crate) fn note_void(&mut self, pos: Position) {
        self.known_voids.insert(pos);
        self.beliefs.insert(pos, CellBelief::Void);
    }

    pub(crate) fn note_communication(&mut self, tick: u64, peer: RobotId, action: Action) {
        self.communications.push(CommunicationRecord { tick, peer, action });
    }

    /// Learning step: log the merged record, reinforce its rule, bump rationality counters.
    pub(crate) fn record(&mut self, perception: Perception, action: Action) {
        self.history.push(MemoryEntry { perception, action });

        let score = effectiveness(&perception, action);
        self.rules
            .entry(perception.rule_key())
            .and_modify(|c| *c = RETENTION * *c + LEARNING_RATE * score)
            .or_insert(score);

        if action == Action::MoveForward {
            if perception.void_collision {
                self.counters.collisions += 1;
            } else {
                self.counters.successful_moves += 1;
            }
        }
        let steering = matches!(action, Action::MoveForward | Action::Rotate);
        if perception.monster_nearby && steering {
            self.counters.hunt_actions += 1;
        }
        if perception.robot_ahead && steering {
            self.counters.comm_successes += 1;
        }
    }
}
