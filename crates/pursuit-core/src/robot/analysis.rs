//! On-demand diagnostics over a robot's memory: rationality, loop and episode detection,
//! perception-action tables.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::memory::{effectiveness, Memory};
use super::{Action, RuleKey};
use crate::Orientation;

pub const DEFAULT_LOOP_WINDOW: usize = 10;
/// Window used by episode analysis when none is configured.
pub const DEFAULT_EPISODE_WINDOW: usize = 15;

/// Pattern length used by loop detection.
const PATTERN_LEN: usize = 3;
/// A pattern seen this many times within the window marks a loop.
const LOOP_REPETITIONS: usize = 3;
/// Below (or at) this distinct-action ratio a window is not considered episodic.
const MIN_VARIABILITY: f64 = 0.3;

/// Weighted rationality components; `total` is the clamped weighted sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rationality {
    pub effectiveness: f64,
    pub hunt_efficiency: f64,
    pub adaptability: f64,
    pub comm_efficiency: f64,
    pub total: f64,
}

impl Rationality {
    pub const EFFECTIVENESS_WEIGHT: f64 = 0.30;
    pub const HUNT_WEIGHT: f64 = 0.25;
    pub const ADAPTABILITY_WEIGHT: f64 = 0.25;
    pub const COMM_WEIGHT: f64 = 0.20;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeVerdict {
    InsufficientData,
    LoopDetected,
    LowVariability,
    Episodic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpisodeAnalysis {
    pub episodic: bool,
    pub in_loop: bool,
    /// Distinct length-3 patterns seen at least twice in the window.
    pub repeated_patterns: usize,
    /// Distinct actions divided by window length.
    pub variability: f64,
    pub verdict: EpisodeVerdict,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TableRow {
    pub step: usize,
    pub tick: u64,
    pub orientation: Orientation,
    pub monster_nearby: bool,
    pub monster_in_cell: bool,
    pub robot_ahead: bool,
    pub void_collision: bool,
    pub action: Action,
    pub effectiveness: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PerceptionActionSummary {
    pub total_entries: usize,
    pub distinct_situations: usize,
    pub rules_learned: usize,
    pub mean_effectiveness: f64,
}

impl Memory {
    /// Rationality in [0, 1]; exactly 0.0 before any action.
    pub fn rationality(&self) -> f64 {
        self.rationality_breakdown().total
    }

    pub fn rationality_breakdown(&self) -> Rationality {
        let total_actions = self.total_actions();
        if total_actions == 0 {
            return Rationality::default();
        }

        let c = self.counters();
        let actions = total_actions.max(1) as f64;

        let effectiveness =
            c.successful_moves as f64 / (c.successful_moves + c.collisions).max(1) as f64;
        let hunt_efficiency = (c.hunt_actions as f64 / actions).min(1.0);

        let rule_count = self.rules().len();
        let mean_confidence = if rule_count == 0 {
            0.0
        } else {
            self.rules().values().sum::<f64>() / rule_count as f64
        };
        let adaptability = (rule_count as f64 / 10.0).min(1.0) * mean_confidence;

        let comm_efficiency = (c.comm_successes as f64 / actions).min(1.0);

        let total = (Rationality::EFFECTIVENESS_WEIGHT * effectiveness
            + Rationality::HUNT_WEIGHT * hunt_efficiency
            + Rationality::ADAPTABILITY_WEIGHT * adaptability
            + Rationality::COMM_WEIGHT * comm_efficiency)
            .clamp(0.0, 1.0);

        Rationality {
            effectiveness,
            hunt_efficiency,
            adaptability,
            comm_efficiency,
            total,
        }
    }

    /// True when some length-3 action pattern repeats at least 3 times in the last `window`
    /// actions. Needs at least `2 * window` recorded actions.
    pub fn detect_loop(&self, window: usize) -> bool {
        if self.total_actions() < window.saturating_mul(2) {
            return false;
        }
        pattern_counts(&self.recent_actions(window))
            .values()
            .any(|count| *count >= LOOP_REPETITIONS)
    }

    pub fn episode_analysis(&self, window: usize) -> EpisodeAnalysis {
        if window == 0 || self.total_actions() < window {
            return EpisodeAnalysis {
                episodic: true,
                in_loop: false,
                repeated_patterns: 0,
                variability: 1.0,
                verdict: EpisodeVerdict::InsufficientData,
            };
        }

        let recent = self.recent_actions(window);
        let distinct: BTreeSet<Action> = recent.iter().copied().collect();
        let variability = distinct.len() as f64 / recent.len() as f64;
        let repeated_patterns = pattern_counts(&recent)
            .values()
            .filter(|count| **count >= 2)
            .count();
        let in_loop = self.detect_loop(window);

        let verdict = if in_loop {
            EpisodeVerdict::LoopDetected
        } else if variability <= MIN_VARIABILITY {
            EpisodeVerdict::LowVariability
        } else {
            EpisodeVerdict::Episodic
        };

        EpisodeAnalysis {
            episodic: verdict == EpisodeVerdict::Episodic,
            in_loop,
            repeated_patterns,
            variability,
            verdict,
        }
    }

    pub fn perception_action_table(&self) -> Vec<TableRow> {
        self.history()
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let p = &entry.perception;
                TableRow {
                    step: i + 1,
                    tick: p.tick,
                    orientation: p.orientation,
                    monster_nearby: p.monster_nearby,
                    monster_in_cell: p.monster_in_cell,
                    robot_ahead: p.robot_ahead,
                    void_collision: p.void_collision,
                    action: entry.action,
                    effectiveness: effectiveness(p, entry.action),
                }
            })
            .collect()
    }

    pub fn perception_action_summary(&self) -> PerceptionActionSummary {
        let history = self.history();
        if history.is_empty() {
            return PerceptionActionSummary::default();
        }

        let situations: BTreeSet<RuleKey> =
            history.iter().map(|e| e.perception.rule_key()).collect();
        let total: f64 = history
            .iter()
            .map(|e| effectiveness(&e.perception, e.action))
            .sum();

        PerceptionActionSummary {
            total_entries: history.len(),
            distinct_situations: situations.len(),
            rules_learned: self.rules().len(),
            mean_effectiveness: total / history.len() as f64,
        }
    }

    fn recent_actions(&self, window: usize) -> Vec<Action> {
        let history = self.history();
        let start = history.len().saturating_sub(window);
        history[start..].iter().map(|e| e.action).collect()
    }
}

fn pattern_counts(actions: &[Action]) -> BTreeMap<&[Action], usize> {
    let mut counts = BTreeMap::new();
    for pattern in actions.windows(PATTERN_LEN) {
        *counts.entry(pattern).or_insert(0) += 1;
    }
    counts
}
