use pursuit_core::robot::{effectiveness, EpisodeVerdict, RuleKey, DEFAULT_LOOP_WINDOW};
use pursuit_core::{Action, Orientation, Perception, Position, Robot, RobotId};

const EPS: f64 = 1e-9;

fn blank(tick: u64) -> Perception {
    Perception {
        orientation: Orientation::East,
        monster_nearby: false,
        monster_in_cell: false,
        robot_ahead: false,
        void_collision: false,
        tick,
    }
}

fn fresh() -> Robot {
    Robot::new(RobotId(0), Position::new(1, 1, 1), Orientation::East)
}

fn feed(robot: &mut Robot, actions: &[Action]) {
    let start = robot.history().len() as u64;
    for (i, action) in actions.iter().enumerate() {
        robot.learn(blank(start + i as u64 + 1), *action);
    }
}

#[test]
fn rationality_is_zero_before_acting() {
    let robot = fresh();
    assert_eq!(robot.rationality(), 0.0);
    let breakdown = robot.memory().rationality_breakdown();
    assert_eq!(breakdown.total, 0.0);
    assert_eq!(breakdown.effectiveness, 0.0);
}

#[test]
fn effectiveness_table() {
    let mut p = blank(1);
    assert_eq!(effectiveness(&p, Action::MoveForward), 0.8);
    assert_eq!(effectiveness(&p, Action::Rotate), 0.5);
    assert_eq!(effectiveness(&p, Action::Destroy), 0.5);
    assert_eq!(effectiveness(&p, Action::Wait), 0.5);

    p.monster_in_cell = true;
    assert_eq!(effectiveness(&p, Action::Destroy), 1.0);

    p.robot_ahead = true;
    assert_eq!(effectiveness(&p, Action::Rotate), 0.7);

    p.void_collision = true;
    assert_eq!(effectiveness(&p, Action::MoveForward), 0.1);
}

#[test]
fn rule_confidence_decays_toward_recent_effectiveness() {
    let mut robot = fresh();
    let key = blank(0).rule_key();

    robot.learn(blank(1), Action::MoveForward);
    assert_eq!(robot.memory().confidence(key), Some(0.8));

    robot.learn(blank(2), Action::Rotate);
    let confidence = robot.memory().confidence(key).expect("rule");
    assert!((confidence - 0.77).abs() < EPS, "got {confidence}");
    assert_eq!(robot.memory().rules().len(), 1);
}

#[test]
fn single_successful_move_scores_as_expected() {
    let mut robot = fresh();
    robot.learn(blank(1), Action::MoveForward);

    let r = robot.memory().rationality_breakdown();
    assert!((r.effectiveness - 1.0).abs() < EPS);
    assert_eq!(r.hunt_efficiency, 0.0);
    assert!((r.adaptability - 0.08).abs() < EPS);
    assert_eq!(r.comm_efficiency, 0.0);
    assert!((r.total - 0.32).abs() < EPS, "got {}", r.total);
}

#[test]
fn mixed_history_rationality_and_mapping() {
    let mut robot = fresh();

    let mut hunting = blank(1);
    hunting.monster_nearby = true;
    robot.learn(hunting, Action::MoveForward);

    let mut blocked = blank(2);
    blocked.robot_ahead = true;
    robot.learn(blocked, Action::Rotate);

    let mut crashed = blank(3);
    crashed.void_collision = true;
    robot.learn(crashed, Action::MoveForward);

    let counters = robot.memory().counters();
    assert_eq!(counters.successful_moves, 1);
    assert_eq!(counters.collisions, 1);
    assert_eq!(counters.hunt_actions, 1);
    assert_eq!(counters.comm_successes, 1);

    let r = robot.memory().rationality_breakdown();
    assert!((r.effectiveness - 0.5).abs() < EPS);
    assert!((r.hunt_efficiency - 1.0 / 3.0).abs() < EPS);
    assert!((r.adaptability - 0.16).abs() < EPS);
    assert!((r.comm_efficiency - 1.0 / 3.0).abs() < EPS);
    assert!((r.total - 0.34).abs() < EPS, "got {}", r.total);

    let summary = robot.memory().perception_action_summary();
    assert_eq!(summary.total_entries, 3);
    assert_eq!(summary.distinct_situations, 3);
    assert_eq!(summary.rules_learned, 3);
    assert!((summary.mean_effectiveness - 1.6 / 3.0).abs() < EPS);

    let table = robot.memory().perception_action_table();
    let steps: Vec<usize> = table.iter().map(|row| row.step).collect();
    assert_eq!(steps, vec![1, 2, 3]);
    assert!(table[1].robot_ahead);
    assert_eq!(table[1].action, Action::Rotate);
    assert!((table[2].effectiveness - 0.1).abs() < EPS);
    assert!(table[2].void_collision);
}

#[test]
fn rationality_stays_in_unit_range() {
    let mut robot = fresh();
    for tick in 1..=60 {
        let mut p = blank(tick);
        p.monster_nearby = tick % 2 == 0;
        p.robot_ahead = tick % 3 == 0;
        p.monster_in_cell = tick % 7 == 0;
        p.void_collision = tick % 5 == 0;
        let action = match tick % 4 {
            0 => Action::Rotate,
            1 => Action::MoveForward,
            2 => Action::Destroy,
            _ => Action::Wait,
        };
        robot.learn(p, action);
        let total = robot.rationality();
        assert!((0.0..=1.0).contains(&total), "tick {tick}: {total}");
    }
}

#[test]
fn distinct_situations_learn_distinct_rules() {
    let mut robot = fresh();
    robot.learn(blank(1), Action::MoveForward);
    let mut p = blank(2);
    p.monster_in_cell = true;
    robot.learn(p, Action::Destroy);

    let expected = RuleKey {
        monster_nearby: false,
        robot_ahead: false,
        monster_in_cell: true,
        void_collision: false,
    };
    assert_eq!(robot.memory().confidence(expected), Some(1.0));
    assert_eq!(robot.memory().rules().len(), 2);
}

#[test]
fn loop_detection_needs_two_windows_of_history() {
    let mut robot = fresh();
    feed(&mut robot, &[Action::Rotate; 19]);
    assert!(!robot.detect_loop(DEFAULT_LOOP_WINDOW));

    feed(&mut robot, &[Action::Rotate]);
    assert!(robot.detect_loop(DEFAULT_LOOP_WINDOW));
}

#[test]
fn repeating_turn_and_advance_is_a_loop() {
    let mut robot = fresh();
    let cycle = [Action::Rotate, Action::MoveForward, Action::MoveForward];
    let actions: Vec<Action> = cycle.iter().copied().cycle().take(20).collect();
    feed(&mut robot, &actions);

    assert!(robot.detect_loop(10));

    let analysis = robot.memory().episode_analysis(10);
    assert!(analysis.in_loop);
    assert!(!analysis.episodic);
    assert_eq!(analysis.verdict, EpisodeVerdict::LoopDetected);
    assert_eq!(analysis.repeated_patterns, 3);
}

#[test]
fn varied_history_is_episodic() {
    use pursuit_core::Action::{Destroy as D, MoveForward as M, Rotate as R, Wait as W};

    let mut robot = fresh();
    feed(&mut robot, &[R; 10]);
    feed(&mut robot, &[M, R, W, D, M, M, R, R, W, D]);

    assert!(!robot.detect_loop(10));

    let analysis = robot.memory().episode_analysis(10);
    assert!(!analysis.in_loop);
    assert!(analysis.episodic);
    assert_eq!(analysis.verdict, EpisodeVerdict::Episodic);
    assert_eq!(analysis.repeated_patterns, 1);
    assert!((analysis.variability - 0.4).abs() < EPS);
}

#[test]
fn monotone_short_history_has_low_variability() {
    let mut robot = fresh();
    feed(&mut robot, &[Action::Rotate; 10]);

    let analysis = robot.memory().episode_analysis(10);
    assert!(!analysis.in_loop);
    assert!(!analysis.episodic);
    assert_eq!(analysis.verdict, EpisodeVerdict::LowVariability);
    assert!((analysis.variability - 0.1).abs() < EPS);
}

#[test]
fn short_history_is_insufficient_data() {
    let mut robot = fresh();
    feed(&mut robot, &[Action::Rotate; 4]);

    let analysis = robot.memory().episode_analysis(10);
    assert_eq!(analysis.verdict, EpisodeVerdict::InsufficientData);
    assert!(analysis.episodic);
}

#[test]
fn history_is_append_only_and_ordered() {
    let mut robot = fresh();
    feed(&mut robot, &[Action::MoveForward, Action::Rotate, Action::Wait]);
    let ticks: Vec<u64> = robot.history().iter().map(|e| e.perception.tick).collect();
    assert_eq!(ticks, vec![1, 2, 3]);

    feed(&mut robot, &[Action::Destroy]);
    assert_eq!(robot.history().len(), 4);
    assert_eq!(robot.history()[0].action, Action::MoveForward);
    assert_eq!(robot.history()[3].action, Action::Destroy);
}
