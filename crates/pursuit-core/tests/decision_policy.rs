use std::collections::{BTreeMap, BTreeSet};

use pursuit_core::robot::{Rule, RULES};
use pursuit_core::{
    Action, Environment, Grid, MonsterConfig, Orientation, Perception, Position, Robot, RobotId,
    SplitMix64, Terrain, WorldView,
};

/// Unbounded, all-free world with hand-placed occupants.
#[derive(Default)]
struct TestWorld {
    voids: BTreeSet<Position>,
    monsters: BTreeSet<Position>,
    robots: BTreeMap<Position, RobotId>,
}

impl Terrain for TestWorld {
    fn is_valid(&self, pos: Position) -> bool {
        !self.voids.contains(&pos)
    }
}

impl WorldView for TestWorld {
    fn monster_at(&self, pos: Position) -> bool {
        self.monsters.contains(&pos)
    }

    fn robot_id_at(&self, pos: Position) -> Option<RobotId> {
        self.robots.get(&pos).copied()
    }
}

fn perception(monster_nearby: bool, monster_in_cell: bool, robot_ahead: bool) -> Perception {
    Perception {
        orientation: Orientation::North,
        monster_nearby,
        monster_in_cell,
        robot_ahead,
        void_collision: false,
        tick: 1,
    }
}

#[test]
fn rules_are_ranked_destroy_first() {
    assert_eq!(
        RULES,
        [Rule::Destroy, Rule::Communicate, Rule::Hunt, Rule::Explore]
    );
}

#[test]
fn monster_in_cell_overrides_everything() {
    let robot = Robot::new(RobotId(0), Position::ORIGIN, Orientation::North);
    let mut world = TestWorld::default();
    world.robots.insert(Position::new(0, 1, 0), RobotId(1));
    let mut rng = SplitMix64::new(5);

    let decision = robot.decide(&perception(true, true, true), &world, &mut rng);

    assert_eq!(decision.action, Action::Destroy);
    assert_eq!(decision.rule, Rule::Destroy);
    assert_eq!(decision.peer, None);
}

#[test]
fn lower_id_passes_and_higher_id_yields() {
    let ahead = Position::new(0, 1, 0);
    let mut rng = SplitMix64::new(5);

    let mut world = TestWorld::default();
    world.robots.insert(ahead, RobotId(4));
    let low = Robot::new(RobotId(2), Position::ORIGIN, Orientation::North);
    let decision = low.decide(&perception(true, false, true), &world, &mut rng);
    assert_eq!(decision.rule, Rule::Communicate);
    assert_eq!(decision.action, Action::MoveForward);
    assert_eq!(decision.peer, Some(RobotId(4)));

    let mut world = TestWorld::default();
    world.robots.insert(ahead, RobotId(1));
    let high = Robot::new(RobotId(2), Position::ORIGIN, Orientation::North);
    let decision = high.decide(&perception(true, false, true), &world, &mut rng);
    assert_eq!(decision.rule, Rule::Communicate);
    assert_eq!(decision.action, Action::Rotate);
    assert_eq!(decision.peer, Some(RobotId(1)));
}

#[test]
fn unresolved_peer_yields() {
    let robot = Robot::new(RobotId(0), Position::ORIGIN, Orientation::North);
    let world = TestWorld::default();
    let mut rng = SplitMix64::new(5);

    let decision = robot.decide(&perception(false, false, true), &world, &mut rng);

    assert_eq!(decision.rule, Rule::Communicate);
    assert_eq!(decision.action, Action::Rotate);
    assert_eq!(decision.peer, None);
}

#[test]
fn hunting_moves_toward_open_cells_only() {
    let robot = Robot::new(RobotId(0), Position::ORIGIN, Orientation::East);
    let mut rng = SplitMix64::new(5);

    let open = TestWorld::default();
    let decision = robot.decide(&perception(true, false, false), &open, &mut rng);
    assert_eq!(decision.rule, Rule::Hunt);
    assert_eq!(decision.action, Action::MoveForward);

    let mut blocked = TestWorld::default();
    blocked.voids.insert(Position::new(1, 0, 0));
    let decision = robot.decide(&perception(true, false, false), &blocked, &mut rng);
    assert_eq!(decision.rule, Rule::Hunt);
    assert_eq!(decision.action, Action::Rotate);
}

#[test]
fn hunting_avoids_remembered_voids() {
    let void = Position::new(1, 1, 2);
    let grid = Grid::with_voids(3, [void]).expect("grid");
    let mut robot = Robot::new(RobotId(0), Position::new(1, 1, 1), Orientation::Up);
    let mut rng = SplitMix64::new(5);
    robot.act(Action::MoveForward, &grid, &mut [], &mut rng);

    // This world claims the cell is open; memory still wins.
    let world = TestWorld::default();
    let decision = robot.decide(&perception(true, false, false), &world, &mut rng);
    assert_eq!(decision.action, Action::Rotate);
}

#[test]
fn exploring_unvisited_cell_moves_without_randomness() {
    let robot = Robot::new(RobotId(0), Position::ORIGIN, Orientation::South);
    let world = TestWorld::default();
    let mut rng = SplitMix64::new(21);

    let decision = robot.decide(&perception(false, false, false), &world, &mut rng);

    assert_eq!(decision.rule, Rule::Explore);
    assert_eq!(decision.action, Action::MoveForward);
    assert_eq!(rng, SplitMix64::new(21));
}

#[test]
fn exploring_known_void_rotates() {
    let grid = Grid::with_voids(3, []).expect("grid");
    let mut robot = Robot::new(RobotId(0), Position::ORIGIN, Orientation::Down);
    let mut rng = SplitMix64::new(21);
    robot.act(Action::MoveForward, &grid, &mut [], &mut rng);

    let decision = robot.decide(&perception(false, false, false), &TestWorld::default(), &mut rng);
    assert_eq!(decision.action, Action::Rotate);
}

#[test]
fn exploring_visited_cell_sometimes_turns_away() {
    let grid = Grid::with_voids(3, []).expect("grid");
    let mut robot = Robot::new(RobotId(0), Position::ORIGIN, Orientation::East);
    let mut rng = SplitMix64::new(8);
    robot.act(Action::MoveForward, &grid, &mut [], &mut rng);
    robot.act(Action::MoveForward, &grid, &mut [], &mut rng);
    assert_eq!(robot.position(), Position::new(2, 0, 0));

    let mut turns = 0;
    while robot.orientation() != Orientation::West {
        robot.act(Action::Rotate, &grid, &mut [], &mut rng);
        turns += 1;
        assert!(turns < 1000, "never turned west");
    }
    assert!(robot.memory().belief(robot.forward()).is_some());

    let world = TestWorld::default();
    let trials = 2000;
    let rotations = (0..trials)
        .filter(|_| {
            robot
                .decide(&perception(false, false, false), &world, &mut rng)
                .action
                == Action::Rotate
        })
        .count();
    assert!(
        (500..=700).contains(&rotations),
        "expected ~30% rotations, got {rotations}/{trials}"
    );
}

/// Side-3 world with five voids, two robots facing each other across (1,1,1)-(1,2,1).
fn facing_pair(seed: u64, swap_ids: bool) -> Environment {
    let voids = [
        Position::new(0, 0, 0),
        Position::new(2, 2, 2),
        Position::new(0, 2, 0),
        Position::new(2, 0, 2),
        Position::new(0, 0, 2),
    ];
    let grid = Grid::with_voids(3, voids).expect("grid");
    assert_eq!(grid.void_count(), 5);

    let lower = (Position::new(1, 1, 1), Orientation::North);
    let upper = (Position::new(1, 2, 1), Orientation::South);
    let robots = if swap_ids { [upper, lower] } else { [lower, upper] };
    Environment::from_layout(grid, &robots, &[], MonsterConfig::default(), seed).expect("env")
}

#[test]
fn facing_robots_resolve_by_identity() {
    for seed in 0..32 {
        let mut env = facing_pair(seed, false);
        assert!(env.perceive(RobotId(0)).expect("p").robot_ahead);
        assert!(env.perceive(RobotId(1)).expect("p").robot_ahead);
        assert_eq!(env.decide(RobotId(0)), Some(Action::MoveForward));
        assert_eq!(env.decide(RobotId(1)), Some(Action::Rotate));

        let mut swapped = facing_pair(seed, true);
        assert_eq!(swapped.decide(RobotId(0)), Some(Action::MoveForward));
        assert_eq!(swapped.decide(RobotId(1)), Some(Action::Rotate));
    }
}

#[test]
fn communication_is_logged_on_the_acting_robot() {
    let mut env = facing_pair(3, false);

    env.tick();

    let first = env.robot(RobotId(0)).expect("robot");
    let log = first.memory().communications();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].tick, 1);
    assert_eq!(log[0].peer, RobotId(1));
    assert_eq!(log[0].action, Action::MoveForward);
    assert_eq!(first.position(), Position::new(1, 2, 1));
    assert_eq!(first.memory().counters().comm_successes, 1);
}

#[test]
fn unknown_robot_has_no_decision() {
    let mut env = facing_pair(0, false);
    assert_eq!(env.decide(RobotId(9)), None);
    assert!(env.perceive(RobotId(9)).is_none());
}
