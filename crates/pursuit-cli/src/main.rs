//! Pursuit CLI - run robot/monster pursuit simulations from the command line.
//!
//! - `pursuit run` - run a seeded simulation and print its report
//! - `pursuit defaults` - print the default configuration as YAML

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use pursuit_core::{
    EnvironmentProfile, RobotDetails, RobotReport, Simulation, SimulationConfig, SimulationReport,
    Termination,
};

/// Table rows shown per robot with `--details`.
const DETAIL_ROWS: usize = 10;

#[derive(Parser)]
#[command(name = "pursuit")]
#[command(about = "Robot/monster pursuit simulation on a 3D grid", version)]
struct Cli {
    /// Verbose output (per-decision logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation
    Run {
        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the configured seed
        #[arg(long)]
        seed: Option<u64>,

        /// Override the configured tick budget
        #[arg(long)]
        max_ticks: Option<u64>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Include per-robot communication logs and perception-action tables
        /// (the full tables under a `details` key with `--json`)
        #[arg(long)]
        details: bool,
    },

    /// Print the default configuration as YAML
    Defaults,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Run {
            config,
            seed,
            max_ticks,
            json,
            details,
        }) => run(config.as_deref(), seed, max_ticks, json, details),
        Some(Commands::Defaults) => print_defaults(),
        None => {
            println!("Pursuit - robot/monster pursuit simulation");
            println!();
            println!("Usage: pursuit <COMMAND>");
            println!();
            println!("Commands:");
            println!("  run       Run a simulation");
            println!("  defaults  Print the default configuration");
            println!();
            println!("Run 'pursuit --help' for more information.");
            Ok(())
        }
    }
}

fn run(
    config_path: Option<&Path>,
    seed: Option<u64>,
    max_ticks: Option<u64>,
    json: bool,
    details: bool,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => {
            let config = SimulationConfig::load(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            tracing::info!(path = %path.display(), "loaded configuration");
            config
        }
        None => SimulationConfig::default(),
    };
    if seed.is_some() {
        config.seed = seed;
    }
    if let Some(max_ticks) = max_ticks {
        config.max_ticks = max_ticks;
    }

    let mut sim = Simulation::from_config(&config).context("failed to build environment")?;
    let report = sim.run(config.max_ticks);

    if json {
        let mut value = serde_json::to_value(&report).context("failed to encode report")?;
        if details {
            let robots = serde_json::to_value(sim.robot_details())
                .context("failed to encode robot details")?;
            if let Some(object) = value.as_object_mut() {
                object.insert("details".to_string(), robots);
            }
        }
        let out = serde_json::to_string_pretty(&value).context("failed to encode report")?;
        println!("{out}");
        return Ok(());
    }

    print_report(&report);
    if details {
        print_details(&report, &sim);
    }
    Ok(())
}

fn print_defaults() -> Result<()> {
    let yaml = SimulationConfig::default()
        .to_yaml()
        .context("failed to encode default config")?;
    print!("{yaml}");
    Ok(())
}

fn describe(termination: Termination) -> &'static str {
    match termination {
        Termination::AllMonstersDestroyed => "all monsters destroyed",
        Termination::AllRobotsDestroyed => "all robots destroyed",
        Termination::TickBudgetExhausted => "tick budget exhausted",
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn print_report(report: &SimulationReport) {
    let stats = &report.stats;

    println!("Simulation Report");
    println!("=================");
    println!();
    println!("Termination:        {}", describe(report.termination));
    println!("Iterations:         {}", stats.tick);
    println!(
        "Monsters destroyed: {} ({:.1}%)",
        stats.monsters_destroyed, report.success_rate
    );
    println!("Robots surviving:   {}", stats.robots_alive);
    println!("Monsters remaining: {}", stats.monsters_alive);
    println!("Final score:        {}", stats.total_score);
    println!("Efficiency:         {:.3} kills/tick", report.efficiency);
    println!("Mean rationality:   {:.3}", report.mean_rationality);
    println!("Loops detected:     {}", report.loops_detected);
    println!("Episodic:           {}", yes_no(report.episodic));

    println!();
    println!(
        "{:<8} {:>10} {:>13} {:>8} {:>7} {:>8}",
        "agent", "accessible", "deterministic", "episodic", "dynamic", "discrete"
    );
    print_profile("robot", &report.environment.robot);
    print_profile("monster", &report.environment.monster);

    if report.robots.is_empty() {
        return;
    }

    println!();
    println!(
        "{:<10} {:<12} {:<8} {:>7} {:>5} {:>5} {:>5} {:>7} {:>5} {:>6} {:>6} {:>6} {:>6} {:>6} {:>4}",
        "robot", "position", "heading", "score", "kills", "moves", "coll", "actions", "rules",
        "total", "eff", "hunt", "adapt", "comm", "loop"
    );
    for robot in &report.robots {
        let r = &robot.rationality;
        println!(
            "{:<10} {:<12} {:<8} {:>7} {:>5} {:>5} {:>5} {:>7} {:>5} {:>6.3} {:>6.3} {:>6.3} {:>6.3} {:>6.3} {:>4}",
            robot.id.to_string(),
            robot.position.to_string(),
            format!("{:?}", robot.orientation),
            robot.score,
            robot.kills,
            robot.moves,
            robot.collisions,
            robot.total_actions,
            robot.rules_learned,
            r.total,
            r.effectiveness,
            r.hunt_efficiency,
            r.adaptability,
            r.comm_efficiency,
            yes_no(robot.in_loop),
        );
    }
}

fn print_profile(agent: &str, profile: &EnvironmentProfile) {
    println!(
        "{:<8} {:>10} {:>13} {:>8} {:>7} {:>8}",
        agent,
        yes_no(profile.accessible),
        yes_no(profile.deterministic),
        yes_no(profile.episodic),
        yes_no(profile.dynamic),
        yes_no(profile.discrete),
    );
}

fn print_details(report: &SimulationReport, sim: &Simulation) {
    let details = sim.robot_details();
    for (robot, detail) in report.robots.iter().zip(&details) {
        print_robot_details(robot, detail, sim);
    }
}

fn print_robot_details(robot: &RobotReport, detail: &RobotDetails, sim: &Simulation) {
    let episode = &robot.episode;
    let summary = &robot.mapping;

    println!();
    println!("{} at {}", robot.id, robot.position);
    println!(
        "  episode: {:?} (variability {:.2}, repeated patterns {})",
        episode.verdict, episode.variability, episode.repeated_patterns
    );
    println!(
        "  mapping: {} entries, {} situations, {} rules, mean effectiveness {:.3}",
        summary.total_entries,
        summary.distinct_situations,
        summary.rules_learned,
        summary.mean_effectiveness
    );
    if let Some(memory) = sim.environment().robot(robot.id).map(|r| r.memory()) {
        println!(
            "  map: {} cells known, {} voids, displacement {}",
            memory.beliefs().len(),
            memory.known_voids().len(),
            memory.displacement()
        );
    }

    if !detail.communications.is_empty() {
        println!("  communications:");
        for record in &detail.communications {
            println!(
                "    tick {:>4}: {} -> {}",
                record.tick, record.peer, record.action
            );
        }
    }

    let table = &detail.table;
    let start = table.len().saturating_sub(DETAIL_ROWS);
    if start < table.len() {
        println!(
            "  {:>5} {:>5} {:<8} {:>6} {:>6} {:>6} {:>6} {:<13} {:>5}",
            "step", "tick", "heading", "near", "here", "ahead", "crash", "action", "eff"
        );
    }
    for row in &table[start..] {
        println!(
            "  {:>5} {:>5} {:<8} {:>6} {:>6} {:>6} {:>6} {:<13} {:>5.2}",
            row.step,
            row.tick,
            format!("{:?}", row.orientation),
            yes_no(row.monster_nearby),
            yes_no(row.monster_in_cell),
            yes_no(row.robot_ahead),
            yes_no(row.void_collision),
            row.action.to_string(),
            row.effectiveness,
        );
    }
}
