//! SinkShip Headless Simulation Harness
//!
//! Validates the character logic and the bundled game config without a game
//! engine. Runs entirely in-process: no window, no physics engine, no audio.
//!
//! Usage:
//!   cargo run -p sinkship-simtest
//!   cargo run -p sinkship-simtest -- --verbose

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sinkship_core::components::Trigger;
use sinkship_core::generation::{generate_ship, ShipConfig};
use sinkship_core::prelude::*;
use sinkship_logic::character::{CharacterEvent, EntityId, Interactable, LadderRef};
use sinkship_logic::config::{ConfigError, ConfigIssue};

// ── Game config (same JSON a host would load) ───────────────────────────
const CONFIG_JSON: &str = include_str!("../../../data/game_config.json");

const DT: f32 = 0.02;

// ── Logging ─────────────────────────────────────────────────────────────

/// Warnings only by default, debug with `--verbose`. `RUST_LOG` still wins.
fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .target(env_logger::Target::Stdout)
        .init();
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    init_logging(verbose);
    println!("=== SinkShip Simulation Harness ===\n");

    let config = match GameConfig::from_json_str(CONFIG_JSON) {
        Ok(c) => c,
        Err(e) => {
            println!("  ✗ config_parse: {}", e);
            std::process::exit(1);
        }
    };

    let mut results = Vec::new();

    // 1. Game config validation
    results.extend(validate_game_config(&config, verbose));

    // 2. Climbing rules
    results.extend(validate_climbing(&config));

    // 3. Repair threshold
    results.extend(validate_repairing(&config, verbose));

    // 4. Death is terminal
    results.extend(validate_death(&config));

    // 5. Water boundaries
    results.extend(validate_water(&config));

    // 6. Full ship run
    results.extend(validate_ship_run(&config, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Fixtures ────────────────────────────────────────────────────────────

const LADDER: LadderRef = LadderRef {
    id: EntityId(1),
    transition_floor: EntityId(2),
};
const BREACH: EntityId = EntityId(3);
const DOOR: EntityId = EntityId(4);

/// Apply one random operation; rejected calls are expected and ignored.
fn random_op(c: &mut Character, rng: &mut StdRng) {
    let target = Vec2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
    let result = match rng.gen_range(0..12) {
        0 => {
            c.on_trigger_enter(Interactable::Ladder(LADDER));
            Ok(())
        }
        1 => {
            c.on_trigger_enter(Interactable::Breach(BREACH));
            Ok(())
        }
        2 => {
            c.on_trigger_enter(Interactable::Door(DOOR));
            Ok(())
        }
        3 => {
            c.on_trigger_exit(LADDER.id);
            Ok(())
        }
        4 => c.start_climbing(),
        5 => c.stop_climbing(),
        6 => c.walk_to(target),
        7 => c.climb_to(target),
        8 => c.start_repairing(),
        9 => c.repair_hit().map(|_| ()),
        10 => c.toggle_door(),
        _ => {
            c.physics_step(DT);
            Ok(())
        }
    };
    if let Err(e) = result {
        log::trace!("random op rejected: {}", e);
    }
}

// ── 1. Game Config ──────────────────────────────────────────────────────

fn validate_game_config(config: &GameConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Game Config ---");
    let mut results = Vec::new();

    let issues = config.validate();
    results.push(TestResult::new(
        "config_valid",
        issues.is_empty(),
        format!("{} issues", issues.len()),
    ));

    results.push(TestResult::new(
        "config_matches_defaults",
        *config == GameConfig::default(),
        "bundled file equals built-in defaults",
    ));

    let partial = GameConfig::from_json_str(r#"{ "repair_hits_needed": 2 }"#);
    results.push(TestResult::new(
        "config_partial_override",
        matches!(&partial, Ok(c) if c.repair_hits_needed == 2 && c.walk_speed == config.walk_speed),
        "unnamed fields keep their defaults",
    ));

    let zero = GameConfig::from_json_str(r#"{ "repair_hits_needed": 0 }"#);
    results.push(TestResult::new(
        "config_rejects_zero_hits",
        matches!(&zero, Err(ConfigError::Invalid(i)) if i.contains(&ConfigIssue::ZeroRepairHits)),
        match &zero {
            Err(e) => e.to_string(),
            Ok(_) => "accepted".into(),
        },
    ));

    let malformed = GameConfig::from_json_str("{ walk_speed: ");
    results.push(TestResult::new(
        "config_rejects_malformed",
        matches!(malformed, Err(ConfigError::Parse(_))),
        "syntax errors surface as Parse",
    ));

    let missing = GameConfig::load("does/not/exist.json");
    results.push(TestResult::new(
        "config_missing_file_errors",
        matches!(missing, Err(ConfigError::Io(_))),
        "no silent fallback to defaults",
    ));

    if verbose {
        println!(
            "  walk {} m/s, climb {} m/s, {} hits per breach",
            config.walk_speed, config.climb_speed, config.repair_hits_needed
        );
    }

    results
}

// ── 2. Climbing ─────────────────────────────────────────────────────────

fn validate_climbing(config: &GameConfig) -> Vec<TestResult> {
    println!("--- Climbing ---");
    let mut results = Vec::new();

    // Strict alternation with one collision event per transition
    let mut c = Character::new(config.clone(), Vec2::ZERO);
    c.on_trigger_enter(Interactable::Ladder(LADDER));
    let mut rng = StdRng::seed_from_u64(7);
    let mut violations = 0;
    for _ in 0..1_000 {
        let was = c.is_climbing();
        let ok = if rng.gen_bool(0.5) {
            c.start_climbing().is_ok() == !was
        } else {
            c.stop_climbing().is_ok() == was
        };
        let events = c.drain_events().len();
        let expected = usize::from(c.is_climbing() != was);
        if !ok || events != expected {
            violations += 1;
        }
    }
    results.push(TestResult::new(
        "climb_strict_alternation",
        violations == 0,
        format!("{} violations in 1000 calls", violations),
    ));

    let mut c = Character::new(config.clone(), Vec2::ZERO);
    results.push(TestResult::new(
        "climb_requires_ladder",
        c.start_climbing() == Err(CharacterError::NoLadder) && !c.is_climbing(),
        "start without ladder is rejected",
    ));

    // Ladder enter, climb three steps, ladder exit
    let mut c = Character::new(config.clone(), Vec2::ZERO);
    c.on_trigger_enter(Interactable::Ladder(LADDER));
    let mut ok = c.start_climbing().is_ok();
    for i in 1..=3 {
        ok &= c.climb_to(Vec2::new(0.0, i as f32 * 0.1)).is_ok();
        c.physics_step(DT);
    }
    c.drain_events();
    c.on_trigger_exit(LADDER.id);
    let restored = c.drain_events()
        == vec![CharacterEvent::SetCollisionIgnored {
            floor: LADDER.transition_floor,
            ignored: false,
        }];
    results.push(TestResult::new(
        "climb_ladder_exit_scenario",
        ok && restored && !c.is_climbing() && c.ladder().is_none(),
        format!("ended {} at y={:.2}", c.activity().name(), c.position().y),
    ));

    // A second ladder overlapping the climbed one must not take its floor
    let upper = LadderRef {
        id: EntityId(5),
        transition_floor: EntityId(6),
    };
    let mut c = Character::new(config.clone(), Vec2::ZERO);
    c.on_trigger_enter(Interactable::Ladder(LADDER));
    let started = c.start_climbing().is_ok();
    c.on_trigger_enter(Interactable::Ladder(upper));
    c.drain_events();
    c.on_trigger_exit(LADDER.id);
    let events = c.drain_events();
    results.push(TestResult::new(
        "climb_overlapping_ladders",
        started
            && events
                == vec![CharacterEvent::SetCollisionIgnored {
                    floor: LADDER.transition_floor,
                    ignored: false,
                }],
        format!("{} events on leaving the climbed ladder", events.len()),
    ));

    results
}

// ── 3. Repairing ────────────────────────────────────────────────────────

fn validate_repairing(config: &GameConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Repairing ---");
    let mut results = Vec::new();
    let needed = config.repair_hits_needed;

    let mut c = Character::new(config.clone(), Vec2::ZERO);
    c.on_trigger_enter(Interactable::Breach(BREACH));
    let started = c.start_repairing().is_ok();
    let mut early = 0;
    for _ in 1..needed {
        if !matches!(c.repair_hit(), Ok(RepairProgress::Hit { .. })) {
            early += 1;
        }
    }
    let last = c.repair_hit();
    let completions = c
        .drain_events()
        .iter()
        .filter(|e| matches!(e, CharacterEvent::BreachRepaired { .. }))
        .count();
    results.push(TestResult::new(
        "repair_exact_threshold",
        started
            && early == 0
            && last == Ok(RepairProgress::Completed { breach: BREACH })
            && completions == 1
            && !c.is_repairing(),
        format!("{} hits, {} completion events", needed, completions),
    ));

    results.push(TestResult::new(
        "repair_no_extra_hit",
        c.repair_hit() == Err(CharacterError::NotRepairing),
        "hit after completion is rejected",
    ));

    let mut c = Character::new(config.clone(), Vec2::ZERO);
    c.on_trigger_enter(Interactable::Breach(BREACH));
    let mut partial_ok = true;
    for _ in 0..5 {
        partial_ok &= c.start_repairing().is_ok();
        for _ in 1..needed {
            partial_ok &= c.repair_hit().is_ok();
        }
        partial_ok &= c.stop_repairing().is_ok();
    }
    results.push(TestResult::new(
        "repair_partial_never_completes",
        partial_ok && c.drain_events().is_empty(),
        format!("5 rounds of {} hits", needed.saturating_sub(1)),
    ));

    if verbose {
        println!("  {} hits needed per breach", needed);
    }

    results
}

// ── 4. Death ────────────────────────────────────────────────────────────

fn validate_death(config: &GameConfig) -> Vec<TestResult> {
    println!("--- Death ---");
    let mut results = Vec::new();

    let mut rng = StdRng::seed_from_u64(2024);
    let mut escaped = 0;
    for _ in 0..200 {
        let mut c = Character::new(config.clone(), Vec2::ZERO);
        for _ in 0..rng.gen_range(0..30) {
            random_op(&mut c, &mut rng);
        }
        c.die();
        for _ in 0..100 {
            random_op(&mut c, &mut rng);
            if !c.is_dead() {
                escaped += 1;
                break;
            }
        }
    }
    results.push(TestResult::new(
        "death_is_terminal",
        escaped == 0,
        format!("{} of 200 characters left Dead", escaped),
    ));

    let mut c = Character::new(config.clone(), Vec2::ZERO);
    c.die();
    c.die();
    let died = c
        .drain_events()
        .iter()
        .filter(|e| matches!(e, CharacterEvent::Died { .. }))
        .count();
    results.push(TestResult::new(
        "death_idempotent",
        died == 1,
        format!("{} death events for two calls", died),
    ));

    results
}

// ── 5. Water ────────────────────────────────────────────────────────────

fn validate_water(config: &GameConfig) -> Vec<TestResult> {
    println!("--- Water ---");
    let mut results = Vec::new();

    let area = Rect::new(Vec2::new(-2.0, -3.0), Vec2::new(2.0, 1.0));
    let corners = [
        Vec2::new(-2.0, -3.0),
        Vec2::new(-2.0, 1.0),
        Vec2::new(2.0, 1.0),
        Vec2::new(2.0, -3.0),
    ];
    let all_corners = corners.iter().all(|&p| area.contains(p));
    results.push(TestResult::new(
        "water_edges_inclusive",
        all_corners && area.contains(Vec2::new(0.0, 1.0)),
        "corners and edges count as submerged",
    ));

    let mut c = Character::new(config.clone(), Vec2::new(5.0, 0.0));
    c.set_water_areas(vec![area]);
    c.update_frame(&|_, _| false);
    let dry_outside = !c.head_under_water() && !c.feet_under_water();

    let mut c = Character::new(config.clone(), Vec2::ZERO);
    c.update_frame(&|_, _| false);
    let dry_without_water = !c.head_under_water() && !c.feet_under_water();
    results.push(TestResult::new(
        "water_dry_cases",
        dry_outside && dry_without_water,
        "outside every rectangle, or with none, is dry",
    ));

    results
}

// ── 6. Ship Run ─────────────────────────────────────────────────────────

fn validate_ship_run(config: &GameConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Ship Run ---");
    let mut results = Vec::new();

    let ship_config = ShipConfig {
        breach_chance: 1.0,
        water_level: None,
        ..ShipConfig::default()
    };
    let mut sim = ShipSim::new(config.clone(), Vec2::new(1.0, 0.5));
    let mut rng = StdRng::seed_from_u64(42);
    let layout = generate_ship(&mut sim, &ship_config, &mut rng);

    results.push(TestResult::new(
        "ship_generated",
        sim.room_count() == layout.room_count() && !layout.breaches.is_empty(),
        format!(
            "'{}': {} rooms, {} breaches",
            layout.name,
            layout.room_count(),
            layout.breaches.len()
        ),
    ));
    let sinking_before = sim.is_sinking();

    // Walk to each breach and hammer it shut
    let mut repaired = 0;
    for &breach in &layout.breaches {
        let Ok(center) = sim.world.get::<&Trigger>(breach).map(|t| t.0.center()) else {
            continue;
        };
        let Some(spot) = layout
            .decks
            .iter()
            .position(|d| d.floor_y <= center.y && center.y < d.floor_y + ship_config.deck_height)
            .and_then(|level| layout.standing_spot(level, center.x))
        else {
            continue;
        };
        sim.character_mut().place_at(spot);
        let _ = sim.step(PlayerInput::idle(), DT);
        for _ in 0..config.repair_hits_needed {
            let _ = sim.step(PlayerInput::hammer(), DT);
        }
        if sim.breach_repaired(breach) == Some(true) {
            repaired += 1;
        }
    }
    results.push(TestResult::new(
        "ship_all_breaches_repaired",
        repaired == layout.breaches.len() && sim.leaking_room_count() == 0,
        format!("{}/{} repaired", repaired, layout.breaches.len()),
    ));
    results.push(TestResult::new(
        "ship_stops_sinking",
        sinking_before && !sim.is_sinking(),
        format!("sinking before: {}, after: {}", sinking_before, sim.is_sinking()),
    ));

    // Climb the first ladder from the bottom deck
    let climbed = match (layout.ladders.first(), layout.decks.get(1)) {
        (Some(&ladder), Some(upper)) => {
            let x = sim
                .world
                .get::<&Trigger>(ladder)
                .map(|t| t.0.center().x)
                .unwrap_or_default();
            if let Some(spot) = layout.standing_spot(0, x) {
                sim.character_mut().place_at(spot);
            }
            let _ = sim.step(PlayerInput::idle(), DT);
            let _ = sim.step(PlayerInput::climb(1.0), DT);
            // The top of the ladder volume ends the climb
            let mut steps = 0;
            while steps < 1_000 && sim.character().is_climbing() {
                let _ = sim.step(PlayerInput::climb(1.0), DT);
                steps += 1;
            }
            for _ in 0..100 {
                let _ = sim.step(PlayerInput::idle(), DT);
            }
            let feet = sim.character().feet_position().y;
            if verbose {
                println!("  climbed for {} steps, feet at {:.3}", steps, feet);
            }
            (feet - upper.floor_y).abs() < 1e-3
        }
        _ => false,
    };
    results.push(TestResult::new(
        "ship_climb_to_next_deck",
        climbed,
        "character ends standing on the deck above",
    ));

    // Drown in a flooded hold
    sim.spawn_water(Rect::new(
        Vec2::new(-1.0, -1.0),
        Vec2::new(layout.width + 1.0, 100.0),
    ));
    let _ = sim.step(PlayerInput::idle(), DT);
    let under = sim.character().head_under_water();
    sim.kill();
    let start = sim.character().position().y;
    let mut dead_steps = 0;
    for _ in 0..100 {
        if sim.step(PlayerInput::walk(1.0), DT) == Ok(StepOutcome::Dead) {
            dead_steps += 1;
        }
    }
    results.push(TestResult::new(
        "ship_drowned_body_floats",
        under && dead_steps == 100 && sim.character().position().y > start,
        format!(
            "rose {:.3} m in 100 steps",
            sim.character().position().y - start
        ),
    ));

    results
}
