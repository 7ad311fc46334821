//! Headless run of a swarm hunting the player craft.
//!
//! Run with: RUST_LOG=info cargo run --example basic_demo

use override_sim::{PlayerInput, PointGravityField, SimConfig, SimEvent, SimWorld, Vec2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f32::consts::TAU;

/// The spawner keeps the swarm at this size.
const SWARM_SIZE: usize = 15;
const SPAWN_RADIUS: f32 = 2500.0;

fn main() {
    env_logger::init();
    println!("=== System Override - Swarm Demo ===\n");

    let mut sim = SimWorld::with_gravity(SimConfig::default(), PointGravityField::default())
        .expect("default config is valid");
    sim.spawn_planet("Terra", Vec2::new(0.0, 4000.0), 1200.0, 0.5, 2.0e6);

    let player = sim
        .spawn_player_craft(Vec2::ZERO, 0.0)
        .expect("fighter template is valid");
    sim.set_swarm_target(Some(player)).expect("player just spawned");

    let mut spawner_rng = ChaCha8Rng::seed_from_u64(11);
    let mut removed = 0usize;
    let mut shots = 0usize;

    // Ten seconds at 60 frames per second.
    for frame in 0..600 {
        while sim.spaceship_count() < SWARM_SIZE {
            let angle = spawner_rng.gen_range(0.0..TAU);
            let origin = sim
                .snapshot()
                .craft(player.0)
                .map(|c| Vec2::new(c.x, c.y))
                .unwrap_or(Vec2::ZERO);
            let pos = origin + Vec2::from_angle(angle) * SPAWN_RADIUS;
            let id = sim.spawn_craft(pos, angle).expect("fighter template is valid");
            sim.add_spacecraft(id).expect("craft just spawned");
        }

        // The player circles and shoots at the origin.
        sim.set_player_input(PlayerInput {
            movement: Vec2::new(0.3, -1.0),
            aim_point: Some(Vec2::new(0.0, -1000.0)),
            fire: frame % 10 == 0,
        });

        // Stand-in for projectile hits the host would resolve.
        if frame % 45 == 0 {
            if let Some(victim) = sim.swarm().roster().first().map(|entry| entry.craft) {
                let _ = sim.take_damage(victim, 40);
            }
        }

        sim.step(1.0 / 60.0);

        for event in sim.drain_events() {
            match event {
                SimEvent::CraftRemoved { craft } => {
                    removed += 1;
                    println!("  t={:5.2}s craft {} left the swarm", sim.current_time(), craft.0);
                }
                SimEvent::WeaponFired { .. } => shots += 1,
                SimEvent::PlayerDestroyed => println!("  player destroyed"),
                _ => {}
            }
        }

        if (frame + 1) % 120 == 0 {
            print_snapshot(&mut sim);
        }
    }

    println!("\nSwarm losses: {removed}, shots fired: {shots}");
    println!("\n=== Final State (JSON) ===\n");
    println!("{}", sim.snapshot_json());
}

fn print_snapshot(sim: &mut SimWorld) {
    let snapshot = sim.snapshot();
    println!(
        "--- Tick {} (t={:.1}s), {} craft ---",
        snapshot.tick,
        snapshot.time,
        snapshot.crafts.len()
    );
    for craft in snapshot.crafts.iter().filter(|c| c.is_player) {
        println!(
            "  player: pos=({:.0}, {:.0}) v=({:.0}, {:.0}) hp={}/{}",
            craft.x, craft.y, craft.vx, craft.vy, craft.health, craft.max_health
        );
    }
    let wrecks = snapshot.crafts.iter().filter(|c| c.is_destroyed).count();
    println!("  wrecks drifting: {wrecks}");
}
