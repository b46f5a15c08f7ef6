use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use candy_physics::audio::AudioSnapshot;
use candy_physics::camera::CameraPose;
use candy_physics::collab::{Collaborators, Stockpile, ToastLog};
use candy_physics::config::PhysicsConfig;
use candy_physics::engine::input::{Action, InputState};
use candy_physics::engine::time::FixedStep;
use candy_physics::scene::test_scene::{animate_obstacles, load_demo_world};
use candy_physics::systems::PlayerController;
use clap::{Parser, ValueEnum};
use glam::Vec3;
use log::{error, info};
use rustc_hash::FxHashMap;

const TICK: f32 = 1.0 / 60.0;
const MAX_TICKS_PER_FRAME: usize = 8;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Script {
    /// Walk forward.
    Walk,
    /// Walk forward and jump periodically, double jumping at the apex.
    Jump,
    /// Walk forward and dash whenever the cooldown allows.
    Dash,
    /// Dance in place, then stop.
    Dance,
    /// Head for the lake.
    Swim,
    /// Phase shift until the stockpile runs out.
    Phase,
}

#[derive(Parser)]
#[command(name = "candy-sim", about = "Headless player physics simulation")]
struct Args {
    /// Number of frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: usize,
    /// Frame duration in seconds; simulated at a fixed 60 Hz tick
    #[arg(long, default_value_t = TICK)]
    dt: f32,
    /// JSON config; missing keys keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Script::Walk)]
    script: Script,
    /// Disable the spatial grid and scan every obstacle
    #[arg(long)]
    no_grid: bool,
}

/// Synthetic 120 BPM track with a kick on every downbeat.
fn audio_at(t: f32) -> AudioSnapshot {
    let bpm = 120.0;
    let phase = (t * bpm / 60.0).rem_euclid(1.0);
    AudioSnapshot {
        kick_trigger: (1.0 - phase * 4.0).max(0.0),
        groove_amount: 0.5 + 0.5 * (t * 0.1).sin(),
        bpm,
        beat_phase: phase,
        wind: Vec3::new(0.5, 0.0, 0.0),
    }
}

fn scripted_input(script: Script, tick: usize, input: &mut InputState) {
    *input = InputState::new();
    match script {
        Script::Walk | Script::Swim => input.press(Action::Forward),
        Script::Jump => {
            input.press(Action::Forward);
            // Grounded jump, then a fresh press near the apex.
            if matches!(tick % 60, 0..=2 | 25..=27) {
                input.press(Action::Jump);
            }
        }
        Script::Dash => {
            input.press(Action::Forward);
            if tick % 30 == 0 {
                input.press(Action::Dash);
            }
        }
        Script::Dance => {
            if tick == 10 || tick == 400 {
                input.press(Action::Dance);
            }
        }
        Script::Phase => {
            if tick % 120 == 0 {
                input.press(Action::Phase);
            }
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match PhysicsConfig::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                error!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => PhysicsConfig::default(),
    };
    if args.no_grid {
        config.grid.enabled = false;
    }
    let config = Arc::new(config);

    let mut world = match load_demo_world(Arc::clone(&config)) {
        Ok(world) => world,
        Err(err) => {
            error!("demo world: {err}");
            return ExitCode::FAILURE;
        }
    };

    let spawn = config.spawn_point();
    let mut player = PlayerController::new(Arc::clone(&config), spawn);
    player.upload_obstacles(&world);

    // Swimmers face the lake; everyone else walks away from it.
    let yaw = match args.script {
        Script::Swim => 90.0,
        _ => -90.0,
    };
    let mut camera = CameraPose::from_yaw_pitch(spawn, yaw, -15.0);
    let mut input = InputState::new();
    let mut stockpile = Stockpile::with(&config.abilities.phase_item, 2);
    let mut toasts = ToastLog::default();

    let mut fixed = FixedStep::new(TICK, MAX_TICKS_PER_FRAME);
    let mut counts: FxHashMap<&'static str, usize> = FxHashMap::default();
    let mut fast_frames = 0usize;
    let mut tick = 0usize;

    info!(
        "simulating {} frames of {:?} at dt {} (grid {})",
        args.frames,
        args.script,
        args.dt,
        if config.grid.enabled { "on" } else { "off" }
    );

    for _ in 0..args.frames {
        for _ in 0..fixed.advance(args.dt) {
            let t = tick as f32 * TICK;
            animate_obstacles(&mut world, t);
            scripted_input(args.script, tick, &mut input);
            let audio = audio_at(t);

            let mut collab = Collaborators {
                inventory: &mut stockpile,
                notifier: &mut toasts,
            };
            let report = player.step(&mut world, TICK, &mut camera, &mut input, &audio, &mut collab);

            for event in &report.events {
                *counts.entry(event.label()).or_default() += 1;
            }
            fast_frames += usize::from(report.used_fast_path);
            camera.position = player.state().position;
            tick += 1;
        }
    }

    let state = player.state();
    println!("ticks:       {tick}");
    println!("position:    {:.3?}", state.position);
    println!("velocity:    {:.3?}", state.velocity);
    println!(
        "mode:        {} ({:.2}s)",
        state.current_mode().label(),
        state.time_in_mode()
    );
    println!("grounded:    {}", state.is_grounded);
    println!("underwater:  {}", state.is_underwater);
    println!("fast path:   {fast_frames} of {} calls accepted", player.fast_path_calls());

    let mut sorted: Vec<_> = counts.into_iter().collect();
    sorted.sort_unstable();
    for (label, n) in sorted {
        println!("  {label:<18} {n}");
    }
    for message in &toasts.messages {
        println!("toast: {message}");
    }
    ExitCode::SUCCESS
}
