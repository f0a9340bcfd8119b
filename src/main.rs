//! Wave Attack headless driver
//!
//! Runs the simulation at 60 fps with an autopilot at the controls and
//! draws every frame into a recording surface. Useful for balance checks
//! and soak runs without a window.
//!
//! Usage: wave-attack [--seed N] [--seconds N] [--quality low|medium|high]
//!                    [--tuning PATH] [--settings PATH]

use std::process::ExitCode;

use glam::Vec2;

use wave_attack::renderer::{Recorder, draw_frame};
use wave_attack::sim::{GameEvent, GamePhase, GameState, SkillKind, TickInput, tick};
use wave_attack::{ConfigError, QualityPreset, Settings, Tuning};

const FRAME_DT: f32 = 1.0 / 60.0;

struct Options {
    seed: u64,
    seconds: f32,
    quality: Option<QualityPreset>,
    tuning: Option<String>,
    settings: Option<String>,
}

fn parse_args() -> Result<Options, String> {
    let mut opts = Options {
        seed: 0x5eed,
        seconds: 120.0,
        quality: None,
        tuning: None,
        settings: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = || args.next().ok_or_else(|| format!("{arg} needs a value"));
        match arg.as_str() {
            "--seed" => opts.seed = value()?.parse().map_err(|e| format!("--seed: {e}"))?,
            "--seconds" => {
                opts.seconds = value()?.parse().map_err(|e| format!("--seconds: {e}"))?
            }
            "--quality" => {
                let name = value()?;
                let preset = QualityPreset::from_str(&name)
                    .ok_or_else(|| format!("--quality: unknown preset {name}"))?;
                opts.quality = Some(preset);
            }
            "--tuning" => opts.tuning = Some(value()?),
            "--settings" => opts.settings = Some(value()?),
            other => return Err(format!("unknown argument {other}")),
        }
    }
    Ok(opts)
}

fn load(opts: &Options) -> Result<(Tuning, Settings), ConfigError> {
    let tuning = match &opts.tuning {
        Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
        None => Tuning::default(),
    };
    let settings = match (&opts.settings, opts.quality) {
        (Some(path), quality) => {
            let mut settings = Settings::from_json(&std::fs::read_to_string(path)?)?;
            if let Some(quality) = quality {
                settings.quality = quality;
            }
            settings
        }
        (None, Some(quality)) => Settings::from_preset(quality),
        (None, None) => Settings::default(),
    };
    Ok((tuning, settings))
}

/// Simple pilot: stay under the nearest enemy, sidestep close bullets,
/// fire skills when ready and take the first upgrade offered
fn autopilot(state: &GameState) -> TickInput {
    let mut input = TickInput {
        attack: true,
        ..Default::default()
    };
    match state.phase {
        GamePhase::Title => input.start = true,
        GamePhase::SkillSelect => input.select_upgrade = Some(0),
        GamePhase::Shop => {
            input.purchase = Some(0);
            input.close_shop = true;
        }
        GamePhase::Playing => {}
        GamePhase::LevelUp | GamePhase::Paused | GamePhase::GameOver => return input,
    }

    let me = state.player.pos;
    let target = state
        .director
        .enemies
        .iter()
        .filter(|e| e.is_alive())
        .min_by(|a, b| a.pos.distance_squared(me).total_cmp(&b.pos.distance_squared(me)));
    let mut steer = match target {
        Some(enemy) => Vec2::new((enemy.pos.x - me.x).signum(), 0.0),
        None => Vec2::ZERO,
    };

    let threat = state
        .bullets
        .enemy_bullets()
        .filter(|b| b.pos.distance(me) < 80.0)
        .min_by(|a, b| a.pos.distance(me).total_cmp(&b.pos.distance(me)));
    if let Some(bullet) = threat {
        steer = Vec2::new(if bullet.pos.x > me.x { -1.0 } else { 1.0 }, 0.0);
        input.dash = true;
    }
    input.movement = steer;

    for kind in SkillKind::ALL {
        input.skills[kind.index()] = state.player.skill(kind).is_ready();
    }
    if state.gems >= 3 && state.phase == GamePhase::Playing {
        input.open_shop = true;
    }
    input
}

fn main() -> ExitCode {
    env_logger::init();

    let opts = match parse_args() {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let (tuning, settings) = match load(&opts) {
        Ok(loaded) => loaded,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    log::info!("Wave Attack (headless) starting, seed {}", opts.seed);
    let mut state = GameState::new(opts.seed, tuning, settings);
    let mut surface = Recorder::default();
    let frames = (opts.seconds / FRAME_DT).ceil() as u64;
    let (mut kills, mut primitives) = (0u64, 0usize);

    for frame in 0..frames {
        let input = autopilot(&state);
        tick(&mut state, &input, FRAME_DT);

        for event in state.drain_events() {
            match event {
                GameEvent::EnemyKilled { .. } => kills += 1,
                GameEvent::BossSpawned { wave, name, .. } => {
                    log::info!("frame {frame}: boss {:?} on wave {wave}", name)
                }
                GameEvent::GameOver { score, wave } => {
                    log::info!("frame {frame}: game over, score {score}, wave {wave}")
                }
                _ => {}
            }
        }

        surface.clear();
        draw_frame(&mut surface, &state);
        primitives = primitives.max(surface.primitive_count());

        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    println!(
        "wave {} | level {} | score {} | kills {} | gems {} | peak primitives/frame {}",
        state.director.wave,
        state.player.level,
        state.score,
        kills,
        state.gems,
        primitives
    );
    ExitCode::SUCCESS
}
