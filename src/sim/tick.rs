//! Frame-driven simulation tick
//!
//! One call advances the whole game by `dt` seconds in a fixed order:
//! waves, player, enemies, bullets, collisions, deaths, items, level-ups,
//! cosmetics. Everything outside `Playing` only advances the cosmetics and
//! banner timers it needs.

use glam::Vec2;

use super::bullet::HomingTargets;
use super::collision::Collider;
use super::effect::EffectKind;
use super::player::{PLAYER_COLOR, PlayerInput};
use super::skill::SkillKind;
use super::state::{GameEvent, GamePhase, GameState};
use super::wave::WaveEvent;
use crate::rgb;

/// Input sampled for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired movement direction
    pub movement: Vec2,
    pub attack: bool,
    pub dash: bool,
    /// Charge laser held; releasing fires
    pub laser: bool,
    /// Skill activation presses, indexed like `SkillKind::ALL`
    pub skills: [bool; 4],
    /// Leave the title screen
    pub start: bool,
    /// Pause toggle
    pub pause: bool,
    pub open_shop: bool,
    pub close_shop: bool,
    pub purchase: Option<usize>,
    pub select_upgrade: Option<usize>,
    /// New run from the game over screen
    pub restart: bool,
}

impl TickInput {
    fn player(&self) -> PlayerInput {
        PlayerInput {
            movement: self.movement,
            attack: self.attack,
            dash: self.dash,
            laser: self.laser,
        }
    }
}

/// Advance the game by one frame
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let dt = if dt.is_finite() {
        dt.clamp(0.0, state.tuning.world.max_frame_dt)
    } else {
        0.0
    };

    handle_phase_input(state, input);

    match state.phase {
        GamePhase::Title | GamePhase::Paused | GamePhase::GameOver => return,
        GamePhase::LevelUp => {
            state.level_up_timer -= dt;
            if state.level_up_timer <= 0.0 {
                state.level_up_timer = 0.0;
                state.phase = GamePhase::SkillSelect;
                state.offer_upgrades();
            }
            advance_cosmetics(state, dt);
            return;
        }
        GamePhase::SkillSelect | GamePhase::Shop => {
            advance_cosmetics(state, dt);
            return;
        }
        GamePhase::Playing => {}
    }

    state.time += dt;

    // Waves
    let wave_events = state.director.update(dt, &state.tuning, &mut state.rng);
    for event in wave_events {
        apply_wave_event(state, event);
    }

    // Player
    for (kind, pressed) in SkillKind::ALL.into_iter().zip(input.skills) {
        if pressed {
            state.activate_skill(kind);
        }
    }
    let world_size = state.world_size();
    let mut commands = Vec::new();
    let report = state.player.update(
        dt,
        input.player(),
        world_size,
        &mut state.bullets,
        &mut state.particles,
        &mut state.rng,
        &state.settings,
        &mut commands,
    );
    if report.dashed {
        log::debug!("dash");
        state
            .effects
            .create(EffectKind::Dash, state.player.pos, PLAYER_COLOR, state.player.radius * 2.0);
        state.push_event(GameEvent::Dash);
    }
    if report.shots > 0 {
        let muzzle = state.player.pos - Vec2::new(0.0, state.player.radius);
        state.effects.create(EffectKind::MuzzleFlash, muzzle, rgb(0xffffaa), 10.0);
    }
    state.apply_skill_commands(&commands);

    // Enemies
    let player_pos = state.player.is_alive().then_some(state.player.pos);
    let reports = state.director.update_enemies(
        dt,
        player_pos,
        &state.tuning,
        &mut state.bullets,
        &mut state.rng,
    );
    for (id, report) in reports {
        let Some(enemy) = state.director.enemy(id) else {
            continue;
        };
        let (pos, size, color) = (enemy.pos, enemy.size, enemy.kind.color());
        if report.stealth_toggled {
            state.effects.create(EffectKind::Stealth, pos, color, size * 2.0);
        }
        for phase in report.phases_entered {
            log::debug!("boss {id} entered phase {phase}");
            state.effects.create(EffectKind::BossPhase, pos, color, size * 3.0);
            state.push_event(GameEvent::BossPhaseChanged { id, phase });
        }
    }

    // Bullets
    let targets: Vec<Vec2> = state
        .director
        .enemies
        .iter()
        .filter(|e| e.is_alive())
        .map(|e| e.pos)
        .collect();
    state.bullets.update(
        dt,
        HomingTargets {
            player: player_pos,
            enemies: &targets,
        },
        &mut state.particles,
    );

    // Collisions
    let report = Collider {
        enemies: &mut state.director.enemies,
        bullets: &mut state.bullets,
        player: &mut state.player,
        particles: &mut state.particles,
        effects: &mut state.effects,
        rng: &mut state.rng,
        contact_damage: state.settings.contact_damage,
        dt,
    }
    .resolve();
    state.bullets.release_removed();
    for amount in report.player_damage {
        state.push_event(GameEvent::PlayerDamaged { amount });
    }

    // Deaths
    state.resolve_deaths();
    let escaped: Vec<u32> = state
        .director
        .enemies
        .iter()
        .filter(|e| e.escaped)
        .map(|e| e.id)
        .collect();
    for id in escaped {
        state.push_event(GameEvent::EnemyEscaped { id });
    }
    state.director.reap();

    // Items
    let collected = state.items.update(
        dt,
        state.player.pos,
        state.player.radius,
        world_size,
        &state.tuning.items,
    );
    state.apply_pickups(&collected);

    advance_cosmetics(state, dt);

    if !state.player.is_alive() {
        state.phase = GamePhase::GameOver;
        log::info!(
            "game over on wave {} with score {}",
            state.director.wave,
            state.score
        );
        state.push_event(GameEvent::GameOver {
            score: state.score,
            wave: state.director.wave,
        });
        return;
    }

    if state.player.pending_level_ups > 0 {
        state.phase = GamePhase::LevelUp;
        state.level_up_timer = state.tuning.player.level_up_time;
        state.particles.level_up(state.player.pos);
        state
            .effects
            .create(EffectKind::LevelUp, state.player.pos, rgb(0xffd700), 80.0);
    }
}

fn handle_phase_input(state: &mut GameState, input: &TickInput) {
    match state.phase {
        GamePhase::Title if input.start => {
            state.phase = GamePhase::Playing;
            log::info!("run started (seed {})", state.seed);
        }
        GamePhase::Playing if input.pause => state.phase = GamePhase::Paused,
        GamePhase::Playing if input.open_shop => state.phase = GamePhase::Shop,
        GamePhase::Paused if input.pause => state.phase = GamePhase::Playing,
        GamePhase::Shop => {
            if let Some(index) = input.purchase {
                state.purchase(index);
            }
            if input.close_shop {
                state.phase = GamePhase::Playing;
            }
        }
        GamePhase::SkillSelect => {
            if let Some(index) = input.select_upgrade {
                state.select_upgrade(index);
            }
        }
        GamePhase::GameOver if input.restart => state.restart(),
        _ => {}
    }
}

fn apply_wave_event(state: &mut GameState, event: WaveEvent) {
    match event {
        WaveEvent::Started { wave } => state.push_event(GameEvent::WaveStarted { wave }),
        WaveEvent::BossSpawned { wave, .. } => {
            let (name, quote) = match &state.director.boss_quote {
                Some(q) => (Some(q.name.clone()), Some(q.quote.clone())),
                None => (None, None),
            };
            state.push_event(GameEvent::BossSpawned { wave, name, quote });
        }
        WaveEvent::MiniBossSpawned { id } => log::debug!("mini boss {id} spawned"),
        WaveEvent::Cleared { wave, heal, gems } => {
            let healed = state.player.heal(heal);
            if healed > 0.0 {
                state.effects.heal_number(state.player.pos, healed);
            }
            state.gems += gems;
            state.push_event(GameEvent::WaveCleared { wave });
        }
    }
}

fn advance_cosmetics(state: &mut GameState, dt: f32) {
    state.particles.update(dt);
    state.effects.update(dt);
    state.director.update_timers(dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::bullet::BulletPattern;
    use crate::sim::enemy::EnemyKind;
    use crate::tuning::Tuning;

    const DT: f32 = 1.0 / 60.0;

    fn playing() -> GameState {
        let mut state = GameState::new(7, Tuning::default(), Settings::default());
        tick(
            &mut state,
            &TickInput {
                start: true,
                ..Default::default()
            },
            DT,
        );
        state
    }

    #[test]
    fn test_title_waits_for_start() {
        let mut state = GameState::new(7, Tuning::default(), Settings::default());
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::Title);
        assert!(state.director.enemies.is_empty());
        assert_eq!(state.time, 0.0);
    }

    #[test]
    fn test_first_tick_starts_wave() {
        let mut state = playing();
        assert_eq!(state.phase, GamePhase::Playing);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::WaveStarted { wave: 1 }));
        // floor(5 * 1.0) opening burst
        assert_eq!(state.director.enemies.len(), 5);
    }

    #[test]
    fn test_pause_freezes_world() {
        let mut state = playing();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, DT);
        assert_eq!(state.phase, GamePhase::Paused);

        let before: Vec<Vec2> = state.director.enemies.iter().map(|e| e.pos).collect();
        let time = state.time;
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), DT);
        }
        let after: Vec<Vec2> = state.director.enemies.iter().map(|e| e.pos).collect();
        assert_eq!(before, after);
        assert_eq!(state.time, time);

        tick(&mut state, &pause, DT);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut state = playing();
        let time = state.time;
        tick(&mut state, &TickInput::default(), 5.0);
        assert!((state.time - time - 0.1).abs() < 1e-6);
        tick(&mut state, &TickInput::default(), f32::NAN);
        assert!((state.time - time - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_shop_purchase_flow() {
        let mut state = playing();
        state.gems = 5;
        tick(
            &mut state,
            &TickInput {
                open_shop: true,
                ..Default::default()
            },
            DT,
        );
        assert_eq!(state.phase, GamePhase::Shop);
        let time = state.time;
        tick(
            &mut state,
            &TickInput {
                purchase: Some(1),
                close_shop: true,
                ..Default::default()
            },
            DT,
        );
        assert_eq!(state.gems, 1);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.time > time);
    }

    #[test]
    fn test_level_up_opens_skill_select() {
        let mut state = playing();
        state.grant_xp(100);
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::LevelUp);

        let enemies: Vec<Vec2> = state.director.enemies.iter().map(|e| e.pos).collect();
        for _ in 0..100 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert_eq!(state.phase, GamePhase::SkillSelect);
        assert_eq!(state.upgrade_choices.len(), 3);
        let still: Vec<Vec2> = state.director.enemies.iter().map(|e| e.pos).collect();
        assert_eq!(enemies, still);

        tick(
            &mut state,
            &TickInput {
                select_upgrade: Some(0),
                ..Default::default()
            },
            DT,
        );
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.pending_level_ups, 0);
    }

    #[test]
    fn test_death_ends_run_and_restart() {
        let mut state = playing();
        state.player.hp = 0.0;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state
            .events()
            .iter()
            .any(|e| matches!(e, GameEvent::GameOver { .. })));

        tick(
            &mut state,
            &TickInput {
                restart: true,
                ..Default::default()
            },
            DT,
        );
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.hp, state.player.max_hp);
    }

    #[test]
    fn test_kill_rewards_through_tick() {
        let mut state = playing();
        state.director.enemies.clear();
        let id = state
            .director
            .spawn_at(EnemyKind::Normal, Vec2::new(400.0, 200.0), &state.tuning, &mut state.rng);
        if let Some(enemy) = state.director.enemy_mut(id) {
            enemy.take_damage(1000.0);
        }
        state.drain_events();
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.score, 100);
        assert!(state
            .events()
            .iter()
            .any(|e| matches!(e, GameEvent::EnemyKilled { id: killed, .. } if *killed == id)));
    }

    #[test]
    fn test_skill_press_activates() {
        let mut state = playing();
        let mut input = TickInput::default();
        input.skills[SkillKind::ChainLightning.index()] = true;
        tick(&mut state, &input, DT);
        assert!(state
            .events()
            .iter()
            .any(|e| matches!(e, GameEvent::SkillActivated { kind: SkillKind::ChainLightning })));
        let bolt = state.bullets.player_bullets().find(|b| b.chain.is_some());
        assert_eq!(bolt.map(|b| b.pattern), Some(BulletPattern::Zigzag));
    }
}
