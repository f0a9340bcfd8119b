//! Enemies: kinds, movement and attack patterns, boss phases
//!
//! Lifecycle is `Active -> Dying -> finished`. `die()` only succeeds once, and
//! rewards are reaped separately (see `GameState::resolve_deaths`), so a
//! double kill in one frame cannot double-award.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bullet::{BulletManager, BulletOptions, BulletPattern};
use super::rng::SimRng;
use crate::tuning::{EnemyStats, EnemyTable, PatternTuning};
use crate::{Color, angle_to, direction, rgb};

/// Enemy type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnemyKind {
    Normal,
    /// Fast, toggles stealth on an interval
    Assassin,
    /// Explodes on death, hurting nearby enemies and the player
    Bomber,
    MiniBoss,
    Boss,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Normal,
        EnemyKind::Assassin,
        EnemyKind::Bomber,
        EnemyKind::MiniBoss,
        EnemyKind::Boss,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Normal => "normal",
            EnemyKind::Assassin => "assassin",
            EnemyKind::Bomber => "bomber",
            EnemyKind::MiniBoss => "miniBoss",
            EnemyKind::Boss => "boss",
        }
    }

    /// Bosses hover on screen instead of descending off the bottom
    pub fn hovers(&self) -> bool {
        matches!(self, EnemyKind::MiniBoss | EnemyKind::Boss)
    }

    pub fn color(&self) -> Color {
        match self {
            EnemyKind::Normal => rgb(0xff6666),
            EnemyKind::Assassin => rgb(0xaa66ff),
            EnemyKind::Bomber => rgb(0xff9933),
            EnemyKind::MiniBoss => rgb(0xff3399),
            EnemyKind::Boss => rgb(0xff0000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MovementPattern {
    Linear,
    Sine,
    Circle,
    Zigzag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttackPattern {
    Single,
    Spread,
    Spiral,
    Targeted,
    Burst,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyState {
    Active,
    /// Playing the death animation; `timer` runs from 1 to 0
    Dying { timer: f32 },
}

/// Timed debuffs applied by skill payloads
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatusEffects {
    pub burn_dps: f32,
    pub burn_timer: f32,
    /// Fraction of movement speed removed
    pub slow: f32,
    pub slow_timer: f32,
    pub stun_timer: f32,
    /// Damage taken multiplier while stunned
    pub amplification: f32,
}

impl StatusEffects {
    pub fn stunned(&self) -> bool {
        self.stun_timer > 0.0
    }

    fn speed_factor(&self) -> f32 {
        if self.slow_timer > 0.0 {
            (1.0 - self.slow).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    fn tick(&mut self, dt: f32) {
        self.burn_timer = (self.burn_timer - dt).max(0.0);
        self.slow_timer = (self.slow_timer - dt).max(0.0);
        self.stun_timer = (self.stun_timer - dt).max(0.0);
    }
}

/// A burst shot waiting for its fire time on the enemy's own clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueuedShot {
    pub fire_at: f32,
    pub speed: f32,
}

/// Things an enemy update wants the caller to know about
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnemyReport {
    /// Boss phases entered this frame, in order
    pub phases_entered: Vec<u32>,
    pub stealth_toggled: bool,
    pub shots_fired: usize,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    /// Descending anchor the movement pattern oscillates around
    pub anchor: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub damage: f32,
    pub score: u64,
    pub drop_chance: f32,
    pub bullet_speed: f32,
    pub fire_interval: f32,
    pub bullet_timer: f32,
    pub movement: MovementPattern,
    pub attack: AttackPattern,
    /// Enemy-local clock (frozen while stunned); burst shots fire against it
    pub clock: f32,
    /// Movement clock (scaled while slowed)
    pub move_time: f32,
    pub pattern_timer: f32,
    pub burst_queue: Vec<QueuedShot>,
    pub stealth_timer: f32,
    pub stealthed: bool,
    /// 1-based boss phase
    pub phase: u32,
    pub phase_thresholds: Vec<f32>,
    pub hover_y: Option<f32>,
    pub status: StatusEffects,
    pub state: EnemyState,
    /// Score/xp/drops already handed out
    pub rewarded: bool,
    /// Left the bottom of the screen alive
    pub escaped: bool,
    pub hit_flash: f32,
}

impl Enemy {
    /// Build an enemy from its base stats, scaled for the current wave
    pub fn spawn(
        id: u32,
        kind: EnemyKind,
        pos: Vec2,
        scale: f32,
        table: &EnemyTable,
        rng: &mut SimRng,
    ) -> Self {
        let stats = table.stats(kind);
        let movement = roll_movement(stats, rng);
        let attack = roll_attack(stats, rng);
        let hover_y = match kind {
            EnemyKind::Boss => Some(table.boss_hover_y),
            EnemyKind::MiniBoss => Some(table.mini_boss_hover_y),
            _ => None,
        };
        Self {
            id,
            kind,
            pos,
            anchor: pos,
            vel: Vec2::new(0.0, stats.speed),
            size: stats.size,
            hp: stats.hp * scale,
            max_hp: stats.hp * scale,
            damage: stats.damage * scale,
            score: stats.score,
            drop_chance: stats.drop_chance,
            bullet_speed: stats.bullet_speed,
            fire_interval: stats.fire_interval,
            bullet_timer: 0.0,
            movement,
            attack,
            clock: 0.0,
            move_time: 0.0,
            pattern_timer: 0.0,
            burst_queue: Vec::new(),
            stealth_timer: 0.0,
            stealthed: false,
            phase: 1,
            phase_thresholds: if kind == EnemyKind::Boss {
                table.phase_thresholds.clone()
            } else {
                Vec::new()
            },
            hover_y,
            status: StatusEffects::default(),
            state: EnemyState::Active,
            rewarded: false,
            escaped: false,
            hit_flash: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state == EnemyState::Active
    }

    pub fn is_dying(&self) -> bool {
        matches!(self.state, EnemyState::Dying { .. })
    }

    /// Death animation finished (or escaped); ready to drop from the list
    pub fn is_finished(&self) -> bool {
        self.escaped || matches!(self.state, EnemyState::Dying { timer } if timer <= 0.0)
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp <= 0.0 {
            0.0
        } else {
            (self.hp / self.max_hp).clamp(0.0, 1.0)
        }
    }

    pub fn phase_count(&self) -> u32 {
        self.phase_thresholds.len() as u32 + 1
    }

    /// Draw alpha (stealthed assassins fade out)
    pub fn alpha(&self, table: &EnemyTable) -> f32 {
        if let EnemyState::Dying { timer } = self.state {
            return timer.clamp(0.0, 1.0);
        }
        if self.stealthed { table.stealth_alpha } else { 1.0 }
    }

    /// Apply damage; returns the hp actually removed
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if !self.is_alive() || amount <= 0.0 {
            return 0.0;
        }
        let amount = if self.status.stunned() {
            amount * self.status.amplification.max(1.0)
        } else {
            amount
        };
        let before = self.hp;
        self.hp = (self.hp - amount).clamp(0.0, self.max_hp);
        self.hit_flash = 0.1;
        if self.hp <= 0.0 {
            self.die();
        }
        before - self.hp
    }

    /// Enter the death animation; false if already dying
    pub fn die(&mut self) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.hp = 0.0;
        self.burst_queue.clear();
        self.state = EnemyState::Dying { timer: 1.0 };
        true
    }

    pub fn apply_burn(&mut self, dps: f32, duration: f32) {
        if dps <= 0.0 || duration <= 0.0 {
            return;
        }
        self.status.burn_dps = self.status.burn_dps.max(dps);
        self.status.burn_timer = self.status.burn_timer.max(duration);
    }

    pub fn apply_slow(&mut self, slow: f32, duration: f32) {
        if slow <= 0.0 || duration <= 0.0 {
            return;
        }
        self.status.slow = self.status.slow.max(slow);
        self.status.slow_timer = self.status.slow_timer.max(duration);
    }

    pub fn apply_stun(&mut self, duration: f32, amplification: f32) {
        if duration <= 0.0 {
            return;
        }
        self.status.stun_timer = self.status.stun_timer.max(duration);
        self.status.amplification = self.status.amplification.max(amplification);
    }

    /// Advance one frame: movement, status effects, abilities, firing
    pub fn update(
        &mut self,
        dt: f32,
        player: Option<Vec2>,
        table: &EnemyTable,
        world_size: Vec2,
        bullets: &mut BulletManager,
        rng: &mut SimRng,
    ) -> EnemyReport {
        let mut report = EnemyReport::default();
        self.hit_flash = (self.hit_flash - dt).max(0.0);

        if let EnemyState::Dying { timer } = &mut self.state {
            *timer -= dt / table.death_time.max(f32::EPSILON);
            return report;
        }

        if self.status.burn_timer > 0.0 {
            self.take_damage(self.status.burn_dps * dt);
        }
        self.advance_phases(table, rng, &mut report);
        let stunned = self.status.stunned();
        self.status.tick(dt);
        if !self.is_alive() {
            return report;
        }

        if self.kind == EnemyKind::Assassin {
            self.stealth_timer += dt;
            if self.stealth_timer >= table.stealth_interval {
                self.stealth_timer = 0.0;
                self.stealthed = !self.stealthed;
                report.stealth_toggled = true;
            }
        }

        if stunned {
            return report;
        }

        self.clock += dt;
        self.pattern_timer += dt;
        self.step_movement(dt, &table.patterns, world_size);

        self.bullet_timer += dt;
        if self.bullet_timer >= self.fire_interval {
            self.bullet_timer = 0.0;
            report.shots_fired += self.shoot(player, &table.patterns, bullets);
        }
        report.shots_fired += self.drain_burst_queue(player, bullets);
        report
    }

    /// Advance through every phase threshold the hp ratio has crossed
    fn advance_phases(&mut self, table: &EnemyTable, rng: &mut SimRng, report: &mut EnemyReport) {
        while let Some(&threshold) = self.phase_thresholds.get(self.phase as usize - 1) {
            if self.hp_ratio() > threshold {
                break;
            }
            self.phase += 1;
            let stats = table.stats(self.kind);
            self.movement = roll_movement(stats, rng);
            self.attack = roll_attack(stats, rng);
            self.fire_interval *= 0.85;
            report.phases_entered.push(self.phase);
            log::debug!("Enemy {} entered phase {}", self.id, self.phase);
        }
    }

    fn step_movement(&mut self, dt: f32, patterns: &PatternTuning, world_size: Vec2) {
        let factor = self.status.speed_factor();
        self.move_time += dt * factor;
        self.anchor.y += self.vel.y * factor * dt;
        if let Some(hover) = self.hover_y {
            self.anchor.y = self.anchor.y.min(hover);
        }

        let t = self.move_time;
        let offset = match self.movement {
            MovementPattern::Linear => Vec2::ZERO,
            MovementPattern::Sine => {
                Vec2::new((t * patterns.sine_frequency).sin() * patterns.sine_amplitude, 0.0)
            }
            MovementPattern::Circle => direction(t * patterns.circle_speed) * patterns.circle_radius,
            MovementPattern::Zigzag => Vec2::new(
                (t * patterns.zigzag_frequency).sin() * patterns.zigzag_amplitude,
                0.0,
            ),
        };
        self.pos = self.anchor + offset;
        let max_x = (world_size.x - self.size).max(self.size);
        self.pos.x = self.pos.x.clamp(self.size, max_x);

        if self.hover_y.is_none() && self.pos.y - self.size > world_size.y {
            self.escaped = true;
        }
    }

    /// Fire the current attack pattern; returns bullets spawned
    fn shoot(&mut self, player: Option<Vec2>, patterns: &PatternTuning, bullets: &mut BulletManager) -> usize {
        let aim = player.map(|p| angle_to(self.pos, p)).unwrap_or(std::f32::consts::FRAC_PI_2);
        let base = BulletOptions {
            speed: Some(self.bullet_speed),
            damage: Some(self.damage),
            ..Default::default()
        };
        match self.attack {
            AttackPattern::Single => bullets.spawn_enemy_bullet(self.pos, direction(aim), base),
            AttackPattern::Spread => bullets.spawn_enemy_bullet(
                self.pos,
                direction(aim),
                BulletOptions {
                    pattern: BulletPattern::Spread,
                    count: patterns.spread_count,
                    spread: patterns.spread_arc,
                    ..base
                },
            ),
            AttackPattern::Spiral => {
                let n = patterns.spiral_count.max(1);
                let offset = self.pattern_timer * patterns.spiral_turn_rate;
                let spiral = BulletOptions {
                    pattern: BulletPattern::Spiral,
                    spiral_speed: patterns.spiral_bullet_speed,
                    ..base
                };
                (0..n)
                    .map(|i| {
                        let angle = offset + TAU * i as f32 / n as f32;
                        bullets.spawn_enemy_bullet(self.pos, direction(angle), spiral.clone())
                    })
                    .sum()
            }
            AttackPattern::Targeted => bullets.spawn_enemy_bullet(
                self.pos,
                direction(aim),
                BulletOptions {
                    pattern: BulletPattern::Homing,
                    speed: Some(patterns.targeted_speed),
                    damage: Some(self.damage * patterns.targeted_damage_multiplier),
                    homing_strength: Some(patterns.homing_strength),
                    color: Some(rgb(0xff44ff)),
                    ..base
                },
            ),
            AttackPattern::Burst => {
                for i in 0..patterns.burst_count {
                    self.burst_queue.push(QueuedShot {
                        fire_at: self.clock + i as f32 * patterns.burst_delay,
                        speed: self.bullet_speed + i as f32 * patterns.burst_speed_step,
                    });
                }
                0
            }
        }
    }

    /// Fire queued burst shots whose time has come, aimed at the player's current position
    fn drain_burst_queue(&mut self, player: Option<Vec2>, bullets: &mut BulletManager) -> usize {
        let clock = self.clock;
        let mut fired = 0;
        let pos = self.pos;
        let damage = self.damage;
        self.burst_queue.retain(|shot| {
            if shot.fire_at > clock {
                return true;
            }
            let aim = player.map(|p| angle_to(pos, p)).unwrap_or(std::f32::consts::FRAC_PI_2);
            fired += bullets.spawn_enemy_bullet(
                pos,
                direction(aim),
                BulletOptions {
                    speed: Some(shot.speed),
                    damage: Some(damage),
                    ..Default::default()
                },
            );
            false
        });
        fired
    }
}

fn roll_movement(stats: &EnemyStats, rng: &mut SimRng) -> MovementPattern {
    let entries = stats.movement.entries();
    let weights = entries.map(|(_, w)| w);
    rng.weighted(&weights)
        .map(|i| entries[i].0)
        .unwrap_or(MovementPattern::Linear)
}

fn roll_attack(stats: &EnemyStats, rng: &mut SimRng) -> AttackPattern {
    rng.pick(&stats.attacks).copied().unwrap_or(AttackPattern::Single)
}
