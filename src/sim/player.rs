//! The player ship
//!
//! Movement, auto-fire, the charge laser, dash, buffs and the xp/level curve.
//! Skills are owned here but their side effects come back as
//! `SkillCommand`s for the tick loop to apply.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bullet::{BulletManager, BulletOptions, BulletPattern, LaserOptions};
use super::particle::ParticleSystem;
use super::rng::SimRng;
use super::skill::{Skill, SkillCommand, SkillKind};
use crate::consts::UP;
use crate::settings::Settings;
use crate::tuning::{PlayerTuning, SkillTable, StatBoost};
use crate::{Color, direction, rgb};

pub const PLAYER_COLOR: Color = rgb(0x22bbff);
pub const CHARGE_COLOR: Color = rgb(0xffd700);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuffKind {
    /// Bullet damage multiplier
    Power,
    /// Movement speed multiplier
    Speed,
    /// Blocks all damage
    Shield,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Buff {
    pub kind: BuffKind,
    pub remaining: f32,
}

/// Derived movement state, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    ChargingLaser,
    Dashing,
    Invincible,
    Moving,
}

/// Controls sampled for one frame
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerInput {
    /// Desired direction; lengths above 1 are normalized
    pub movement: Vec2,
    pub attack: bool,
    /// Dash trigger (edge)
    pub dash: bool,
    /// Charge laser held
    pub laser: bool,
}

/// What the player did this frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerReport {
    pub shots: usize,
    pub dashed: bool,
    pub laser_fired: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub level: u32,
    pub xp: u32,
    pub next_xp: u32,
    pub speed: f32,
    pub bullet_damage: f32,
    pub bullet_size: f32,
    pub bullet_speed: f32,
    /// Seconds between shots
    pub attack_speed: f32,
    pub attack_timer: f32,
    pub critical_chance: f32,
    pub critical_damage: f32,
    pub buffs: Vec<Buff>,
    pub invincible_timer: f32,
    /// Remaining dash time
    pub dash_timer: f32,
    pub dash_cooldown_timer: f32,
    pub dash_dir: Vec2,
    pub laser_charge: f32,
    pub charging: bool,
    /// One per `SkillKind`, in `SkillKind::ALL` order
    pub skills: Vec<Skill>,
    pub skill_points: u32,
    /// Level-ups still waiting for an upgrade pick
    pub pending_level_ups: u32,
    pub moving: bool,
    cfg: PlayerTuning,
}

impl Player {
    pub fn new(world_size: Vec2, cfg: &PlayerTuning, skills: &SkillTable) -> Self {
        Self {
            pos: Vec2::new(world_size.x / 2.0, world_size.y - 80.0),
            radius: cfg.radius,
            hp: cfg.max_hp,
            max_hp: cfg.max_hp,
            level: 1,
            xp: 0,
            next_xp: cfg.next_xp,
            speed: cfg.speed,
            bullet_damage: cfg.bullet_damage,
            bullet_size: cfg.bullet_size,
            bullet_speed: cfg.bullet_speed,
            attack_speed: cfg.attack_speed,
            attack_timer: 0.0,
            critical_chance: cfg.critical_chance,
            critical_damage: cfg.critical_damage,
            buffs: Vec::new(),
            invincible_timer: 0.0,
            dash_timer: 0.0,
            dash_cooldown_timer: 0.0,
            dash_dir: Vec2::ZERO,
            laser_charge: 0.0,
            charging: false,
            skills: SkillKind::ALL
                .iter()
                .map(|&kind| Skill::new(kind, skills))
                .collect(),
            skill_points: 0,
            pending_level_ups: 0,
            moving: false,
            cfg: cfg.clone(),
        }
    }

    pub fn state(&self) -> PlayerState {
        if self.charging {
            PlayerState::ChargingLaser
        } else if self.dash_timer > 0.0 {
            PlayerState::Dashing
        } else if self.invincible_timer > 0.0 {
            PlayerState::Invincible
        } else {
            PlayerState::Moving
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_timer > 0.0
    }

    pub fn has_buff(&self, kind: BuffKind) -> bool {
        self.buffs.iter().any(|b| b.kind == kind)
    }

    pub fn damage_multiplier(&self) -> f32 {
        if self.has_buff(BuffKind::Power) {
            self.cfg.power_multiplier
        } else {
            1.0
        }
    }

    pub fn speed_multiplier(&self) -> f32 {
        if self.has_buff(BuffKind::Speed) {
            self.cfg.speed_multiplier
        } else {
            1.0
        }
    }

    /// Charge progress in 0..=1
    pub fn charge_ratio(&self) -> f32 {
        if self.cfg.charge_time <= 0.0 {
            1.0
        } else {
            (self.laser_charge / self.cfg.charge_time).clamp(0.0, 1.0)
        }
    }

    pub fn skill(&self, kind: SkillKind) -> &Skill {
        &self.skills[kind.index()]
    }

    pub fn skill_mut(&mut self, kind: SkillKind) -> &mut Skill {
        &mut self.skills[kind.index()]
    }

    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        dt: f32,
        input: PlayerInput,
        world_size: Vec2,
        bullets: &mut BulletManager,
        particles: &mut ParticleSystem,
        rng: &mut SimRng,
        settings: &Settings,
        commands: &mut Vec<SkillCommand>,
    ) -> PlayerReport {
        let mut report = PlayerReport::default();

        report.dashed = self.update_dash(dt, input);
        self.update_movement(dt, input, world_size);

        self.attack_timer += dt;
        if self.attack_timer >= self.attack_speed {
            if (input.attack || settings.auto_fire) && !self.charging {
                self.attack_timer = 0.0;
                report.shots = self.shoot(bullets);
            } else {
                self.attack_timer = self.attack_speed;
            }
        }

        report.laser_fired = self.update_laser_charge(dt, input.laser, bullets, particles);

        self.buffs.retain_mut(|b| {
            b.remaining -= dt;
            b.remaining > 0.0
        });
        if self.invincible_timer > 0.0 {
            self.invincible_timer = (self.invincible_timer - dt).max(0.0);
        }

        for skill in &mut self.skills {
            skill.update(dt, world_size, rng, commands);
        }

        if self.moving {
            particles.trail(self.pos, PLAYER_COLOR, self.radius * 0.5, 0.3);
        }
        report
    }

    fn update_dash(&mut self, dt: f32, input: PlayerInput) -> bool {
        if self.dash_cooldown_timer > 0.0 {
            self.dash_cooldown_timer = (self.dash_cooldown_timer - dt).max(0.0);
        }
        if self.dash_timer > 0.0 {
            self.dash_timer = (self.dash_timer - dt).max(0.0);
        }
        if !input.dash || self.dash_cooldown_timer > 0.0 || self.dash_timer > 0.0 {
            return false;
        }
        let dir = input.movement.normalize_or_zero();
        self.dash_dir = if dir == Vec2::ZERO { direction(UP) } else { dir };
        self.dash_timer = self.cfg.dash_duration;
        self.dash_cooldown_timer = self.cfg.dash_cooldown;
        self.invincible_timer = self.invincible_timer.max(self.cfg.dash_duration);
        log::debug!("dash toward ({:.2}, {:.2})", self.dash_dir.x, self.dash_dir.y);
        true
    }

    fn update_movement(&mut self, dt: f32, input: PlayerInput, world_size: Vec2) {
        let vel = if self.dash_timer > 0.0 {
            self.dash_dir * self.cfg.dash_speed
        } else {
            let mut dir = input.movement;
            if !dir.is_finite() {
                dir = Vec2::ZERO;
            }
            if dir.length_squared() > 1.0 {
                dir = dir.normalize();
            }
            dir * self.speed * self.speed_multiplier()
        };
        self.moving = vel != Vec2::ZERO;
        let r = Vec2::splat(self.radius);
        self.pos = (self.pos + vel * dt).clamp(r, (world_size - r).max(r));
    }

    /// Fire the level-dependent shot pattern; returns bullets created
    fn shoot(&mut self, bullets: &mut BulletManager) -> usize {
        let opts = BulletOptions {
            speed: Some(self.bullet_speed),
            size: Some(self.bullet_size),
            damage: Some(self.bullet_damage * self.damage_multiplier()),
            ..Default::default()
        };
        let up = direction(UP);

        if self.level >= self.cfg.spread_shot_level {
            let spread = BulletOptions {
                pattern: BulletPattern::Spread,
                count: 3,
                spread: self.cfg.spread_shot_arc,
                ..opts
            };
            bullets.spawn_player_bullet(self.pos, up, spread)
        } else if self.level >= self.cfg.twin_shot_level {
            let offset = Vec2::new(self.cfg.twin_shot_offset, 0.0);
            bullets.spawn_player_bullet(self.pos - offset, up, opts.clone())
                + bullets.spawn_player_bullet(self.pos + offset, up, opts)
        } else {
            bullets.spawn_player_bullet(self.pos, up, opts)
        }
    }

    fn update_laser_charge(
        &mut self,
        dt: f32,
        held: bool,
        bullets: &mut BulletManager,
        particles: &mut ParticleSystem,
    ) -> bool {
        if held {
            self.charging = true;
            self.laser_charge = (self.laser_charge + dt).min(self.cfg.charge_time);
            let ratio = self.charge_ratio();
            particles.charge_spark(self.pos, self.radius * (1.2 + ratio), CHARGE_COLOR);
            return false;
        }
        if !self.charging {
            return false;
        }
        self.fire_laser(bullets, particles);
        true
    }

    /// Release the charge: thin, scaled or triple beam by charge ratio
    fn fire_laser(&mut self, bullets: &mut BulletManager, particles: &mut ParticleSystem) {
        let ratio = self.charge_ratio();
        let base = self.bullet_damage * self.damage_multiplier();

        if ratio < 0.2 {
            let opts = LaserOptions {
                width: 4.0,
                life: 0.15,
                ..Default::default()
            };
            bullets.spawn_laser(self.pos, UP, base * 2.0, opts);
        } else if ratio >= 0.9 {
            for offset in [0.0, -0.1, 0.1] {
                let opts = LaserOptions {
                    width: 16.0,
                    life: 0.4,
                    ..Default::default()
                };
                bullets.spawn_laser(self.pos, UP + offset, base * 5.0, opts);
            }
            particles.explosion(self.pos, CHARGE_COLOR, 30);
        } else {
            let opts = LaserOptions {
                width: 4.0 + ratio * 12.0,
                life: 0.2 + ratio * 0.2,
                ..Default::default()
            };
            bullets.spawn_laser(self.pos, UP, base * (2.0 + ratio * 3.0), opts);
        }
        self.laser_charge = 0.0;
        self.charging = false;
    }

    /// Apply damage unless invincible or shielded; returns hp lost
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if amount <= 0.0 || self.is_invincible() || self.has_buff(BuffKind::Shield) {
            return 0.0;
        }
        let before = self.hp;
        self.hp = (self.hp - amount).clamp(0.0, self.max_hp);
        self.invincible_timer = self.cfg.invincible_time;
        before - self.hp
    }

    /// Returns hp actually restored
    pub fn heal(&mut self, amount: f32) -> f32 {
        if amount <= 0.0 || !self.is_alive() {
            return 0.0;
        }
        let before = self.hp;
        self.hp = (self.hp + amount).min(self.max_hp);
        self.hp - before
    }

    /// Add xp and take every level-up it pays for; returns levels gained
    pub fn add_xp(&mut self, amount: u32) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        let mut gained = 0;
        while self.next_xp > 0 && self.xp >= self.next_xp {
            self.xp -= self.next_xp;
            self.next_xp = self.cfg.grow_next_xp(self.next_xp);
            self.level_up();
            gained += 1;
        }
        gained
    }

    fn level_up(&mut self) {
        self.level += 1;
        self.max_hp += self.cfg.level_up_max_hp;
        self.hp = self.max_hp;
        self.bullet_damage += self.cfg.level_up_damage;
        self.skill_points += 1;
        self.pending_level_ups += 1;
        log::info!("player reached level {}", self.level);
    }

    /// Same-kind buffs merge by keeping the longer duration
    pub fn add_buff(&mut self, kind: BuffKind, duration: f32) {
        if duration <= 0.0 {
            return;
        }
        match self.buffs.iter_mut().find(|b| b.kind == kind) {
            Some(buff) => buff.remaining = buff.remaining.max(duration),
            None => self.buffs.push(Buff {
                kind,
                remaining: duration,
            }),
        }
    }

    /// Roll a critical hit on top of `base`
    pub fn roll_damage(&self, base: f32, rng: &mut SimRng) -> (f32, bool) {
        if rng.chance(self.critical_chance) {
            (base * self.critical_damage, true)
        } else {
            (base, false)
        }
    }

    /// Damage of one regular shot including buffs and a crit roll
    pub fn calculate_damage(&self, rng: &mut SimRng) -> f32 {
        self.roll_damage(self.bullet_damage * self.damage_multiplier(), rng).0
    }

    pub fn apply_boost(&mut self, boost: StatBoost) {
        match boost {
            StatBoost::MaxHp(amount) => {
                self.max_hp += amount;
                self.hp = (self.hp + amount).min(self.max_hp);
            }
            StatBoost::MaxHpPercent(fraction) => {
                let amount = (self.max_hp * fraction).floor();
                self.max_hp += amount;
                self.hp = (self.hp + amount).min(self.max_hp);
            }
            StatBoost::BulletDamage(amount) => self.bullet_damage += amount,
            StatBoost::BulletDamageScale(scale) => self.bullet_damage *= scale,
            StatBoost::AttackSpeedScale(scale) => self.attack_speed *= scale,
            StatBoost::BulletSizeScale(scale) => self.bullet_size *= scale,
        }
    }

    pub fn activate_skill(&mut self, kind: SkillKind, ignore_cooldown: bool) -> bool {
        self.skill_mut(kind).activate(ignore_cooldown)
    }

    pub fn level_up_skill(&mut self, kind: SkillKind, table: &SkillTable) -> bool {
        self.skill_mut(kind).level_up(table)
    }
}
