//! Projectiles: pooled bullets and short-lived laser beams
//!
//! This module only moves and prunes projectiles. Hits are resolved by the
//! central pass in `sim::collision`, which flags bullets for removal; the
//! flagged slots are released by `release_removed` at the end of that pass.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::particle::ParticleSystem;
use super::pool::{Handle, Pool};
use crate::tuning::WorldTuning;
use crate::{Color, angle_to, consts, direction, normalize_angle, rgb};

pub const PLAYER_BULLET_SPEED: f32 = 400.0;
pub const PLAYER_BULLET_SIZE: f32 = 8.0;
pub const PLAYER_BULLET_COLOR: Color = rgb(0xffcc66);
pub const ENEMY_BULLET_SPEED: f32 = 200.0;
pub const ENEMY_BULLET_SIZE: f32 = 6.0;
pub const ENEMY_BULLET_COLOR: Color = rgb(0xff6666);
pub const BULLET_DAMAGE: f32 = 10.0;
pub const HOMING_STRENGTH: f32 = 3.0;
/// Share of the bullet's damage each chain hop deals
pub const CHAIN_FALLOFF: f32 = 0.7;
/// Share of the bullet's damage the meteor splash deals at its center
pub const METEOR_SPLASH: f32 = 0.5;
pub const METEOR_RADIUS: f32 = 100.0;
/// Lasers extend to this far above the canvas
const LASER_TOP: f32 = -100.0;

/// Motion / payload tag of a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BulletPattern {
    #[default]
    Normal,
    /// Part of a fan; flies straight
    Spread,
    /// Polar path recomputed from elapsed time around the spawn point
    Spiral,
    /// Sine offset across a straight base path
    Zigzag,
    /// Steers toward a live target with a capped turn rate
    Homing,
    /// Decorative beam segment, deals no damage
    Beam,
    Meteor,
}

/// Splash that hops to nearby enemies after the first hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainPayload {
    pub chain_count: u32,
    pub chain_range: f32,
    pub stun_duration: f32,
    pub damage_amplification: f32,
    pub slow_effect: f32,
    pub slow_duration: f32,
}

impl Default for ChainPayload {
    fn default() -> Self {
        Self {
            chain_count: 3,
            chain_range: 150.0,
            stun_duration: 0.0,
            damage_amplification: 1.0,
            slow_effect: 0.0,
            slow_duration: 0.0,
        }
    }
}

/// Area burst on impact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeteorPayload {
    pub explosion_radius: f32,
    pub burn_damage: f32,
    pub burn_duration: f32,
}

impl Default for MeteorPayload {
    fn default() -> Self {
        Self {
            explosion_radius: METEOR_RADIUS,
            burn_damage: 0.0,
            burn_duration: 0.0,
        }
    }
}

/// Optional overrides for a spawned bullet; `None` falls back to the owner's default
#[derive(Debug, Clone, Default)]
pub struct BulletOptions {
    pub speed: Option<f32>,
    pub size: Option<f32>,
    pub damage: Option<f32>,
    pub color: Option<Color>,
    pub pattern: BulletPattern,
    /// Bullets in a spread/spiral fan (1 = single bullet)
    pub count: u32,
    /// Total fan arc for `Spread` (radians)
    pub spread: f32,
    pub spiral_speed: f32,
    pub zigzag_amplitude: f32,
    pub zigzag_frequency: f32,
    pub homing_strength: Option<f32>,
    pub beam_length: f32,
    pub penetrate: bool,
    pub trail: bool,
    pub chain: Option<ChainPayload>,
    pub meteor: Option<MeteorPayload>,
}

impl BulletOptions {
    pub fn pattern(pattern: BulletPattern) -> Self {
        Self {
            pattern,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bullet {
    pub pos: Vec2,
    /// Spawn point, anchor for spiral and zigzag paths
    pub origin: Vec2,
    /// Unit heading
    pub dir: Vec2,
    pub speed: f32,
    pub size: f32,
    pub damage: f32,
    pub color: Color,
    pub pattern: BulletPattern,
    pub penetrate: bool,
    pub trail: bool,
    /// Seconds since spawn
    pub age: f32,
    pub spiral_speed: f32,
    pub zigzag_amplitude: f32,
    pub zigzag_frequency: f32,
    pub homing_strength: f32,
    pub beam_length: f32,
    pub chain: Option<ChainPayload>,
    pub meteor: Option<MeteorPayload>,
    /// Enemy ids a penetrating bullet has already struck
    pub hit_enemies: Vec<u32>,
    pub remove: bool,
}

impl Bullet {
    /// Heading angle (radians)
    pub fn angle(&self) -> f32 {
        self.dir.y.atan2(self.dir.x)
    }

    /// Whether collision should consider this bullet at all
    pub fn is_harmful(&self) -> bool {
        !self.remove && self.pattern != BulletPattern::Beam && self.damage > 0.0
    }

    fn advance(&mut self, dt: f32, target: Option<Vec2>) {
        self.age += dt;
        match self.pattern {
            BulletPattern::Spiral => {
                let heading = self.dir.y.atan2(self.dir.x);
                let radius = self.speed * self.age;
                self.pos = self.origin + direction(heading + self.age * self.spiral_speed) * radius;
            }
            BulletPattern::Zigzag => {
                let base = self.origin + self.dir * self.speed * self.age;
                let lateral = (self.age * self.zigzag_frequency).sin() * self.zigzag_amplitude;
                self.pos = base + self.dir.perp() * lateral;
            }
            BulletPattern::Homing => {
                if let Some(target) = target {
                    let angle = steer(
                        self.angle(),
                        angle_to(self.pos, target),
                        self.homing_strength * dt,
                    );
                    self.dir = direction(angle);
                }
                self.pos += self.dir * self.speed * dt;
            }
            BulletPattern::Normal
            | BulletPattern::Spread
            | BulletPattern::Beam
            | BulletPattern::Meteor => {
                self.pos += self.dir * self.speed * dt;
            }
        }
    }
}

/// Turn `current` toward `target` by at most `max_turn`, along the short arc
pub fn steer(current: f32, target: f32, max_turn: f32) -> f32 {
    let diff = normalize_angle(target - current);
    let turn = diff.clamp(-max_turn, max_turn);
    normalize_angle(current + turn)
}

/// How a laser deals its damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaserDamage {
    /// Full damage once, on the first collision pass
    Instant,
    /// `damage * dt` every collision pass
    PerSecond,
}

#[derive(Debug, Clone)]
pub struct LaserOptions {
    pub width: f32,
    pub life: f32,
    pub color: Color,
    pub mode: LaserDamage,
    /// Beam length; `None` reaches the top of the canvas
    pub length: Option<f32>,
}

impl Default for LaserOptions {
    fn default() -> Self {
        Self {
            width: 12.0,
            life: 0.3,
            color: rgb(0xffd700),
            mode: LaserDamage::Instant,
            length: None,
        }
    }
}

/// Straight beam segment anchored at its spawn point
#[derive(Debug, Clone)]
pub struct Laser {
    pub origin: Vec2,
    pub angle: f32,
    pub length: f32,
    pub damage: f32,
    pub mode: LaserDamage,
    pub width: f32,
    pub life: f32,
    pub max_life: f32,
    pub color: Color,
    /// Instant damage already dealt
    pub applied: bool,
    /// Spawned this frame; survives its first update untouched
    pub fresh: bool,
}

impl Laser {
    pub fn end(&self) -> Vec2 {
        self.origin + direction(self.angle) * self.length
    }

    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            1.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }

    /// Band test: projection onto the beam axis within [0, length] and
    /// lateral distance under `radius + width / 2`
    pub fn hits(&self, point: Vec2, radius: f32) -> bool {
        let axis = direction(self.angle);
        let rel = point - self.origin;
        let along = rel.dot(axis);
        if along < 0.0 || along > self.length {
            return false;
        }
        rel.perp_dot(axis).abs() < radius + self.width / 2.0
    }
}

/// Canvas rectangle grown by the prune margin
#[derive(Debug, Clone, Copy)]
struct Bounds {
    width: f32,
    height: f32,
    margin: f32,
}

impl Bounds {
    fn contains(&self, p: Vec2) -> bool {
        p.is_finite()
            && p.x >= -self.margin
            && p.x <= self.width + self.margin
            && p.y >= -self.margin
            && p.y <= self.height + self.margin
    }
}

/// Where homing bullets steer this frame
#[derive(Debug, Clone, Copy, Default)]
pub struct HomingTargets<'a> {
    /// Live player position (enemy bullets)
    pub player: Option<Vec2>,
    /// Live enemy positions (player bullets steer to the nearest)
    pub enemies: &'a [Vec2],
}

impl HomingTargets<'_> {
    fn nearest_enemy(&self, from: Vec2) -> Option<Vec2> {
        self.enemies
            .iter()
            .copied()
            .min_by(|a, b| {
                a.distance_squared(from)
                    .partial_cmp(&b.distance_squared(from))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}

/// Owns the player and enemy bullet pools and the laser list
#[derive(Debug, Clone)]
pub struct BulletManager {
    player_bullets: Pool<Bullet>,
    enemy_bullets: Pool<Bullet>,
    lasers: Vec<Laser>,
    max_lasers: usize,
    bounds: Bounds,
    full_warned: bool,
}

impl BulletManager {
    pub fn new(max_bullets: usize, max_lasers: usize, world: &WorldTuning) -> Self {
        Self {
            player_bullets: Pool::with_capacity(max_bullets),
            enemy_bullets: Pool::with_capacity(max_bullets),
            lasers: Vec::with_capacity(max_lasers),
            max_lasers,
            bounds: Bounds {
                width: world.width,
                height: world.height,
                margin: world.bounds_margin,
            },
            full_warned: false,
        }
    }

    /// Spawn a player bullet (or a fan, for spread/spiral with `count > 1`).
    /// Returns how many bullets were created; a full pool creates none.
    pub fn spawn_player_bullet(&mut self, origin: Vec2, dir: Vec2, opts: BulletOptions) -> usize {
        let defaults = (PLAYER_BULLET_SPEED, PLAYER_BULLET_SIZE, PLAYER_BULLET_COLOR);
        let spawned = spawn_into(&mut self.player_bullets, origin, dir, &opts, defaults);
        if spawned == 0 {
            self.warn_full("player");
        }
        spawned
    }

    pub fn spawn_enemy_bullet(&mut self, origin: Vec2, dir: Vec2, opts: BulletOptions) -> usize {
        let defaults = (ENEMY_BULLET_SPEED, ENEMY_BULLET_SIZE, ENEMY_BULLET_COLOR);
        let spawned = spawn_into(&mut self.enemy_bullets, origin, dir, &opts, defaults);
        if spawned == 0 {
            self.warn_full("enemy");
        }
        spawned
    }

    // Warns once per run
    fn warn_full(&mut self, owner: &str) {
        if !self.full_warned {
            self.full_warned = true;
            log::warn!("{owner} bullet pool full, dropping spawns");
        }
    }

    /// Spawn a beam; false when the laser list is full
    pub fn spawn_laser(&mut self, origin: Vec2, angle: f32, damage: f32, opts: LaserOptions) -> bool {
        if self.lasers.len() >= self.max_lasers {
            return false;
        }
        let length = opts.length.unwrap_or_else(|| {
            let rise = -angle.sin();
            if rise > 0.01 {
                (origin.y - LASER_TOP) / rise
            } else {
                self.bounds.height
            }
        });
        self.lasers.push(Laser {
            origin,
            angle,
            length,
            damage,
            mode: opts.mode,
            width: opts.width,
            life: opts.life,
            max_life: opts.life,
            color: opts.color,
            applied: false,
            fresh: true,
        });
        true
    }

    /// Advance every projectile and prune the ones that left the canvas
    pub fn update(&mut self, dt: f32, targets: HomingTargets<'_>, particles: &mut ParticleSystem) {
        let bounds = self.bounds;

        for bullet in self.player_bullets.values_mut() {
            let target = if bullet.pattern == BulletPattern::Homing {
                targets.nearest_enemy(bullet.pos)
            } else {
                None
            };
            step_bullet(bullet, dt, target, bounds, particles);
        }
        for bullet in self.enemy_bullets.values_mut() {
            step_bullet(bullet, dt, targets.player, bounds, particles);
        }
        self.release_removed();

        self.lasers.retain_mut(|laser| {
            if laser.fresh {
                laser.fresh = false;
                return true;
            }
            laser.life -= dt;
            laser.life > 0.0
        });
    }

    /// Free every bullet slot flagged for removal
    pub fn release_removed(&mut self) {
        for pool in [&mut self.player_bullets, &mut self.enemy_bullets] {
            let flagged: Vec<Handle> = pool
                .iter()
                .filter(|(_, b)| b.remove)
                .map(|(handle, _)| handle)
                .collect();
            for handle in flagged {
                pool.release(handle);
            }
        }
    }

    pub fn clear(&mut self) {
        self.player_bullets.clear();
        self.enemy_bullets.clear();
        self.lasers.clear();
    }

    pub fn player_bullet_count(&self) -> usize {
        self.player_bullets.len()
    }

    pub fn enemy_bullet_count(&self) -> usize {
        self.enemy_bullets.len()
    }

    pub fn player_bullets(&self) -> impl Iterator<Item = &Bullet> {
        self.player_bullets.values()
    }

    pub fn enemy_bullets(&self) -> impl Iterator<Item = &Bullet> {
        self.enemy_bullets.values()
    }

    pub fn player_bullets_mut(&mut self) -> impl Iterator<Item = &mut Bullet> {
        self.player_bullets.values_mut()
    }

    pub fn enemy_bullets_mut(&mut self) -> impl Iterator<Item = &mut Bullet> {
        self.enemy_bullets.values_mut()
    }

    pub fn lasers(&self) -> &[Laser] {
        &self.lasers
    }

    pub fn lasers_mut(&mut self) -> &mut [Laser] {
        &mut self.lasers
    }
}

fn step_bullet(
    bullet: &mut Bullet,
    dt: f32,
    target: Option<Vec2>,
    bounds: Bounds,
    particles: &mut ParticleSystem,
) {
    if bullet.remove {
        return;
    }
    bullet.advance(dt, target);
    if bullet.trail {
        particles.trail(bullet.pos, bullet.color, bullet.size * 0.4, 0.3);
    }
    if !bounds.contains(bullet.pos) {
        bullet.remove = true;
    }
}

fn spawn_into(
    pool: &mut Pool<Bullet>,
    origin: Vec2,
    dir: Vec2,
    opts: &BulletOptions,
    (speed, size, color): (f32, f32, Color),
) -> usize {
    let heading = if dir.length_squared() > 0.0 {
        dir.y.atan2(dir.x)
    } else {
        consts::UP
    };
    let count = opts.count.max(1);

    let make = |angle: f32, spiral_speed: f32| Bullet {
        pos: origin,
        origin,
        dir: direction(angle),
        speed: opts.speed.unwrap_or(speed),
        size: opts.size.unwrap_or(size),
        damage: opts.damage.unwrap_or(BULLET_DAMAGE),
        color: opts.color.unwrap_or(color),
        pattern: opts.pattern,
        penetrate: opts.penetrate,
        trail: opts.trail,
        age: 0.0,
        spiral_speed,
        zigzag_amplitude: opts.zigzag_amplitude,
        zigzag_frequency: opts.zigzag_frequency,
        homing_strength: opts.homing_strength.unwrap_or(HOMING_STRENGTH),
        beam_length: opts.beam_length,
        chain: opts.chain,
        meteor: opts.meteor,
        hit_enemies: Vec::new(),
        remove: false,
    };

    let mut spawned = 0;
    for i in 0..count {
        let (angle, spiral_speed) = match opts.pattern {
            BulletPattern::Spread if count > 1 => {
                let step = opts.spread / (count - 1) as f32;
                (heading - opts.spread / 2.0 + step * i as f32, opts.spiral_speed)
            }
            BulletPattern::Spiral if count > 1 => (
                heading + TAU * i as f32 / count as f32,
                opts.spiral_speed + i as f32 * PI / 8.0,
            ),
            _ => (heading, opts.spiral_speed),
        };
        if pool.spawn(make(angle, spiral_speed)).is_none() {
            break;
        }
        spawned += 1;
    }
    spawned
}
