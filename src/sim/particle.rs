//! Cosmetic particles
//!
//! Particles never affect gameplay. They live in a fixed-capacity pool, so a
//! burst that would overflow the cap simply spawns fewer particles. Emitters
//! draw from their own random stream, so the particle cap never shifts the
//! gameplay rolls.

use std::f32::consts::TAU;

use glam::Vec2;

use super::pool::{Handle, Pool};
use super::rng::SimRng;
use crate::{Color, direction, polar_to_cartesian, rgb};

/// Draw shape of a particle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleShape {
    Circle,
    /// Short streak aligned with velocity
    Spark,
    /// Thin line rotated by `rotation`
    Line,
    Star,
    Diamond,
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Color,
    pub size: f32,
    pub life: f32,
    pub max_life: f32,
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Velocity retained per 1/60 s
    pub friction: f32,
    /// Size retained per 1/60 s
    pub shrink: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub shape: ParticleShape,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, color: Color, size: f32, life: f32) -> Self {
        Self {
            pos,
            vel,
            color,
            size,
            life,
            max_life: life,
            gravity: 0.0,
            friction: 0.98,
            shrink: 1.0,
            rotation: 0.0,
            rotation_speed: 0.0,
            shape: ParticleShape::Circle,
        }
    }

    pub fn with_shape(mut self, shape: ParticleShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_spin(mut self, rotation: f32, rotation_speed: f32) -> Self {
        self.rotation = rotation;
        self.rotation_speed = rotation_speed;
        self
    }

    pub fn with_shrink(mut self, shrink: f32) -> Self {
        self.shrink = shrink;
        self
    }

    /// Remaining life as 0..=1, used as draw alpha
    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }

    /// Advance physics; returns false once expired
    fn step(&mut self, dt: f32) -> bool {
        let frames = dt * 60.0;
        self.vel.y += self.gravity * dt;
        self.vel *= self.friction.powf(frames);
        self.pos += self.vel * dt;
        self.size *= self.shrink.powf(frames);
        self.rotation += self.rotation_speed * dt;
        self.life -= dt;
        self.life > 0.0 && self.pos.is_finite()
    }
}

/// Pool of live particles plus the stock emitters
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    pool: Pool<Particle>,
    rng: SimRng,
}

impl ParticleSystem {
    pub fn new(capacity: usize) -> Self {
        Self::with_seed(capacity, 0)
    }

    pub fn with_seed(capacity: usize, seed: u64) -> Self {
        Self {
            pool: Pool::with_capacity(capacity),
            rng: SimRng::new(seed),
        }
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn spawn(&mut self, particle: Particle) -> Option<Handle> {
        self.pool.spawn(particle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.pool.values()
    }

    pub fn update(&mut self, dt: f32) {
        self.pool.retain(|p| p.step(dt));
    }

    pub fn clear(&mut self) {
        self.pool.clear();
    }

    /// Radial burst of sparks that fall under gravity
    pub fn explosion(&mut self, pos: Vec2, color: Color, count: usize) {
        let rng = &mut self.rng;
        for i in 0..count {
            if self.pool.is_full() {
                break;
            }
            let angle = TAU * i as f32 / count as f32 + rng.spread(0.2);
            let speed = 200.0 * rng.range(0.8, 1.2);
            let particle = Particle::new(
                pos,
                direction(angle) * speed,
                color,
                rng.range(3.0, 6.0),
                rng.range(0.5, 1.0),
            )
            .with_shape(ParticleShape::Spark)
            .with_gravity(200.0)
            .with_shrink(0.95);
            self.pool.spawn(particle);
        }
    }

    /// Short white streaks where a bullet connects
    pub fn hit(&mut self, pos: Vec2) {
        let rng = &mut self.rng;
        for _ in 0..8 {
            let angle = rng.angle();
            let particle = Particle::new(
                pos,
                direction(angle) * rng.range(50.0, 100.0),
                rgb(0xffffff),
                rng.range(2.0, 4.0),
                0.3,
            )
            .with_shape(ParticleShape::Line)
            .with_spin(angle, 0.0);
            if self.pool.spawn(particle).is_none() {
                break;
            }
        }
    }

    /// Single fading dot left behind a moving object
    pub fn trail(&mut self, pos: Vec2, color: Color, size: f32, life: f32) {
        let particle = Particle::new(pos, Vec2::ZERO, color, size, life).with_shrink(0.95);
        self.pool.spawn(particle);
    }

    /// Star shower plus a large burst
    pub fn level_up(&mut self, pos: Vec2) {
        const COLORS: [u32; 4] = [0x44aaff, 0xffff44, 0xff44ff, 0x44ff44];
        let rng = &mut self.rng;
        for i in 0..20 {
            let angle = TAU * i as f32 / 20.0;
            let color = rgb(*rng.pick(&COLORS).unwrap_or(&COLORS[0]));
            let particle = Particle::new(
                pos,
                direction(angle) * rng.range(200.0, 300.0),
                color,
                rng.range(4.0, 8.0),
                rng.range(1.0, 1.5),
            )
            .with_shape(ParticleShape::Star)
            .with_gravity(200.0)
            .with_spin(angle, rng.spread(10.0));
            if self.pool.spawn(particle).is_none() {
                break;
            }
        }
        self.explosion(pos, rgb(0xffff44), 30);
    }

    /// Occasional spark orbiting a charging emitter
    pub fn charge_spark(&mut self, center: Vec2, radius: f32, color: Color) {
        if self.rng.chance(0.3) {
            let spot = center + polar_to_cartesian(radius, self.rng.angle());
            self.explosion(spot, color, 1);
        }
    }

    /// Ring of spinning diamonds around a buff pickup
    pub fn power_up(&mut self, pos: Vec2, color: Color) {
        for i in 0..12 {
            let angle = TAU * i as f32 / 12.0;
            let particle = Particle::new(pos, direction(angle) * 120.0, color, 6.0, 0.6)
                .with_shape(ParticleShape::Diamond)
                .with_spin(angle, 6.0)
                .with_shrink(0.97);
            if self.pool.spawn(particle).is_none() {
                break;
            }
        }
    }

    /// Small sparkle when an item is picked up
    pub fn collect(&mut self, pos: Vec2, color: Color) {
        let rng = &mut self.rng;
        for _ in 0..6 {
            let particle = Particle::new(
                pos,
                direction(rng.angle()) * rng.range(40.0, 90.0),
                color,
                rng.range(2.0, 4.0),
                0.4,
            )
            .with_shape(ParticleShape::Star);
            if self.pool.spawn(particle).is_none() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particles_expire() {
        let mut system = ParticleSystem::new(10);
        system.trail(Vec2::ZERO, rgb(0xffffff), 3.0, 0.3);
        system.update(0.2);
        assert_eq!(system.len(), 1);
        system.update(0.2);
        assert!(system.is_empty());
    }

    #[test]
    fn test_burst_respects_capacity() {
        let mut system = ParticleSystem::new(16);
        system.explosion(Vec2::ZERO, rgb(0xff6666), 100);
        assert_eq!(system.len(), 16);
        system.level_up(Vec2::ZERO);
        assert_eq!(system.len(), 16);
    }

    #[test]
    fn test_gravity_pulls_down() {
        let mut system = ParticleSystem::new(1);
        let p = Particle::new(Vec2::ZERO, Vec2::ZERO, rgb(0xffffff), 2.0, 1.0).with_gravity(200.0);
        system.spawn(p);
        system.update(0.1);
        let p = system.iter().next().expect("alive");
        assert!(p.vel.y > 0.0);
        assert!(p.pos.y > 0.0);
    }

    #[test]
    fn test_same_seed_same_burst() {
        let burst = |seed: u64| {
            let mut system = ParticleSystem::with_seed(64, seed);
            system.explosion(Vec2::ZERO, rgb(0xff6666), 10);
            system.iter().map(|p| p.vel).collect::<Vec<_>>()
        };
        assert_eq!(burst(3), burst(3));
        assert_ne!(burst(3), burst(4));
    }

    #[test]
    fn test_alpha_tracks_life() {
        let mut p = Particle::new(Vec2::ZERO, Vec2::ZERO, rgb(0xffffff), 2.0, 1.0);
        assert_eq!(p.alpha(), 1.0);
        p.step(0.5);
        assert!((p.alpha() - 0.5).abs() < 1e-5);
    }
}
