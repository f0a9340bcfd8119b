//! Timed visual effects (floating numbers, rings, lightning arcs)
//!
//! Like particles these are purely cosmetic, with their own random stream.
//! The list is bounded; requests past the cap are dropped.

use glam::Vec2;

use super::rng::SimRng;
use crate::{Color, rgb};

/// Segments in a lightning arc
pub const LIGHTNING_SEGMENTS: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub enum EffectKind {
    LevelUp,
    SkillActivate,
    /// Floating damage number
    Damage { amount: f32, critical: bool },
    /// Floating heal number
    Heal { amount: f32 },
    /// Expanding ring around a buffed player
    Buff,
    /// Jagged polyline between two points
    Lightning { points: Vec<Vec2> },
    Explosion,
    BossPhase,
    Stealth,
    Dash,
    MuzzleFlash,
}

impl EffectKind {
    /// Lifetime in seconds
    pub fn duration(&self) -> f32 {
        match self {
            EffectKind::LevelUp => 2.0,
            EffectKind::SkillActivate => 1.0,
            EffectKind::Damage { .. } | EffectKind::Heal { .. } => 1.0,
            EffectKind::Buff => 1.0,
            EffectKind::Lightning { .. } => 0.3,
            EffectKind::Explosion => 0.5,
            EffectKind::BossPhase => 1.5,
            EffectKind::Stealth => 0.5,
            EffectKind::Dash => 0.3,
            EffectKind::MuzzleFlash => 0.1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Effect {
    pub kind: EffectKind,
    pub pos: Vec2,
    pub color: Color,
    pub size: f32,
    pub lifetime: f32,
    pub max_lifetime: f32,
    /// Vertical drift for floating text
    pub offset_y: f32,
}

impl Effect {
    /// 0 at spawn, 1 at expiry
    pub fn progress(&self) -> f32 {
        (self.lifetime / self.max_lifetime).clamp(0.0, 1.0)
    }

    pub fn alpha(&self) -> f32 {
        1.0 - self.progress()
    }

    fn step(&mut self, dt: f32) -> bool {
        self.lifetime += dt;
        if matches!(
            self.kind,
            EffectKind::Damage { .. } | EffectKind::Heal { .. }
        ) {
            self.offset_y -= dt * 50.0;
        }
        self.lifetime < self.max_lifetime
    }
}

#[derive(Debug, Clone)]
pub struct EffectManager {
    effects: Vec<Effect>,
    capacity: usize,
    rng: SimRng,
}

impl EffectManager {
    pub fn new(capacity: usize) -> Self {
        Self::with_seed(capacity, 0)
    }

    pub fn with_seed(capacity: usize, seed: u64) -> Self {
        Self {
            effects: Vec::with_capacity(capacity),
            capacity,
            rng: SimRng::new(seed),
        }
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    /// Start an effect; false when the list is full
    pub fn create(&mut self, kind: EffectKind, pos: Vec2, color: Color, size: f32) -> bool {
        if self.effects.len() >= self.capacity {
            return false;
        }
        let max_lifetime = kind.duration();
        self.effects.push(Effect {
            kind,
            pos,
            color,
            size,
            lifetime: 0.0,
            max_lifetime,
            offset_y: 0.0,
        });
        true
    }

    pub fn damage_number(&mut self, pos: Vec2, amount: f32, critical: bool) -> bool {
        let color = if critical { rgb(0xffdd00) } else { rgb(0xffffff) };
        let size = if critical { 24.0 } else { 16.0 };
        self.create(EffectKind::Damage { amount, critical }, pos, color, size)
    }

    pub fn heal_number(&mut self, pos: Vec2, amount: f32) -> bool {
        self.create(EffectKind::Heal { amount }, pos, rgb(0x44ff44), 16.0)
    }

    /// Lightning arc with jittered interior points
    pub fn lightning(&mut self, from: Vec2, to: Vec2, color: Color) -> bool {
        let mut points = Vec::with_capacity(LIGHTNING_SEGMENTS + 1);
        let normal = (to - from).perp().normalize_or_zero();
        for i in 0..=LIGHTNING_SEGMENTS {
            let t = i as f32 / LIGHTNING_SEGMENTS as f32;
            let jitter = if i == 0 || i == LIGHTNING_SEGMENTS {
                0.0
            } else {
                self.rng.spread(20.0)
            };
            points.push(from.lerp(to, t) + normal * jitter);
        }
        self.create(EffectKind::Lightning { points }, from, color, 2.0)
    }

    pub fn update(&mut self, dt: f32) {
        self.effects.retain_mut(|e| e.step(dt));
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_drops_extra_effects() {
        let mut effects = EffectManager::new(2);
        assert!(effects.create(EffectKind::Buff, Vec2::ZERO, rgb(0xffffff), 10.0));
        assert!(effects.damage_number(Vec2::ZERO, 5.0, false));
        assert!(!effects.heal_number(Vec2::ZERO, 1.0));
        assert_eq!(effects.len(), 2);
    }

    #[test]
    fn test_floating_number_rises_and_expires() {
        let mut effects = EffectManager::new(4);
        effects.damage_number(Vec2::new(10.0, 10.0), 12.0, true);
        effects.update(0.5);
        let e = effects.iter().next().expect("alive");
        assert!((e.offset_y + 25.0).abs() < 1e-4);
        assert!((e.alpha() - 0.5).abs() < 1e-4);
        effects.update(0.6);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_lightning_endpoints_are_exact() {
        let mut effects = EffectManager::new(4);
        let from = Vec2::new(0.0, 0.0);
        let to = Vec2::new(100.0, 0.0);
        effects.lightning(from, to, rgb(0x77ddff));
        let Some(EffectKind::Lightning { points }) = effects.iter().next().map(|e| &e.kind) else {
            panic!("expected lightning");
        };
        assert_eq!(points.len(), LIGHTNING_SEGMENTS + 1);
        assert_eq!(points[0], from);
        assert_eq!(points[LIGHTNING_SEGMENTS], to);
    }
}
