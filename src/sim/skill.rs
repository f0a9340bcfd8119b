//! Player skills
//!
//! Each skill is a cooldown/duration state machine. While active it emits
//! `SkillCommand`s; the tick loop applies them to the player, projectiles and
//! effects, so a skill never touches another subsystem's state directly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bullet::{ChainPayload, MeteorPayload};
use super::rng::SimRng;
use crate::tuning::SkillTable;
use crate::{Color, angle_to, direction, rgb, rgba};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkillKind {
    RegenAura,
    HomingLaser,
    ChainLightning,
    MeteorShower,
}

impl SkillKind {
    pub const ALL: [SkillKind; 4] = [
        SkillKind::RegenAura,
        SkillKind::HomingLaser,
        SkillKind::ChainLightning,
        SkillKind::MeteorShower,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillKind::RegenAura => "regenAura",
            SkillKind::HomingLaser => "homingLaser",
            SkillKind::ChainLightning => "chainLightning",
            SkillKind::MeteorShower => "meteorShower",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            SkillKind::RegenAura => 0,
            SkillKind::HomingLaser => 1,
            SkillKind::ChainLightning => 2,
            SkillKind::MeteorShower => 3,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            SkillKind::RegenAura => rgb(0x44ff88),
            SkillKind::HomingLaser => rgb(0xff44ff),
            SkillKind::ChainLightning => rgb(0x77ddff),
            SkillKind::MeteorShower => rgb(0xff6666),
        }
    }
}

/// Type-specific tunables and per-activation state
#[derive(Debug, Clone, PartialEq)]
pub enum SkillParams {
    RegenAura {
        range: f32,
        heal_amount: f32,
        pulse_interval: f32,
        pulse_timer: f32,
        shield_amount: f32,
    },
    HomingLaser {
        damage: f32,
        beam_width: f32,
        beam_speed: f32,
        beam_length: f32,
        color_interval: f32,
        color_timer: f32,
        color_index: usize,
        palette: Vec<u32>,
    },
    ChainLightning {
        damage: f32,
        bolt_speed: f32,
        bolt_size: f32,
        zigzag_amplitude: f32,
        zigzag_frequency: f32,
        payload: ChainPayload,
        /// Bolt still to be launched for the current activation
        pending_cast: bool,
    },
    MeteorShower {
        meteor_count: u32,
        damage: f32,
        meteor_speed: f32,
        meteor_size: f32,
        payload: MeteorPayload,
    },
}

/// Side effects requested by an active skill
#[derive(Debug, Clone, PartialEq)]
pub enum SkillCommand {
    Heal(f32),
    /// Shield buff seconds
    Shield(f32),
    /// Ring of heal sparkles at `range` around the player
    HealPulse { range: f32 },
    /// One heal sparkle at an offset from the player
    HealSparkle { offset: Vec2 },
    /// Continuous beam straight up from the player
    Beam {
        width: f32,
        damage_per_sec: f32,
        speed: f32,
        length: f32,
        color: Color,
        glow: Color,
    },
    /// Zigzagging bolt carrying the chain splash
    ChainBolt {
        damage: f32,
        speed: f32,
        size: f32,
        zigzag_amplitude: f32,
        zigzag_frequency: f32,
        payload: ChainPayload,
    },
    Meteor {
        origin: Vec2,
        dir: Vec2,
        damage: f32,
        speed: f32,
        size: f32,
        payload: MeteorPayload,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skill {
    pub kind: SkillKind,
    pub level: u32,
    pub max_level: u32,
    pub cooldown: f32,
    pub cooldown_timer: f32,
    pub duration: f32,
    pub duration_timer: f32,
    pub active: bool,
    pub params: SkillParams,
}

impl Skill {
    pub fn new(kind: SkillKind, table: &SkillTable) -> Self {
        let (cooldown, duration, params) = match kind {
            SkillKind::RegenAura => {
                let t = &table.regen_aura;
                (
                    t.cooldown,
                    t.duration,
                    SkillParams::RegenAura {
                        range: t.range,
                        heal_amount: t.heal_amount,
                        pulse_interval: t.pulse_interval,
                        pulse_timer: 0.0,
                        shield_amount: t.shield_amount,
                    },
                )
            }
            SkillKind::HomingLaser => {
                let t = &table.homing_laser;
                (
                    t.cooldown,
                    t.duration,
                    SkillParams::HomingLaser {
                        damage: t.damage,
                        beam_width: t.beam_width,
                        beam_speed: t.beam_speed,
                        beam_length: t.beam_length,
                        color_interval: t.color_interval,
                        color_timer: 0.0,
                        color_index: 0,
                        palette: t.palette.clone(),
                    },
                )
            }
            SkillKind::ChainLightning => {
                let t = &table.chain_lightning;
                (
                    t.cooldown,
                    0.0,
                    SkillParams::ChainLightning {
                        damage: t.damage,
                        bolt_speed: t.bolt_speed,
                        bolt_size: t.bolt_size,
                        zigzag_amplitude: t.bolt_zigzag_amplitude,
                        zigzag_frequency: t.bolt_zigzag_frequency,
                        payload: ChainPayload {
                            chain_count: t.chain_count,
                            chain_range: t.chain_range,
                            stun_duration: t.stun_duration,
                            damage_amplification: t.damage_amplification,
                            slow_effect: t.slow_effect,
                            slow_duration: t.slow_duration,
                        },
                        pending_cast: false,
                    },
                )
            }
            SkillKind::MeteorShower => {
                let t = &table.meteor_shower;
                (
                    t.cooldown,
                    t.duration,
                    SkillParams::MeteorShower {
                        meteor_count: t.meteor_count,
                        damage: t.damage,
                        meteor_speed: t.meteor_speed,
                        meteor_size: t.meteor_size,
                        payload: MeteorPayload {
                            explosion_radius: t.explosion_radius,
                            burn_damage: t.burn_damage,
                            burn_duration: t.burn_duration,
                        },
                    },
                )
            }
        };
        Self {
            kind,
            level: 0,
            max_level: table.max_level,
            cooldown,
            cooldown_timer: 0.0,
            duration,
            duration_timer: 0.0,
            active: false,
            params,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown_timer <= 0.0
    }

    /// Cooldown progress as 0 (just used) ..= 1 (ready)
    pub fn cooldown_ratio(&self) -> f32 {
        if self.cooldown <= 0.0 {
            1.0
        } else {
            1.0 - (self.cooldown_timer / self.cooldown).clamp(0.0, 1.0)
        }
    }

    /// Start the skill; false while cooling down unless `ignore_cooldown`
    pub fn activate(&mut self, ignore_cooldown: bool) -> bool {
        if !ignore_cooldown && self.cooldown_timer > 0.0 {
            log::warn!("{} is on cooldown ({:.1}s)", self.kind.as_str(), self.cooldown_timer);
            return false;
        }
        self.active = true;
        self.cooldown_timer = self.cooldown;
        self.duration_timer = self.duration;
        match &mut self.params {
            SkillParams::ChainLightning { pending_cast, .. } => *pending_cast = true,
            SkillParams::RegenAura { pulse_timer, .. } => *pulse_timer = 0.0,
            _ => {}
        }
        log::debug!("{} activated (level {})", self.kind.as_str(), self.level);
        true
    }

    pub fn deactivate(&mut self) {
        if self.active {
            self.active = false;
            self.duration_timer = 0.0;
            log::debug!("{} ended", self.kind.as_str());
        }
    }

    /// Advance timers and, while active, emit this frame's commands
    pub fn update(
        &mut self,
        dt: f32,
        world_size: Vec2,
        rng: &mut SimRng,
        out: &mut Vec<SkillCommand>,
    ) {
        if self.cooldown_timer > 0.0 {
            self.cooldown_timer = (self.cooldown_timer - dt).max(0.0);
        }
        if !self.active {
            return;
        }

        // Instant casts fire before the (zero) duration runs out
        if let SkillParams::ChainLightning {
            damage,
            bolt_speed,
            bolt_size,
            zigzag_amplitude,
            zigzag_frequency,
            payload,
            pending_cast,
        } = &mut self.params
        {
            if *pending_cast {
                *pending_cast = false;
                out.push(SkillCommand::ChainBolt {
                    damage: *damage,
                    speed: *bolt_speed,
                    size: *bolt_size,
                    zigzag_amplitude: *zigzag_amplitude,
                    zigzag_frequency: *zigzag_frequency,
                    payload: *payload,
                });
            }
        }

        self.duration_timer -= dt;
        if self.duration_timer <= 0.0 {
            self.deactivate();
            return;
        }
        self.update_effect(dt, world_size, rng, out);
    }

    fn update_effect(
        &mut self,
        dt: f32,
        world_size: Vec2,
        rng: &mut SimRng,
        out: &mut Vec<SkillCommand>,
    ) {
        match &mut self.params {
            SkillParams::RegenAura {
                range,
                heal_amount,
                pulse_interval,
                pulse_timer,
                shield_amount,
            } => {
                out.push(SkillCommand::Heal(*heal_amount * dt));
                *pulse_timer += dt;
                if *pulse_timer >= *pulse_interval {
                    *pulse_timer = 0.0;
                    out.push(SkillCommand::HealPulse { range: *range });
                    out.push(SkillCommand::Shield(*shield_amount));
                }
                if rng.chance(dt * 5.0) {
                    let offset = direction(rng.angle()) * rng.range(0.0, *range);
                    out.push(SkillCommand::HealSparkle { offset });
                }
            }
            SkillParams::HomingLaser {
                damage,
                beam_width,
                beam_speed,
                beam_length,
                color_interval,
                color_timer,
                color_index,
                palette,
            } => {
                *color_timer += dt;
                if *color_timer >= *color_interval && !palette.is_empty() {
                    *color_timer = 0.0;
                    *color_index = (*color_index + 1) % palette.len();
                }
                let hex = palette.get(*color_index).copied().unwrap_or(0xffffff);
                out.push(SkillCommand::Beam {
                    width: *beam_width,
                    damage_per_sec: *damage,
                    speed: *beam_speed,
                    length: *beam_length,
                    color: rgb(hex),
                    glow: rgba(hex, 0.3),
                });
            }
            SkillParams::ChainLightning { .. } => {}
            SkillParams::MeteorShower {
                meteor_count,
                damage,
                meteor_speed,
                meteor_size,
                payload,
            } => {
                if rng.chance(dt * *meteor_count as f32) {
                    let origin = Vec2::new(rng.range(0.0, world_size.x), -50.0);
                    let target = Vec2::new(origin.x + rng.spread(100.0), world_size.y + 50.0);
                    out.push(SkillCommand::Meteor {
                        origin,
                        dir: direction(angle_to(origin, target)),
                        damage: *damage,
                        speed: *meteor_speed,
                        size: *meteor_size,
                        payload: *payload,
                    });
                }
            }
        }
    }

    /// Raise the level and scale tunables; false at max level
    pub fn level_up(&mut self, table: &SkillTable) -> bool {
        if self.level >= self.max_level {
            return false;
        }
        self.level += 1;
        match &mut self.params {
            SkillParams::RegenAura {
                range,
                heal_amount,
                pulse_interval,
                shield_amount,
                ..
            } => {
                let t = &table.regen_aura;
                *heal_amount *= t.heal_multiplier;
                *range *= t.range_multiplier;
                *shield_amount *= t.shield_multiplier;
                *pulse_interval *= t.pulse_multiplier;
            }
            SkillParams::HomingLaser {
                damage,
                beam_width,
                color_interval,
                ..
            } => {
                let t = &table.homing_laser;
                *damage *= t.damage_multiplier;
                self.cooldown *= t.cooldown_multiplier;
                *beam_width *= t.width_multiplier;
                *color_interval *= t.color_interval_multiplier;
            }
            SkillParams::ChainLightning { damage, payload, .. } => {
                let t = &table.chain_lightning;
                *damage *= t.damage_multiplier;
                payload.chain_count += t.chain_step;
                payload.chain_range *= t.range_multiplier;
                payload.stun_duration += t.stun_step;
                payload.damage_amplification += t.amplification_step;
            }
            SkillParams::MeteorShower {
                meteor_count,
                damage,
                payload,
                ..
            } => {
                let t = &table.meteor_shower;
                *damage *= t.damage_multiplier;
                *meteor_count += t.count_step;
                payload.explosion_radius *= t.radius_multiplier;
                payload.burn_damage *= t.burn_multiplier;
            }
        }
        log::debug!("{} reached level {}", self.kind.as_str(), self.level);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD: Vec2 = Vec2::new(800.0, 600.0);

    fn skill(kind: SkillKind) -> (Skill, SkillTable) {
        let table = SkillTable::default();
        (Skill::new(kind, &table), table)
    }

    #[test]
    fn test_cooldown_blocks_activation() {
        let (mut s, _) = skill(SkillKind::HomingLaser);
        assert!(s.activate(false));
        s.deactivate();
        assert!(!s.activate(false));
        assert!(s.activate(true));
    }

    #[test]
    fn test_cooldown_recovers() {
        let (mut s, _) = skill(SkillKind::RegenAura);
        let mut rng = SimRng::new(1);
        let mut out = Vec::new();
        assert!(s.activate(false));
        for _ in 0..90 {
            s.update(0.1, WORLD, &mut rng, &mut out);
        }
        assert!(s.is_ready());
        assert_eq!(s.cooldown_ratio(), 1.0);
    }

    #[test]
    fn test_duration_expiry_deactivates() {
        let (mut s, _) = skill(SkillKind::HomingLaser);
        let mut rng = SimRng::new(1);
        let mut out = Vec::new();
        s.activate(false);
        s.update(0.5, WORLD, &mut rng, &mut out);
        assert!(s.active);
        assert!(matches!(out[0], SkillCommand::Beam { .. }));
        out.clear();
        s.update(0.6, WORLD, &mut rng, &mut out);
        assert!(!s.active);
        assert!(out.is_empty());
    }

    #[test]
    fn test_chain_lightning_fires_exactly_once() {
        let (mut s, _) = skill(SkillKind::ChainLightning);
        let mut rng = SimRng::new(1);
        let mut out = Vec::new();
        s.activate(false);
        for _ in 0..5 {
            s.update(1.0 / 60.0, WORLD, &mut rng, &mut out);
        }
        let bolts = out
            .iter()
            .filter(|c| matches!(c, SkillCommand::ChainBolt { .. }))
            .count();
        assert_eq!(bolts, 1);
        assert!(!s.active);
    }

    #[test]
    fn test_meteor_spawns_above_world() {
        let (mut s, _) = skill(SkillKind::MeteorShower);
        let mut rng = SimRng::new(9);
        let mut out = Vec::new();
        s.activate(false);
        // dt * meteor_count >= 1 guarantees a meteor
        s.update(0.2, WORLD, &mut rng, &mut out);
        let Some(SkillCommand::Meteor { origin, dir, .. }) = out.first() else {
            panic!("expected meteor");
        };
        assert_eq!(origin.y, -50.0);
        assert!(dir.y > 0.0);
    }

    #[test]
    fn test_regen_heals_and_pulses() {
        let (mut s, _) = skill(SkillKind::RegenAura);
        let mut rng = SimRng::new(3);
        let mut out = Vec::new();
        s.activate(false);
        s.update(0.25, WORLD, &mut rng, &mut out);
        s.update(0.25, WORLD, &mut rng, &mut out);
        let healed: f32 = out
            .iter()
            .filter_map(|c| match c {
                SkillCommand::Heal(h) => Some(*h),
                _ => None,
            })
            .sum();
        assert!((healed - 1.0).abs() < 1e-4);
        assert!(out.iter().any(|c| matches!(c, SkillCommand::HealPulse { .. })));
        assert!(out.iter().any(|c| matches!(c, SkillCommand::Shield(_))));
    }

    #[test]
    fn test_level_up_caps_at_max() {
        let (mut s, table) = skill(SkillKind::ChainLightning);
        for _ in 0..5 {
            assert!(s.level_up(&table));
        }
        assert!(!s.level_up(&table));
        assert_eq!(s.level, 5);
        let SkillParams::ChainLightning { payload, .. } = &s.params else {
            panic!("wrong params");
        };
        assert_eq!(payload.chain_count, 9);
    }
}
