//! Game state and session-level rules
//!
//! Everything one run owns lives here: actors, managers, the economy and the
//! phase machine. `tick` drives it; this module holds the rules that span
//! several subsystems (rewards, drops, bomber blasts, shop, upgrades).

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bullet::{BulletManager, BulletOptions, BulletPattern, LaserDamage, LaserOptions};
use super::effect::{EffectKind, EffectManager};
use super::enemy::EnemyKind;
use super::item::{Collected, ItemKind, ItemManager};
use super::particle::{Particle, ParticleShape, ParticleSystem};
use super::player::{BuffKind, Player};
use super::rng::SimRng;
use super::skill::{SkillCommand, SkillKind};
use super::wave::WaveDirector;
use crate::consts::UP;
use crate::settings::Settings;
use crate::tuning::Tuning;
use crate::{direction, rgb};

/// Upgrade picks offered per level-up
pub const UPGRADE_CHOICES: usize = 3;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the start input
    Title,
    Playing,
    Paused,
    /// Level-up banner; skill select opens when it expires
    LevelUp,
    SkillSelect,
    Shop,
    GameOver,
}

/// Something that happened this frame, for audio/UI layers
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    EnemyKilled { id: u32, kind: EnemyKind, pos: Vec2, score: u64 },
    EnemyEscaped { id: u32 },
    BomberExploded { id: u32, pos: Vec2 },
    PlayerDamaged { amount: f32 },
    LevelUp { level: u32 },
    ItemCollected { kind: ItemKind },
    BossSpawned { wave: u32, name: Option<String>, quote: Option<String> },
    BossPhaseChanged { id: u32, phase: u32 },
    WaveStarted { wave: u32 },
    WaveCleared { wave: u32 },
    SkillActivated { kind: SkillKind },
    Dash,
    Purchased { id: String },
    UpgradeSelected { choice: UpgradeChoice },
    GameOver { score: u64, wave: u32 },
}

/// One entry on the skill-select screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeChoice {
    /// Index into `Tuning::upgrades`
    Stat(usize),
    Skill(SkillKind),
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub seed: u64,
    pub tuning: Tuning,
    pub settings: Settings,
    pub rng: SimRng,
    pub phase: GamePhase,
    pub player: Player,
    pub director: WaveDirector,
    pub bullets: BulletManager,
    pub particles: ParticleSystem,
    pub effects: EffectManager,
    pub items: ItemManager,
    pub score: u64,
    /// Shop currency
    pub gems: u32,
    pub level_up_timer: f32,
    pub upgrade_choices: Vec<UpgradeChoice>,
    /// Simulated seconds spent in `Playing`
    pub time: f32,
    events: Vec<GameEvent>,
}

/// Seed for a cosmetic random stream, kept apart from gameplay rolls
fn cosmetic_seed(seed: u64, stream: u64) -> u64 {
    seed ^ stream.wrapping_mul(0x9e37_79b9_7f4a_7c15)
}

impl GameState {
    /// Start a session on the title screen.
    ///
    /// Panics if `tuning` does not validate: the loop cannot run on a broken
    /// data table.
    pub fn new(seed: u64, tuning: Tuning, settings: Settings) -> Self {
        if let Err(err) = tuning.validate() {
            panic!("invalid tuning: {err}");
        }
        let world_size = Vec2::new(tuning.world.width, tuning.world.height);
        let limits = &tuning.limits;
        let particle_cap = limits.max_particles.min(settings.max_particles());
        Self {
            seed,
            rng: SimRng::new(seed),
            phase: GamePhase::Title,
            player: Player::new(world_size, &tuning.player, &tuning.skills),
            director: WaveDirector::new(),
            bullets: BulletManager::new(limits.max_bullets, limits.max_lasers, &tuning.world),
            particles: ParticleSystem::with_seed(particle_cap, cosmetic_seed(seed, 1)),
            effects: EffectManager::with_seed(limits.max_effects, cosmetic_seed(seed, 2)),
            items: ItemManager::new(),
            score: 0,
            gems: 0,
            level_up_timer: 0.0,
            upgrade_choices: Vec::new(),
            time: 0.0,
            events: Vec::new(),
            tuning,
            settings,
        }
    }

    pub fn world_size(&self) -> Vec2 {
        Vec2::new(self.tuning.world.width, self.tuning.world.height)
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take this frame's events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Fresh run with a seed derived from this one
    pub fn restart(&mut self) {
        let seed = self.rng.next_seed();
        let tuning = self.tuning.clone();
        let settings = self.settings.clone();
        *self = GameState::new(seed, tuning, settings);
        self.phase = GamePhase::Playing;
        log::info!("run restarted (seed {seed})");
    }

    /// Buy shop entry `index`; false for a bad index or too few gems
    pub fn purchase(&mut self, index: usize) -> bool {
        let Some(entry) = self.tuning.shop.get(index) else {
            log::warn!("no shop entry {index}");
            return false;
        };
        if self.gems < entry.cost {
            log::warn!("cannot afford {} ({} gems, have {})", entry.id, entry.cost, self.gems);
            return false;
        }
        self.gems -= entry.cost;
        let (id, boost) = (entry.id.clone(), entry.boost);
        self.player.apply_boost(boost);
        log::info!("purchased {id}, {} gems left", self.gems);
        self.events.push(GameEvent::Purchased { id });
        true
    }

    /// Draw distinct upgrade picks for the skill-select screen
    pub fn offer_upgrades(&mut self) {
        let mut pool: Vec<UpgradeChoice> = (0..self.tuning.upgrades.len())
            .map(UpgradeChoice::Stat)
            .collect();
        pool.extend(
            self.player
                .skills
                .iter()
                .filter(|s| s.level < s.max_level)
                .map(|s| UpgradeChoice::Skill(s.kind)),
        );
        let picks = UPGRADE_CHOICES.min(pool.len());
        // Partial Fisher-Yates
        for i in 0..picks {
            let j = i + self.rng.index(pool.len() - i);
            pool.swap(i, j);
        }
        pool.truncate(picks);
        log::debug!("upgrade choices: {:?}", pool);
        self.upgrade_choices = pool;
    }

    /// Apply pick `index` from the offered choices
    pub fn select_upgrade(&mut self, index: usize) -> bool {
        if self.phase != GamePhase::SkillSelect {
            return false;
        }
        let Some(&choice) = self.upgrade_choices.get(index) else {
            return false;
        };
        match choice {
            UpgradeChoice::Stat(i) => {
                let Some(entry) = self.tuning.upgrades.get(i) else {
                    return false;
                };
                self.player.apply_boost(entry.boost);
            }
            UpgradeChoice::Skill(kind) => {
                if !self.player.level_up_skill(kind, &self.tuning.skills) {
                    return false;
                }
            }
        }
        log::debug!("selected upgrade {:?}", choice);
        self.events.push(GameEvent::UpgradeSelected { choice });
        self.player.skill_points = self.player.skill_points.saturating_sub(1);
        self.player.pending_level_ups = self.player.pending_level_ups.saturating_sub(1);
        if self.player.pending_level_ups > 0 {
            self.offer_upgrades();
        } else {
            self.upgrade_choices.clear();
            self.phase = GamePhase::Playing;
        }
        true
    }

    pub fn activate_skill(&mut self, kind: SkillKind) -> bool {
        let ignore_cooldown = self.settings.remove_skill_cooldown;
        if !self.player.activate_skill(kind, ignore_cooldown) {
            return false;
        }
        self.effects
            .create(EffectKind::SkillActivate, self.player.pos, kind.color(), self.player.radius * 2.0);
        self.events.push(GameEvent::SkillActivated { kind });
        true
    }

    /// Turn skill side effects into bullets, lasers, heals and cosmetics
    pub fn apply_skill_commands(&mut self, commands: &[SkillCommand]) {
        let origin = self.player.pos;
        for command in commands {
            match *command {
                SkillCommand::Heal(amount) => {
                    self.player.heal(amount);
                }
                SkillCommand::Shield(seconds) => self.player.add_buff(BuffKind::Shield, seconds),
                SkillCommand::HealPulse { range } => {
                    let color = SkillKind::RegenAura.color();
                    for i in 0..12 {
                        let angle = TAU * i as f32 / 12.0;
                        let pos = origin + direction(angle) * range;
                        let particle = Particle::new(pos, direction(angle) * -40.0, color, 4.0, 0.5)
                            .with_shape(ParticleShape::Diamond);
                        self.particles.spawn(particle);
                    }
                    self.effects.create(EffectKind::Buff, origin, color, range);
                }
                SkillCommand::HealSparkle { offset } => {
                    self.particles
                        .trail(origin + offset, SkillKind::RegenAura.color(), 3.0, 0.5);
                }
                SkillCommand::Beam {
                    width,
                    damage_per_sec,
                    speed,
                    length,
                    color,
                    glow,
                } => {
                    let core = LaserOptions {
                        width,
                        life: 0.0,
                        color,
                        mode: LaserDamage::PerSecond,
                        length: Some(length),
                    };
                    self.bullets.spawn_laser(origin, UP, damage_per_sec, core);
                    let halo = BulletOptions {
                        pattern: BulletPattern::Beam,
                        speed: Some(speed),
                        size: Some(width * 3.0),
                        damage: Some(0.0),
                        color: Some(glow),
                        beam_length: length,
                        ..Default::default()
                    };
                    self.bullets.spawn_player_bullet(origin, direction(UP), halo);
                }
                SkillCommand::ChainBolt {
                    damage,
                    speed,
                    size,
                    zigzag_amplitude,
                    zigzag_frequency,
                    payload,
                } => {
                    let opts = BulletOptions {
                        pattern: BulletPattern::Zigzag,
                        zigzag_amplitude,
                        zigzag_frequency,
                        speed: Some(speed),
                        size: Some(size),
                        damage: Some(damage),
                        color: Some(SkillKind::ChainLightning.color()),
                        trail: true,
                        chain: Some(payload),
                        ..Default::default()
                    };
                    self.bullets.spawn_player_bullet(origin, direction(UP), opts);
                    self.particles.explosion(origin, SkillKind::ChainLightning.color(), 5);
                }
                SkillCommand::Meteor {
                    origin: start,
                    dir,
                    damage,
                    speed,
                    size,
                    payload,
                } => {
                    let opts = BulletOptions {
                        pattern: BulletPattern::Meteor,
                        speed: Some(speed),
                        size: Some(size),
                        damage: Some(damage),
                        color: Some(SkillKind::MeteorShower.color()),
                        trail: true,
                        meteor: Some(payload),
                        ..Default::default()
                    };
                    self.bullets.spawn_player_bullet(start, dir, opts);
                }
            }
        }
    }

    /// Reward newly dead enemies exactly once, roll drops and detonate
    /// bombers. Blasts can kill more enemies, so this repeats until no
    /// unrewarded death is left.
    pub fn resolve_deaths(&mut self) {
        loop {
            let mut blasts = Vec::new();
            let mut rewarded_any = false;

            for i in 0..self.director.enemies.len() {
                let enemy = &mut self.director.enemies[i];
                if enemy.is_alive() || enemy.rewarded || enemy.escaped {
                    continue;
                }
                enemy.rewarded = true;
                rewarded_any = true;
                let (id, kind, pos, score) = (enemy.id, enemy.kind, enemy.pos, enemy.score);
                let (drop_chance, damage) = (enemy.drop_chance, enemy.damage);

                self.score += score;
                self.events.push(GameEvent::EnemyKilled { id, kind, pos, score });
                self.particles.explosion(pos, kind.color(), 20);
                self.grant_xp((score / 10) as u32);

                if kind == EnemyKind::Boss {
                    self.items.spawn(ItemKind::Gem, pos, &self.tuning.items);
                } else if let Some(item) =
                    ItemManager::roll_drop(&mut self.rng, &self.tuning.items, drop_chance)
                {
                    self.items.spawn(item, pos, &self.tuning.items);
                }
                if kind == EnemyKind::Bomber {
                    blasts.push((id, pos, damage));
                }
            }

            for (id, pos, damage) in blasts {
                self.bomber_blast(id, pos, damage);
            }
            if !rewarded_any {
                break;
            }
        }
    }

    /// Falloff blast around a dead bomber hitting enemies and the player
    fn bomber_blast(&mut self, source: u32, pos: Vec2, damage: f32) {
        let radius = self.tuning.enemies.explosion_radius;
        log::debug!("bomber {source} exploded");
        self.events.push(GameEvent::BomberExploded { id: source, pos });
        let color = rgb(0xff8800);
        self.effects.create(EffectKind::Explosion, pos, color, radius);
        self.particles.explosion(pos, color, 30);
        if radius <= 0.0 {
            return;
        }

        for enemy in &mut self.director.enemies {
            if enemy.id == source || !enemy.is_alive() {
                continue;
            }
            let dist = enemy.pos.distance(pos);
            if dist < radius {
                enemy.take_damage((damage * (1.0 - dist / radius)).floor());
            }
        }
        let dist = self.player.pos.distance(pos);
        if dist < radius {
            let lost = self.player.take_damage((damage * (1.0 - dist / radius)).floor());
            if lost > 0.0 {
                self.events.push(GameEvent::PlayerDamaged { amount: lost });
            }
        }
    }

    pub fn grant_xp(&mut self, amount: u32) {
        let gained = self.player.add_xp(amount);
        for n in 0..gained {
            self.events.push(GameEvent::LevelUp {
                level: self.player.level - gained + 1 + n,
            });
        }
    }

    /// Apply what the player picked up this frame
    pub fn apply_pickups(&mut self, collected: &[Collected]) {
        for pickup in collected {
            let color = self.tuning.items.stats(pickup.kind).color;
            match pickup.kind {
                ItemKind::Coin => self.score += pickup.value as u64,
                ItemKind::Gem => {
                    self.score += pickup.value as u64;
                    self.gems += 1;
                    self.grant_xp(self.tuning.items.gem_xp);
                }
                ItemKind::Health => {
                    let healed = self.player.heal(pickup.value);
                    if healed > 0.0 {
                        self.effects.heal_number(self.player.pos, healed);
                    }
                }
                ItemKind::Power => self.player.add_buff(BuffKind::Power, pickup.value),
                ItemKind::Speed => self.player.add_buff(BuffKind::Speed, pickup.value),
                ItemKind::Shield => self.player.add_buff(BuffKind::Shield, pickup.value),
            }
            if matches!(pickup.kind, ItemKind::Power | ItemKind::Speed | ItemKind::Shield) {
                self.particles.power_up(self.player.pos, rgb(color));
                self.effects
                    .create(EffectKind::Buff, self.player.pos, rgb(color), self.player.radius * 2.0);
            } else {
                self.particles.collect(pickup.pos, rgb(color));
            }
            self.events.push(GameEvent::ItemCollected { kind: pickup.kind });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bullet::HomingTargets;

    fn state() -> GameState {
        let mut s = GameState::new(42, Tuning::default(), Settings::default());
        s.phase = GamePhase::Playing;
        s
    }

    fn add_enemy(s: &mut GameState, kind: EnemyKind, pos: Vec2) -> usize {
        s.director.spawn_at(kind, pos, &s.tuning, &mut s.rng);
        s.director.enemies.len() - 1
    }

    #[test]
    #[should_panic(expected = "invalid tuning")]
    fn test_invalid_tuning_panics() {
        let mut tuning = Tuning::default();
        tuning.enemies.normal.attacks.clear();
        GameState::new(1, tuning, Settings::default());
    }

    #[test]
    fn test_rewards_are_granted_once() {
        let mut s = state();
        let i = add_enemy(&mut s, EnemyKind::Normal, Vec2::new(100.0, 100.0));
        s.director.enemies[i].die();
        s.director.enemies[i].die();
        s.resolve_deaths();
        s.resolve_deaths();
        assert_eq!(s.score, 100);
        assert_eq!(s.player.xp, 10);
        let kills = s
            .events()
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemyKilled { .. }))
            .count();
        assert_eq!(kills, 1);
    }

    #[test]
    fn test_escaped_enemies_are_not_rewarded() {
        let mut s = state();
        let i = add_enemy(&mut s, EnemyKind::Normal, Vec2::new(100.0, 100.0));
        s.director.enemies[i].escaped = true;
        s.resolve_deaths();
        assert_eq!(s.score, 0);
        assert_eq!(s.director.reap(), 1);
    }

    #[test]
    fn test_boss_drops_gem() {
        let mut s = state();
        let i = add_enemy(&mut s, EnemyKind::Boss, Vec2::new(400.0, 100.0));
        s.director.enemies[i].die();
        s.resolve_deaths();
        assert_eq!(s.score, 1000);
        assert!(s.items.iter().any(|item| item.kind == ItemKind::Gem));
    }

    #[test]
    fn test_bomber_chain_reaction() {
        let mut s = state();
        s.player.pos = Vec2::new(700.0, 550.0);
        let a = add_enemy(&mut s, EnemyKind::Bomber, Vec2::new(100.0, 100.0));
        let b = add_enemy(&mut s, EnemyKind::Bomber, Vec2::new(110.0, 100.0));
        let c = add_enemy(&mut s, EnemyKind::Normal, Vec2::new(150.0, 100.0));
        s.director.enemies[a].die();
        s.resolve_deaths();
        // 25 * (1 - 10/100) = 22.5 -> 22 kills the 20 hp bomber next to it
        assert!(!s.director.enemies[b].is_alive());
        assert!(s.director.enemies[b].rewarded);
        assert!(!s.director.enemies[c].is_alive());
        assert_eq!(s.score, 300 + 300 + 100);
        let blasts = s
            .events()
            .iter()
            .filter(|e| matches!(e, GameEvent::BomberExploded { .. }))
            .count();
        assert_eq!(blasts, 2);
    }

    #[test]
    fn test_bomber_blast_hurts_player() {
        let mut s = state();
        s.player.pos = Vec2::new(100.0, 150.0);
        let a = add_enemy(&mut s, EnemyKind::Bomber, Vec2::new(100.0, 100.0));
        s.director.enemies[a].die();
        s.resolve_deaths();
        // 25 * (1 - 50/100) = 12.5 -> 12
        assert_eq!(s.player.hp, 88.0);
    }

    #[test]
    fn test_purchase_needs_gems() {
        let mut s = state();
        assert!(!s.purchase(0));
        s.gems = 3;
        assert!(s.purchase(0));
        assert_eq!(s.gems, 0);
        assert_eq!(s.player.max_hp, 105.0);
        assert!(!s.purchase(99));
    }

    #[test]
    fn test_upgrade_choices_are_distinct() {
        let mut s = state();
        for _ in 0..20 {
            s.offer_upgrades();
            assert_eq!(s.upgrade_choices.len(), UPGRADE_CHOICES);
            for (i, a) in s.upgrade_choices.iter().enumerate() {
                for b in &s.upgrade_choices[i + 1..] {
                    assert_ne!(a, b);
                }
            }
        }
    }

    #[test]
    fn test_select_upgrade_walks_pending_level_ups() {
        let mut s = state();
        s.player.next_xp = 8;
        s.grant_xp(50);
        assert_eq!(s.player.pending_level_ups, 2);
        s.phase = GamePhase::SkillSelect;
        s.offer_upgrades();
        assert!(s.select_upgrade(0));
        assert_eq!(s.phase, GamePhase::SkillSelect);
        assert!(!s.select_upgrade(7));
        assert!(s.select_upgrade(1));
        assert_eq!(s.phase, GamePhase::Playing);
        assert_eq!(s.player.pending_level_ups, 0);
    }

    #[test]
    fn test_pickups_apply_effects() {
        let mut s = state();
        s.player.hp = 50.0;
        let at = s.player.pos;
        let pickups = [
            Collected { kind: ItemKind::Coin, pos: at, value: 100.0 },
            Collected { kind: ItemKind::Gem, pos: at, value: 1000.0 },
            Collected { kind: ItemKind::Health, pos: at, value: 5.0 },
            Collected { kind: ItemKind::Shield, pos: at, value: 10.0 },
        ];
        s.apply_pickups(&pickups);
        assert_eq!(s.score, 1100);
        assert_eq!(s.gems, 1);
        assert_eq!(s.player.xp, 20);
        assert_eq!(s.player.hp, 55.0);
        assert!(s.player.has_buff(BuffKind::Shield));
    }

    #[test]
    fn test_skill_commands_spawn_projectiles() {
        let mut s = state();
        let chain = s.tuning.skills.chain_lightning.clone();
        s.apply_skill_commands(&[SkillCommand::ChainBolt {
            damage: chain.damage,
            speed: chain.bolt_speed,
            size: chain.bolt_size,
            zigzag_amplitude: chain.bolt_zigzag_amplitude,
            zigzag_frequency: chain.bolt_zigzag_frequency,
            payload: Default::default(),
        }]);
        assert_eq!(s.bullets.player_bullet_count(), 1);

        // The bolt weaves sideways off its straight climb
        s.bullets.update(1.0, HomingTargets::default(), &mut s.particles);
        let bolt = s.bullets.player_bullets().next().expect("bolt in flight");
        assert_eq!(bolt.pattern, BulletPattern::Zigzag);
        assert!(bolt.chain.is_some());
        let swing = (1.0 * chain.bolt_zigzag_frequency).sin() * chain.bolt_zigzag_amplitude;
        assert!((bolt.pos.x - bolt.origin.x - swing).abs() < 1e-3);
        assert!((bolt.origin.y - bolt.pos.y - chain.bolt_speed).abs() < 1e-2);

        s.apply_skill_commands(&[SkillCommand::Beam {
            width: 15.0,
            damage_per_sec: 40.0,
            speed: 2000.0,
            length: 2000.0,
            color: rgb(0xff0000),
            glow: rgb(0xff0000),
        }]);
        assert_eq!(s.bullets.lasers().len(), 1);
        assert_eq!(s.bullets.lasers()[0].mode, LaserDamage::PerSecond);
    }

    #[test]
    fn test_restart_resets_run() {
        let mut s = state();
        s.score = 500;
        s.gems = 4;
        add_enemy(&mut s, EnemyKind::Normal, Vec2::new(10.0, 10.0));
        s.phase = GamePhase::GameOver;
        let old_seed = s.seed;
        s.restart();
        assert_eq!(s.phase, GamePhase::Playing);
        assert_eq!(s.score, 0);
        assert_eq!(s.gems, 0);
        assert!(s.director.enemies.is_empty());
        assert_ne!(s.seed, old_seed);
    }
}
