//! Game balance tables
//!
//! Immutable data the simulation reads but never mutates. `Default` carries
//! the shipped balance; `Tuning::from_json` overlays a partial document on
//! top of it and validates the result.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::consts;
use crate::error::ConfigError;
use crate::sim::enemy::{AttackPattern, EnemyKind, MovementPattern};
use crate::sim::item::ItemKind;

/// Pool capacities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Limits {
    /// Per owner (player and enemy pools are separate)
    pub max_bullets: usize,
    pub max_enemies: usize,
    pub max_particles: usize,
    pub max_effects: usize,
    pub max_lasers: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_bullets: consts::MAX_BULLETS,
            max_enemies: consts::MAX_ENEMIES,
            max_particles: consts::MAX_PARTICLES,
            max_effects: consts::MAX_EFFECTS,
            max_lasers: consts::MAX_LASERS,
        }
    }
}

/// Canvas and timestep
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorldTuning {
    pub width: f32,
    pub height: f32,
    /// Bullets are pruned this far outside the canvas
    pub bounds_margin: f32,
    pub max_frame_dt: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            width: consts::WORLD_WIDTH,
            height: consts::WORLD_HEIGHT,
            bounds_margin: consts::BOUNDS_MARGIN,
            max_frame_dt: consts::MAX_FRAME_DT,
        }
    }
}

/// Player base stats and progression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerTuning {
    pub radius: f32,
    pub speed: f32,
    pub max_hp: f32,
    pub next_xp: u32,
    pub xp_growth: f64,
    pub xp_growth_bonus: f64,
    pub bullet_damage: f32,
    pub bullet_size: f32,
    pub bullet_speed: f32,
    /// Seconds between shots
    pub attack_speed: f32,
    pub critical_chance: f32,
    pub critical_damage: f32,
    /// Grace period after taking a hit
    pub invincible_time: f32,
    pub dash_speed: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,
    pub level_up_max_hp: f32,
    pub level_up_damage: f32,
    /// Seconds the level-up banner holds before skill select opens
    pub level_up_time: f32,
    /// Seconds to reach a full laser charge
    pub charge_time: f32,
    pub power_multiplier: f32,
    pub speed_multiplier: f32,
    pub twin_shot_level: u32,
    pub twin_shot_offset: f32,
    pub spread_shot_level: u32,
    pub spread_shot_arc: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            radius: 20.0,
            speed: 300.0,
            max_hp: 100.0,
            next_xp: 100,
            xp_growth: 1.3,
            xp_growth_bonus: 10.0,
            bullet_damage: 10.0,
            bullet_size: 8.0,
            bullet_speed: 400.0,
            attack_speed: 0.25,
            critical_chance: 0.05,
            critical_damage: 2.0,
            invincible_time: 0.5,
            dash_speed: 800.0,
            dash_duration: 0.2,
            dash_cooldown: 2.0,
            level_up_max_hp: 5.0,
            level_up_damage: 2.0,
            level_up_time: 1.5,
            charge_time: 1.0,
            power_multiplier: 1.5,
            speed_multiplier: 1.3,
            twin_shot_level: 5,
            twin_shot_offset: 15.0,
            spread_shot_level: 10,
            spread_shot_arc: PI / 6.0,
        }
    }
}

impl PlayerTuning {
    /// XP needed for the level after one that needed `next_xp`
    pub fn grow_next_xp(&self, next_xp: u32) -> u32 {
        (next_xp as f64 * self.xp_growth + self.xp_growth_bonus).floor() as u32
    }
}

/// Wave cadence and difficulty curve
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WaveTuning {
    pub wave_duration: f32,
    pub boss_wave_interval: u32,
    pub difficulty_scale: f32,
    pub spawn_interval_base: f32,
    pub spawn_interval_step: f32,
    pub spawn_interval_floor: f32,
    /// Enemies dropped in at wave start before scaling
    pub base_enemy_count: f32,
    /// Initial burst never exceeds this share of the enemy cap
    pub initial_burst_ratio: f32,
    /// Fraction of the wave timer at which the mini-boss appears
    pub mini_boss_at: f32,
    pub clear_heal: f32,
    pub clear_gems_base: u32,
    /// One extra gem per this many waves
    pub clear_gems_every: u32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            wave_duration: 60.0,
            boss_wave_interval: 5,
            difficulty_scale: 1.1,
            spawn_interval_base: 1.0,
            spawn_interval_step: 0.1,
            spawn_interval_floor: 0.3,
            base_enemy_count: 5.0,
            initial_burst_ratio: 0.7,
            mini_boss_at: 0.5,
            clear_heal: 5.0,
            clear_gems_base: 2,
            clear_gems_every: 5,
        }
    }
}

impl WaveTuning {
    /// Seconds between regular spawns on `wave` (1-based)
    pub fn spawn_interval(&self, wave: u32) -> f32 {
        let wave = wave.max(1) as f32;
        (self.spawn_interval_base - (wave - 1.0) * self.spawn_interval_step)
            .max(self.spawn_interval_floor)
    }

    /// Stat multiplier on `wave` (1-based)
    pub fn scale(&self, wave: u32) -> f32 {
        self.difficulty_scale.powi(wave.max(1) as i32 - 1)
    }

    pub fn is_boss_wave(&self, wave: u32) -> bool {
        self.boss_wave_interval > 0 && wave > 0 && wave % self.boss_wave_interval == 0
    }

    pub fn clear_gems(&self, wave: u32) -> u32 {
        self.clear_gems_base + wave / self.clear_gems_every.max(1)
    }
}

/// Probability of each movement pattern at spawn
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MovementWeights {
    pub linear: f32,
    pub sine: f32,
    pub circle: f32,
    pub zigzag: f32,
}

impl Default for MovementWeights {
    fn default() -> Self {
        Self::new(0.4, 0.3, 0.1, 0.2)
    }
}

impl MovementWeights {
    pub const fn new(linear: f32, sine: f32, circle: f32, zigzag: f32) -> Self {
        Self {
            linear,
            sine,
            circle,
            zigzag,
        }
    }

    pub fn entries(&self) -> [(MovementPattern, f32); 4] {
        [
            (MovementPattern::Linear, self.linear),
            (MovementPattern::Sine, self.sine),
            (MovementPattern::Circle, self.circle),
            (MovementPattern::Zigzag, self.zigzag),
        ]
    }

    pub fn total(&self) -> f32 {
        self.linear + self.sine + self.circle + self.zigzag
    }
}

/// Base stats for one enemy kind (wave 1)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnemyStats {
    pub size: f32,
    pub hp: f32,
    /// Descent speed (px/s)
    pub speed: f32,
    pub fire_interval: f32,
    pub bullet_speed: f32,
    pub score: u64,
    pub damage: f32,
    pub drop_chance: f32,
    pub movement: MovementWeights,
    pub attacks: Vec<AttackPattern>,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            size: 20.0,
            hp: 10.0,
            speed: 100.0,
            fire_interval: 2.0,
            bullet_speed: 200.0,
            score: 100,
            damage: 10.0,
            drop_chance: 0.3,
            movement: MovementWeights::default(),
            attacks: vec![AttackPattern::Single],
        }
    }
}

/// Chance that a regular spawn is each kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpawnWeights {
    pub normal: f32,
    pub assassin: f32,
    pub bomber: f32,
}

impl Default for SpawnWeights {
    fn default() -> Self {
        Self {
            normal: 0.7,
            assassin: 0.2,
            bomber: 0.1,
        }
    }
}

impl SpawnWeights {
    pub fn entries(&self) -> [(EnemyKind, f32); 3] {
        [
            (EnemyKind::Normal, self.normal),
            (EnemyKind::Assassin, self.assassin),
            (EnemyKind::Bomber, self.bomber),
        ]
    }
}

/// Shape parameters for movement and attack patterns
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PatternTuning {
    pub sine_amplitude: f32,
    pub sine_frequency: f32,
    pub circle_radius: f32,
    pub circle_speed: f32,
    pub zigzag_amplitude: f32,
    pub zigzag_frequency: f32,
    pub spread_count: u32,
    pub spread_arc: f32,
    pub spiral_count: u32,
    /// Rotation of the spiral ring per second of pattern time
    pub spiral_turn_rate: f32,
    /// Angular speed of each spiral bullet around its spawn point (rad/s)
    pub spiral_bullet_speed: f32,
    pub targeted_damage_multiplier: f32,
    pub targeted_speed: f32,
    pub burst_count: u32,
    pub burst_delay: f32,
    pub burst_speed_step: f32,
    /// Max turn rate of homing bullets (rad/s)
    pub homing_strength: f32,
}

impl Default for PatternTuning {
    fn default() -> Self {
        Self {
            sine_amplitude: 100.0,
            sine_frequency: 2.0,
            circle_radius: 50.0,
            circle_speed: 2.0,
            zigzag_amplitude: 50.0,
            zigzag_frequency: 4.0,
            spread_count: 5,
            spread_arc: PI / 3.0,
            spiral_count: 8,
            spiral_turn_rate: 1.0,
            spiral_bullet_speed: 1.0,
            targeted_damage_multiplier: 1.5,
            targeted_speed: 300.0,
            burst_count: 3,
            burst_delay: 0.1,
            burst_speed_step: 50.0,
            homing_strength: 3.0,
        }
    }
}

/// Per-kind enemy stats plus kind-specific abilities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnemyTable {
    pub normal: EnemyStats,
    pub assassin: EnemyStats,
    pub bomber: EnemyStats,
    pub mini_boss: EnemyStats,
    pub boss: EnemyStats,
    pub spawn_weights: SpawnWeights,
    pub patterns: PatternTuning,
    pub stealth_interval: f32,
    pub stealth_alpha: f32,
    pub explosion_radius: f32,
    /// Descending hp ratios at which the boss enters its next phase
    pub phase_thresholds: Vec<f32>,
    pub boss_hover_y: f32,
    pub mini_boss_hover_y: f32,
    pub death_time: f32,
}

impl Default for EnemyTable {
    fn default() -> Self {
        Self {
            normal: EnemyStats::default(),
            assassin: EnemyStats {
                size: 18.0,
                hp: 15.0,
                speed: 150.0,
                fire_interval: 1.5,
                bullet_speed: 250.0,
                score: 200,
                damage: 15.0,
                drop_chance: 0.3,
                movement: MovementWeights::new(0.1, 0.2, 0.4, 0.3),
                attacks: vec![AttackPattern::Targeted, AttackPattern::Burst],
            },
            bomber: EnemyStats {
                size: 25.0,
                hp: 20.0,
                speed: 80.0,
                fire_interval: 2.0,
                bullet_speed: 200.0,
                score: 300,
                damage: 25.0,
                drop_chance: 0.3,
                movement: MovementWeights::new(0.4, 0.3, 0.1, 0.2),
                attacks: vec![AttackPattern::Spread, AttackPattern::Burst],
            },
            mini_boss: EnemyStats {
                size: 35.0,
                hp: 120.0,
                speed: 75.0,
                fire_interval: 1.2,
                bullet_speed: 220.0,
                score: 500,
                damage: 15.0,
                drop_chance: 0.8,
                movement: MovementWeights::new(0.3, 0.3, 0.2, 0.2),
                attacks: vec![
                    AttackPattern::Spread,
                    AttackPattern::Targeted,
                    AttackPattern::Burst,
                ],
            },
            boss: EnemyStats {
                size: 50.0,
                hp: 400.0,
                speed: 50.0,
                fire_interval: 0.8,
                bullet_speed: 220.0,
                score: 1000,
                damage: 20.0,
                drop_chance: 1.0,
                movement: MovementWeights::new(0.2, 0.3, 0.3, 0.2),
                attacks: vec![
                    AttackPattern::Spread,
                    AttackPattern::Spiral,
                    AttackPattern::Targeted,
                    AttackPattern::Burst,
                ],
            },
            spawn_weights: SpawnWeights::default(),
            patterns: PatternTuning::default(),
            stealth_interval: 3.0,
            stealth_alpha: 0.3,
            explosion_radius: 100.0,
            phase_thresholds: vec![0.7, 0.3],
            boss_hover_y: 120.0,
            mini_boss_hover_y: 160.0,
            death_time: 1.0,
        }
    }
}

impl EnemyTable {
    pub fn stats(&self, kind: EnemyKind) -> &EnemyStats {
        match kind {
            EnemyKind::Normal => &self.normal,
            EnemyKind::Assassin => &self.assassin,
            EnemyKind::Bomber => &self.bomber,
            EnemyKind::MiniBoss => &self.mini_boss,
            EnemyKind::Boss => &self.boss,
        }
    }
}

/// Look and payload of one pickup kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemStats {
    pub size: f32,
    pub color: u32,
    /// Score for coin/gem, hp for health, seconds for buffs
    pub value: f32,
}

impl Default for ItemStats {
    fn default() -> Self {
        Self {
            size: 20.0,
            color: 0xffffff,
            value: 0.0,
        }
    }
}

/// Relative odds of each drop once an enemy decides to drop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DropWeights {
    pub coin: f32,
    pub health: f32,
    pub power: f32,
    pub speed: f32,
    pub shield: f32,
}

impl Default for DropWeights {
    fn default() -> Self {
        Self {
            coin: 0.4,
            health: 0.1,
            power: 0.05,
            speed: 0.03,
            shield: 0.02,
        }
    }
}

impl DropWeights {
    pub fn entries(&self) -> [(ItemKind, f32); 5] {
        [
            (ItemKind::Coin, self.coin),
            (ItemKind::Health, self.health),
            (ItemKind::Power, self.power),
            (ItemKind::Speed, self.speed),
            (ItemKind::Shield, self.shield),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemTable {
    pub coin: ItemStats,
    pub gem: ItemStats,
    pub health: ItemStats,
    pub power: ItemStats,
    pub speed: ItemStats,
    pub shield: ItemStats,
    pub drop_weights: DropWeights,
    /// Fall speed before the magnet engages (px/s)
    pub fall_speed: f32,
    pub magnet_range: f32,
    /// Magnet pull acceleration (px/s²)
    pub magnet_accel: f32,
    /// Alpha lost per second after collection
    pub fade_speed: f32,
    pub gem_xp: u32,
}

impl Default for ItemTable {
    fn default() -> Self {
        Self {
            coin: ItemStats {
                size: 20.0,
                color: 0xffd700,
                value: 100.0,
            },
            gem: ItemStats {
                size: 30.0,
                color: 0x00ffff,
                value: 1000.0,
            },
            health: ItemStats {
                size: 20.0,
                color: 0xff4444,
                value: 5.0,
            },
            power: ItemStats {
                size: 20.0,
                color: 0xff8800,
                value: 10.0,
            },
            speed: ItemStats {
                size: 20.0,
                color: 0x44ff44,
                value: 10.0,
            },
            shield: ItemStats {
                size: 20.0,
                color: 0x4488ff,
                value: 10.0,
            },
            drop_weights: DropWeights::default(),
            fall_speed: 60.0,
            magnet_range: 100.0,
            magnet_accel: 600.0,
            fade_speed: 5.0,
            gem_xp: 20,
        }
    }
}

impl ItemTable {
    pub fn stats(&self, kind: ItemKind) -> &ItemStats {
        match kind {
            ItemKind::Coin => &self.coin,
            ItemKind::Gem => &self.gem,
            ItemKind::Health => &self.health,
            ItemKind::Power => &self.power,
            ItemKind::Speed => &self.speed,
            ItemKind::Shield => &self.shield,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegenAuraTuning {
    pub cooldown: f32,
    pub duration: f32,
    pub range: f32,
    /// Hp per second while active
    pub heal_amount: f32,
    pub pulse_interval: f32,
    /// Shield seconds granted per pulse
    pub shield_amount: f32,
    pub heal_multiplier: f32,
    pub range_multiplier: f32,
    pub shield_multiplier: f32,
    pub pulse_multiplier: f32,
}

impl Default for RegenAuraTuning {
    fn default() -> Self {
        Self {
            cooldown: 8.0,
            duration: 5.0,
            range: 200.0,
            heal_amount: 2.0,
            pulse_interval: 0.5,
            shield_amount: 1.0,
            heal_multiplier: 1.2,
            range_multiplier: 1.1,
            shield_multiplier: 1.2,
            pulse_multiplier: 0.9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HomingLaserTuning {
    pub cooldown: f32,
    pub duration: f32,
    /// Damage per second to enemies in the beam
    pub damage: f32,
    pub beam_width: f32,
    pub beam_speed: f32,
    pub beam_length: f32,
    pub color_interval: f32,
    pub palette: Vec<u32>,
    pub damage_multiplier: f32,
    pub cooldown_multiplier: f32,
    pub width_multiplier: f32,
    pub color_interval_multiplier: f32,
}

impl Default for HomingLaserTuning {
    fn default() -> Self {
        Self {
            cooldown: 3.0,
            duration: 1.0,
            damage: 40.0,
            beam_width: 15.0,
            beam_speed: 2000.0,
            beam_length: 2000.0,
            color_interval: 0.05,
            palette: vec![
                0xff4444, 0x44ff44, 0x4444ff, 0xff44ff, 0x44ffff, 0xffff44, 0xffffff,
            ],
            damage_multiplier: 1.3,
            cooldown_multiplier: 0.9,
            width_multiplier: 1.2,
            color_interval_multiplier: 0.9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChainLightningTuning {
    pub cooldown: f32,
    pub damage: f32,
    pub chain_count: u32,
    pub chain_range: f32,
    pub stun_duration: f32,
    /// Damage taken multiplier while stunned
    pub damage_amplification: f32,
    /// Fraction of movement speed removed while slowed
    pub slow_effect: f32,
    pub slow_duration: f32,
    pub bolt_speed: f32,
    pub bolt_size: f32,
    /// Sideways swing of the bolt's zigzag path (px)
    pub bolt_zigzag_amplitude: f32,
    pub bolt_zigzag_frequency: f32,
    pub damage_multiplier: f32,
    pub chain_step: u32,
    pub range_multiplier: f32,
    pub stun_step: f32,
    pub amplification_step: f32,
}

impl Default for ChainLightningTuning {
    fn default() -> Self {
        Self {
            cooldown: 4.0,
            damage: 20.0,
            chain_count: 4,
            chain_range: 150.0,
            stun_duration: 0.5,
            damage_amplification: 1.2,
            slow_effect: 0.3,
            slow_duration: 2.0,
            bolt_speed: 400.0,
            bolt_size: 12.0,
            bolt_zigzag_amplitude: 30.0,
            bolt_zigzag_frequency: 0.1,
            damage_multiplier: 1.2,
            chain_step: 1,
            range_multiplier: 1.1,
            stun_step: 0.1,
            amplification_step: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MeteorShowerTuning {
    pub cooldown: f32,
    pub duration: f32,
    /// Expected meteors per second while active
    pub meteor_count: u32,
    pub damage: f32,
    pub explosion_radius: f32,
    pub burn_damage: f32,
    pub burn_duration: f32,
    pub meteor_speed: f32,
    pub meteor_size: f32,
    pub damage_multiplier: f32,
    pub count_step: u32,
    pub radius_multiplier: f32,
    pub burn_multiplier: f32,
}

impl Default for MeteorShowerTuning {
    fn default() -> Self {
        Self {
            cooldown: 6.0,
            duration: 3.0,
            meteor_count: 8,
            damage: 35.0,
            explosion_radius: 80.0,
            burn_damage: 10.0,
            burn_duration: 3.0,
            meteor_speed: 300.0,
            meteor_size: 25.0,
            damage_multiplier: 1.25,
            count_step: 1,
            radius_multiplier: 1.1,
            burn_multiplier: 1.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkillTable {
    pub max_level: u32,
    pub regen_aura: RegenAuraTuning,
    pub homing_laser: HomingLaserTuning,
    pub chain_lightning: ChainLightningTuning,
    pub meteor_shower: MeteorShowerTuning,
}

impl Default for SkillTable {
    fn default() -> Self {
        Self {
            max_level: 5,
            regen_aura: RegenAuraTuning::default(),
            homing_laser: HomingLaserTuning::default(),
            chain_lightning: ChainLightningTuning::default(),
            meteor_shower: MeteorShowerTuning::default(),
        }
    }
}

/// A permanent player stat change bought in the shop or picked on level up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "camelCase")]
pub enum StatBoost {
    /// Flat max hp (current hp rises with it)
    MaxHp(f32),
    /// Max hp by a fraction of the current max, floored
    MaxHpPercent(f32),
    BulletDamage(f32),
    BulletDamageScale(f32),
    /// Multiplies the seconds between shots
    AttackSpeedScale(f32),
    BulletSizeScale(f32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopEntry {
    pub id: String,
    pub cost: u32,
    pub boost: StatBoost,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeEntry {
    pub id: String,
    pub boost: StatBoost,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossQuote {
    pub wave: u32,
    pub name: String,
    pub quote: String,
}

/// All balance data for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tuning {
    pub limits: Limits,
    pub world: WorldTuning,
    pub player: PlayerTuning,
    pub wave: WaveTuning,
    pub enemies: EnemyTable,
    pub items: ItemTable,
    pub skills: SkillTable,
    pub shop: Vec<ShopEntry>,
    pub upgrades: Vec<UpgradeEntry>,
    pub boss_quotes: Vec<BossQuote>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            world: WorldTuning::default(),
            player: PlayerTuning::default(),
            wave: WaveTuning::default(),
            enemies: EnemyTable::default(),
            items: ItemTable::default(),
            skills: SkillTable::default(),
            shop: vec![
                shop_entry("healthUp", 3, StatBoost::MaxHp(5.0)),
                shop_entry("damageUp", 4, StatBoost::BulletDamage(2.0)),
                shop_entry("attackSpeed", 5, StatBoost::AttackSpeedScale(0.85)),
                shop_entry("bulletSize", 3, StatBoost::BulletSizeScale(1.2)),
            ],
            upgrades: vec![
                upgrade_entry("attackDamage", StatBoost::BulletDamageScale(1.3)),
                upgrade_entry("attackSpeed", StatBoost::AttackSpeedScale(0.8)),
                upgrade_entry("hpUp", StatBoost::MaxHpPercent(0.3)),
                upgrade_entry("bulletSize", StatBoost::BulletSizeScale(1.2)),
            ],
            boss_quotes: vec![
                boss_quote(
                    5,
                    "Crimson Guardian",
                    "Humans... your greed will destroy this planet!",
                ),
                boss_quote(10, "Storm Lord", "Face the judgment of the storm!"),
                boss_quote(15, "Shadow Reaper", "Your future will be buried in darkness..."),
                boss_quote(
                    20,
                    "Emperor of Neo Terra",
                    "You made it this far... but this is the end!",
                ),
            ],
        }
    }
}

fn shop_entry(id: &str, cost: u32, boost: StatBoost) -> ShopEntry {
    ShopEntry {
        id: id.to_string(),
        cost,
        boost,
    }
}

fn upgrade_entry(id: &str, boost: StatBoost) -> UpgradeEntry {
    UpgradeEntry {
        id: id.to_string(),
        boost,
    }
}

fn boss_quote(wave: u32, name: &str, quote: &str) -> BossQuote {
    BossQuote {
        wave,
        name: name.to_string(),
        quote: quote.to_string(),
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON document over the defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!(
            "Loaded tuning (scale {}, boss every {} waves)",
            tuning.wave.difficulty_scale,
            tuning.wave.boss_wave_interval
        );
        Ok(tuning)
    }

    /// Quote shown when the boss of `wave` spawns; unknown waves reuse the first entry
    pub fn boss_quote(&self, wave: u32) -> Option<&BossQuote> {
        self.boss_quotes
            .iter()
            .find(|q| q.wave == wave)
            .or_else(|| self.boss_quotes.first())
    }

    /// Reject tables the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let l = &self.limits;
        for (field, cap) in [
            ("limits.maxBullets", l.max_bullets),
            ("limits.maxEnemies", l.max_enemies),
            ("limits.maxEffects", l.max_effects),
            ("limits.maxLasers", l.max_lasers),
        ] {
            if cap == 0 {
                return Err(ConfigError::invalid(field, "capacity must be at least 1"));
            }
        }

        let w = &self.world;
        if !(w.width > 0.0 && w.height > 0.0) {
            return Err(ConfigError::invalid("world", "dimensions must be positive"));
        }
        if !(w.max_frame_dt > 0.0) {
            return Err(ConfigError::invalid("world.maxFrameDt", "must be positive"));
        }

        let p = &self.player;
        if !(p.max_hp > 0.0 && p.radius > 0.0) {
            return Err(ConfigError::invalid("player", "maxHp and radius must be positive"));
        }
        if p.next_xp == 0 {
            return Err(ConfigError::invalid("player.nextXp", "must be at least 1"));
        }
        if !(p.attack_speed > 0.0 && p.charge_time > 0.0) {
            return Err(ConfigError::invalid(
                "player",
                "attackSpeed and chargeTime must be positive",
            ));
        }

        let wave = &self.wave;
        if !(wave.difficulty_scale > 0.0) {
            return Err(ConfigError::invalid("wave.difficultyScale", "must be positive"));
        }
        if wave.boss_wave_interval == 0 {
            return Err(ConfigError::invalid("wave.bossWaveInterval", "must be at least 1"));
        }
        if !(wave.spawn_interval_floor > 0.0) {
            return Err(ConfigError::invalid("wave.spawnIntervalFloor", "must be positive"));
        }

        for kind in EnemyKind::ALL {
            let stats = self.enemies.stats(kind);
            let field = format!("enemies.{}", kind.as_str());
            if !(stats.hp > 0.0 && stats.size > 0.0) {
                return Err(ConfigError::invalid(field, "hp and size must be positive"));
            }
            if stats.attacks.is_empty() {
                return Err(ConfigError::invalid(field, "attack pattern list is empty"));
            }
            if stats.movement.entries().iter().any(|(_, w)| *w < 0.0)
                || (stats.movement.total() - 1.0).abs() > 1e-3
            {
                return Err(ConfigError::invalid(
                    field,
                    "movement weights must be non-negative and sum to 1.0",
                ));
            }
            if !(0.0..=1.0).contains(&stats.drop_chance) {
                return Err(ConfigError::invalid(field, "dropChance must be within 0..=1"));
            }
        }

        let sw = &self.enemies.spawn_weights;
        if sw.normal + sw.assassin + sw.bomber <= 0.0 {
            return Err(ConfigError::invalid("enemies.spawnWeights", "no positive weight"));
        }
        let thresholds = &self.enemies.phase_thresholds;
        if thresholds.iter().any(|t| !(*t > 0.0 && *t < 1.0))
            || thresholds.windows(2).any(|w| w[1] >= w[0])
        {
            return Err(ConfigError::invalid(
                "enemies.phaseThresholds",
                "must be strictly descending ratios within (0, 1)",
            ));
        }

        if self
            .items
            .drop_weights
            .entries()
            .iter()
            .all(|(_, w)| *w <= 0.0)
        {
            return Err(ConfigError::invalid("items.dropWeights", "no positive weight"));
        }

        let skills = &self.skills;
        if skills.max_level == 0 {
            return Err(ConfigError::invalid("skills.maxLevel", "must be at least 1"));
        }
        if skills.homing_laser.palette.is_empty() {
            return Err(ConfigError::invalid("skills.homingLaser.palette", "is empty"));
        }

        if self.upgrades.is_empty() {
            return Err(ConfigError::invalid("upgrades", "table is empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        Tuning::default().validate().expect("default tuning is valid");
    }

    #[test]
    fn test_spawn_interval_floors() {
        let wave = WaveTuning::default();
        assert!((wave.spawn_interval(1) - 1.0).abs() < 1e-6);
        assert!((wave.spawn_interval(3) - 0.8).abs() < 1e-6);
        assert!((wave.spawn_interval(30) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_scale_matches_difficulty_curve() {
        let wave = WaveTuning::default();
        assert_eq!(wave.scale(1), 1.0);
        assert!((wave.scale(6) - 1.1f32.powi(5)).abs() < 1e-5);
        assert!(wave.is_boss_wave(5));
        assert!(!wave.is_boss_wave(6));
        assert_eq!(wave.clear_gems(4), 2);
        assert_eq!(wave.clear_gems(10), 4);
    }

    #[test]
    fn test_partial_json_overrides() {
        let tuning = Tuning::from_json(r#"{"wave":{"difficultyScale":1.5}}"#).expect("valid");
        assert_eq!(tuning.wave.difficulty_scale, 1.5);
        assert_eq!(tuning.wave.boss_wave_interval, 5);
        assert_eq!(tuning.enemies.boss.attacks.len(), 4);
    }

    #[test]
    fn test_rejects_bad_weights() {
        let json = r#"{"enemies":{"normal":{"movement":{"linear":0.9,"sine":0.9,"circle":0,"zigzag":0}}}}"#;
        assert!(matches!(
            Tuning::from_json(json),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_pattern_tag() {
        let json = r#"{"enemies":{"boss":{"attacks":["laserRain"]}}}"#;
        assert!(matches!(Tuning::from_json(json), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_rejects_empty_attack_list() {
        let json = r#"{"enemies":{"bomber":{"attacks":[]}}}"#;
        assert!(matches!(
            Tuning::from_json(json),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_boss_quote_fallback() {
        let tuning = Tuning::default();
        assert_eq!(tuning.boss_quote(10).map(|q| q.name.as_str()), Some("Storm Lord"));
        assert_eq!(
            tuning.boss_quote(25).map(|q| q.name.as_str()),
            Some("Crimson Guardian")
        );
    }
}
