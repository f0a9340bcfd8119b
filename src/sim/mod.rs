//! Frame-driven simulation module
//!
//! All gameplay logic lives here. This module must stay reproducible:
//! - Variable `dt`, clamped per frame
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod bullet;
pub mod collision;
pub mod effect;
pub mod enemy;
pub mod item;
pub mod particle;
pub mod player;
pub mod pool;
pub mod rng;
pub mod skill;
pub mod state;
pub mod tick;
pub mod wave;

pub use bullet::{
    Bullet, BulletManager, BulletOptions, BulletPattern, HomingTargets, Laser, LaserDamage,
    LaserOptions,
};
pub use collision::{CollisionReport, Collider};
pub use effect::{Effect, EffectKind, EffectManager};
pub use enemy::{AttackPattern, Enemy, EnemyKind, EnemyState, MovementPattern};
pub use item::{Item, ItemKind, ItemManager};
pub use particle::{Particle, ParticleShape, ParticleSystem};
pub use player::{BuffKind, Player, PlayerInput, PlayerState};
pub use pool::{Handle, Pool};
pub use rng::SimRng;
pub use skill::{Skill, SkillCommand, SkillKind};
pub use state::{GameEvent, GamePhase, GameState, UpgradeChoice};
pub use tick::{TickInput, tick};
pub use wave::{WaveDirector, WaveEvent, WaveState};
