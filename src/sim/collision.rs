//! Central collision pass
//!
//! The only place projectile and contact damage is applied. Runs once per
//! frame after every entity has moved; bullets are only flagged here and
//! released by `BulletManager::release_removed` afterwards.

use glam::Vec2;

use super::bullet::{
    Bullet, BulletManager, CHAIN_FALLOFF, ChainPayload, LaserDamage, METEOR_SPLASH, MeteorPayload,
};
use super::effect::{EffectKind, EffectManager};
use super::enemy::Enemy;
use super::particle::ParticleSystem;
use super::player::Player;
use super::rng::SimRng;
use crate::rgb;

/// Everything the pass reads and mutates for one frame
pub struct Collider<'a> {
    pub enemies: &'a mut [Enemy],
    pub bullets: &'a mut BulletManager,
    pub player: &'a mut Player,
    pub particles: &'a mut ParticleSystem,
    pub effects: &'a mut EffectManager,
    pub rng: &'a mut SimRng,
    pub contact_damage: f32,
    pub dt: f32,
}

/// Outcome of one pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    pub enemy_hits: usize,
    pub critical_hits: usize,
    /// Hp the player actually lost, one entry per landed hit
    pub player_damage: Vec<f32>,
}

impl Collider<'_> {
    pub fn resolve(&mut self) -> CollisionReport {
        let mut report = CollisionReport::default();
        self.player_bullets(&mut report);
        self.lasers(&mut report);
        self.enemy_bullets(&mut report);
        self.contact(&mut report);
        report
    }

    /// Player bullets against enemies, with crits and special payloads
    fn player_bullets(&mut self, report: &mut CollisionReport) {
        let enemies = &mut *self.enemies;
        let player = &*self.player;
        let rng = &mut *self.rng;
        let effects = &mut *self.effects;
        let particles = &mut *self.particles;

        for bullet in self.bullets.player_bullets_mut() {
            if !bullet.is_harmful() {
                continue;
            }
            for i in 0..enemies.len() {
                let enemy = &mut enemies[i];
                if !enemy.is_alive() || bullet.hit_enemies.contains(&enemy.id) {
                    continue;
                }
                if bullet.pos.distance(enemy.pos) >= enemy.size + bullet.size / 2.0 {
                    continue;
                }

                let (damage, critical) = player.roll_damage(bullet.damage, rng);
                let dealt = enemy.take_damage(damage);
                effects.damage_number(enemy.pos, dealt, critical);
                particles.hit(bullet.pos);
                report.enemy_hits += 1;
                if critical {
                    report.critical_hits += 1;
                }

                if let Some(meteor) = bullet.meteor {
                    meteor_splash(enemies, i, bullet, meteor, particles, effects);
                }
                if let Some(chain) = bullet.chain {
                    chain_splash(enemies, i, bullet.damage, chain, effects);
                }

                if bullet.penetrate {
                    bullet.hit_enemies.push(enemies[i].id);
                } else {
                    bullet.remove = true;
                    break;
                }
            }
        }
    }

    /// Beams: instant lasers hit once, per-second beams every pass
    fn lasers(&mut self, report: &mut CollisionReport) {
        let dt = self.dt;
        for laser in self.bullets.lasers_mut() {
            let damage = match laser.mode {
                LaserDamage::Instant if laser.applied => continue,
                LaserDamage::Instant => laser.damage,
                LaserDamage::PerSecond => laser.damage * dt,
            };
            for enemy in self.enemies.iter_mut() {
                if !enemy.is_alive() || !laser.hits(enemy.pos, enemy.size) {
                    continue;
                }
                let dealt = enemy.take_damage(damage);
                report.enemy_hits += 1;
                if laser.mode == LaserDamage::Instant {
                    self.effects.damage_number(enemy.pos, dealt, false);
                }
            }
            laser.applied = true;
        }
    }

    /// Enemy bullets against the player; they pass through while invincible
    fn enemy_bullets(&mut self, report: &mut CollisionReport) {
        let player = &mut *self.player;
        for bullet in self.bullets.enemy_bullets_mut() {
            if !player.is_alive() || player.is_invincible() {
                return;
            }
            if !bullet.is_harmful() {
                continue;
            }
            if bullet.pos.distance(player.pos) < player.radius + bullet.size / 2.0 {
                bullet.remove = true;
                let lost = player.take_damage(bullet.damage);
                if lost > 0.0 {
                    report.player_damage.push(lost);
                    self.particles.hit(player.pos);
                }
            }
        }
    }

    /// Body contact; every frame of overlap tries, invincibility rate-limits
    fn contact(&mut self, report: &mut CollisionReport) {
        if self.contact_damage <= 0.0 {
            return;
        }
        for enemy in self.enemies.iter() {
            if !enemy.is_alive() {
                continue;
            }
            if enemy.pos.distance(self.player.pos) < enemy.size + self.player.radius {
                let lost = self.player.take_damage(self.contact_damage);
                if lost > 0.0 {
                    report.player_damage.push(lost);
                }
            }
        }
    }
}

/// Falloff splash around a meteor impact; the struck enemy is excluded
fn meteor_splash(
    enemies: &mut [Enemy],
    struck: usize,
    bullet: &Bullet,
    meteor: MeteorPayload,
    particles: &mut ParticleSystem,
    effects: &mut EffectManager,
) {
    let radius = meteor.explosion_radius;
    let color = rgb(0xff6666);
    effects.create(EffectKind::Explosion, bullet.pos, color, radius);
    particles.explosion(bullet.pos, color, 30);

    enemies[struck].apply_burn(meteor.burn_damage, meteor.burn_duration);
    if radius <= 0.0 {
        return;
    }
    for (i, enemy) in enemies.iter_mut().enumerate() {
        if i == struck || !enemy.is_alive() {
            continue;
        }
        let dist = enemy.pos.distance(bullet.pos);
        if dist < radius {
            let dealt = enemy.take_damage(bullet.damage * (1.0 - dist / radius) * METEOR_SPLASH);
            effects.damage_number(enemy.pos, dealt, false);
            enemy.apply_burn(meteor.burn_damage, meteor.burn_duration);
        }
    }
}

/// Greedy nearest-first chain from the struck enemy, no revisits
fn chain_splash(
    enemies: &mut [Enemy],
    struck: usize,
    damage: f32,
    chain: ChainPayload,
    effects: &mut EffectManager,
) {
    let color = rgb(0x77ddff);
    let mut visited = vec![struck];
    apply_chain_status(&mut enemies[struck], chain);

    let mut from = enemies[struck].pos;
    for _ in 0..chain.chain_count {
        let Some(next) = nearest_unvisited(enemies, from, chain.chain_range, &visited) else {
            break;
        };
        let to = enemies[next].pos;
        effects.lightning(from, to, color);
        let dealt = enemies[next].take_damage(damage * CHAIN_FALLOFF);
        effects.damage_number(to, dealt, false);
        apply_chain_status(&mut enemies[next], chain);
        visited.push(next);
        from = to;
    }
}

fn apply_chain_status(enemy: &mut Enemy, chain: ChainPayload) {
    enemy.apply_stun(chain.stun_duration, chain.damage_amplification);
    enemy.apply_slow(chain.slow_effect, chain.slow_duration);
}

fn nearest_unvisited(enemies: &[Enemy], from: Vec2, range: f32, visited: &[usize]) -> Option<usize> {
    let mut best = None;
    let mut best_dist = range;
    for (i, enemy) in enemies.iter().enumerate() {
        if !enemy.is_alive() || visited.contains(&i) {
            continue;
        }
        let dist = enemy.pos.distance(from);
        if dist < best_dist {
            best_dist = dist;
            best = Some(i);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bullet::{BulletOptions, BulletPattern, LaserOptions};
    use crate::sim::enemy::EnemyKind;
    use crate::tuning::{EnemyTable, Tuning, WorldTuning};

    struct World {
        enemies: Vec<Enemy>,
        bullets: BulletManager,
        player: Player,
        particles: ParticleSystem,
        effects: EffectManager,
        rng: SimRng,
    }

    impl World {
        fn new() -> Self {
            let tuning = Tuning::default();
            let mut player = Player::new(Vec2::new(800.0, 600.0), &tuning.player, &tuning.skills);
            player.critical_chance = 0.0;
            Self {
                enemies: Vec::new(),
                bullets: BulletManager::new(200, 32, &WorldTuning::default()),
                player,
                particles: ParticleSystem::new(500),
                effects: EffectManager::new(50),
                rng: SimRng::new(7),
            }
        }

        fn enemy(&mut self, kind: EnemyKind, pos: Vec2) -> usize {
            let id = self.enemies.len() as u32 + 1;
            let mut rng = SimRng::new(id as u64);
            self.enemies
                .push(Enemy::spawn(id, kind, pos, 1.0, &EnemyTable::default(), &mut rng));
            self.enemies.len() - 1
        }

        fn resolve(&mut self, contact_damage: f32) -> CollisionReport {
            Collider {
                enemies: &mut self.enemies,
                bullets: &mut self.bullets,
                player: &mut self.player,
                particles: &mut self.particles,
                effects: &mut self.effects,
                rng: &mut self.rng,
                contact_damage,
                dt: 0.1,
            }
            .resolve()
        }

        fn damage_numbers(&self) -> Vec<f32> {
            self.effects
                .iter()
                .filter_map(|e| match e.kind {
                    EffectKind::Damage { amount, .. } => Some(amount),
                    _ => None,
                })
                .collect()
        }
    }

    fn shot(damage: f32) -> BulletOptions {
        BulletOptions {
            damage: Some(damage),
            ..Default::default()
        }
    }

    #[test]
    fn test_bullet_hits_and_is_flagged() {
        let mut w = World::new();
        let a = w.enemy(EnemyKind::Normal, Vec2::new(100.0, 100.0));
        w.bullets.spawn_player_bullet(Vec2::new(105.0, 100.0), Vec2::NEG_Y, shot(4.0));
        let report = w.resolve(0.0);
        assert_eq!(report.enemy_hits, 1);
        assert_eq!(w.enemies[a].hp, 6.0);
        w.bullets.release_removed();
        assert_eq!(w.bullets.player_bullet_count(), 0);
    }

    #[test]
    fn test_one_bullet_kills_once() {
        let mut w = World::new();
        let a = w.enemy(EnemyKind::Normal, Vec2::new(100.0, 100.0));
        w.bullets.spawn_player_bullet(Vec2::new(100.0, 100.0), Vec2::NEG_Y, shot(50.0));
        w.bullets.spawn_player_bullet(Vec2::new(100.0, 100.0), Vec2::NEG_Y, shot(50.0));
        let report = w.resolve(0.0);
        assert_eq!(report.enemy_hits, 1);
        assert!(w.enemies[a].is_dying());
        // The second bullet found no live target
        w.bullets.release_removed();
        assert_eq!(w.bullets.player_bullet_count(), 1);
    }

    #[test]
    fn test_penetrating_bullet_hits_each_enemy_once() {
        let mut w = World::new();
        let mut big = EnemyTable::default();
        big.normal.hp = 1000.0;
        let mut rng = SimRng::new(1);
        w.enemies.push(Enemy::spawn(1, EnemyKind::Normal, Vec2::new(100.0, 100.0), 1.0, &big, &mut rng));
        w.enemies.push(Enemy::spawn(2, EnemyKind::Normal, Vec2::new(110.0, 100.0), 1.0, &big, &mut rng));
        let opts = BulletOptions {
            penetrate: true,
            ..shot(10.0)
        };
        w.bullets.spawn_player_bullet(Vec2::new(105.0, 100.0), Vec2::NEG_Y, opts);
        assert_eq!(w.resolve(0.0).enemy_hits, 2);
        assert_eq!(w.resolve(0.0).enemy_hits, 0);
        assert_eq!(w.enemies[0].hp, 990.0);
    }

    #[test]
    fn test_chain_splash_follows_nearest_in_range() {
        let mut w = World::new();
        let mut big = EnemyTable::default();
        big.normal.hp = 1000.0;
        let mut rng = SimRng::new(1);
        for (id, x) in [(1, 0.0), (2, 50.0), (3, 80.0), (4, -200.0)] {
            w.enemies.push(Enemy::spawn(
                id,
                EnemyKind::Normal,
                Vec2::new(300.0 + x, 300.0),
                1.0,
                &big,
                &mut rng,
            ));
        }
        let opts = BulletOptions {
            pattern: BulletPattern::Zigzag,
            chain: Some(ChainPayload {
                chain_count: 3,
                chain_range: 150.0,
                ..Default::default()
            }),
            ..shot(10.0)
        };
        w.bullets.spawn_player_bullet(Vec2::new(300.0, 300.0), Vec2::NEG_Y, opts);
        w.resolve(0.0);
        assert_eq!(w.enemies[0].hp, 990.0);
        assert_eq!(w.enemies[1].hp, 993.0);
        assert_eq!(w.enemies[2].hp, 993.0);
        assert_eq!(w.enemies[3].hp, 1000.0);
        assert_eq!(w.damage_numbers(), vec![10.0, 7.0, 7.0]);
    }

    #[test]
    fn test_meteor_splash_falls_off() {
        let mut w = World::new();
        let mut big = EnemyTable::default();
        big.normal.hp = 1000.0;
        let mut rng = SimRng::new(1);
        for (id, x) in [(1, 0.0), (2, 50.0), (3, 150.0)] {
            w.enemies.push(Enemy::spawn(
                id,
                EnemyKind::Normal,
                Vec2::new(300.0 + x, 300.0),
                1.0,
                &big,
                &mut rng,
            ));
        }
        let opts = BulletOptions {
            pattern: BulletPattern::Meteor,
            meteor: Some(MeteorPayload {
                explosion_radius: 100.0,
                burn_damage: 10.0,
                burn_duration: 3.0,
            }),
            ..shot(40.0)
        };
        w.bullets.spawn_player_bullet(Vec2::new(300.0, 300.0), Vec2::Y, opts);
        w.resolve(0.0);
        assert_eq!(w.enemies[0].hp, 960.0);
        assert_eq!(w.enemies[1].hp, 990.0);
        assert_eq!(w.enemies[2].hp, 1000.0);
        assert!(w.enemies[0].status.burn_timer > 0.0);
        assert!(w.enemies[1].status.burn_timer > 0.0);
        assert_eq!(w.damage_numbers(), vec![40.0, 10.0]);
    }

    #[test]
    fn test_instant_laser_applies_once() {
        let mut w = World::new();
        let a = w.enemy(EnemyKind::Boss, Vec2::new(400.0, 100.0));
        w.bullets
            .spawn_laser(Vec2::new(400.0, 500.0), crate::consts::UP, 30.0, LaserOptions::default());
        w.resolve(0.0);
        w.resolve(0.0);
        assert_eq!(w.enemies[a].hp, 370.0);
    }

    #[test]
    fn test_per_second_laser_scales_with_dt() {
        let mut w = World::new();
        let a = w.enemy(EnemyKind::Boss, Vec2::new(400.0, 100.0));
        let opts = LaserOptions {
            mode: LaserDamage::PerSecond,
            ..Default::default()
        };
        w.bullets.spawn_laser(Vec2::new(400.0, 500.0), crate::consts::UP, 40.0, opts);
        w.resolve(0.0);
        w.resolve(0.0);
        assert!((w.enemies[a].hp - 392.0).abs() < 1e-3);
    }

    #[test]
    fn test_enemy_bullet_hits_player_then_passes_through() {
        let mut w = World::new();
        let pos = w.player.pos;
        w.bullets.spawn_enemy_bullet(pos, Vec2::Y, shot(10.0));
        w.bullets.spawn_enemy_bullet(pos, Vec2::Y, shot(10.0));
        let report = w.resolve(0.0);
        assert_eq!(report.player_damage, vec![10.0]);
        assert_eq!(w.player.hp, 90.0);
        w.bullets.release_removed();
        assert_eq!(w.bullets.enemy_bullet_count(), 1);
    }

    #[test]
    fn test_contact_damage_rate_limited_by_invincibility() {
        let mut w = World::new();
        let pos = w.player.pos;
        w.enemy(EnemyKind::Normal, pos);
        w.enemy(EnemyKind::Normal, pos + Vec2::new(5.0, 0.0));
        let report = w.resolve(1.0);
        assert_eq!(report.player_damage, vec![1.0]);
        assert_eq!(w.resolve(1.0).player_damage.len(), 0);
        w.player.invincible_timer = 0.0;
        assert_eq!(w.resolve(1.0).player_damage.len(), 1);
    }

    #[test]
    fn test_dead_enemies_are_not_collided() {
        let mut w = World::new();
        let a = w.enemy(EnemyKind::Normal, Vec2::new(100.0, 100.0));
        w.enemies[a].die();
        w.bullets.spawn_player_bullet(Vec2::new(100.0, 100.0), Vec2::NEG_Y, shot(5.0));
        assert_eq!(w.resolve(0.0).enemy_hits, 0);
    }
}
