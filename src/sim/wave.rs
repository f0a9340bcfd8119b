//! Wave/spawn director
//!
//! Owns the enemy list and decides when enemies appear. Each wave opens with
//! an initial burst (plus a boss on boss waves), trickles in regular spawns
//! on an interval that shrinks with the wave number, drops one mini-boss at
//! the halfway mark and clears once its timer has run out and no enemy is
//! left.

use glam::Vec2;

use super::bullet::BulletManager;
use super::enemy::{Enemy, EnemyKind, EnemyReport};
use super::rng::SimRng;
use crate::tuning::{BossQuote, Tuning};

/// Seconds the "Wave N" banner stays up
pub const WAVE_TITLE_TIME: f32 = 2.0;
/// Seconds a boss quote stays up
pub const BOSS_QUOTE_TIME: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveState {
    NotStarted,
    Running,
}

/// Something the director did this frame
#[derive(Debug, Clone, PartialEq)]
pub enum WaveEvent {
    Started { wave: u32 },
    BossSpawned { wave: u32, id: u32 },
    MiniBossSpawned { id: u32 },
    /// `gems` is the reward computed against the upcoming wave number
    Cleared { wave: u32, heal: f32, gems: u32 },
}

#[derive(Debug, Clone)]
pub struct WaveDirector {
    pub wave: u32,
    pub state: WaveState,
    /// Seconds since the wave started
    pub timer: f32,
    pub spawn_timer: f32,
    pub mini_boss_spawned: bool,
    pub enemies: Vec<Enemy>,
    pub title_timer: f32,
    /// Set on the frame a wave clears, for the banner text
    pub just_cleared: bool,
    pub boss_quote: Option<BossQuote>,
    pub boss_quote_timer: f32,
    next_id: u32,
    cap_warned: bool,
}

impl Default for WaveDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveDirector {
    pub fn new() -> Self {
        Self {
            wave: 1,
            state: WaveState::NotStarted,
            timer: 0.0,
            spawn_timer: 0.0,
            mini_boss_spawned: false,
            enemies: Vec::new(),
            title_timer: 0.0,
            just_cleared: false,
            boss_quote: None,
            boss_quote_timer: 0.0,
            next_id: 1,
            cap_warned: false,
        }
    }

    pub fn live_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: u32) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn boss(&self) -> Option<&Enemy> {
        self.enemies
            .iter()
            .find(|e| e.kind == EnemyKind::Boss && e.is_alive())
    }

    /// Advance the wave clock and spawn; call before enemies move
    pub fn update(&mut self, dt: f32, tuning: &Tuning, rng: &mut SimRng) -> Vec<WaveEvent> {
        let mut events = Vec::new();
        self.timer += dt;
        self.spawn_timer += dt;

        if self.state == WaveState::NotStarted {
            self.start_wave(tuning, rng, &mut events);
            return events;
        }

        let wave_tuning = &tuning.wave;
        if self.enemies.is_empty() && self.timer >= wave_tuning.wave_duration {
            let cleared = self.wave;
            self.wave += 1;
            self.state = WaveState::NotStarted;
            self.just_cleared = true;
            self.title_timer = WAVE_TITLE_TIME;
            log::info!("wave {} cleared", cleared);
            events.push(WaveEvent::Cleared {
                wave: cleared,
                heal: wave_tuning.clear_heal,
                gems: wave_tuning.clear_gems(self.wave),
            });
            return events;
        }
        if self.timer >= wave_tuning.wave_duration {
            return events;
        }

        if !self.mini_boss_spawned
            && self.timer >= wave_tuning.wave_duration * wave_tuning.mini_boss_at
        {
            self.mini_boss_spawned = true;
            if let Some(id) = self.spawn(EnemyKind::MiniBoss, tuning, rng, false) {
                events.push(WaveEvent::MiniBossSpawned { id });
            }
        }

        if self.spawn_timer >= wave_tuning.spawn_interval(self.wave) {
            self.spawn_timer = 0.0;
            let entries = tuning.enemies.spawn_weights.entries();
            let weights = entries.map(|(_, w)| w);
            if let Some(i) = rng.weighted(&weights) {
                self.spawn(entries[i].0, tuning, rng, false);
            }
        }
        events
    }

    fn start_wave(&mut self, tuning: &Tuning, rng: &mut SimRng, events: &mut Vec<WaveEvent>) {
        self.state = WaveState::Running;
        self.timer = 0.0;
        self.spawn_timer = 0.0;
        self.mini_boss_spawned = false;
        self.just_cleared = false;
        self.title_timer = WAVE_TITLE_TIME;
        log::info!("wave {} started", self.wave);
        events.push(WaveEvent::Started { wave: self.wave });

        let w = &tuning.wave;
        let scaled = (w.base_enemy_count * w.scale(self.wave)).floor();
        let ceiling = (tuning.limits.max_enemies as f32 * w.initial_burst_ratio).floor();
        let burst = scaled.min(ceiling).max(0.0) as usize;
        for _ in 0..burst {
            let entries = tuning.enemies.spawn_weights.entries();
            let weights = entries.map(|(_, w)| w);
            if let Some(i) = rng.weighted(&weights) {
                self.spawn(entries[i].0, tuning, rng, false);
            }
        }

        if w.is_boss_wave(self.wave) {
            if let Some(id) = self.spawn(EnemyKind::Boss, tuning, rng, true) {
                self.boss_quote = tuning.boss_quote(self.wave).cloned();
                self.boss_quote_timer = BOSS_QUOTE_TIME;
                match &self.boss_quote {
                    Some(q) => log::info!("boss {} appears on wave {}", q.name, self.wave),
                    None => log::info!("boss appears on wave {}", self.wave),
                }
                events.push(WaveEvent::BossSpawned {
                    wave: self.wave,
                    id,
                });
            }
        }
    }

    /// Spawn one enemy above the canvas; `None` once the cap is reached,
    /// unless `bypass_cap`
    pub fn spawn(
        &mut self,
        kind: EnemyKind,
        tuning: &Tuning,
        rng: &mut SimRng,
        bypass_cap: bool,
    ) -> Option<u32> {
        if !bypass_cap && self.enemies.len() >= tuning.limits.max_enemies {
            if !self.cap_warned {
                self.cap_warned = true;
                log::warn!("enemy cap of {} reached, dropping spawns", tuning.limits.max_enemies);
            }
            return None;
        }
        let size = tuning.enemies.stats(kind).size;
        let width = tuning.world.width;
        let x = if width > size * 2.0 {
            rng.range(size, width - size)
        } else {
            width / 2.0
        };
        Some(self.spawn_at(kind, Vec2::new(x, -size), tuning, rng))
    }

    /// Spawn at an exact position, ignoring the cap
    pub fn spawn_at(&mut self, kind: EnemyKind, pos: Vec2, tuning: &Tuning, rng: &mut SimRng) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        let scale = tuning.wave.scale(self.wave);
        self.enemies
            .push(Enemy::spawn(id, kind, pos, scale, &tuning.enemies, rng));
        id
    }

    /// Move and fire every enemy; reports are paired with the enemy id
    pub fn update_enemies(
        &mut self,
        dt: f32,
        player: Option<Vec2>,
        tuning: &Tuning,
        bullets: &mut BulletManager,
        rng: &mut SimRng,
    ) -> Vec<(u32, EnemyReport)> {
        let world_size = Vec2::new(tuning.world.width, tuning.world.height);
        self.enemies
            .iter_mut()
            .map(|e| {
                let report = e.update(dt, player, &tuning.enemies, world_size, bullets, rng);
                (e.id, report)
            })
            .collect()
    }

    /// Drop enemies whose death animation ended or that escaped
    pub fn reap(&mut self) -> usize {
        let before = self.enemies.len();
        self.enemies.retain(|e| !e.is_finished());
        before - self.enemies.len()
    }

    /// Banner and quote timers; these keep running outside `Playing`
    pub fn update_timers(&mut self, dt: f32) {
        self.title_timer = (self.title_timer - dt).max(0.0);
        if self.boss_quote_timer > 0.0 {
            self.boss_quote_timer = (self.boss_quote_timer - dt).max(0.0);
            if self.boss_quote_timer == 0.0 {
                self.boss_quote = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn director_at(wave: u32) -> WaveDirector {
        WaveDirector {
            wave,
            ..WaveDirector::new()
        }
    }

    #[test]
    fn test_first_update_starts_wave_with_burst() {
        let tuning = Tuning::default();
        let mut rng = SimRng::new(1);
        let mut d = WaveDirector::new();
        let events = d.update(0.016, &tuning, &mut rng);
        assert_eq!(events, vec![WaveEvent::Started { wave: 1 }]);
        assert_eq!(d.state, WaveState::Running);
        assert_eq!(d.enemies.len(), 5);
        assert!(d.enemies.iter().all(|e| e.kind != EnemyKind::Boss));
    }

    #[test]
    fn test_boss_wave_spawns_one_boss_with_quote() {
        let tuning = Tuning::default();
        let mut rng = SimRng::new(1);
        let mut d = director_at(5);
        let events = d.update(0.016, &tuning, &mut rng);
        let bosses: Vec<_> = d.enemies.iter().filter(|e| e.kind == EnemyKind::Boss).collect();
        assert_eq!(bosses.len(), 1);
        assert!((bosses[0].max_hp - 400.0 * 1.1f32.powi(4)).abs() < 1e-2);
        assert!(matches!(events[1], WaveEvent::BossSpawned { wave: 5, .. }));
        assert_eq!(d.boss_quote.as_ref().map(|q| q.wave), Some(5));
    }

    #[test]
    fn test_boss_bypasses_cap() {
        let mut tuning = Tuning::default();
        tuning.limits.max_enemies = 2;
        let mut rng = SimRng::new(4);
        let mut d = director_at(10);
        d.update(0.016, &tuning, &mut rng);
        assert_eq!(d.enemies.len(), 2);
        assert_eq!(d.enemies.last().map(|e| e.kind), Some(EnemyKind::Boss));
    }

    #[test]
    fn test_cap_drops_spawns() {
        let mut tuning = Tuning::default();
        tuning.limits.max_enemies = 3;
        let mut rng = SimRng::new(4);
        let mut d = WaveDirector::new();
        for _ in 0..200 {
            d.update(0.1, &tuning, &mut rng);
        }
        assert_eq!(d.enemies.len(), 3);
    }

    #[test]
    fn test_mini_boss_once_at_halfway() {
        let tuning = Tuning::default();
        let mut rng = SimRng::new(2);
        let mut d = WaveDirector::new();
        d.update(0.0, &tuning, &mut rng);
        let mut mini = 0;
        for _ in 0..590 {
            for ev in d.update(0.1, &tuning, &mut rng) {
                if matches!(ev, WaveEvent::MiniBossSpawned { .. }) {
                    mini += 1;
                    assert!(d.timer >= 30.0);
                }
            }
        }
        assert_eq!(mini, 1);
    }

    #[test]
    fn test_wave_clears_only_when_empty_and_timer_elapsed() {
        let tuning = Tuning::default();
        let mut rng = SimRng::new(3);
        let mut d = WaveDirector::new();
        d.update(0.0, &tuning, &mut rng);
        d.enemies.clear();
        assert!(d.update(1.0, &tuning, &mut rng).is_empty());
        assert_eq!(d.state, WaveState::Running);
        d.timer = 60.0;
        d.enemies.clear();
        let events = d.update(0.1, &tuning, &mut rng);
        assert_eq!(
            events,
            vec![WaveEvent::Cleared {
                wave: 1,
                heal: 5.0,
                gems: 2
            }]
        );
        assert_eq!(d.wave, 2);
        let events = d.update(0.1, &tuning, &mut rng);
        assert_eq!(events[0], WaveEvent::Started { wave: 2 });
    }

    #[test]
    fn test_no_regular_spawns_after_timer() {
        let tuning = Tuning::default();
        let mut rng = SimRng::new(3);
        let mut d = WaveDirector::new();
        d.update(0.0, &tuning, &mut rng);
        d.timer = 61.0;
        let before = d.enemies.len();
        for _ in 0..20 {
            d.update(0.5, &tuning, &mut rng);
        }
        assert_eq!(d.enemies.len(), before);
    }

    #[test]
    fn test_quote_timer_expires() {
        let tuning = Tuning::default();
        let mut rng = SimRng::new(1);
        let mut d = director_at(5);
        d.update(0.0, &tuning, &mut rng);
        d.update_timers(2.0);
        assert!(d.boss_quote.is_some());
        d.update_timers(1.5);
        assert!(d.boss_quote.is_none());
    }
}
