//! Pickups dropped by enemies
//!
//! Items fall slowly, get pulled toward the player once inside the magnet
//! range and fade out after collection. Effects of a pickup are applied by
//! the game state from the returned `Collected` list.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::SimRng;
use crate::tuning::ItemTable;
use crate::{Color, rgb};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    Coin,
    Gem,
    Health,
    Power,
    Speed,
    Shield,
}

impl ItemKind {
    pub const ALL: [ItemKind; 6] = [
        ItemKind::Coin,
        ItemKind::Gem,
        ItemKind::Health,
        ItemKind::Power,
        ItemKind::Speed,
        ItemKind::Shield,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Coin => "coin",
            ItemKind::Gem => "gem",
            ItemKind::Health => "health",
            ItemKind::Power => "power",
            ItemKind::Speed => "speed",
            ItemKind::Shield => "shield",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Item {
    pub kind: ItemKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: Color,
    pub value: f32,
    /// Locked onto the player
    pub magnet: bool,
    pub collected: bool,
    pub alpha: f32,
}

/// A pickup the player touched this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collected {
    pub kind: ItemKind,
    pub pos: Vec2,
    pub value: f32,
}

#[derive(Debug, Clone, Default)]
pub struct ItemManager {
    items: Vec<Item>,
}

impl ItemManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn spawn(&mut self, kind: ItemKind, pos: Vec2, table: &ItemTable) {
        let stats = table.stats(kind);
        self.items.push(Item {
            kind,
            pos,
            vel: Vec2::new(0.0, table.fall_speed),
            size: stats.size,
            color: rgb(stats.color),
            value: stats.value,
            magnet: false,
            collected: false,
            alpha: 1.0,
        });
    }

    /// Roll an enemy's drop: `drop_chance` gates it, the weight table
    /// picks the kind
    pub fn roll_drop(rng: &mut SimRng, table: &ItemTable, drop_chance: f32) -> Option<ItemKind> {
        if !rng.chance(drop_chance) {
            return None;
        }
        let entries = table.drop_weights.entries();
        let weights = entries.map(|(_, w)| w);
        rng.weighted(&weights).map(|i| entries[i].0)
    }

    /// Move, collect and prune; returns the pickups touched this frame
    pub fn update(
        &mut self,
        dt: f32,
        player_pos: Vec2,
        player_radius: f32,
        world_size: Vec2,
        table: &ItemTable,
    ) -> Vec<Collected> {
        let mut collected = Vec::new();

        for item in &mut self.items {
            if item.collected {
                item.alpha -= table.fade_speed * dt;
                continue;
            }

            let to_player = player_pos - item.pos;
            if !item.magnet && to_player.length() < table.magnet_range {
                item.magnet = true;
            }
            if item.magnet {
                item.vel += to_player.normalize_or_zero() * table.magnet_accel * dt;
            }
            item.pos += item.vel * dt;

            let reach = player_radius + item.size / 2.0;
            let d = (player_pos - item.pos).abs();
            if d.x < reach && d.y < reach {
                item.collected = true;
                collected.push(Collected {
                    kind: item.kind,
                    pos: item.pos,
                    value: item.value,
                });
            }
        }

        let bottom = world_size.y;
        self.items.retain(|item| {
            item.alpha > 0.0 && item.pos.is_finite() && item.pos.y < bottom + item.size
        });
        collected
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn test_item_falls_without_magnet() {
        let table = ItemTable::default();
        let mut items = ItemManager::new();
        items.spawn(ItemKind::Coin, Vec2::new(100.0, 100.0), &table);
        let got = items.update(1.0, Vec2::new(700.0, 500.0), 20.0, WORLD, &table);
        assert!(got.is_empty());
        let item = items.iter().next().expect("still alive");
        assert_eq!(item.pos, Vec2::new(100.0, 160.0));
        assert!(!item.magnet);
    }

    #[test]
    fn test_magnet_pulls_and_collects_once() {
        let table = ItemTable::default();
        let mut items = ItemManager::new();
        let player = Vec2::new(400.0, 400.0);
        items.spawn(ItemKind::Gem, Vec2::new(400.0, 320.0), &table);

        let mut total = Vec::new();
        for _ in 0..60 {
            total.extend(items.update(1.0 / 60.0, player, 20.0, WORLD, &table));
        }
        assert_eq!(total.len(), 1);
        assert_eq!(total[0].kind, ItemKind::Gem);
        // Faded out after collection
        assert!(items.is_empty());
    }

    #[test]
    fn test_off_screen_items_pruned() {
        let table = ItemTable::default();
        let mut items = ItemManager::new();
        items.spawn(ItemKind::Health, Vec2::new(10.0, 590.0), &table);
        items.update(1.0, Vec2::new(700.0, 100.0), 20.0, WORLD, &table);
        assert!(items.is_empty());
    }

    #[test]
    fn test_drop_roll_respects_chance() {
        let table = ItemTable::default();
        let mut rng = SimRng::new(11);
        for _ in 0..50 {
            assert_eq!(ItemManager::roll_drop(&mut rng, &table, 0.0), None);
        }
        let kinds: Vec<_> = (0..200)
            .filter_map(|_| ItemManager::roll_drop(&mut rng, &table, 1.0))
            .collect();
        assert_eq!(kinds.len(), 200);
        assert!(kinds.iter().all(|k| *k != ItemKind::Gem));
        assert!(kinds.contains(&ItemKind::Coin));
    }
}
