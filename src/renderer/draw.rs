//! Per-subsystem draw routines

use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, PI};

use super::Surface;
use super::shapes;
use crate::sim::bullet::{BulletManager, BulletPattern};
use crate::sim::effect::{EffectKind, EffectManager};
use crate::sim::enemy::{Enemy, EnemyKind};
use crate::sim::item::{ItemKind, ItemManager};
use crate::sim::particle::{ParticleShape, ParticleSystem};
use crate::sim::player::{BuffKind, CHARGE_COLOR, PLAYER_COLOR, Player};
use crate::sim::skill::SkillKind;
use crate::sim::state::{GamePhase, GameState};
use crate::sim::wave::WAVE_TITLE_TIME;
use crate::tuning::EnemyTable;
use crate::{Color, direction, rgb, rgba};

const BACKGROUND: Color = rgb(0x000011);
const HUD_TEXT: Color = rgb(0xffffff);
const HP_BAR: Color = rgb(0x44ff44);
const XP_BAR: Color = rgb(0x4488ff);
const BAR_BACK: Color = rgba(0x000000, 0.5);

fn with_alpha(mut color: Color, alpha: f32) -> Color {
    color[3] *= alpha.clamp(0.0, 1.0);
    color
}

pub fn background(surface: &mut dyn Surface, state: &GameState) {
    surface.set_fill(BACKGROUND);
    surface.fill_rect(Vec2::ZERO, state.world_size());
}

pub fn particles(surface: &mut dyn Surface, particles: &ParticleSystem) {
    for p in particles.iter() {
        surface.set_alpha(p.alpha());
        surface.set_fill(p.color);
        match p.shape {
            ParticleShape::Circle => surface.fill_circle(p.pos, p.size),
            ParticleShape::Spark => {
                surface.set_stroke(p.color, p.size * 0.5);
                surface.stroke_path(&shapes::streak(p.pos, p.vel, p.size * 3.0));
            }
            ParticleShape::Line => {
                let half = direction(p.rotation) * p.size;
                surface.set_stroke(p.color, 1.0);
                surface.stroke_path(&[p.pos - half, p.pos + half]);
            }
            ParticleShape::Star => {
                surface.fill_path(&shapes::star(p.pos, p.size, p.size * 0.4, 5, p.rotation))
            }
            ParticleShape::Diamond => surface.fill_path(&shapes::diamond(p.pos, p.size, p.rotation)),
        }
    }
    surface.set_alpha(1.0);
}

pub fn bullets(surface: &mut dyn Surface, bullets: &BulletManager) {
    for laser in bullets.lasers() {
        surface.set_alpha(laser.alpha());
        surface.set_fill(with_alpha(laser.color, 0.4));
        surface.fill_path(&shapes::beam(laser.origin, laser.angle, laser.length, laser.width * 2.0));
        surface.set_fill(laser.color);
        surface.fill_path(&shapes::beam(laser.origin, laser.angle, laser.length, laser.width));
    }
    surface.set_alpha(1.0);

    for bullet in bullets.player_bullets().chain(bullets.enemy_bullets()) {
        surface.set_fill(bullet.color);
        match bullet.pattern {
            BulletPattern::Beam => {
                surface.set_fill(with_alpha(bullet.color, 0.3));
                surface.fill_path(&shapes::beam(
                    bullet.pos,
                    bullet.angle() + PI,
                    bullet.beam_length.min(bullet.pos.y.max(0.0)),
                    bullet.size,
                ));
            }
            _ if bullet.chain.is_some() => {
                surface.fill_path(&shapes::diamond(bullet.pos, bullet.size, bullet.angle()));
            }
            BulletPattern::Meteor => {
                surface.set_fill(with_alpha(bullet.color, 0.4));
                surface.fill_circle(bullet.pos, bullet.size * 1.5);
                surface.set_fill(bullet.color);
                surface.fill_circle(bullet.pos, bullet.size);
            }
            _ => surface.fill_circle(bullet.pos, bullet.size / 2.0),
        }
    }
}

fn enemy_hull(enemy: &Enemy) -> Vec<Vec2> {
    match enemy.kind {
        EnemyKind::Normal => shapes::polygon(enemy.pos, enemy.size, 3, FRAC_PI_2),
        EnemyKind::Assassin => shapes::diamond(enemy.pos, enemy.size, FRAC_PI_2),
        EnemyKind::Bomber => shapes::polygon(enemy.pos, enemy.size, 8, 0.0),
        EnemyKind::MiniBoss => shapes::polygon(enemy.pos, enemy.size, 6, 0.0),
        EnemyKind::Boss => shapes::star(enemy.pos, enemy.size, enemy.size * 0.7, 8, 0.0),
    }
}

pub fn enemies(surface: &mut dyn Surface, enemies: &[Enemy], table: &EnemyTable) {
    for enemy in enemies {
        surface.set_alpha(enemy.alpha(table));
        let color = if enemy.hit_flash > 0.0 {
            rgb(0xffffff)
        } else {
            enemy.kind.color()
        };
        surface.set_fill(color);
        surface.fill_path(&enemy_hull(enemy));

        if enemy.status.stunned() {
            surface.set_stroke(rgb(0x77ddff), 2.0);
            surface.stroke_circle(enemy.pos, enemy.size * 1.2);
        }
        if enemy.status.burn_timer > 0.0 {
            surface.set_fill(rgba(0xff6600, 0.4));
            surface.fill_circle(enemy.pos, enemy.size * 0.5);
        }

        if enemy.is_alive() && !enemy.kind.hovers() && enemy.hp < enemy.max_hp {
            let width = enemy.size * 2.0;
            let top = enemy.pos - Vec2::new(enemy.size, enemy.size + 8.0);
            surface.set_fill(BAR_BACK);
            surface.fill_rect(top, Vec2::new(width, 4.0));
            surface.set_fill(HP_BAR);
            surface.fill_rect(top, Vec2::new(width * enemy.hp_ratio(), 4.0));
        }
    }
    surface.set_alpha(1.0);
}

pub fn items(surface: &mut dyn Surface, items: &ItemManager) {
    for item in items.iter() {
        surface.set_alpha(item.alpha);
        surface.set_fill(item.color);
        let half = item.size / 2.0;
        match item.kind {
            ItemKind::Coin => surface.fill_circle(item.pos, half),
            ItemKind::Gem => surface.fill_path(&shapes::diamond(item.pos, half, FRAC_PI_2)),
            ItemKind::Health => {
                surface.fill_rect(item.pos - Vec2::new(half, half * 0.3), Vec2::new(item.size, half * 0.6));
                surface.fill_rect(item.pos - Vec2::new(half * 0.3, half), Vec2::new(half * 0.6, item.size));
            }
            ItemKind::Power | ItemKind::Speed | ItemKind::Shield => {
                surface.fill_path(&shapes::star(item.pos, half, half * 0.5, 5, 0.0));
            }
        }
    }
    surface.set_alpha(1.0);
}

pub fn player(surface: &mut dyn Surface, player: &Player) {
    if !player.is_alive() {
        return;
    }
    // Blink while invincible
    let blink = player.is_invincible() && (player.invincible_timer * 20.0) as i32 % 2 == 0;
    surface.set_alpha(if blink { 0.4 } else { 1.0 });

    if player.has_buff(BuffKind::Shield) {
        surface.set_stroke(rgb(0x44aaff), 2.0);
        surface.stroke_circle(player.pos, player.radius * 1.5);
    }
    if player.has_buff(BuffKind::Power) {
        surface.set_fill(rgba(0xff4444, 0.25));
        surface.fill_circle(player.pos, player.radius * 1.3);
    }
    if player.skill(SkillKind::RegenAura).active {
        surface.set_fill(rgba(0x44ff88, 0.15));
        surface.fill_circle(player.pos, player.radius * 2.5);
    }

    surface.set_fill(PLAYER_COLOR);
    surface.fill_path(&shapes::ship(player.pos, player.radius));

    if player.charging {
        surface.set_stroke(CHARGE_COLOR, 3.0);
        surface.stroke_circle(player.pos, player.radius * (1.0 + player.charge_ratio()));
    }
    surface.set_alpha(1.0);
}

pub fn effects(surface: &mut dyn Surface, effects: &EffectManager) {
    for effect in effects.iter() {
        let t = effect.progress();
        surface.set_alpha(effect.alpha());
        match &effect.kind {
            EffectKind::Damage { amount, critical } => {
                surface.set_fill(effect.color);
                let text = if *critical {
                    format!("{}!", amount.round())
                } else {
                    format!("{}", amount.round())
                };
                surface.fill_text(&text, effect.pos + Vec2::new(0.0, effect.offset_y), effect.size);
            }
            EffectKind::Heal { amount } => {
                surface.set_fill(effect.color);
                let pos = effect.pos + Vec2::new(0.0, effect.offset_y);
                surface.fill_text(&format!("+{}", amount.round()), pos, effect.size);
            }
            EffectKind::Lightning { points } => {
                surface.set_stroke(effect.color, 3.0 * (1.0 - t));
                surface.stroke_path(points);
            }
            EffectKind::MuzzleFlash => {
                surface.set_fill(effect.color);
                surface.fill_circle(effect.pos, effect.size * (1.0 - t));
            }
            EffectKind::Explosion => {
                surface.set_fill(with_alpha(effect.color, 0.3));
                surface.fill_circle(effect.pos, effect.size * t);
            }
            EffectKind::LevelUp
            | EffectKind::SkillActivate
            | EffectKind::Buff
            | EffectKind::BossPhase
            | EffectKind::Stealth
            | EffectKind::Dash => {
                surface.set_stroke(effect.color, 3.0);
                surface.stroke_circle(effect.pos, effect.size * (0.5 + t));
            }
        }
    }
    surface.set_alpha(1.0);
}

fn bar(surface: &mut dyn Surface, min: Vec2, size: Vec2, ratio: f32, color: Color) {
    surface.set_fill(BAR_BACK);
    surface.fill_rect(min, size);
    surface.set_fill(color);
    surface.fill_rect(min, Vec2::new(size.x * ratio.clamp(0.0, 1.0), size.y));
}

pub fn hud(surface: &mut dyn Surface, state: &GameState) {
    let world = state.world_size();
    let player = &state.player;

    bar(surface, Vec2::new(10.0, 10.0), Vec2::new(200.0, 12.0), player.hp / player.max_hp, HP_BAR);
    let xp_ratio = player.xp as f32 / player.next_xp.max(1) as f32;
    bar(surface, Vec2::new(10.0, 26.0), Vec2::new(200.0, 6.0), xp_ratio, XP_BAR);

    surface.set_fill(HUD_TEXT);
    surface.fill_text(&format!("Lv {}", player.level), Vec2::new(220.0, 22.0), 14.0);
    surface.fill_text(&format!("Score {}", state.score), Vec2::new(world.x - 160.0, 22.0), 16.0);
    surface.fill_text(&format!("Wave {}", state.director.wave), Vec2::new(world.x - 160.0, 42.0), 14.0);
    surface.fill_text(&format!("Gems {}", state.gems), Vec2::new(world.x - 160.0, 60.0), 14.0);

    // Skill cooldown slots
    for (i, skill) in player.skills.iter().enumerate() {
        let center = Vec2::new(30.0 + i as f32 * 44.0, world.y - 30.0);
        surface.set_fill(BAR_BACK);
        surface.fill_circle(center, 18.0);
        surface.set_fill(with_alpha(skill.kind.color(), if skill.is_ready() { 1.0 } else { 0.4 }));
        surface.fill_circle(center, 18.0 * (1.0 - skill.cooldown_ratio()));
        if skill.active {
            surface.set_stroke(HUD_TEXT, 2.0);
            surface.stroke_circle(center, 20.0);
        }
    }

    if let Some(boss) = state.director.boss() {
        bar(
            surface,
            Vec2::new(world.x * 0.2, 70.0),
            Vec2::new(world.x * 0.6, 10.0),
            boss.hp_ratio(),
            boss.kind.color(),
        );
    }

    let banner = state.director.title_timer;
    if banner > 0.0 {
        surface.set_alpha((banner / WAVE_TITLE_TIME).min(1.0));
        surface.set_fill(HUD_TEXT);
        let text = if state.director.just_cleared {
            format!("Wave {} Clear!", state.director.wave - 1)
        } else {
            format!("Wave {}", state.director.wave)
        };
        surface.fill_text(&text, world / 2.0, 36.0);
        surface.set_alpha(1.0);
    }
    if let Some(quote) = &state.director.boss_quote {
        surface.set_fill(rgb(0xff4444));
        surface.fill_text(&quote.name, Vec2::new(world.x / 2.0, world.y / 2.0 - 60.0), 24.0);
        surface.fill_text(&quote.quote, Vec2::new(world.x / 2.0, world.y / 2.0 - 30.0), 16.0);
    }

    let overlay = match state.phase {
        GamePhase::Title => Some("WAVE ATTACK"),
        GamePhase::Paused => Some("PAUSED"),
        GamePhase::LevelUp => Some("LEVEL UP!"),
        GamePhase::GameOver => Some("GAME OVER"),
        GamePhase::Playing | GamePhase::SkillSelect | GamePhase::Shop => None,
    };
    if let Some(text) = overlay {
        surface.set_fill(rgba(0x000000, 0.5));
        surface.fill_rect(Vec2::ZERO, world);
        surface.set_fill(HUD_TEXT);
        surface.fill_text(text, world / 2.0, 40.0);
    }
}
