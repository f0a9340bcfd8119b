//! Drawing contract consumed by an external renderer
//!
//! The simulation never touches a graphics API. Each frame it walks its
//! subsystems in a fixed layer order and issues primitive calls on a
//! [`Surface`]; a canvas, a GPU batcher or the [`Recorder`] used by tests
//! and the headless driver can sit behind it.

mod draw;
mod recorder;
pub mod shapes;

use glam::Vec2;

use crate::Color;
use crate::sim::GameState;

pub use recorder::{DrawCommand, Recorder};

/// Minimal 2D drawing target
pub trait Surface {
    /// Push the current alpha and transform
    fn save(&mut self);
    fn restore(&mut self);
    fn set_alpha(&mut self, alpha: f32);
    /// Translate, then rotate (radians), then uniformly scale
    fn set_transform(&mut self, translate: Vec2, rotation: f32, scale: f32);
    fn set_fill(&mut self, color: Color);
    fn set_stroke(&mut self, color: Color, width: f32);
    fn fill_circle(&mut self, center: Vec2, radius: f32);
    fn stroke_circle(&mut self, center: Vec2, radius: f32);
    /// Fill a closed polygon
    fn fill_path(&mut self, points: &[Vec2]);
    /// Stroke an open polyline
    fn stroke_path(&mut self, points: &[Vec2]);
    fn fill_rect(&mut self, min: Vec2, size: Vec2);
    /// Text is optional; surfaces without fonts ignore it
    fn fill_text(&mut self, _text: &str, _pos: Vec2, _size: f32) {}
    /// Marks the start of a layer
    fn begin_layer(&mut self, _layer: Layer) {}
}

/// Draw layers, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Background,
    Particles,
    Bullets,
    Enemies,
    Items,
    Player,
    Effects,
    Hud,
}

impl Layer {
    pub const ORDER: [Layer; 8] = [
        Layer::Background,
        Layer::Particles,
        Layer::Bullets,
        Layer::Enemies,
        Layer::Items,
        Layer::Player,
        Layer::Effects,
        Layer::Hud,
    ];
}

/// Draw one layer of the game
pub fn draw_layer(surface: &mut dyn Surface, state: &GameState, layer: Layer) {
    surface.begin_layer(layer);
    surface.save();
    match layer {
        Layer::Background => draw::background(surface, state),
        Layer::Particles => draw::particles(surface, &state.particles),
        Layer::Bullets => draw::bullets(surface, &state.bullets),
        Layer::Enemies => draw::enemies(surface, &state.director.enemies, &state.tuning.enemies),
        Layer::Items => draw::items(surface, &state.items),
        Layer::Player => draw::player(surface, &state.player),
        Layer::Effects => draw::effects(surface, &state.effects),
        Layer::Hud => draw::hud(surface, state),
    }
    surface.restore();
}

/// Draw a whole frame in layer order
pub fn draw_frame(surface: &mut dyn Surface, state: &GameState) {
    for layer in Layer::ORDER {
        draw_layer(surface, state, layer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::{TickInput, tick};
    use crate::tuning::Tuning;

    fn running_state() -> GameState {
        let mut state = GameState::new(3, Tuning::default(), Settings::default());
        let start = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &start, 1.0 / 60.0);
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), 1.0 / 60.0);
        }
        state
    }

    #[test]
    fn test_frame_draws_layers_in_order() {
        let state = running_state();
        let mut rec = Recorder::default();
        draw_frame(&mut rec, &state);
        assert_eq!(rec.layers(), Layer::ORDER.to_vec());
    }

    #[test]
    fn test_save_restore_balanced() {
        let state = running_state();
        let mut rec = Recorder::default();
        draw_frame(&mut rec, &state);
        assert_eq!(rec.depth(), 0);
        assert!(rec.max_depth() >= 1);
    }

    #[test]
    fn test_enemies_layer_draws_each_enemy() {
        let state = running_state();
        let mut rec = Recorder::default();
        draw_layer(&mut rec, &state, Layer::Enemies);
        let bodies = rec
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillPath { .. } | DrawCommand::FillCircle { .. }))
            .count();
        assert!(bodies >= state.director.enemies.len());
    }
}
