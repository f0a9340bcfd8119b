//! Surface that records draw calls instead of rasterizing them

use glam::Vec2;

use super::{Layer, Surface};
use crate::Color;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Layer(Layer),
    Save,
    Restore,
    Alpha(f32),
    Transform { translate: Vec2, rotation: f32, scale: f32 },
    Fill(Color),
    Stroke { color: Color, width: f32 },
    FillCircle { center: Vec2, radius: f32 },
    StrokeCircle { center: Vec2, radius: f32 },
    FillPath { points: Vec<Vec2> },
    StrokePath { points: Vec<Vec2> },
    FillRect { min: Vec2, size: Vec2 },
    Text { text: String, pos: Vec2, size: f32 },
}

#[derive(Debug, Clone, Default)]
pub struct Recorder {
    commands: Vec<DrawCommand>,
    depth: usize,
    max_depth: usize,
}

impl Recorder {
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Layers in the order they were started
    pub fn layers(&self) -> Vec<Layer> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Layer(layer) => Some(*layer),
                _ => None,
            })
            .collect()
    }

    /// Current save nesting
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of primitives actually drawn
    pub fn primitive_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    DrawCommand::FillCircle { .. }
                        | DrawCommand::StrokeCircle { .. }
                        | DrawCommand::FillPath { .. }
                        | DrawCommand::StrokePath { .. }
                        | DrawCommand::FillRect { .. }
                        | DrawCommand::Text { .. }
                )
            })
            .count()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.depth = 0;
        self.max_depth = 0;
    }
}

impl Surface for Recorder {
    fn save(&mut self) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if self.depth == 0 {
            log::warn!("restore without a matching save");
            return;
        }
        self.depth -= 1;
        self.commands.push(DrawCommand::Restore);
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::Alpha(alpha));
    }

    fn set_transform(&mut self, translate: Vec2, rotation: f32, scale: f32) {
        self.commands.push(DrawCommand::Transform {
            translate,
            rotation,
            scale,
        });
    }

    fn set_fill(&mut self, color: Color) {
        self.commands.push(DrawCommand::Fill(color));
    }

    fn set_stroke(&mut self, color: Color, width: f32) {
        self.commands.push(DrawCommand::Stroke { color, width });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32) {
        self.commands.push(DrawCommand::FillCircle { center, radius });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32) {
        self.commands.push(DrawCommand::StrokeCircle { center, radius });
    }

    fn fill_path(&mut self, points: &[Vec2]) {
        self.commands.push(DrawCommand::FillPath {
            points: points.to_vec(),
        });
    }

    fn stroke_path(&mut self, points: &[Vec2]) {
        self.commands.push(DrawCommand::StrokePath {
            points: points.to_vec(),
        });
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2) {
        self.commands.push(DrawCommand::FillRect { min, size });
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, size: f32) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
            size,
        });
    }

    fn begin_layer(&mut self, layer: Layer) {
        self.commands.push(DrawCommand::Layer(layer));
    }
}
