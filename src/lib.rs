//! Wave Attack - simulation core of a 2D bullet-hell survival shooter
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (pools, actors, projectiles, collisions, waves)
//! - `renderer`: Drawing contract consumed by an external renderer
//! - `tuning`: Data-driven game balance
//! - `settings`: Runtime switches owned by the outer UI

pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::ConfigError;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Largest frame delta the simulation accepts (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Logical canvas dimensions
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 600.0;

    /// Pool capacities
    pub const MAX_BULLETS: usize = 200;
    pub const MAX_ENEMIES: usize = 50;
    pub const MAX_PARTICLES: usize = 1000;
    pub const MAX_EFFECTS: usize = 50;
    pub const MAX_LASERS: usize = 32;

    /// Distance outside the canvas before a bullet is pruned
    pub const BOUNDS_MARGIN: f32 = 50.0;

    /// Straight up in screen coordinates (y grows downward)
    pub const UP: f32 = -std::f32::consts::FRAC_PI_2;
}

/// RGBA color, components in 0..=1
pub type Color = [f32; 4];

/// Build an opaque color from a 0xRRGGBB literal
#[inline]
pub const fn rgb(hex: u32) -> Color {
    rgba(hex, 1.0)
}

/// Build a color from a 0xRRGGBB literal and an alpha
#[inline]
pub const fn rgba(hex: u32, alpha: f32) -> Color {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        alpha,
    ]
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Bearing from `from` toward `to` (radians)
#[inline]
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Unit vector for an angle
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * PI) - (-PI)).abs() < 1e-5);
        assert!((normalize_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-5);
        assert_eq!(normalize_angle(0.5), 0.5);
    }

    #[test]
    fn test_angle_to_points_down() {
        let a = angle_to(Vec2::ZERO, Vec2::new(0.0, 10.0));
        assert!((a - PI / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_rgb_components() {
        let c = rgb(0xff8000);
        assert_eq!(c[0], 1.0);
        assert!((c[1] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c[2], 0.0);
        assert_eq!(c[3], 1.0);
    }
}
