//! Point generation for 2D primitives
//!
//! Surfaces only know circles and paths, so every other outline (ship,
//! stars, diamonds, enemy hulls) is built here as a closed point list.

use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::direction;

/// Vertices of a regular polygon; the first vertex points along `rotation`
pub fn polygon(center: Vec2, radius: f32, sides: u32, rotation: f32) -> Vec<Vec2> {
    let sides = sides.max(3);
    (0..sides)
        .map(|i| center + direction(rotation + i as f32 / sides as f32 * TAU) * radius)
        .collect()
}

/// Star with `points` tips alternating between the outer and inner radius
pub fn star(center: Vec2, outer: f32, inner: f32, points: u32, rotation: f32) -> Vec<Vec2> {
    let points = points.max(2);
    let step = PI / points as f32;
    (0..points * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            center + direction(rotation - FRAC_PI_2 + i as f32 * step) * radius
        })
        .collect()
}

/// Rhombus with its long axis along `rotation`
pub fn diamond(center: Vec2, size: f32, rotation: f32) -> Vec<Vec2> {
    let long = direction(rotation) * size;
    let short = direction(rotation + FRAC_PI_2) * size * 0.6;
    vec![center + long, center + short, center - long, center - short]
}

/// Player ship: nose up, swept wings
pub fn ship(center: Vec2, radius: f32) -> Vec<Vec2> {
    vec![
        center + Vec2::new(0.0, -radius),
        center + Vec2::new(radius * 0.8, radius * 0.8),
        center + Vec2::new(0.0, radius * 0.4),
        center + Vec2::new(-radius * 0.8, radius * 0.8),
    ]
}

/// Short streak behind a moving point
pub fn streak(pos: Vec2, vel: Vec2, length: f32) -> [Vec2; 2] {
    [pos, pos - vel.normalize_or_zero() * length]
}

/// Rectangle spanning `length` from `origin` along `angle`, `width` across
pub fn beam(origin: Vec2, angle: f32, length: f32, width: f32) -> Vec<Vec2> {
    let axis = direction(angle) * length;
    let half = direction(angle + FRAC_PI_2) * width / 2.0;
    vec![
        origin + half,
        origin + axis + half,
        origin + axis - half,
        origin - half,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_alternates_radius() {
        let pts = star(Vec2::ZERO, 10.0, 4.0, 5, 0.0);
        assert_eq!(pts.len(), 10);
        assert!((pts[0].length() - 10.0).abs() < 1e-4);
        assert!((pts[1].length() - 4.0).abs() < 1e-4);
        // First tip points straight up
        assert!(pts[0].y < -9.99);
    }

    #[test]
    fn test_polygon_has_min_three_sides() {
        assert_eq!(polygon(Vec2::ZERO, 5.0, 1, 0.0).len(), 3);
        assert_eq!(polygon(Vec2::ZERO, 5.0, 6, 0.0).len(), 6);
    }

    #[test]
    fn test_beam_corners() {
        let pts = beam(Vec2::ZERO, 0.0, 100.0, 10.0);
        assert!((pts[1] - Vec2::new(100.0, 5.0)).length() < 1e-4);
        assert!((pts[3] - Vec2::new(0.0, -5.0)).length() < 1e-4);
    }
}
