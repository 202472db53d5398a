//! Sphere placements in the scene.

use glam::Vec3;
use orrery_gl::{GlContext, GlError, RenderTarget};

use crate::constants::{Bounds, Color};

/// Smallest sphere that can be placed.
pub const MINIMUM_PLACEMENT_SCALE: f32 = 0.1;

/// The placement and sizing of a sphere in the scene.
#[derive(Debug, Clone)]
pub struct Sphere {
    pub color: Color,
    pub position: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(color: Color, position: Vec3) -> Self {
        Self {
            color,
            position,
            radius: MINIMUM_PLACEMENT_SCALE,
        }
    }

    /// Resizes the sphere, clamped so it stays within the scene bounds.
    pub fn resize(&mut self, scale: f32, bounds: &Bounds) {
        let scale = scale
            .max(MINIMUM_PLACEMENT_SCALE)
            .min(bounds.right - self.position.x)
            .min(bounds.top - self.position.y)
            .min(self.position.x - bounds.left)
            .min(self.position.y - bounds.bottom);
        self.radius = scale;
    }

    /// Relocates the sphere, clamped so it stays within the scene bounds.
    pub fn move_to(&mut self, position: Vec3, bounds: &Bounds) {
        let x = position
            .x
            .max(bounds.left + self.radius)
            .min(bounds.right - self.radius);
        let y = position
            .y
            .max(bounds.bottom + self.radius)
            .min(bounds.top - self.radius);
        self.position = Vec3::new(x, y, position.z);
    }

    /// Whether `query` falls within the sphere's footprint.
    pub fn includes(&self, query: Vec3) -> bool {
        self.position.distance_squared(query) < self.radius * self.radius
    }

    /// Draws the sphere shaded, with an optional wireframe highlight drawn
    /// unlit on top.
    pub fn draw(
        &self,
        gl: &mut GlContext,
        target: &mut RenderTarget<'_>,
        highlight: Option<Color>,
    ) -> Result<(), GlError> {
        gl.push_matrix();
        gl.translate(self.position.x, self.position.y, self.position.z);
        gl.scale(self.radius, self.radius, self.radius);

        gl.set_lighting(true);
        gl.set_light0_enabled(true);
        gl.color(self.color[0], self.color[1], self.color[2]);
        gl.draw("sphere", target)?;
        gl.set_light0_enabled(false);
        gl.set_lighting(false);

        if let Some([r, g, b]) = highlight {
            gl.color(r, g, b);
            gl.draw("sphere-wireframe", target)?;
        }

        gl.pop_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SCENE_BOUNDS;

    #[test]
    fn new_sphere_has_minimum_radius() {
        let s = Sphere::new([0.9, 0.9, 0.9], Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(s.radius, MINIMUM_PLACEMENT_SCALE);
    }

    #[test]
    fn resize_clamps_to_bounds() {
        let mut s = Sphere::new([0.5, 0.5, 0.5], Vec3::new(0.5, 1.0, 0.0));
        s.resize(10.0, &SCENE_BOUNDS);
        // Nearest wall is x = 1.0, half a unit away.
        assert!((s.radius - 0.5).abs() < 1e-6);
    }

    #[test]
    fn resize_never_shrinks_below_minimum() {
        let mut s = Sphere::new([0.5, 0.5, 0.5], Vec3::new(0.0, 1.0, 0.0));
        s.resize(0.0, &SCENE_BOUNDS);
        assert_eq!(s.radius, MINIMUM_PLACEMENT_SCALE);
    }

    #[test]
    fn move_to_keeps_sphere_inside_bounds() {
        let mut s = Sphere::new([0.5, 0.5, 0.5], Vec3::new(0.0, 1.0, 0.0));
        s.move_to(Vec3::new(5.0, -5.0, 0.0), &SCENE_BOUNDS);
        assert!((s.position.x - (SCENE_BOUNDS.right - s.radius)).abs() < 1e-6);
        assert!((s.position.y - (SCENE_BOUNDS.bottom + s.radius)).abs() < 1e-6);
    }

    #[test]
    fn includes_uses_footprint_radius() {
        let s = Sphere::new([0.5, 0.5, 0.5], Vec3::new(0.0, 1.0, 0.0));
        assert!(s.includes(Vec3::new(0.05, 1.0, 0.0)));
        assert!(!s.includes(Vec3::new(0.2, 1.0, 0.0)));
    }
}
