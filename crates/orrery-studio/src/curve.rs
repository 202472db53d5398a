//! A quadratic Bezier curve with draggable control points.

use glam::Vec3;
use orrery_gl::{GlContext, GlError, RenderTarget};

use crate::constants::{CURVE_COLOR, POINT_COLOR};

/// Distance within which a click selects a control point.
pub const MAX_SELECT_DISTANCE: f32 = 0.2;

/// Subdivision tolerance; larger means a smoother polyline.
const SMOOTHNESS: f32 = 500.0;
const EPSILON: f32 = 1e-8;

/// A controllable quadratic Bezier curve.
///
/// Control points are edited through [`control_point_mut`]; callers must
/// then call [`update`] to invalidate the cached polyline. The polyline is
/// recompiled lazily on the next draw.
///
/// [`control_point_mut`]: Curve::control_point_mut
/// [`update`]: Curve::update
pub struct Curve {
    control_points: [Vec3; 3],
    /// Polyline samples approximating the curve.
    points: Vec<Vec3>,
    compiled: bool,
}

impl Curve {
    pub fn new(control_points: [Vec3; 3]) -> Self {
        Self {
            control_points,
            points: Vec::new(),
            compiled: false,
        }
    }

    pub fn control_point(&self, index: usize) -> Vec3 {
        self.control_points[index]
    }

    pub fn control_point_mut(&mut self, index: usize) -> &mut Vec3 {
        &mut self.control_points[index]
    }

    /// Invalidates the cached polyline after a control point moved.
    pub fn update(&mut self) {
        self.compiled = false;
    }

    /// Returns the index of the closest control point within selection
    /// range of `query`, or `None`.
    pub fn choose_control_point(&self, query: Vec3) -> Option<usize> {
        let mut which = None;
        let mut best = MAX_SELECT_DISTANCE * MAX_SELECT_DISTANCE;
        for (i, cp) in self.control_points.iter().enumerate() {
            let d2 = query.distance_squared(*cp);
            if d2 < best {
                which = Some(i);
                best = d2;
            }
        }
        which
    }

    /// Recompiles the polyline by adaptive subdivision. A (sub)curve is
    /// flat enough once the control polygon's length is within `1/SMOOTHNESS`
    /// of its chord.
    fn compile(&mut self) {
        if !self.compiled {
            let [p0, p1, p2] = self.control_points;
            self.points.clear();
            self.points.push(p0);
            subdivide(p0, p1, p2, &mut self.points);
            self.compiled = true;
        }
    }

    /// Draws the curve polyline and its control points. Recompiles the
    /// polyline first if a control point has moved.
    pub fn draw(&mut self, gl: &mut GlContext, target: &mut RenderTarget<'_>) -> Result<(), GlError> {
        self.compile();
        self.draw_curve(gl, target)?;
        self.draw_controls(gl, target)
    }

    /// Renders the polyline by sweeping the "path" tube along each segment.
    fn draw_curve(&self, gl: &mut GlContext, target: &mut RenderTarget<'_>) -> Result<(), GlError> {
        for pair in self.points.windows(2) {
            let (p0, p1) = (pair[0], pair[1]);
            let dir = p1 - p0;
            let len = dir.length();
            if len < EPSILON {
                continue;
            }
            let angle = dir.y.atan2(dir.x).to_degrees();

            gl.push_matrix();
            gl.translate(p0.x, p0.y, 1.5);
            gl.rotate(angle, Vec3::Z);
            gl.rotate(90.0, Vec3::Y);
            gl.scale(0.01, 0.01, len);
            gl.color(CURVE_COLOR[0], CURVE_COLOR[1], CURVE_COLOR[2]);
            gl.draw("path", target)?;
            gl.pop_matrix()?;
        }
        Ok(())
    }

    fn draw_controls(&self, gl: &mut GlContext, target: &mut RenderTarget<'_>) -> Result<(), GlError> {
        for cp in &self.control_points {
            gl.push_matrix();
            gl.translate(cp.x, cp.y, 1.9);
            gl.scale(0.02, 0.02, 0.02);
            gl.color(POINT_COLOR[0], POINT_COLOR[1], POINT_COLOR[2]);
            gl.draw("square", target)?;
            gl.pop_matrix()?;
        }
        Ok(())
    }
}

/// Appends polyline samples for the quadratic Bezier `(p0, p1, p2)`,
/// excluding `p0` itself (the caller seeds it).
fn subdivide(p0: Vec3, p1: Vec3, p2: Vec3, out: &mut Vec<Vec3>) {
    let chord = p2.distance(p0);
    let polygon = p1.distance(p0) + p2.distance(p1);
    if chord < EPSILON || polygon / chord <= 1.0 + 1.0 / SMOOTHNESS {
        out.push(p1);
        out.push(p2);
        return;
    }

    let p01 = p0.lerp(p1, 0.5);
    let p12 = p1.lerp(p2, 0.5);
    let p012 = p01.lerp(p12, 0.5);
    subdivide(p0, p01, p012, out);
    subdivide(p012, p12, p2, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> Curve {
        Curve::new([
            Vec3::new(-0.75, 0.2, 0.0),
            Vec3::new(-0.5, 0.75, 0.0),
            Vec3::new(0.5, 1.25, 0.0),
        ])
    }

    #[test]
    fn collinear_controls_compile_to_one_polyline_leg() {
        let mut c = Curve::new([
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.5, 0.5, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ]);
        c.compile();
        assert_eq!(c.points, vec![c.control_points[0], c.control_points[1], c.control_points[2]]);
    }

    #[test]
    fn bent_curve_subdivides() {
        let mut c = curve();
        c.compile();
        assert!(c.points.len() > 3);
        // Endpoints of the polyline are the curve endpoints.
        assert_eq!(*c.points.first().unwrap(), c.control_points[0]);
        assert_eq!(*c.points.last().unwrap(), c.control_points[2]);
    }

    #[test]
    fn polyline_points_lie_near_the_curve() {
        let mut c = curve();
        c.compile();
        let [p0, p1, p2] = c.control_points;
        for p in &c.points {
            // Nearest point on the exact curve, sampled densely.
            let nearest = (0..=1000)
                .map(|i| {
                    let t = i as f32 / 1000.0;
                    let a = p0.lerp(p1, t);
                    let b = p1.lerp(p2, t);
                    a.lerp(b, t).distance(*p)
                })
                .fold(f32::INFINITY, f32::min);
            assert!(nearest < 1e-3, "point {p:?} is {nearest} off the curve");
        }
    }

    #[test]
    fn update_triggers_recompile() {
        let mut c = curve();
        c.compile();
        let before = c.points.len();
        *c.control_point_mut(1) = Vec3::new(-0.5, 1.9, 0.0);
        c.update();
        c.compile();
        assert!(c.points.len() != before || c.points[1] != Vec3::new(-0.5, 0.75, 0.0));
    }

    #[test]
    fn choose_control_point_picks_closest_in_range() {
        let c = curve();
        assert_eq!(c.choose_control_point(Vec3::new(-0.7, 0.25, 0.0)), Some(0));
        assert_eq!(c.choose_control_point(Vec3::new(0.45, 1.2, 0.0)), Some(2));
        assert_eq!(c.choose_control_point(Vec3::new(2.0, 2.0, 0.0)), None);
    }
}
