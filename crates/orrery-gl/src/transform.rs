use glam::{Mat4, Vec3, Vec4};

use crate::error::GlError;

/// Selects which of the two transform stacks subsequent stack and compose
/// operations act upon.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MatrixMode {
    Projection,
    ModelView,
}

impl MatrixMode {
    const ALL: [MatrixMode; 2] = [MatrixMode::Projection, MatrixMode::ModelView];

    fn index(self) -> usize {
        match self {
            MatrixMode::Projection => 0,
            MatrixMode::ModelView => 1,
        }
    }
}

/// One current matrix and one saved stack per matrix mode.
///
/// Compose operators right-multiply the active mode's current matrix, so the
/// most recently applied transform sits closest to the vertices — classic
/// fixed-function stack semantics. Projection builders target wgpu clip
/// space (depth 0..1, right-handed).
pub(crate) struct TransformStacks {
    mode: MatrixMode,
    current: [Mat4; 2],
    saved: [Vec<Mat4>; 2],
}

impl Default for TransformStacks {
    fn default() -> Self {
        Self {
            mode: MatrixMode::Projection,
            current: [Mat4::IDENTITY; 2],
            saved: [Vec::new(), Vec::new()],
        }
    }
}

impl TransformStacks {
    pub fn set_mode(&mut self, mode: MatrixMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> MatrixMode {
        self.mode
    }

    /// Read-only snapshot of a mode's current matrix.
    pub fn current(&self, mode: MatrixMode) -> Mat4 {
        self.current[mode.index()]
    }

    pub fn load_identity(&mut self) {
        self.current[self.mode.index()] = Mat4::IDENTITY;
    }

    /// Duplicates the current matrix onto the active mode's stack.
    pub fn push(&mut self) {
        let m = self.current[self.mode.index()];
        self.saved[self.mode.index()].push(m);
    }

    /// Restores the current matrix from the top of the active mode's stack.
    pub fn pop(&mut self) -> Result<(), GlError> {
        let top = self.saved[self.mode.index()]
            .pop()
            .ok_or(GlError::EmptyStackPop(self.mode))?;
        self.current[self.mode.index()] = top;
        Ok(())
    }

    /// Verifies both stacks are empty; a leftover entry means mismatched
    /// push/pop somewhere in the frame.
    pub fn check_balanced(&self) -> Result<(), GlError> {
        for mode in MatrixMode::ALL {
            let depth = self.saved[mode.index()].len();
            if depth > 0 {
                return Err(GlError::UnbalancedStack { mode, depth });
            }
        }
        Ok(())
    }

    fn compose(&mut self, m: Mat4) {
        let cur = &mut self.current[self.mode.index()];
        *cur = *cur * m;
    }

    pub fn translate(&mut self, tx: f32, ty: f32, tz: f32) {
        self.compose(Mat4::from_translation(Vec3::new(tx, ty, tz)));
    }

    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) {
        self.compose(Mat4::from_scale(Vec3::new(sx, sy, sz)));
    }

    /// Rotation about an arbitrary axis, angle in degrees. A degenerate axis
    /// leaves the matrix untouched (matching gl-matrix behavior).
    pub fn rotate(&mut self, angle_degrees: f32, axis: Vec3) {
        if axis.length_squared() <= f32::EPSILON {
            return;
        }
        self.compose(Mat4::from_axis_angle(
            axis.normalize(),
            angle_degrees.to_radians(),
        ));
    }

    pub fn ortho(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        self.compose(Mat4::orthographic_rh(left, right, bottom, top, near, far));
    }

    pub fn frustum(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        self.compose(frustum_rh(left, right, bottom, top, near, far));
    }

    /// Symmetric perspective projection, vertical field of view in degrees.
    pub fn perspective(&mut self, fovy_degrees: f32, aspect: f32, near: f32, far: f32) {
        self.compose(Mat4::perspective_rh(
            fovy_degrees.to_radians(),
            aspect,
            near,
            far,
        ));
    }

    pub fn look_at(&mut self, eye: Vec3, center: Vec3, up: Vec3) {
        self.compose(Mat4::look_at_rh(eye, center, up));
    }
}

/// Off-center perspective frustum mapping depth to 0..1 (glam has no
/// zero-to-one frustum constructor).
fn frustum_rh(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let two_n = 2.0 * near;
    let inv_w = 1.0 / (right - left);
    let inv_h = 1.0 / (top - bottom);
    let inv_d = 1.0 / (near - far);
    Mat4::from_cols(
        Vec4::new(two_n * inv_w, 0.0, 0.0, 0.0),
        Vec4::new(0.0, two_n * inv_h, 0.0, 0.0),
        Vec4::new(
            (right + left) * inv_w,
            (top + bottom) * inv_h,
            far * inv_d,
            -1.0,
        ),
        Vec4::new(0.0, 0.0, near * far * inv_d, 0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn balanced_push_pop_leaves_depth_zero() {
        let mut t = TransformStacks::default();
        t.set_mode(MatrixMode::Projection);
        t.push();
        t.push();
        t.pop().unwrap();
        t.pop().unwrap();
        t.set_mode(MatrixMode::ModelView);
        t.push();
        t.pop().unwrap();
        assert!(t.check_balanced().is_ok());
    }

    #[test]
    fn pop_of_empty_stack_fails() {
        let mut t = TransformStacks::default();
        t.set_mode(MatrixMode::Projection);
        t.push();
        t.pop().unwrap();
        assert!(matches!(
            t.pop(),
            Err(GlError::EmptyStackPop(MatrixMode::Projection))
        ));
    }

    #[test]
    fn unbalanced_push_detected_at_flush() {
        let mut t = TransformStacks::default();
        t.set_mode(MatrixMode::ModelView);
        t.push();
        let err = t.check_balanced().unwrap_err();
        assert!(matches!(
            err,
            GlError::UnbalancedStack {
                mode: MatrixMode::ModelView,
                depth: 1
            }
        ));
    }

    #[test]
    fn push_restores_matrix_on_pop() {
        let mut t = TransformStacks::default();
        t.set_mode(MatrixMode::ModelView);
        t.translate(1.0, 2.0, 3.0);
        let before = t.current(MatrixMode::ModelView);
        t.push();
        t.scale(5.0, 5.0, 5.0);
        assert_ne!(t.current(MatrixMode::ModelView), before);
        t.pop().unwrap();
        assert_eq!(t.current(MatrixMode::ModelView), before);
    }

    #[test]
    fn compose_right_multiplies() {
        // translate-then-scale must scale a point before translating it.
        let mut t = TransformStacks::default();
        t.set_mode(MatrixMode::ModelView);
        t.translate(10.0, 0.0, 0.0);
        t.scale(2.0, 2.0, 2.0);
        let p = t.current(MatrixMode::ModelView) * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert!((p.x - 12.0).abs() < 1e-6);
    }

    #[test]
    fn modes_are_independent() {
        let mut t = TransformStacks::default();
        t.set_mode(MatrixMode::Projection);
        t.ortho(-1.0, 3.0, 0.0, 2.0, -10.0, 10.0);
        assert_eq!(t.current(MatrixMode::ModelView), Mat4::IDENTITY);
        t.set_mode(MatrixMode::ModelView);
        t.translate(1.0, 0.0, 0.0);
        let proj = t.current(MatrixMode::Projection);
        assert_ne!(proj, Mat4::IDENTITY);
        assert_ne!(proj, t.current(MatrixMode::ModelView));
    }

    #[test]
    fn degenerate_rotation_axis_is_a_no_op() {
        let mut t = TransformStacks::default();
        t.set_mode(MatrixMode::ModelView);
        t.rotate(45.0, Vec3::ZERO);
        assert_eq!(t.current(MatrixMode::ModelView), Mat4::IDENTITY);
    }

    #[test]
    fn rotation_about_z() {
        let mut t = TransformStacks::default();
        t.set_mode(MatrixMode::ModelView);
        t.rotate(90.0, Vec3::Z);
        let p = t.current(MatrixMode::ModelView) * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert!(p.x.abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn ortho_maps_box_corners_to_clip_space() {
        let mut t = TransformStacks::default();
        t.set_mode(MatrixMode::Projection);
        t.ortho(-1.0, 3.0, 0.0, 2.0, -10.0, 10.0);
        let m = t.current(MatrixMode::Projection);
        let lo = m * Vec4::new(-1.0, 0.0, 10.0, 1.0);
        let hi = m * Vec4::new(3.0, 2.0, -10.0, 1.0);
        assert!((lo.x + 1.0).abs() < 1e-6 && (lo.y + 1.0).abs() < 1e-6);
        assert!((hi.x - 1.0).abs() < 1e-6 && (hi.y - 1.0).abs() < 1e-6);
        // wgpu depth range: near plane at 0, far plane at 1.
        assert!(lo.z.abs() < 1e-6);
        assert!((hi.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn frustum_matches_symmetric_perspective() {
        let near = 0.1;
        let far = 100.0;
        let fovy = 60.0f32;
        let aspect = 2.0;
        let half_h = near * (fovy / 2.0).to_radians().tan();
        let half_w = half_h * aspect;

        let mut a = TransformStacks::default();
        a.frustum(-half_w, half_w, -half_h, half_h, near, far);
        let mut b = TransformStacks::default();
        b.perspective(fovy, aspect, near, far);

        let ma = a.current(MatrixMode::Projection).to_cols_array();
        let mb = b.current(MatrixMode::Projection).to_cols_array();
        for (x, y) in ma.iter().zip(mb.iter()) {
            assert!((x - y).abs() < 1e-4, "{ma:?} vs {mb:?}");
        }
    }
}
