/// Fixed-function render state consumed at draw time.
///
/// Defaults mirror classic GL startup state: white current color, +z current
/// normal, lighting off, a single light behind the viewer, and a dim bluish
/// ambient term. Mutated only through `GlContext` setters; no validation, no
/// failure modes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RenderState {
    pub color: [f32; 4],
    /// Current normal, w = 0. Copied into every recorded vertex.
    pub normal: [f32; 4],
    pub lighting: bool,
    pub light0: bool,
    pub light0_position: [f32; 4],
    pub light0_color: [f32; 4],
    pub ambient: [f32; 4],
    pub material_diffuse: f32,
    pub material_specular: f32,
    pub material_shininess: f32,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            normal: [0.0, 0.0, 1.0, 0.0],
            lighting: false,
            light0: false,
            light0_position: [0.0, 0.0, -1.0, 1.0],
            light0_color: [1.0, 1.0, 1.0, 1.0],
            ambient: [0.2, 0.2, 0.3, 1.0],
            material_diffuse: 1.0,
            material_specular: 0.6,
            material_shininess: 20.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_defaults() {
        let s = RenderState::default();
        assert_eq!(s.color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(s.normal, [0.0, 0.0, 1.0, 0.0]);
        assert!(!s.lighting);
        assert!(!s.light0);
        assert_eq!(s.material_shininess, 20.0);
    }
}
