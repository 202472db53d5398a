//! The editor: scene state, mouse/keyboard interaction, and per-frame
//! drawing of the top-down scene view.
//!
//! Placement editing by mouse:
//!
//! * A click either selects a nearby sphere or places a new one from the
//!   palette. Dragging past a threshold radius resizes it until release.
//! * A quick click (no significant drag) instead enters placement mode,
//!   where the sphere follows the pointer; a later click drops it.
//! * Middle-click near a curve control point grabs it for dragging.

use glam::{Mat4, Vec3, Vec4};
use orrery_gl::window::{App, Control};
use orrery_gl::{GlContext, GlError, MatrixMode, RenderTarget};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{Key, NamedKey};

use crate::constants::{
    Color, EDITING_THRESHOLD, FLOOR_COLOR0, FLOOR_COLOR1, HEIGHT, LIGHT_START_POSITION, PALETTE,
    SCENE_BOUNDS, SPHERE_SELECT_COLOR, WIDTH,
};
use crate::curve::Curve;
use crate::objects::build_object_library;
use crate::sphere::Sphere;

const LIGHT_STEP: f32 = 0.05;

/// What the mouse is currently editing.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EditMode {
    Nothing,
    ControlPoint,
    /// A sphere was just selected or created by a click.
    Sphere,
    /// The selected sphere follows the pointer until dropped.
    SpherePosition,
    /// Dragging resizes the selected sphere.
    SphereSize,
}

impl EditMode {
    fn is_sphere(self) -> bool {
        matches!(
            self,
            EditMode::Sphere | EditMode::SpherePosition | EditMode::SphereSize
        )
    }
}

/// The scene's projection. Also used to map pointer positions back into
/// scene coordinates.
fn projection() -> Mat4 {
    Mat4::orthographic_rh(-1.0, 3.0, 0.0, 2.0, -10.0, 10.0)
}

/// Maps a pointer position in window pixels to scene coordinates through
/// the inverse projection.
fn mouse_to_scene(size: (u32, u32), cursor: (f64, f64)) -> Vec3 {
    let (w, h) = (size.0.max(1) as f64, size.1.max(1) as f64);
    let ndc = Vec4::new(
        (2.0 * cursor.0 / w - 1.0) as f32,
        (1.0 - 2.0 * cursor.1 / h) as f32,
        0.0,
        1.0,
    );
    let scene = projection().inverse() * ndc;
    Vec3::new(scene.x, scene.y, 0.0)
}

pub struct Editor {
    spheres: Vec<Sphere>,
    curve: Curve,
    edit_mode: EditMode,
    /// Index of the sphere being edited, if any.
    editing: Option<usize>,
    /// Index of the control point being dragged, if any.
    which_cp: Option<usize>,
    /// Color the next placed sphere will take.
    next_color: Color,
    /// When set, the mirror is the Bezier curve; otherwise the scene's
    /// first sphere acts as a spherical mirror.
    bezier_mirror: bool,
    light_position: Vec3,
    left_down: bool,
    middle_down: bool,
    cursor: (f64, f64),
    size: (u32, u32),
}

impl Editor {
    pub fn new() -> Self {
        Self {
            // The first sphere is the mirror; it can be edited but never
            // removed.
            spheres: vec![Sphere::new([0.9, 0.9, 0.9], Vec3::new(0.0, 1.0, 0.0))],
            curve: Curve::new([
                Vec3::new(-0.75, 0.2, 0.0),
                Vec3::new(-0.5, 0.75, 0.0),
                Vec3::new(0.5, 1.25, 0.0),
            ]),
            edit_mode: EditMode::Nothing,
            editing: None,
            which_cp: None,
            next_color: PALETTE[0].1,
            bezier_mirror: false,
            light_position: LIGHT_START_POSITION,
            left_down: false,
            middle_down: false,
            cursor: (0.0, 0.0),
            size: (WIDTH, HEIGHT),
        }
    }

    fn mouse(&self) -> Vec3 {
        mouse_to_scene(self.size, self.cursor)
    }

    /// Removes the sphere being edited. The mirror sphere at index 0 is
    /// never removed.
    fn remove_selected_sphere(&mut self) {
        if let Some(index) = self.editing
            && index >= 1
        {
            self.spheres.remove(index);
        }
        self.editing = None;
        self.edit_mode = EditMode::Nothing;
    }

    /// Picks the sphere under `click`, or places a new one there.
    fn select_or_create_sphere(&mut self, click: Vec3) -> usize {
        let mut selected = None;
        for (index, sphere) in self.spheres.iter().enumerate() {
            if sphere.includes(click) {
                selected = Some(index);
            }
        }
        selected.unwrap_or_else(|| {
            self.spheres.push(Sphere::new(self.next_color, click));
            self.spheres.len() - 1
        })
    }

    /// Drives the sphere-placement state machine from mouse activity.
    ///
    /// `down` is the left button state; `drag` distinguishes movement from
    /// a click/release at rest.
    fn handle_place_sphere(&mut self, mouse: Vec3, down: bool, drag: bool) {
        if down && !drag {
            // Just clicked the mouse button.
            match self.edit_mode {
                EditMode::Sphere | EditMode::SpherePosition => {
                    // Relocate, then deselect.
                    if let Some(index) = self.editing {
                        self.spheres[index].move_to(mouse, &SCENE_BOUNDS);
                    }
                    self.editing = None;
                    self.edit_mode = EditMode::Nothing;
                }
                EditMode::SphereSize => {
                    self.editing = None;
                    self.edit_mode = EditMode::Nothing;
                }
                EditMode::Nothing => {
                    self.editing = Some(self.select_or_create_sphere(mouse));
                    self.edit_mode = EditMode::Sphere;
                }
                EditMode::ControlPoint => {}
            }
        } else if !down && !drag {
            // Just released the mouse button.
            if self.edit_mode == EditMode::Sphere {
                // Haven't started resizing, so enter relocate mode.
                self.edit_mode = EditMode::SpherePosition;
            } else {
                // Done resizing, deselect.
                self.editing = None;
                self.edit_mode = EditMode::Nothing;
            }
        } else if down && drag {
            // Dragging with the button pressed.
            if self.edit_mode == EditMode::Sphere
                && let Some(index) = self.editing
            {
                let sphere = &self.spheres[index];
                let distance = sphere.position.distance(mouse);
                if distance > EDITING_THRESHOLD * sphere.radius {
                    self.edit_mode = EditMode::SphereSize;
                }
            }
            if self.edit_mode == EditMode::SphereSize
                && let Some(index) = self.editing
            {
                let distance = self.spheres[index].position.distance(mouse);
                self.spheres[index].resize(distance, &SCENE_BOUNDS);
            }
        } else if self.edit_mode == EditMode::SpherePosition
            && let Some(index) = self.editing
        {
            // Moving the mouse with the button released.
            self.spheres[index].move_to(mouse, &SCENE_BOUNDS);
        }
    }

    fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        let mouse = self.mouse();
        match (button, state) {
            (MouseButton::Left, ElementState::Pressed) => {
                self.left_down = true;
                self.handle_place_sphere(mouse, true, false);
            }
            (MouseButton::Left, ElementState::Released) => {
                self.left_down = false;
                if self.edit_mode.is_sphere() {
                    self.handle_place_sphere(mouse, false, false);
                }
            }
            (MouseButton::Middle, ElementState::Pressed) => {
                self.middle_down = true;
                if self.edit_mode == EditMode::Nothing
                    && let Some(which) = self.curve.choose_control_point(mouse)
                {
                    self.edit_mode = EditMode::ControlPoint;
                    self.which_cp = Some(which);
                    *self.curve.control_point_mut(which) = mouse;
                    self.curve.update();
                }
            }
            (MouseButton::Middle, ElementState::Released) => {
                self.middle_down = false;
                if self.edit_mode == EditMode::ControlPoint {
                    if let Some(which) = self.which_cp {
                        *self.curve.control_point_mut(which) = mouse;
                        self.curve.update();
                    }
                    self.which_cp = None;
                    self.edit_mode = EditMode::Nothing;
                }
            }
            _ => {}
        }
    }

    fn handle_cursor_moved(&mut self, x: f64, y: f64) {
        self.cursor = (x, y);
        let mouse = self.mouse();
        if self.edit_mode.is_sphere() {
            self.handle_place_sphere(mouse, self.left_down, true);
        } else if self.edit_mode == EditMode::ControlPoint
            && self.middle_down
            && let Some(which) = self.which_cp
        {
            *self.curve.control_point_mut(which) = mouse;
            self.curve.update();
        }
    }

    fn handle_key(&mut self, key: &str) {
        let lp = &mut self.light_position;
        match key {
            // Light movement, kept within the scene.
            "i" if lp.y < 2.0 - LIGHT_STEP => lp.y += LIGHT_STEP,
            "k" if lp.y > LIGHT_STEP => lp.y -= LIGHT_STEP,
            "j" if lp.x > -1.0 + LIGHT_STEP => lp.x -= LIGHT_STEP,
            "l" if lp.x < 1.0 - LIGHT_STEP => lp.x += LIGHT_STEP,
            "a" if lp.z < 2.0 - LIGHT_STEP => lp.z += LIGHT_STEP,
            "z" if lp.z > LIGHT_STEP => lp.z -= LIGHT_STEP,

            // Delete the selected sphere.
            "x" if self.edit_mode.is_sphere() => self.remove_selected_sphere(),

            // Swap between the spherical and Bezier mirror.
            "m" => self.bezier_mirror = !self.bezier_mirror,

            // Palette selection for the next placed sphere.
            "1" | "2" | "3" | "4" | "5" => {
                let (name, color) = PALETTE[key.parse::<usize>().unwrap_or(1) - 1];
                log::info!("next sphere color: {name}");
                self.next_color = color;
            }
            _ => {}
        }
    }

    fn draw_scene(
        &mut self,
        gl: &mut GlContext,
        target: &mut RenderTarget<'_>,
    ) -> Result<(), GlError> {
        gl.set_lighting(true);
        gl.set_light0_enabled(true);
        // The view looks down the scene's y axis, so y and z swap.
        let lp = self.light_position;
        gl.set_light0_position(Vec4::new(lp.x, lp.z, lp.y, 1.0));

        // Checkerboard floor.
        for r in 0..5 {
            for c in 0..5 {
                gl.push_matrix();
                gl.translate(-1.0 + r as f32 * 0.4 + 0.2, c as f32 * 0.4 + 0.2, 0.0);
                gl.scale(0.2, 0.2, 0.2);
                let [cr, cg, cb] = if (r + c) % 2 == 0 {
                    FLOOR_COLOR0
                } else {
                    FLOOR_COLOR1
                };
                gl.color(cr, cg, cb);
                gl.draw("square", target)?;
                gl.pop_matrix()?;
            }
        }

        // Spheres, with the selected one highlighted. The mirror sphere is
        // hidden while the Bezier curve is the mirror.
        for (index, sphere) in self.spheres.iter().enumerate() {
            if index == 0 && self.bezier_mirror {
                continue;
            }
            let highlight = (self.editing == Some(index)).then_some(SPHERE_SELECT_COLOR);
            sphere.draw(gl, target, highlight)?;
        }

        gl.set_light0_enabled(false);
        gl.set_lighting(false);

        if self.bezier_mirror {
            self.curve.draw(gl, target)?;
        }
        Ok(())
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl App for Editor {
    fn init(&mut self, gl: &mut GlContext) -> anyhow::Result<()> {
        build_object_library(gl)?;
        log::info!("object library recorded");
        Ok(())
    }

    fn on_event(&mut self, event: &WindowEvent) -> Control {
        match event {
            WindowEvent::Resized(new_size) => {
                self.size = (new_size.width, new_size.height);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_cursor_moved(position.x, position.y);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.handle_mouse_button(*button, *state);
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match &event.logical_key {
                    Key::Named(NamedKey::Escape) => return Control::Exit,
                    Key::Character(text) => self.handle_key(text.as_str()),
                    _ => {}
                }
            }
            _ => {}
        }
        Control::Continue
    }

    fn frame(&mut self, gl: &mut GlContext, target: &mut RenderTarget<'_>) -> anyhow::Result<()> {
        gl.set_clear_color(0.2, 0.2, 0.3, 1.0);
        gl.clear(target);

        let (w, h) = self.size;
        gl.set_matrix_mode(MatrixMode::Projection);
        gl.load_identity();
        gl.set_viewport(0.0, 0.0, w as f32, h as f32);
        gl.ortho(-1.0, 3.0, 0.0, 2.0, -10.0, 10.0);

        gl.set_matrix_mode(MatrixMode::ModelView);
        gl.load_identity();

        // The editor view draws in the left pane only; the right pane is
        // reserved for the mirrored rendering.
        if w > h {
            gl.set_scissor(0, 0, w - h, h);
        }
        self.draw_scene(gl, target)?;
        gl.disable_scissor();

        gl.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> Editor {
        Editor::new()
    }

    #[test]
    fn window_center_maps_to_scene_center() {
        let p = mouse_to_scene((1024, 512), (512.0, 256.0));
        assert!((p.x - 1.0).abs() < 1e-5);
        assert!((p.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn window_corner_maps_to_projection_corner() {
        let p = mouse_to_scene((1024, 512), (0.0, 0.0));
        assert!((p.x - -1.0).abs() < 1e-5);
        assert!((p.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn click_in_empty_space_creates_a_sphere() {
        let mut ed = editor();
        ed.handle_place_sphere(Vec3::new(0.5, 0.5, 0.0), true, false);
        assert_eq!(ed.spheres.len(), 2);
        assert_eq!(ed.edit_mode, EditMode::Sphere);
        assert_eq!(ed.editing, Some(1));
    }

    #[test]
    fn click_on_existing_sphere_selects_it() {
        let mut ed = editor();
        // The mirror sphere sits at (0, 1) with radius 0.1.
        ed.handle_place_sphere(Vec3::new(0.05, 1.0, 0.0), true, false);
        assert_eq!(ed.spheres.len(), 1);
        assert_eq!(ed.editing, Some(0));
    }

    #[test]
    fn quick_click_enters_placement_mode_and_second_click_drops() {
        let mut ed = editor();
        let spot = Vec3::new(0.5, 0.5, 0.0);
        ed.handle_place_sphere(spot, true, false);
        ed.handle_place_sphere(spot, false, false);
        assert_eq!(ed.edit_mode, EditMode::SpherePosition);

        let drop = Vec3::new(0.3, 0.8, 0.0);
        ed.handle_place_sphere(drop, true, false);
        assert_eq!(ed.edit_mode, EditMode::Nothing);
        assert_eq!(ed.editing, None);
        assert!((ed.spheres[1].position - drop).length() < 1e-6);
    }

    #[test]
    fn long_drag_switches_to_resizing() {
        let mut ed = editor();
        let spot = Vec3::new(0.0, 0.5, 0.0);
        ed.handle_place_sphere(spot, true, false);
        // Drag well past the threshold radius.
        ed.handle_place_sphere(Vec3::new(0.4, 0.5, 0.0), true, true);
        assert_eq!(ed.edit_mode, EditMode::SphereSize);
        assert!((ed.spheres[1].radius - 0.4).abs() < 1e-6);
        // Release ends the edit.
        ed.handle_place_sphere(Vec3::new(0.4, 0.5, 0.0), false, false);
        assert_eq!(ed.edit_mode, EditMode::Nothing);
    }

    #[test]
    fn short_drag_does_not_resize() {
        let mut ed = editor();
        let spot = Vec3::new(0.0, 0.5, 0.0);
        ed.handle_place_sphere(spot, true, false);
        ed.handle_place_sphere(Vec3::new(0.05, 0.5, 0.0), true, true);
        assert_eq!(ed.edit_mode, EditMode::Sphere);
    }

    #[test]
    fn delete_never_removes_the_mirror_sphere() {
        let mut ed = editor();
        ed.handle_place_sphere(Vec3::new(0.05, 1.0, 0.0), true, false);
        assert_eq!(ed.editing, Some(0));
        ed.handle_key("x");
        assert_eq!(ed.spheres.len(), 1);
        assert_eq!(ed.edit_mode, EditMode::Nothing);
    }

    #[test]
    fn delete_removes_a_placed_sphere() {
        let mut ed = editor();
        ed.handle_place_sphere(Vec3::new(0.5, 0.5, 0.0), true, false);
        assert_eq!(ed.spheres.len(), 2);
        ed.handle_key("x");
        assert_eq!(ed.spheres.len(), 1);
        assert_eq!(ed.editing, None);
    }

    #[test]
    fn light_keys_respect_scene_bounds() {
        let mut ed = editor();
        for _ in 0..100 {
            ed.handle_key("l");
        }
        assert!(ed.light_position.x < 1.0);
        for _ in 0..100 {
            ed.handle_key("k");
        }
        assert!(ed.light_position.y > 0.0);
    }

    #[test]
    fn palette_keys_change_the_next_color() {
        let mut ed = editor();
        ed.handle_key("3");
        assert_eq!(ed.next_color, PALETTE[2].1);
        ed.handle_place_sphere(Vec3::new(0.5, 0.5, 0.0), true, false);
        assert_eq!(ed.spheres[1].color, PALETTE[2].1);
    }

    #[test]
    fn mirror_toggle_flips_between_sphere_and_curve() {
        let mut ed = editor();
        assert!(!ed.bezier_mirror);
        ed.handle_key("m");
        assert!(ed.bezier_mirror);
        ed.handle_key("m");
        assert!(!ed.bezier_mirror);
    }
}
