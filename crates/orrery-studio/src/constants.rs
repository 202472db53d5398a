//! Scene-wide constants: canvas geometry, palette, and editing thresholds.

use glam::Vec3;

/// Canvas size in pixels. The editor pane occupies the left
/// `WIDTH - HEIGHT` pixels; width must be double the height.
pub const WIDTH: u32 = 1024;
pub const HEIGHT: u32 = 512;

/// Axis-aligned bounds of the editable scene, in scene coordinates.
#[derive(Debug, Copy, Clone)]
pub struct Bounds {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

pub const SCENE_BOUNDS: Bounds = Bounds {
    left: -1.0,
    right: 1.0,
    bottom: 0.0,
    top: 2.0,
};

pub type Color = [f32; 3];

pub const SPHERE_SELECT_COLOR: Color = [0.95, 0.9, 0.5]; // Yellow.
pub const CURVE_COLOR: Color = [0.325, 0.575, 0.675]; // Chalk blue.
pub const POINT_COLOR: Color = [0.825, 0.475, 0.175]; // Chalk orange.
pub const FLOOR_COLOR0: Color = [0.125, 0.175, 0.25];
pub const FLOOR_COLOR1: Color = [0.125, 0.25, 0.175];

pub const LIGHT_START_POSITION: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Sphere material palette, selectable with the number keys.
pub const PALETTE: [(&str, Color); 5] = [
    ("adriatic", [0.125, 0.25, 0.375]),
    ("travertine", [0.6, 0.57, 0.52]),
    ("jade", [0.18, 0.38, 0.27]),
    ("amethyst", [0.4, 0.3, 0.5]),
    ("fireball", [0.55, 0.2, 0.22]),
];

/// Drag distance (relative to the sphere radius) before a click-and-drag
/// switches from selection to resizing.
pub const EDITING_THRESHOLD: f32 = 1.1;
