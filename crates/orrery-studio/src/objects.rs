//! The object library: named recordings the editor draws by name.

use std::f32::consts::PI;

use orrery_gl::{GlContext, GlError, RecordOpts, Topology};

/// Records every object the editor draws. Called once at startup.
pub fn build_object_library(gl: &mut GlContext) -> Result<(), GlError> {
    make_square(gl)?;
    make_sphere(gl)?;
    make_sphere_wireframe(gl)?;
    make_path(gl)?;
    Ok(())
}

/// A unit square in the z=0 plane, as two triangles.
fn make_square(gl: &mut GlContext) -> Result<(), GlError> {
    gl.begin(Topology::Triangles, "square", RecordOpts::default())?;
    gl.vertex(-1.0, -1.0, 0.0)?;
    gl.vertex(1.0, -1.0, 0.0)?;
    gl.vertex(1.0, 1.0, 0.0)?;
    gl.vertex(-1.0, -1.0, 0.0)?;
    gl.vertex(1.0, 1.0, 0.0)?;
    gl.vertex(-1.0, 1.0, 0.0)?;
    gl.end()
}

/// A unit sphere tessellated into latitude bands of triangles.
fn make_sphere(gl: &mut GlContext) -> Result<(), GlError> {
    let num_sides = 24;
    let dangle = PI / num_sides as f32;
    gl.begin(Topology::Triangles, "sphere", RecordOpts::default())?;
    for i in 1..num_sides {
        let band0 = (i - 1) as f32 * dangle;
        let band1 = i as f32 * dangle;
        let r0 = band0.sin();
        let r1 = band1.sin();
        for j in 1..=num_sides * 2 {
            let a0 = (j - 1) as f32 * dangle;
            let a1 = j as f32 * dangle;
            gl.vertex(r0 * a0.cos(), r0 * a0.sin(), band0.cos())?;
            gl.vertex(r0 * a1.cos(), r0 * a1.sin(), band0.cos())?;
            gl.vertex(r1 * a1.cos(), r1 * a1.sin(), band1.cos())?;

            gl.vertex(r0 * a0.cos(), r0 * a0.sin(), band0.cos())?;
            gl.vertex(r1 * a1.cos(), r1 * a1.sin(), band1.cos())?;
            gl.vertex(r1 * a0.cos(), r1 * a0.sin(), band1.cos())?;
        }
    }
    gl.end()
}

/// Line-segment wireframe of the unit sphere, used to highlight selection.
fn make_sphere_wireframe(gl: &mut GlContext) -> Result<(), GlError> {
    let num_sides = 24;
    let dangle = PI / num_sides as f32;
    gl.begin(Topology::Lines, "sphere-wireframe", RecordOpts::default())?;
    for i in 1..num_sides {
        let band0 = (i - 1) as f32 * dangle;
        let band1 = i as f32 * dangle;
        let r0 = band0.cos();
        let r1 = band1.cos();
        for j in 1..=num_sides * 2 {
            let a0 = (j - 1) as f32 * dangle;
            let a1 = j as f32 * dangle;
            gl.vertex(r0 * a0.cos(), r0 * a0.sin(), band0.sin())?;
            gl.vertex(r0 * a1.cos(), r0 * a1.sin(), band0.sin())?;
            gl.vertex(r1 * a1.cos(), r1 * a1.sin(), band1.sin())?;
            gl.vertex(r1 * a0.cos(), r1 * a0.sin(), band1.sin())?;
        }
    }
    gl.end()
}

/// An octagonal tube along +z, drawn as line segments. Curve segments are
/// rendered by scaling this to the segment length.
fn make_path(gl: &mut GlContext) -> Result<(), GlError> {
    let num_sides = 8;
    let dangle = 2.0 * PI / num_sides as f32;
    gl.begin(Topology::Lines, "path", RecordOpts::default())?;
    let mut angle: f32 = 0.0;
    for _ in 0..num_sides {
        let next = angle + dangle;
        gl.vertex(angle.cos(), angle.sin(), 0.0)?;
        gl.vertex(angle.cos(), angle.sin(), 1.0)?;

        gl.vertex(angle.cos(), angle.sin(), 0.0)?;
        gl.vertex(next.cos(), next.sin(), 0.0)?;

        gl.vertex(angle.cos(), angle.sin(), 1.0)?;
        gl.vertex(next.cos(), next.sin(), 1.0)?;
        angle = next;
    }
    gl.end()
}
