use glam::{Mat4, Vec3, Vec4};
use wgpu::util::DeviceExt;

use crate::error::GlError;
use crate::pipeline::{ColorUniforms, MaterialUniforms, PipelineSet, ShaderSources, ShaderVariant};
use crate::record::{RecordOpts, Recorder, Recording, RecordingBuffers, Session, Topology};
use crate::state::RenderState;
use crate::transform::{MatrixMode, TransformStacks};

/// Everything a draw call needs from the frame in flight.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub depth_view: &'a wgpu::TextureView,
}

/// The immediate-mode emulation context.
///
/// Owns all state the legacy protocol treats as process-wide: the per-mode
/// transform stacks, the fixed-function render state, the name → recording
/// table, and the four compiled shader variants. There is exactly one writer
/// by construction — the frame loop holds it mutably — so no locking.
///
/// Every contract violation surfaces as a [`GlError`], and hosts must treat
/// those as fatal; see the error type for the full catalog.
pub struct GlContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipelines: PipelineSet,

    transforms: TransformStacks,
    state: RenderState,
    recorder: Recorder,

    clear_color: wgpu::Color,
    clear_depth: f32,
    viewport: Option<[f32; 4]>,
    scissor: Option<[u32; 4]>,

    warned_derived_normals: bool,
}

impl GlContext {
    /// Builds the context: installs identity matrices and default render
    /// state, and compiles/links the four shader programs. A shader that
    /// fails validation makes the whole initialization fail.
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        sources: &ShaderSources,
    ) -> Result<Self, GlError> {
        let pipelines = PipelineSet::new(&device, surface_format, sources)?;
        log::info!("compiled 4 shader variants for {surface_format:?}");
        Ok(Self {
            device,
            queue,
            pipelines,
            transforms: TransformStacks::default(),
            state: RenderState::default(),
            recorder: Recorder::default(),
            clear_color: wgpu::Color::BLACK,
            clear_depth: 1.0,
            viewport: None,
            scissor: None,
            warned_derived_normals: false,
        })
    }

    // ── transform stack ───────────────────────────────────────────────────

    pub fn set_matrix_mode(&mut self, mode: MatrixMode) {
        self.transforms.set_mode(mode);
    }

    pub fn matrix_mode(&self) -> MatrixMode {
        self.transforms.mode()
    }

    pub fn load_identity(&mut self) {
        self.transforms.load_identity();
    }

    pub fn push_matrix(&mut self) {
        self.transforms.push();
    }

    pub fn pop_matrix(&mut self) -> Result<(), GlError> {
        self.transforms.pop()
    }

    pub fn translate(&mut self, tx: f32, ty: f32, tz: f32) {
        self.transforms.translate(tx, ty, tz);
    }

    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) {
        self.transforms.scale(sx, sy, sz);
    }

    pub fn rotate(&mut self, angle_degrees: f32, axis: Vec3) {
        self.transforms.rotate(angle_degrees, axis);
    }

    pub fn ortho(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        self.transforms.ortho(left, right, bottom, top, near, far);
    }

    pub fn frustum(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        self.transforms.frustum(left, right, bottom, top, near, far);
    }

    pub fn perspective(&mut self, fovy_degrees: f32, aspect: f32, near: f32, far: f32) {
        self.transforms.perspective(fovy_degrees, aspect, near, far);
    }

    pub fn look_at(&mut self, eye: Vec3, center: Vec3, up: Vec3) {
        self.transforms.look_at(eye, center, up);
    }

    /// Read-only snapshot of a mode's current matrix, e.g. for inverting the
    /// projection to map screen coordinates back into the scene.
    pub fn matrix(&self, mode: MatrixMode) -> Mat4 {
        self.transforms.current(mode)
    }

    /// End-of-frame check: both matrix stacks must be back to depth zero.
    pub fn flush(&self) -> Result<(), GlError> {
        self.transforms.check_balanced()
    }

    // ── render state ──────────────────────────────────────────────────────

    pub fn color(&mut self, r: f32, g: f32, b: f32) {
        self.state.color = [r, g, b, 1.0];
    }

    pub fn color_alpha(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.state.color = [r, g, b, a];
    }

    pub fn normal(&mut self, dx: f32, dy: f32, dz: f32) {
        self.state.normal = [dx, dy, dz, 0.0];
    }

    pub fn set_lighting(&mut self, enabled: bool) {
        self.state.lighting = enabled;
    }

    pub fn set_light0_enabled(&mut self, enabled: bool) {
        self.state.light0 = enabled;
    }

    pub fn set_light0(&mut self, position: Vec4, color: [f32; 4]) {
        self.state.light0_position = position.to_array();
        self.state.light0_color = color;
    }

    pub fn set_light0_position(&mut self, position: Vec4) {
        self.state.light0_position = position.to_array();
    }

    pub fn set_ambient(&mut self, color: [f32; 4]) {
        self.state.ambient = color;
    }

    pub fn set_material(&mut self, diffuse: f32, specular: f32, shininess: f32) {
        self.state.material_diffuse = diffuse;
        self.state.material_specular = specular;
        self.state.material_shininess = shininess;
    }

    // ── geometry recorder ─────────────────────────────────────────────────

    /// Opens a recording session under `name`. The recording replaces any
    /// prior one of the same name when sealed by [`end`](Self::end).
    pub fn begin(&mut self, topology: Topology, name: &str, opts: RecordOpts) -> Result<(), GlError> {
        if opts.compute_normals && !self.warned_derived_normals {
            // Derived normals were never implemented upstream; the flag is
            // accepted but normals are copied from the current normal.
            log::warn!("compute_normals requested for `{name}`: copying the current normal instead");
            self.warned_derived_normals = true;
        }
        self.recorder.begin(topology, name, opts)
    }

    /// Appends a vertex to the open recording, capturing the current normal
    /// and, if the session saves colors, the current color.
    pub fn vertex(&mut self, x: f32, y: f32, z: f32) -> Result<(), GlError> {
        self.recorder
            .push_vertex([x, y, z], self.state.normal, self.state.color)
    }

    pub fn vertex_v(&mut self, p: Vec3) -> Result<(), GlError> {
        self.vertex(p.x, p.y, p.z)
    }

    /// Whether a begin/end session is currently open.
    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Seals the open recording: uploads its attribute arrays to GPU buffers
    /// and installs it in the table, releasing any replaced entry's buffers.
    pub fn end(&mut self) -> Result<(), GlError> {
        let session = self.recorder.finish()?;
        let recording = self.upload(&session);
        log::debug!(
            "sealed recording `{}`: {} vertices, {:?}",
            session.name,
            recording.vertex_count,
            recording.topology
        );
        self.recorder.install(session.name, recording);
        Ok(())
    }

    fn upload(&self, session: &Session) -> Recording {
        let vertex_count = session.vertex_count();
        let buffer = |label: &str, data: &[[f32; 4]]| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(data),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        };

        let positions = buffer(&format!("{} positions", session.name), &session.positions);
        let normals = buffer(&format!("{} normals", session.name), &session.normals);
        let colors = session
            .save_colors
            .then(|| buffer(&format!("{} colors", session.name), &session.colors));

        // Triangle fans are not a hardware topology under wgpu, so expand
        // the fan into a triangle list through an index buffer.
        let fan_indices = (session.topology == Topology::TriangleFan && vertex_count >= 3)
            .then(|| {
                let indices: Vec<u32> = (1..vertex_count - 1)
                    .flat_map(|i| [0, i, i + 1])
                    .collect();
                let buf = self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{} fan indices", session.name)),
                        contents: bytemuck::cast_slice(&indices),
                        usage: wgpu::BufferUsages::INDEX,
                    });
                (buf, indices.len() as u32)
            });

        Recording {
            topology: session.topology,
            vertex_count,
            has_colors: session.save_colors,
            buffers: Some(RecordingBuffers {
                positions,
                normals,
                colors,
                fan_indices,
            }),
        }
    }

    // ── drawing ───────────────────────────────────────────────────────────

    /// Draws the named recording: selects the shader variant from the
    /// current lighting flag and the recording's color buffer, binds the
    /// transforms/light/material uniforms, and issues exactly one draw call.
    /// The recording itself is never mutated.
    pub fn draw(&mut self, name: &str, target: &mut RenderTarget<'_>) -> Result<(), GlError> {
        let recording = self.recorder.get(name)?;
        let Some(buffers) = &recording.buffers else {
            // Installed without buffers — possible only through internal
            // misuse, treat like a missing recording.
            return Err(GlError::UnknownRecording(name.to_owned()));
        };

        let variant = ShaderVariant::select(self.state.lighting, recording.has_colors);
        let uniforms = self.uniform_bytes(variant);
        let pipelines = self.pipelines.variant(variant);

        let uniform_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(name),
                contents: &uniforms,
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(name),
            layout: &pipelines.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(name),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if let Some([x, y, w, h]) = self.viewport {
            rpass.set_viewport(x, y, w, h, 0.0, 1.0);
        }
        if let Some([x, y, w, h]) = self.scissor {
            rpass.set_scissor_rect(x, y, w, h);
        }

        rpass.set_pipeline(pipelines.for_topology(recording.topology));
        rpass.set_bind_group(0, &bind_group, &[]);

        // Slot order matches the pipeline's vertex buffer declarations.
        rpass.set_vertex_buffer(0, buffers.positions.slice(..));
        let mut slot = 1;
        if variant.is_lit() {
            rpass.set_vertex_buffer(slot, buffers.normals.slice(..));
            slot += 1;
        }
        if variant.is_varying() {
            if let Some(colors) = &buffers.colors {
                rpass.set_vertex_buffer(slot, colors.slice(..));
            }
        }

        match &buffers.fan_indices {
            Some((indices, count)) => {
                rpass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..*count, 0, 0..1);
            }
            None => rpass.draw(0..recording.vertex_count, 0..1),
        }

        Ok(())
    }

    fn uniform_bytes(&self, variant: ShaderVariant) -> Vec<u8> {
        let projection = self.transforms.current(MatrixMode::Projection).to_cols_array_2d();
        let model_view = self.transforms.current(MatrixMode::ModelView).to_cols_array_2d();
        if variant.is_lit() {
            let s = &self.state;
            bytemuck::bytes_of(&MaterialUniforms {
                projection,
                model_view,
                ambient: s.ambient,
                light0_position: s.light0_position,
                light0_color: s.light0_color,
                material_color: s.color,
                params: [
                    s.material_diffuse,
                    s.material_specular,
                    s.material_shininess,
                    if s.light0 { 1.0 } else { 0.0 },
                ],
            })
            .to_vec()
        } else {
            bytemuck::bytes_of(&ColorUniforms {
                projection,
                model_view,
                color: self.state.color,
            })
            .to_vec()
        }
    }

    // ── pass-through rasterizer state ─────────────────────────────────────

    pub fn set_clear_color(&mut self, r: f64, g: f64, b: f64, a: f64) {
        self.clear_color = wgpu::Color { r, g, b, a };
    }

    pub fn set_clear_depth(&mut self, depth: f32) {
        self.clear_depth = depth;
    }

    /// Clears the color and depth attachments to the configured values.
    pub fn clear(&self, target: &mut RenderTarget<'_>) {
        // Pass dropped immediately; the clear is carried by the load ops.
        let _rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_depth),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
    }

    /// Restricts subsequent draws to a viewport, in physical pixels.
    pub fn set_viewport(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.viewport = Some([x, y, width, height]);
    }

    /// Restricts subsequent draws to a scissor rectangle, in physical
    /// pixels. Cleared with [`disable_scissor`](Self::disable_scissor).
    pub fn set_scissor(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.scissor = Some([x, y, width, height]);
    }

    pub fn disable_scissor(&mut self) {
        self.scissor = None;
    }

    /// The wgpu queue, for hosts that submit their own work alongside the
    /// emulation layer.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}
