//! The four fixed-function shader programs and their wgpu pipelines.
//!
//! Variant selection is a pure function of exactly two booleans: the render
//! state's lighting flag and whether the recording being drawn carries a
//! per-vertex color buffer. wgpu bakes the primitive topology into the
//! pipeline, so each variant holds one pipeline per hardware topology.

use std::borrow::Cow;

use bytemuck::{Pod, Zeroable};

use crate::device::DEPTH_FORMAT;
use crate::error::GlError;
use crate::record::Topology;

/// Which of the four fixed shader programs a draw call uses.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderVariant {
    /// Unlit, single uniform color.
    UniformColor,
    /// Unlit, per-vertex colors.
    VaryingColor,
    /// Phong-lit, single uniform material color.
    UniformMaterial,
    /// Phong-lit, per-vertex material colors.
    VaryingMaterial,
}

impl ShaderVariant {
    /// The exhaustive (lighting, has-color-buffer) → variant mapping.
    pub fn select(lighting: bool, has_colors: bool) -> Self {
        match (lighting, has_colors) {
            (false, false) => Self::UniformColor,
            (false, true) => Self::VaryingColor,
            (true, false) => Self::UniformMaterial,
            (true, true) => Self::VaryingMaterial,
        }
    }

    pub(crate) fn is_lit(self) -> bool {
        matches!(self, Self::UniformMaterial | Self::VaryingMaterial)
    }

    pub(crate) fn is_varying(self) -> bool {
        matches!(self, Self::VaryingColor | Self::VaryingMaterial)
    }

    fn label(self) -> &'static str {
        match self {
            Self::UniformColor => "uniform-color",
            Self::VaryingColor => "varying-color",
            Self::UniformMaterial => "uniform-material",
            Self::VaryingMaterial => "varying-material",
        }
    }
}

/// WGSL source text for the four shader variants, supplied by the host at
/// context creation. `default()` is the built-in set.
pub struct ShaderSources {
    pub uniform_color: Cow<'static, str>,
    pub varying_color: Cow<'static, str>,
    pub uniform_material: Cow<'static, str>,
    pub varying_material: Cow<'static, str>,
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self {
            uniform_color: include_str!("shaders/uniform_color.wgsl").into(),
            varying_color: include_str!("shaders/varying_color.wgsl").into(),
            uniform_material: include_str!("shaders/uniform_material.wgsl").into(),
            varying_material: include_str!("shaders/varying_material.wgsl").into(),
        }
    }
}

impl ShaderSources {
    fn for_variant(&self, variant: ShaderVariant) -> &str {
        match variant {
            ShaderVariant::UniformColor => &self.uniform_color,
            ShaderVariant::VaryingColor => &self.varying_color,
            ShaderVariant::UniformMaterial => &self.uniform_material,
            ShaderVariant::VaryingMaterial => &self.varying_material,
        }
    }
}

// ── uniform blocks ────────────────────────────────────────────────────────

/// Uniforms for the plain-color variants. The varying variant ignores
/// `color` but shares the layout so both use one bind group shape.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct ColorUniforms {
    pub projection: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
    pub color: [f32; 4],
}

/// Uniforms for the Phong-lit material variants.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct MaterialUniforms {
    pub projection: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
    pub ambient: [f32; 4],
    pub light0_position: [f32; 4],
    pub light0_color: [f32; 4],
    /// Ignored by the varying variant, which reads per-vertex colors.
    pub material_color: [f32; 4],
    /// x = diffuse, y = specular, z = shininess, w = light0 enabled (0/1).
    pub params: [f32; 4],
}

// ── vertex layouts ────────────────────────────────────────────────────────

// Positions, normals, and colors each live in their own tightly packed
// vec4 buffer, mirroring the begin/end recorder's attribute arrays.
const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x4];
const AUX1_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x4];
const AUX2_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x4];

fn vec4_buffer(attrs: &'static [wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: (std::mem::size_of::<f32>() * 4) as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: attrs,
    }
}

// ── pipelines ─────────────────────────────────────────────────────────────

/// One shader module's pipelines, one per hardware topology.
pub(crate) struct VariantPipelines {
    pub bind_group_layout: wgpu::BindGroupLayout,
    line_list: wgpu::RenderPipeline,
    triangle_list: wgpu::RenderPipeline,
    triangle_strip: wgpu::RenderPipeline,
}

impl VariantPipelines {
    pub fn for_topology(&self, topology: Topology) -> &wgpu::RenderPipeline {
        match topology.hardware() {
            wgpu::PrimitiveTopology::LineList => &self.line_list,
            wgpu::PrimitiveTopology::TriangleStrip => &self.triangle_strip,
            _ => &self.triangle_list,
        }
    }
}

/// The four compiled programs, built once at context creation and never
/// rebuilt.
pub(crate) struct PipelineSet {
    uniform_color: VariantPipelines,
    varying_color: VariantPipelines,
    uniform_material: VariantPipelines,
    varying_material: VariantPipelines,
}

impl PipelineSet {
    /// Compiles and links all four variants. Any validation failure is
    /// surfaced as `GlError::ShaderValidation` and is fatal to the host.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        sources: &ShaderSources,
    ) -> Result<Self, GlError> {
        let build = |variant: ShaderVariant| -> Result<VariantPipelines, GlError> {
            build_variant(device, surface_format, variant, sources.for_variant(variant))
        };
        Ok(Self {
            uniform_color: build(ShaderVariant::UniformColor)?,
            varying_color: build(ShaderVariant::VaryingColor)?,
            uniform_material: build(ShaderVariant::UniformMaterial)?,
            varying_material: build(ShaderVariant::VaryingMaterial)?,
        })
    }

    pub fn variant(&self, variant: ShaderVariant) -> &VariantPipelines {
        match variant {
            ShaderVariant::UniformColor => &self.uniform_color,
            ShaderVariant::VaryingColor => &self.varying_color,
            ShaderVariant::UniformMaterial => &self.uniform_material,
            ShaderVariant::VaryingMaterial => &self.varying_material,
        }
    }
}

fn build_variant(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    variant: ShaderVariant,
    source: &str,
) -> Result<VariantPipelines, GlError> {
    // Catch WGSL validation failures instead of letting wgpu's uncaptured
    // error handler abort with a less useful message.
    let error_scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(variant.label()),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    if let Some(err) = pollster::block_on(error_scope.pop()) {
        return Err(GlError::ShaderValidation {
            name: variant.label(),
            message: err.to_string(),
        });
    }

    let uniform_size = if variant.is_lit() {
        std::mem::size_of::<MaterialUniforms>()
    } else {
        std::mem::size_of::<ColorUniforms>()
    };

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(variant.label()),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: std::num::NonZeroU64::new(uniform_size as u64),
            },
            count: None,
        }],
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(variant.label()),
        bind_group_layouts: &[&bind_group_layout],
        immediate_size: 0,
    });

    // Vertex buffer slots: positions always, then normals for lit variants,
    // then per-vertex colors for varying variants.
    let mut buffers = vec![vec4_buffer(&POSITION_ATTRS)];
    if variant.is_lit() {
        buffers.push(vec4_buffer(&AUX1_ATTRS));
        if variant.is_varying() {
            buffers.push(vec4_buffer(&AUX2_ATTRS));
        }
    } else if variant.is_varying() {
        buffers.push(vec4_buffer(&AUX1_ATTRS));
    }

    let topologies = [
        wgpu::PrimitiveTopology::LineList,
        wgpu::PrimitiveTopology::TriangleList,
        wgpu::PrimitiveTopology::TriangleStrip,
    ];
    let [line_list, triangle_list, triangle_strip] = topologies.map(|topology| {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(variant.label()),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                // Near obscures far; equal depth redraws (legacy GL LEQUAL).
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    });

    Ok(VariantPipelines {
        bind_group_layout,
        line_list,
        triangle_list,
        triangle_strip,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_covers_all_four_cases() {
        assert_eq!(ShaderVariant::select(false, false), ShaderVariant::UniformColor);
        assert_eq!(ShaderVariant::select(false, true), ShaderVariant::VaryingColor);
        assert_eq!(ShaderVariant::select(true, false), ShaderVariant::UniformMaterial);
        assert_eq!(ShaderVariant::select(true, true), ShaderVariant::VaryingMaterial);
    }

    #[test]
    fn variant_flags_match_selection_inputs() {
        for lighting in [false, true] {
            for has_colors in [false, true] {
                let v = ShaderVariant::select(lighting, has_colors);
                assert_eq!(v.is_lit(), lighting);
                assert_eq!(v.is_varying(), has_colors);
            }
        }
    }

    #[test]
    fn uniform_blocks_are_std140_sized() {
        // mat4 + mat4 + vec4.
        assert_eq!(std::mem::size_of::<ColorUniforms>(), 144);
        // mat4 + mat4 + 5 × vec4.
        assert_eq!(std::mem::size_of::<MaterialUniforms>(), 208);
    }
}
