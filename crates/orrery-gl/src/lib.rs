//! Immediate-mode rendering emulation on top of wgpu.
//!
//! This crate reproduces the classic begin/vertex/end geometry protocol,
//! per-mode transform stacks, and fixed-function lighting/material state as a
//! thin layer over wgpu buffers, pipelines, and render passes. Geometry is
//! specified once through a recording session and then drawn by name, one
//! draw call per invocation, with the shader variant picked from the
//! accumulated render state at draw time.

pub mod device;
pub mod logging;
pub mod window;

mod context;
mod error;
mod pipeline;
mod record;
mod state;
mod transform;

pub use context::{GlContext, RenderTarget};
pub use error::GlError;
pub use pipeline::{ShaderSources, ShaderVariant};
pub use record::{RecordOpts, Topology};
pub use transform::MatrixMode;
