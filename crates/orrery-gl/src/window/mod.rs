//! Window + frame loop.
//!
//! Owns the `winit` EventLoop and Window, and wires them to the GPU layer
//! and the `GlContext`.

mod runtime;

pub use runtime::{App, Control, Runtime, RuntimeConfig};
