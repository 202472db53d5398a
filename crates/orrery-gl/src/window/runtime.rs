use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

use crate::context::{GlContext, RenderTarget};
use crate::device::{Gpu, GpuConfig, SurfaceErrorAction};
use crate::pipeline::ShaderSources;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    /// Initial drawable size in physical pixels.
    pub width: u32,
    pub height: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "orrery".to_string(),
            width: 1024,
            height: 512,
        }
    }
}

/// Control directive returned by app event callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Control {
    Continue,
    Exit,
}

/// Application contract.
///
/// The runtime owns the window, GPU, and `GlContext`; the app gets them
/// handed in at fixed points. Errors returned from `init` or `frame` are
/// contract violations or lost devices — both fatal: the runtime logs them
/// and exits the loop.
pub trait App {
    /// Called once after the GPU context is ready, before the first frame.
    /// The object library's recordings are typically built here.
    fn init(&mut self, gl: &mut GlContext) -> Result<()>;

    /// Raw window events (mouse, keyboard, resize).
    fn on_event(&mut self, event: &WindowEvent) -> Control {
        let _ = event;
        Control::Continue
    }

    /// Called once per display refresh. All drawing happens here.
    fn frame(&mut self, gl: &mut GlContext, target: &mut RenderTarget<'_>) -> Result<()>;
}

/// Single-window frame-loop host.
pub struct Runtime;

impl Runtime {
    /// Runs the app until the window closes or a fatal error occurs.
    ///
    /// `sources` are the shader programs compiled at context creation;
    /// `ShaderSources::default()` is the built-in set.
    pub fn run<A: App + 'static>(
        config: RuntimeConfig,
        sources: ShaderSources,
        app: A,
    ) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut host = Host {
            config,
            sources,
            app,
            state: None,
        };
        event_loop
            .run_app(&mut host)
            .context("winit event loop terminated with error")?;
        Ok(())
    }
}

struct WindowState {
    window: Arc<Window>,
    gpu: Gpu,
    gl: GlContext,
}

struct Host<A: App> {
    config: RuntimeConfig,
    sources: ShaderSources,
    app: A,
    state: Option<WindowState>,
}

impl<A: App> Host<A> {
    fn bring_up(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let gpu = pollster::block_on(Gpu::new(window.clone(), GpuConfig::default()))
            .context("GPU initialization failed")?;
        let mut gl = GlContext::new(
            gpu.device().clone(),
            gpu.queue().clone(),
            gpu.surface_format(),
            &self.sources,
        )
        .context("shader program initialization failed")?;

        self.app.init(&mut gl).context("app initialization failed")?;

        window.request_redraw();
        self.state = Some(WindowState { window, gpu, gl });
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        let mut frame = match state.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                if state.gpu.handle_surface_error(err) == SurfaceErrorAction::Fatal {
                    log::error!("surface out of memory; exiting");
                    event_loop.exit();
                }
                return;
            }
        };

        // Target borrows the encoder; dropped before submit() takes the frame.
        {
            let mut target = RenderTarget {
                encoder: &mut frame.encoder,
                color_view: &frame.view,
                depth_view: &frame.depth_view,
            };
            if let Err(e) = self.app.frame(&mut state.gl, &mut target) {
                log::error!("fatal frame error: {e:#}");
                event_loop.exit();
                return;
            }
        }

        state.window.pre_present_notify();
        state.gpu.submit(frame);
    }
}

impl<A: App> ApplicationHandler for Host<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        if let Err(e) = self.bring_up(event_loop) {
            log::error!("failed to start: {e:#}");
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Continuous redraw; the editor is cheap to render.
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.app.on_event(&event) == Control::Exit {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(new_size) => {
                if let Some(state) = self.state.as_mut() {
                    state.gpu.resize(new_size);
                    state.window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}
