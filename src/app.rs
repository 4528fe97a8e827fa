//! Window, GL context and imgui renderer around a `GuiState`.
//!
//! `App::frame` is the whole per-frame cadence of the player: feed the audio
//! output, tick the animation frame, then build and draw the UI from the
//! fresh snapshot. The swap interval is tied to the display refresh so
//! held-key and joystick rotation advance at a steady tick rate.
//! Shared by the binary and the headed GUI tests.

use std::num::NonZeroU32;

use glow::HasContext;
use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{ContextApi, ContextAttributesBuilder, PossiblyCurrentContext, Version};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use glutin_winit::DisplayBuilder;
use imgui_glow_renderer::AutoRenderer;
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use raw_window_handle::HasWindowHandle;
use thiserror::Error;
use tracing::{debug, warn};
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{Event, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::ui::{self, input::GuiAction, GuiState};

/// Matches the map background so resizes don't flash.
const CLEAR: [f32; 3] = [0.12, 0.12, 0.14];
const FONT_PX: f32 = 14.0;

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("window creation failed: {0}")]
    Window(String),
    #[error("GL setup failed: {0}")]
    Gl(String),
    #[error("UI renderer failed: {0}")]
    Renderer(String),
}

fn gl_err(e: impl std::fmt::Display) -> WindowError {
    WindowError::Gl(e.to_string())
}

/// What a window event amounted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppEvent {
    None,
    FrameDrawn,
    CloseRequested,
}

/// Surface and context for one window.
struct Gl {
    window: Window,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
}

impl Gl {
    fn open(event_loop: &ActiveEventLoop, size: LogicalSize<f32>) -> Result<(Self, Config), WindowError> {
        let attrs = WindowAttributes::default()
            .with_inner_size(size)
            .with_title("hexaphonic");
        let (window, config) = DisplayBuilder::new()
            .with_window_attributes(Some(attrs))
            .build(event_loop, ConfigTemplateBuilder::new(), |configs| {
                // Called with at least one config. Prefer multisampling for
                // smoother speaker rings.
                configs.max_by_key(|c| c.num_samples()).expect("empty GL config set")
            })
            .map_err(|e| WindowError::Window(e.to_string()))?;
        let window = window.ok_or_else(|| WindowError::Window("no window created".into()))?;

        let handle = window.window_handle().map_err(gl_err)?.as_raw();
        let display = config.display();
        let context_attrs = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(Some(handle));
        let context = unsafe { display.create_context(&config, &context_attrs) }.map_err(gl_err)?;

        let inner = window.inner_size();
        let surface_attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            handle,
            non_zero(inner.width),
            non_zero(inner.height),
        );
        let surface = unsafe { display.create_window_surface(&config, &surface_attrs) }.map_err(gl_err)?;
        let context = context.make_current(&surface).map_err(gl_err)?;

        if let Err(e) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN)) {
            warn!(error = %e, "vsync unavailable; frame rate is unpaced");
        }
        Ok((Self { window, surface, context }, config))
    }

    fn resize(&self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.surface
            .resize(&self.context, non_zero(size.width), non_zero(size.height));
    }
}

fn non_zero(v: u32) -> NonZeroU32 {
    NonZeroU32::new(v).unwrap_or(NonZeroU32::MIN)
}

pub struct App {
    gl: Gl,
    imgui: imgui::Context,
    platform: WinitPlatform,
    renderer: AutoRenderer,
    pub gui: GuiState,
}

impl App {
    /// Open a window around `gui`. Call from `resumed()` or test setup.
    pub fn open(
        event_loop: &ActiveEventLoop,
        width: f32,
        height: f32,
        gui: GuiState,
    ) -> Result<Self, WindowError> {
        let (gl, config) = Gl::open(event_loop, LogicalSize::new(width, height))?;

        let mut imgui = imgui::Context::create();
        imgui.set_ini_filename(None);
        imgui.style_mut().use_dark_colors();
        imgui.fonts().add_font(&[imgui::FontSource::DefaultFontData {
            config: Some(imgui::FontConfig {
                size_pixels: FONT_PX,
                ..Default::default()
            }),
        }]);

        let mut platform = WinitPlatform::new(&mut imgui);
        platform.attach_window(imgui.io_mut(), &gl.window, HiDpiMode::Default);

        let display = config.display();
        let gl_ctx = unsafe { glow::Context::from_loader_function_cstr(|s| display.get_proc_address(s)) };
        let renderer = AutoRenderer::new(gl_ctx, &mut imgui)
            .map_err(|e| WindowError::Renderer(e.to_string()))?;

        debug!(width, height, "window open");
        Ok(Self {
            gl,
            imgui,
            platform,
            renderer,
            gui,
        })
    }

    pub fn window(&self) -> &Window {
        &self.gl.window
    }

    /// Route one window event: imgui sees everything, resizes reach the
    /// surface, and a redraw runs a full frame.
    pub fn window_event(&mut self, window_id: WindowId, event: WindowEvent) -> Result<AppEvent, WindowError> {
        let forwarded: Event<()> = Event::WindowEvent {
            window_id,
            event: event.clone(),
        };
        self.platform
            .handle_event(self.imgui.io_mut(), &self.gl.window, &forwarded);

        match event {
            WindowEvent::CloseRequested => {
                self.gui.controller.stop();
                Ok(AppEvent::CloseRequested)
            }
            WindowEvent::Resized(size) => {
                self.gl.resize(size);
                Ok(AppEvent::None)
            }
            WindowEvent::RedrawRequested => {
                self.frame()?;
                Ok(AppEvent::FrameDrawn)
            }
            _ => Ok(AppEvent::None),
        }
    }

    /// One frame: pump audio, advance rotation, then draw the UI from the
    /// snapshot that produced.
    pub fn frame(&mut self) -> Result<(), WindowError> {
        self.gui.begin_frame();

        self.platform
            .prepare_frame(self.imgui.io_mut(), &self.gl.window)
            .map_err(|e| WindowError::Window(e.to_string()))?;
        let ui = self.imgui.new_frame();
        ui::build_ui(ui, &mut self.gui);
        self.platform.prepare_render(ui, &self.gl.window);
        let draw_data = self.imgui.render();

        unsafe {
            let gl = self.renderer.gl_context();
            gl.clear_color(CLEAR[0], CLEAR[1], CLEAR[2], 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT);
        }
        self.renderer
            .render(draw_data)
            .map_err(|e| WindowError::Renderer(e.to_string()))?;
        self.gl.surface.swap_buffers(&self.gl.context).map_err(gl_err)
    }

    /// Apply actions through the same path as keyboard and pointer input.
    pub fn inject_actions(&mut self, actions: &[GuiAction]) {
        ui::process_actions(&mut self.gui, actions);
    }

    /// Current framebuffer as top-down RGBA rows.
    pub fn capture_pixels(&self) -> (Vec<u8>, u32, u32) {
        let PhysicalSize { width, height } = self.gl.window.inner_size();
        let mut pixels = vec![0u8; width as usize * height as usize * 4];
        unsafe {
            self.renderer.gl_context().read_pixels(
                0,
                0,
                width as i32,
                height as i32,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelPackData::Slice(&mut pixels),
            );
        }
        flip_rows(&mut pixels, width as usize * 4);
        (pixels, width, height)
    }

    #[cfg(feature = "test-harness")]
    pub fn screenshot(&self, path: &std::path::Path) -> std::io::Result<()> {
        let (pixels, width, height) = self.capture_pixels();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let file = std::io::BufWriter::new(std::fs::File::create(path)?);
        let mut encoder = png::Encoder::new(file, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.write_header()?.write_image_data(&pixels)?;
        Ok(())
    }
}

/// GL reads bottom-up; swap rows in place.
fn flip_rows(pixels: &mut [u8], row_bytes: usize) {
    if row_bytes == 0 {
        return;
    }
    let rows = pixels.len() / row_bytes;
    let (top, bottom) = pixels.split_at_mut(rows / 2 * row_bytes);
    let bottom = &mut bottom[(rows % 2) * row_bytes..];
    for (upper, lower) in top
        .chunks_exact_mut(row_bytes)
        .zip(bottom.chunks_exact_mut(row_bytes).rev())
    {
        upper.swap_with_slice(lower);
    }
}
