//! hexaphonic - spatial cue player with a rotating listener.
//! Uses winit + glutin + glow + imgui-rs for the GUI.

use std::path::PathBuf;

use clap::Parser;
use hexaphonic::app::{App, AppEvent};
use hexaphonic::ui::GuiState;
use tracing::{error, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::WindowId;

#[derive(Parser)]
#[command(version, about = "Spatial cue player")]
struct Args {
    /// Show file to open at startup.
    show: Option<PathBuf>,
}

struct AppState {
    app: Option<App>,
    show: Option<PathBuf>,
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }

        let mut gui = GuiState::new();
        if let Some(path) = &self.show {
            match gui.controller.load_show(path) {
                Ok(()) => gui.status = format!("Loaded {}", path.display()),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not open show");
                    gui.status = format!("Load error: {e}");
                }
            }
        }
        match App::open(event_loop, 1100.0, 760.0, gui) {
            Ok(app) => self.app = Some(app),
            Err(e) => {
                error!(error = %e, "cannot open window");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(app) = &mut self.app else { return };
        match app.window_event(window_id, event) {
            Ok(AppEvent::CloseRequested) => event_loop.exit(),
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "frame failed");
                app.gui.controller.stop();
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Redraw continuously: every frame pumps audio and advances rotation.
        if let Some(app) = &self.app {
            app.window().request_redraw();
        }
    }
}

fn main() {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    let mut state = AppState {
        app: None,
        show: args.show,
    };
    event_loop.run_app(&mut state).expect("Event loop failed");
}
