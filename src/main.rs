//! Mug Mockup - Main Entry Point
//!
//! Opens a window previewing an artwork on a 3D mug. With `--editable` the
//! artwork can be dragged on the mug and adjusted from a side panel; edits are
//! written to the `--settings` JSON file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use mug_mockup::telemetry::{init_logging, LogConfig};
use mug_mockup::{App, EditorHost, ViewerConfig};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{WindowAttributes, WindowId};

const WINDOW_TITLE: &str = "Mug Mockup";

/// Interactive 3D mug mockup preview
#[derive(Debug, Parser)]
#[command(name = "mug-mockup", version, about)]
struct Cli {
    /// Artwork image: a path, a file:// URI or a data: URI
    artwork: String,

    /// JSON file holding the adjustment settings (created on first edit)
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Allow moving the artwork and editing its settings
    #[arg(long)]
    editable: bool,

    /// Viewer configuration XML (defaults to the platform config directory)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Default log filter when MUG_MOCKUP_LOG / RUST_LOG are unset
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// Also write logs to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

/// Application state machine
enum AppState {
    /// Waiting for the event loop to resume
    Uninitialized {
        config: ViewerConfig,
        host: Option<EditorHost>,
    },
    Running {
        app: App,
    },
    /// Startup failed or the window closed
    Stopped,
}

struct MockupApp {
    state: AppState,
}

impl MockupApp {
    fn new(config: ViewerConfig, host: EditorHost) -> Self {
        Self {
            state: AppState::Uninitialized {
                config,
                host: Some(host),
            },
        }
    }

    fn start(event_loop: &ActiveEventLoop, config: ViewerConfig, host: EditorHost) -> anyhow::Result<App> {
        let window_attributes = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(config.window_width, config.window_height));

        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("Failed to create window")?,
        );

        tracing::info!(
            "Window created: {}x{}",
            window.inner_size().width,
            window.inner_size().height
        );

        pollster::block_on(App::new(window, config, host)).context("Failed to initialize GPU")
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        if let AppState::Running { app } = &mut self.state {
            app.shutdown();
        }
        self.state = AppState::Stopped;
        event_loop.exit();
    }
}

impl ApplicationHandler for MockupApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let AppState::Uninitialized { config, host } = &mut self.state else {
            return;
        };
        let Some(host) = host.take() else {
            return;
        };

        match Self::start(event_loop, config.clone(), host) {
            Ok(app) => {
                tracing::info!("Mug Mockup ready");
                app.window().request_redraw();
                self.state = AppState::Running { app };
            }
            Err(e) => {
                tracing::error!("{:#}", e);
                self.state = AppState::Stopped;
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let AppState::Running { app } = &mut self.state else {
            return;
        };

        // Let egui handle the event first
        app.handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested, exiting...");
                self.stop(event_loop);
            }
            WindowEvent::Resized(new_size) => {
                app.resize(new_size);
            }
            WindowEvent::RedrawRequested => match app.render() {
                Ok(true) => {}
                Ok(false) => self.stop(event_loop),
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    app.reconfigure();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    tracing::error!("GPU out of memory, exiting");
                    self.stop(event_loop);
                }
                Err(e) => {
                    tracing::warn!("Surface error: {:?}", e);
                }
            },
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Damping and auto-rotation animate every frame
        if let AppState::Running { app } = &self.state {
            app.window().request_redraw();
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ViewerConfig> {
    match path {
        Some(path) => ViewerConfig::load_from_file(path)
            .with_context(|| format!("Failed to read config {}", path.display())),
        None => Ok(ViewerConfig::load()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig {
        file_path: cli.log_file.clone(),
        default_level: cli.log_level.clone(),
        ..LogConfig::default()
    };
    // Keep the guard alive for the program duration
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("Mug Mockup v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config.as_ref())?;
    let host = match &cli.settings {
        Some(path) => EditorHost::with_sidecar(cli.artwork.clone(), path, cli.editable),
        None => EditorHost::new(cli.artwork.clone(), Default::default(), cli.editable),
    };

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = MockupApp::new(config, host);
    event_loop.run_app(&mut app).context("Event loop error")?;

    Ok(())
}
