//! Application state for the mockup window
//!
//! Holds the GPU context, egui, the mockup viewer and the editor host that
//! owns the canonical settings. Each redraw: adopt edits, update the viewer,
//! build the UI, render the mug into its texture, then draw egui on top.

use crossbeam_channel::{Receiver, Sender};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::config::ViewerConfig;
use crate::gpu_context::{GpuContext, WindowGpuContext};
use crate::host::EditorHost;
use crate::ui::widgets::to_color32;
use crate::ui::{free_egui_texture, register_egui_texture, EditorAction, EditorPanel, PreviewAction, PreviewPanel};
use crate::viewer::MockupViewer;

/// Image types offered by the open dialog
const ARTWORK_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp", "tif", "tiff"];

/// Helper function to render egui pass
fn render_egui_pass(
    renderer: &egui_wgpu::Renderer,
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    paint_jobs: &[egui::ClippedPrimitive],
    screen_descriptor: &egui_wgpu::ScreenDescriptor,
    clear: wgpu::Color,
) {
    let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("egui Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    renderer.render(&mut render_pass.forget_lifetime(), paint_jobs, screen_descriptor);
}

/// Artwork file dialog running on a background thread
struct ArtworkDialog {
    sender: Sender<Option<PathBuf>>,
    receiver: Receiver<Option<PathBuf>>,
    open: bool,
}

impl ArtworkDialog {
    fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            sender,
            receiver,
            open: false,
        }
    }

    fn spawn(&mut self) {
        if self.open {
            return;
        }
        self.open = true;
        let sender = self.sender.clone();
        std::thread::spawn(move || {
            let path = rfd::FileDialog::new()
                .set_title("Open Artwork")
                .add_filter("Images", ARTWORK_EXTENSIONS)
                .pick_file();
            let _ = sender.send(path);
        });
    }

    /// Picked path once the dialog closes
    fn poll(&mut self) -> Option<PathBuf> {
        let path = self.receiver.try_recv().ok()?;
        self.open = false;
        path
    }
}

/// Short label for the artwork URL shown in the editor panel
fn artwork_label(url: &str) -> String {
    if url.starts_with("data:") {
        return "Inline image".to_string();
    }
    let path = url.strip_prefix("file://").unwrap_or(url);
    std::path::Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Main application state
pub struct App {
    window: Arc<Window>,
    gpu: GpuContext,
    window_gpu: WindowGpuContext,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    viewer: MockupViewer,
    host: EditorHost,
    preview_panel: PreviewPanel,
    editor_panel: EditorPanel,
    artwork_dialog: ArtworkDialog,
    background: wgpu::Color,
}

impl App {
    /// Set up the GPU, egui and the viewer for `window`
    pub async fn new(window: Arc<Window>, config: ViewerConfig, host: EditorHost) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let (gpu, surface) = GpuContext::new(window.clone()).await?;
        let window_gpu = WindowGpuContext::new(&gpu, surface, size);

        let egui_ctx = egui::Context::default();
        egui_ctx.set_visuals(egui::Visuals::light());
        let mut style = (*egui_ctx.style()).clone();
        style.visuals.window_shadow = egui::epaint::Shadow::NONE;
        egui_ctx.set_style(style);

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let background = config.background_color.to_linear();
        let mut viewer = MockupViewer::mount(config, host.props(), Some(host.sender()));
        viewer.attach_renderer(&gpu.device, &gpu.queue);

        Ok(Self {
            window,
            gpu,
            window_gpu,
            egui_ctx,
            egui_state,
            viewer,
            host,
            preview_panel: PreviewPanel::new(),
            editor_panel: EditorPanel::new(),
            artwork_dialog: ArtworkDialog::new(),
            background: wgpu::Color {
                r: background[0] as f64,
                g: background[1] as f64,
                b: background[2] as f64,
                a: 1.0,
            },
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Forward a window event to egui; returns true if egui consumed it
    pub fn handle_window_event(&mut self, event: &winit::event::WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(&self.window, event);
        response.consumed
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.window_gpu.resize(&self.gpu, new_size);
    }

    /// Reconfigure the surface after it was lost
    pub fn reconfigure(&mut self) {
        self.window_gpu.reconfigure(&self.gpu);
    }

    /// Render one frame; returns false once the viewer has stopped
    pub fn render(&mut self) -> Result<bool, wgpu::SurfaceError> {
        self.host.pump();
        if let Some(path) = self.artwork_dialog.poll() {
            self.host.set_artwork_url(path.to_string_lossy());
        }
        self.viewer.update(self.host.props());

        if !self.viewer.tick(Instant::now()) {
            return Ok(false);
        }

        // Size the mockup texture before egui references it
        let pixels_per_point = self.window.scale_factor() as f32;
        let (width, height) = self.preview_panel.target_size(pixels_per_point);
        if self.viewer.ensure_render_target(&self.gpu.device, width, height) {
            if let Some(view) = self.viewer.renderer().and_then(|r| r.texture_view()) {
                register_egui_texture(
                    &mut self.window_gpu.egui_renderer,
                    &self.gpu.device,
                    view,
                    &mut self.preview_panel.texture_id,
                );
            }
        }

        let raw_input = self.egui_state.take_egui_input(&self.window);
        self.egui_ctx.begin_pass(raw_input);
        let (preview_actions, editor_actions) = self.build_ui();
        let full_output = self.egui_ctx.end_pass();

        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        self.handle_preview_actions(preview_actions);
        self.handle_editor_actions(editor_actions);

        if let Err(e) = self.host.save_if_idle(self.viewer.is_pointer_down()) {
            tracing::warn!("Failed to save settings: {}", e);
        }

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Mockup Frame Encoder"),
            });

        self.viewer
            .render_frame(&mut encoder, &self.gpu.device, &self.gpu.queue);

        // Update egui textures
        for (id, image_delta) in &full_output.textures_delta.set {
            self.window_gpu
                .egui_renderer
                .update_texture(&self.gpu.device, &self.gpu.queue, *id, image_delta);
        }

        let (surface_width, surface_height) = self.window_gpu.size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [surface_width, surface_height],
            pixels_per_point: full_output.pixels_per_point,
        };

        self.window_gpu.egui_renderer.update_buffers(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        let output = self.window_gpu.surface.get_current_texture()?;
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        render_egui_pass(
            &self.window_gpu.egui_renderer,
            &mut encoder,
            &surface_view,
            &paint_jobs,
            &screen_descriptor,
            self.background,
        );

        // Free egui textures
        for id in &full_output.textures_delta.free {
            self.window_gpu.egui_renderer.free_texture(id);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(true)
    }

    fn build_ui(&mut self) -> (Vec<PreviewAction>, Vec<EditorAction>) {
        let mut editor_actions = Vec::new();
        let mut preview_actions = Vec::new();

        if self.viewer.is_editable() {
            let label = artwork_label(self.host.artwork_url());
            egui::SidePanel::right("mockup_editor")
                .default_width(300.0)
                .resizable(false)
                .show(&self.egui_ctx, |ui| {
                    ui.add_space(8.0);
                    editor_actions = self.editor_panel.render(
                        ui,
                        self.viewer.settings(),
                        self.viewer.mode(),
                        &label,
                    );
                });
        }

        let fill = to_color32(self.viewer.config().background_color);
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(fill))
            .show(&self.egui_ctx, |ui| {
                preview_actions = self.preview_panel.render(
                    ui,
                    self.viewer.status(),
                    self.viewer.is_editable(),
                    self.viewer.mode(),
                );
            });

        (preview_actions, editor_actions)
    }

    fn handle_preview_actions(&mut self, actions: Vec<PreviewAction>) {
        for action in actions {
            match action {
                PreviewAction::Pointer { event, viewport_height } => {
                    self.viewer.handle_pointer(event, viewport_height);
                }
                PreviewAction::Scroll(steps) => self.viewer.on_scroll(steps),
                PreviewAction::RetryArtwork => self.viewer.retry_artwork(),
            }
        }
    }

    fn handle_editor_actions(&mut self, actions: Vec<EditorAction>) {
        for action in actions {
            match action {
                EditorAction::SetMode(mode) => self.viewer.set_mode(mode),
                EditorAction::QuickAction(quick) => self.viewer.quick_action(quick),
                EditorAction::Edit(settings) => self.viewer.edit(settings),
                EditorAction::ResetCamera => self.viewer.reset_camera(),
                EditorAction::OpenArtwork => self.artwork_dialog.spawn(),
            }
        }
    }

    /// Persist pending edits and release the viewer's GPU resources
    pub fn shutdown(&mut self) {
        if let Err(e) = self.host.save() {
            tracing::warn!("Failed to save settings on exit: {}", e);
        }
        free_egui_texture(&mut self.window_gpu.egui_renderer, &mut self.preview_panel.texture_id);
        self.viewer.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artwork_label() {
        assert_eq!(artwork_label("/tmp/designs/mug.png"), "mug.png");
        assert_eq!(artwork_label("file:///tmp/logo.jpg"), "logo.jpg");
        assert_eq!(artwork_label("data:image/png;base64,AAAA"), "Inline image");
    }

    #[test]
    fn test_dialog_poll_without_result() {
        let mut dialog = ArtworkDialog::new();
        assert!(dialog.poll().is_none());
        dialog.sender.send(None).unwrap();
        dialog.open = true;
        assert!(dialog.poll().is_none());
        assert!(!dialog.open);
    }
}
