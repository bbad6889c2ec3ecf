//! Mockup viewer
//!
//! One mounted preview: owns the print raster, the decoded artwork, the scene,
//! the camera and (once a GPU is attached) the renderer. The host passes
//! `ViewerProps` in on every update and receives edited settings back over a
//! channel; the host's settings stay canonical.

use crossbeam_channel::Sender;
use std::time::Instant;

use crate::artwork::{ArtworkAsset, ArtworkLoader, ArtworkSource, ArtworkWatcher, LoadResult};
use crate::compositor::{composite, CompositeOutcome, PrintSurfaceRaster};
use crate::config::ViewerConfig;
use crate::interaction::{InteractionController, InteractionMode, PointerEvent, PointerResponse, QuickAction};
use crate::scene::{MockupRenderer, MugDimensions, OrbitCamera, RenderLoop, SceneModel};
use crate::settings::AdjustmentSettings;

/// Artwork loading state shown over the preview
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// No artwork requested yet
    #[default]
    Idle,
    Loading,
    Ready,
    /// Decode failed; the last good raster stays visible
    LoadFailed { reason: String },
}

impl LoadStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadStatus::Loading)
    }
}

/// Inputs supplied by the host on every update
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewerProps {
    /// Path, `file://` URI or `data:` URI of the artwork
    pub artwork_url: String,
    /// Current adjustments; defaults are used when absent
    pub settings: Option<AdjustmentSettings>,
    /// Whether the operator may move the artwork
    pub editable: bool,
}

/// An interactive mug preview bound to one host
pub struct MockupViewer {
    config: ViewerConfig,
    props: ViewerProps,
    settings: AdjustmentSettings,
    settings_tx: Option<Sender<AdjustmentSettings>>,

    raster: PrintSurfaceRaster,
    artwork: Option<ArtworkAsset>,
    loader: ArtworkLoader,
    pending_generation: Option<u64>,
    watcher: Option<ArtworkWatcher>,
    status: LoadStatus,

    scene: SceneModel,
    camera: OrbitCamera,
    interaction: InteractionController,
    render_loop: RenderLoop,
    renderer: Option<MockupRenderer>,
    mounted: bool,
}

impl MockupViewer {
    /// Create the viewer and start decoding the artwork
    ///
    /// Edited settings are sent on `settings_tx`; without a channel the viewer
    /// adopts its own edits.
    pub fn mount(config: ViewerConfig, props: ViewerProps, settings_tx: Option<Sender<AdjustmentSettings>>) -> Self {
        let mut config = config;
        config.sanitize();

        let settings = props.settings.clone().unwrap_or_default();
        let raster = PrintSurfaceRaster::new(config.raster_width, config.raster_height);
        let scene = SceneModel::new(MugDimensions::default(), settings.surface_color);
        let interaction = InteractionController::new(props.editable, config.drag_sensitivity)
            .with_cover_scale(config.fit_cover_scale);

        let mut camera = OrbitCamera::new();
        camera.set_auto_rotate_speed(config.auto_rotate_speed);
        camera.set_auto_rotate(!props.editable);

        tracing::info!(
            raster_width = raster.width(),
            raster_height = raster.height(),
            editable = props.editable,
            "Mounting mockup viewer"
        );

        let mut viewer = Self {
            config,
            props: props.clone(),
            settings,
            settings_tx,
            raster,
            artwork: None,
            loader: ArtworkLoader::new(),
            pending_generation: None,
            watcher: None,
            status: LoadStatus::Idle,
            scene,
            camera,
            interaction,
            render_loop: RenderLoop::new(),
            renderer: None,
            mounted: true,
        };
        viewer.request_artwork();
        viewer
    }

    /// Apply new host props
    pub fn update(&mut self, props: ViewerProps) {
        if !self.mounted || props == self.props {
            return;
        }

        let url_changed = props.artwork_url != self.props.artwork_url;
        let editable_changed = props.editable != self.props.editable;
        let settings = props.settings.clone().unwrap_or_default();
        self.props = props;

        if editable_changed {
            self.interaction.set_editable(self.props.editable);
            self.camera.set_auto_rotate(!self.props.editable);
            self.camera.set_enabled(self.interaction.camera_controls_enabled());
        }

        if url_changed {
            self.request_artwork();
        }

        self.apply_settings(settings);
    }

    fn apply_settings(&mut self, settings: AdjustmentSettings) {
        if settings == self.settings {
            return;
        }
        self.scene.set_surface_color(settings.surface_color);
        self.settings = settings;
        self.recomposite();
    }

    fn recomposite(&mut self) {
        let outcome = composite(&mut self.raster, self.artwork.as_ref(), &self.settings);
        if outcome != CompositeOutcome::Painted {
            tracing::debug!(?outcome, "Print raster not repainted");
        }
    }

    fn request_artwork(&mut self) {
        let url = self.props.artwork_url.clone();
        self.pending_generation = Some(self.loader.request(&url));
        self.status = LoadStatus::Loading;
        self.watch_artwork(&url);
    }

    fn watch_artwork(&mut self, url: &str) {
        if !self.config.watch_artwork {
            return;
        }
        let path = ArtworkSource::parse(url).ok().and_then(|source| source.path().map(|p| p.to_path_buf()));
        if self.watcher.as_ref().map(|w| w.path().to_path_buf()) == path {
            return;
        }

        self.watcher = path.and_then(|path| match ArtworkWatcher::new(&path) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::warn!("Cannot watch artwork {}: {}", path.display(), e);
                None
            }
        });
    }

    /// Collect finished decodes and on-disk artwork changes
    pub fn poll(&mut self) {
        if !self.mounted {
            return;
        }

        while let Some(result) = self.loader.poll() {
            self.accept_load_result(result);
        }

        let changed = self.watcher.as_mut().is_some_and(|w| w.poll());
        if changed {
            let url = self.props.artwork_url.clone();
            self.pending_generation = Some(self.loader.request(&url));
            if self.artwork.is_none() {
                self.status = LoadStatus::Loading;
            }
        }
    }

    fn accept_load_result(&mut self, result: LoadResult) {
        if !self.mounted || Some(result.generation) != self.pending_generation {
            tracing::debug!(generation = result.generation, "Dropping superseded artwork decode");
            return;
        }
        self.pending_generation = None;

        match result.result {
            Ok(asset) => {
                tracing::info!(
                    width = asset.width(),
                    height = asset.height(),
                    url = %result.url,
                    "Artwork loaded"
                );
                self.artwork = Some(asset);
                self.status = LoadStatus::Ready;
                self.recomposite();
            }
            Err(e) => {
                tracing::warn!(url = %result.url, "Artwork failed to load: {}", e);
                self.status = LoadStatus::LoadFailed { reason: e.to_string() };
            }
        }
    }

    /// Decode the current artwork URL again
    pub fn retry_artwork(&mut self) {
        if !self.mounted {
            return;
        }
        let url = self.props.artwork_url.clone();
        self.pending_generation = Some(self.loader.request(&url));
        self.status = LoadStatus::Loading;
    }

    /// Route a pointer event to the camera or to an artwork edit
    pub fn handle_pointer(&mut self, event: PointerEvent, viewport_height: f32) -> PointerResponse {
        if !self.mounted {
            return PointerResponse::Ignored;
        }
        let response = self.interaction.handle_pointer(event, &self.settings);
        match &response {
            PointerResponse::Orbit { dx, dy } => self.camera.on_drag(*dx, *dy, viewport_height),
            PointerResponse::Reposition(settings) => self.emit(settings.clone()),
            PointerResponse::Ignored => {}
        }
        response
    }

    /// Wheel zoom; available in every mode
    pub fn on_scroll(&mut self, delta: f32) {
        self.camera.on_scroll(delta);
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.interaction.set_mode(mode);
        self.camera.set_enabled(self.interaction.camera_controls_enabled());
    }

    pub fn quick_action(&mut self, action: QuickAction) {
        if let Some(settings) = self.interaction.quick_action(action, &self.settings) {
            tracing::debug!(?action, "Quick action");
            self.emit(settings);
        }
    }

    /// Edit from the adjustment panel; ignored while read-only
    pub fn edit(&mut self, settings: AdjustmentSettings) {
        if self.interaction.is_editable() && settings != self.settings {
            self.emit(settings);
        }
    }

    fn emit(&mut self, settings: AdjustmentSettings) {
        if !self.mounted || !self.interaction.is_editable() {
            return;
        }
        match &self.settings_tx {
            Some(tx) => {
                if tx.send(settings).is_err() {
                    tracing::warn!("Settings receiver dropped; edit discarded");
                }
            }
            None => self.apply_settings(settings),
        }
    }

    pub fn reset_camera(&mut self) {
        self.camera.reset();
    }

    /// Advance one frame; returns false once the viewer has been unmounted
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(dt) = self.render_loop.tick(now) else {
            return false;
        };
        self.poll();
        self.camera.update(dt);
        true
    }

    /// Create GPU resources for this viewer
    pub fn attach_renderer(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if !self.mounted {
            return;
        }
        if let Some(mut old) = self.renderer.take() {
            old.dispose();
        }
        self.renderer = Some(MockupRenderer::new(
            device,
            queue,
            &self.scene,
            (self.raster.width(), self.raster.height()),
            self.config.shadow_map_size,
            self.config.background_color,
        ));
        // Fresh texture needs the current pixels
        self.raster.mark_dirty();
    }

    /// Size the output texture; returns true when it was recreated
    pub fn ensure_render_target(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        let Some(renderer) = self.renderer.as_mut() else {
            return false;
        };
        let recreated = renderer.ensure_render_target(device, width, height);
        self.camera.set_aspect(renderer.aspect());
        recreated
    }

    /// Record this frame's draw into the output texture
    pub fn render_frame(&mut self, encoder: &mut wgpu::CommandEncoder, device: &wgpu::Device, queue: &wgpu::Queue) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(encoder, device, queue, &self.camera, &self.scene, &mut self.raster);
        }
    }

    pub fn renderer(&self) -> Option<&MockupRenderer> {
        self.renderer.as_ref()
    }

    /// Stop rendering and release GPU resources; later results are ignored
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.render_loop.cancel();
        self.pending_generation = None;
        self.watcher = None;
        self.settings_tx = None;
        if let Some(mut renderer) = self.renderer.take() {
            renderer.dispose();
        }
        tracing::info!("Mockup viewer unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn props(&self) -> &ViewerProps {
        &self.props
    }

    pub fn settings(&self) -> &AdjustmentSettings {
        &self.settings
    }

    pub fn mode(&self) -> InteractionMode {
        self.interaction.mode()
    }

    pub fn is_editable(&self) -> bool {
        self.interaction.is_editable()
    }

    pub fn is_pointer_down(&self) -> bool {
        self.interaction.is_pointer_down()
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn scene(&self) -> &SceneModel {
        &self.scene
    }

    pub fn raster(&self) -> &PrintSurfaceRaster {
        &self.raster
    }

    pub fn artwork(&self) -> Option<&ArtworkAsset> {
        self.artwork.as_ref()
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }
}

impl Drop for MockupViewer {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::path::PathBuf;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn test_config() -> ViewerConfig {
        ViewerConfig {
            raster_width: 200,
            raster_height: 100,
            watch_artwork: false,
            ..ViewerConfig::default()
        }
    }

    fn write_png(name: &str, width: u32, height: u32) -> PathBuf {
        let path = std::env::temp_dir().join(format!("mug_mockup_viewer_{}_{}.png", name, std::process::id()));
        RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]))
            .save(&path)
            .unwrap();
        path
    }

    fn props(url: &str, editable: bool) -> ViewerProps {
        ViewerProps {
            artwork_url: url.to_string(),
            settings: None,
            editable,
        }
    }

    fn finish_load(viewer: &mut MockupViewer) {
        let result = viewer.loader.wait(TIMEOUT).expect("decode timed out");
        viewer.accept_load_result(result);
    }

    #[test]
    fn test_read_only_never_emits() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut viewer = MockupViewer::mount(test_config(), props("missing.png", false), Some(tx));
        assert!(viewer.camera().auto_rotate());

        viewer.set_mode(InteractionMode::Reposition);
        viewer.handle_pointer(PointerEvent::Down, 600.0);
        for _ in 0..20 {
            viewer.handle_pointer(PointerEvent::Move { dx: 15.0, dy: -8.0 }, 600.0);
        }
        viewer.handle_pointer(PointerEvent::Up, 600.0);
        for action in QuickAction::ALL {
            viewer.quick_action(action);
        }
        viewer.edit(AdjustmentSettings {
            scale: 2.0,
            ..Default::default()
        });
        viewer.update(props("other.png", false));
        for _ in 0..2 {
            if let Some(result) = viewer.loader.wait(TIMEOUT) {
                viewer.accept_load_result(result);
            }
        }

        assert!(rx.try_recv().is_err());
        assert_eq!(viewer.settings(), &AdjustmentSettings::default());
    }

    #[test]
    fn test_reposition_drag_goes_to_host() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut viewer = MockupViewer::mount(test_config(), props("missing.png", true), Some(tx));
        viewer.set_mode(InteractionMode::Reposition);
        assert!(!viewer.camera().is_enabled());

        viewer.handle_pointer(PointerEvent::Down, 600.0);
        viewer.handle_pointer(PointerEvent::Move { dx: 50.0, dy: 0.0 }, 600.0);

        let sent = rx.try_recv().unwrap();
        assert!((sent.offset_x - 0.1).abs() < 1e-6);
        // Canonical state only changes when the host echoes it back.
        assert_eq!(viewer.settings().offset_x, 0.0);

        viewer.update(ViewerProps {
            settings: Some(sent.clone()),
            ..viewer.props().clone()
        });
        assert_eq!(viewer.settings(), &sent);
    }

    #[test]
    fn test_decode_triggers_composite() {
        let path = write_png("decode", 40, 40);
        let mut viewer = MockupViewer::mount(test_config(), props(path.to_str().unwrap(), true), None);
        assert!(viewer.status().is_loading());
        let generation = viewer.raster().generation();

        finish_load(&mut viewer);
        assert_eq!(viewer.status(), &LoadStatus::Ready);
        assert!(viewer.raster().generation() > generation);
        // Square artwork is centered: the raster center is painted.
        assert_eq!(viewer.raster().pixel(100, 50)[3], 255);
        assert_eq!(viewer.raster().pixel(2, 50)[3], 0);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_load_failure_keeps_raster() {
        let path = write_png("keep", 40, 40);
        let mut viewer = MockupViewer::mount(test_config(), props(path.to_str().unwrap(), true), None);
        finish_load(&mut viewer);
        let before = viewer.raster().as_bytes().to_vec();

        viewer.update(props("/nonexistent/artwork.png", true));
        finish_load(&mut viewer);

        assert!(matches!(viewer.status(), LoadStatus::LoadFailed { .. }));
        assert_eq!(viewer.raster().as_bytes(), &before[..]);
        assert!(viewer.artwork().is_some());

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_superseded_decode_is_dropped() {
        let first = write_png("first", 80, 20);
        let second = write_png("second", 20, 80);
        let mut viewer = MockupViewer::mount(test_config(), props(first.to_str().unwrap(), true), None);
        viewer.update(props(second.to_str().unwrap(), true));

        for _ in 0..2 {
            finish_load(&mut viewer);
        }
        assert_eq!(viewer.artwork().unwrap().width(), 20);
        assert_eq!(viewer.status(), &LoadStatus::Ready);

        let _ = std::fs::remove_file(first);
        let _ = std::fs::remove_file(second);
    }

    #[test]
    fn test_settings_change_recolors_and_recomposites() {
        let path = write_png("recolor", 40, 40);
        let mut viewer = MockupViewer::mount(test_config(), props(path.to_str().unwrap(), true), None);
        finish_load(&mut viewer);
        let generation = viewer.raster().generation();

        let settings = AdjustmentSettings {
            surface_color: "#2f4f4f".parse().unwrap(),
            offset_x: 0.25,
            ..Default::default()
        };
        viewer.update(ViewerProps {
            settings: Some(settings.clone()),
            ..viewer.props().clone()
        });

        assert_eq!(viewer.scene().surface_color(), settings.surface_color);
        assert!(viewer.raster().generation() > generation);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_unmount_stops_everything() {
        let path = write_png("unmount", 10, 10);
        let mut viewer = MockupViewer::mount(test_config(), props(path.to_str().unwrap(), true), None);
        assert!(viewer.tick(Instant::now()));

        viewer.unmount();
        assert!(!viewer.is_mounted());
        assert!(!viewer.tick(Instant::now()));

        // A decode landing after unmount changes nothing.
        let generation = viewer.raster().generation();
        if let Some(result) = viewer.loader.wait(TIMEOUT) {
            viewer.accept_load_result(result);
        }
        assert!(viewer.artwork().is_none());
        assert_eq!(viewer.raster().generation(), generation);

        viewer.unmount();
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_retry_after_failure() {
        let path = std::env::temp_dir().join(format!("mug_mockup_viewer_retry_{}.png", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let mut viewer = MockupViewer::mount(test_config(), props(path.to_str().unwrap(), true), None);
        finish_load(&mut viewer);
        assert!(matches!(viewer.status(), LoadStatus::LoadFailed { .. }));

        RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255])).save(&path).unwrap();
        viewer.retry_artwork();
        assert!(viewer.status().is_loading());
        finish_load(&mut viewer);
        assert_eq!(viewer.status(), &LoadStatus::Ready);

        let _ = std::fs::remove_file(path);
    }
}
