//! Product editor host
//!
//! Plays the role of the page embedding the viewer: owns the canonical
//! adjustment settings, adopts the edits the viewer sends back and persists
//! them to a JSON sidecar file.

use crossbeam_channel::{Receiver, Sender};
use std::path::{Path, PathBuf};

use crate::config::ConfigError;
use crate::settings::AdjustmentSettings;
use crate::viewer::ViewerProps;

/// Canonical settings owner for one artwork
pub struct EditorHost {
    artwork_url: String,
    settings: AdjustmentSettings,
    editable: bool,
    sidecar: Option<PathBuf>,
    sender: Sender<AdjustmentSettings>,
    receiver: Receiver<AdjustmentSettings>,
    unsaved: bool,
}

impl EditorHost {
    pub fn new(artwork_url: impl Into<String>, settings: AdjustmentSettings, editable: bool) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            artwork_url: artwork_url.into(),
            settings,
            editable,
            sidecar: None,
            sender,
            receiver,
            unsaved: false,
        }
    }

    /// Host backed by a settings file; a missing or unreadable file gives defaults
    pub fn with_sidecar(artwork_url: impl Into<String>, sidecar: &Path, editable: bool) -> Self {
        let settings = if sidecar.exists() {
            match AdjustmentSettings::load_json(sidecar) {
                Ok(settings) => {
                    tracing::info!("Loaded settings from {}", sidecar.display());
                    settings
                }
                Err(e) => {
                    tracing::warn!("Failed to load settings from {}: {}", sidecar.display(), e);
                    AdjustmentSettings::default()
                }
            }
        } else {
            AdjustmentSettings::default()
        };

        Self {
            sidecar: Some(sidecar.to_path_buf()),
            ..Self::new(artwork_url, settings, editable)
        }
    }

    /// Channel end to hand to the viewer
    pub fn sender(&self) -> Sender<AdjustmentSettings> {
        self.sender.clone()
    }

    /// Adopt edits sent by the viewer; returns true if settings changed
    pub fn pump(&mut self) -> bool {
        let mut latest = None;
        while let Ok(settings) = self.receiver.try_recv() {
            latest = Some(settings);
        }

        match latest {
            Some(settings) if settings != self.settings => {
                self.settings = settings;
                self.unsaved = true;
                true
            }
            _ => false,
        }
    }

    /// Props for this frame's viewer update
    pub fn props(&self) -> ViewerProps {
        ViewerProps {
            artwork_url: self.artwork_url.clone(),
            settings: Some(self.settings.clone()),
            editable: self.editable,
        }
    }

    pub fn set_artwork_url(&mut self, url: impl Into<String>) {
        self.artwork_url = url.into();
        tracing::info!("Artwork switched to {}", self.artwork_url);
    }

    pub fn artwork_url(&self) -> &str {
        &self.artwork_url
    }

    pub fn settings(&self) -> &AdjustmentSettings {
        &self.settings
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Write the sidecar once a drag has finished; returns whether a file was written
    pub fn save_if_idle(&mut self, pointer_down: bool) -> Result<bool, ConfigError> {
        if !self.unsaved || pointer_down {
            return Ok(false);
        }
        self.save()
    }

    /// Write pending changes now
    pub fn save(&mut self) -> Result<bool, ConfigError> {
        let Some(path) = &self.sidecar else {
            self.unsaved = false;
            return Ok(false);
        };
        if !self.unsaved {
            return Ok(false);
        }
        self.settings.save_json(path)?;
        self.unsaved = false;
        tracing::debug!("Saved settings to {}", path.display());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_sidecar(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mug_mockup_host_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_pump_adopts_latest_edit() {
        let mut host = EditorHost::new("art.png", AdjustmentSettings::default(), true);
        let tx = host.sender();
        let base = AdjustmentSettings::default();
        tx.send(base.translated(0.1, 0.0)).unwrap();
        tx.send(base.translated(0.2, 0.0)).unwrap();

        assert!(host.pump());
        assert_eq!(host.settings().offset_x, 0.2);
        assert_eq!(host.props().settings, Some(host.settings().clone()));
        assert!(!host.pump());
    }

    #[test]
    fn test_sidecar_saved_after_drag_ends() {
        let path = temp_sidecar("save");
        let _ = std::fs::remove_file(&path);
        let mut host = EditorHost::with_sidecar("art.png", &path, true);
        host.sender().send(AdjustmentSettings::default().fit_cover(1.25)).unwrap();
        host.pump();

        assert!(!host.save_if_idle(true).unwrap());
        assert!(!path.exists());
        assert!(host.save_if_idle(false).unwrap());
        assert!(!host.has_unsaved_changes());

        let reloaded = EditorHost::with_sidecar("art.png", &path, true);
        assert_eq!(reloaded.settings().scale, 1.25);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_corrupt_sidecar_gives_defaults() {
        let path = temp_sidecar("corrupt");
        std::fs::write(&path, "{ not json").unwrap();
        let host = EditorHost::with_sidecar("art.png", &path, false);
        assert_eq!(host.settings(), &AdjustmentSettings::default());
        assert!(!host.props().editable);
        let _ = std::fs::remove_file(path);
    }
}
