//! Background artwork decoding
//!
//! Each request gets a generation number. Results come back over a channel and
//! the viewer only accepts the one matching its latest request, so superseded
//! decodes (and decodes finishing after unmount) are harmless no-ops.

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::thread;

use super::{ArtworkAsset, ArtworkError, ArtworkSource};

/// Outcome of one decode request
#[derive(Debug)]
pub struct LoadResult {
    /// Generation handed out by `ArtworkLoader::request`
    pub generation: u64,
    /// URL the request was made for
    pub url: String,
    pub result: Result<ArtworkAsset, ArtworkError>,
}

/// Spawns decode workers and collects their results
pub struct ArtworkLoader {
    sender: Sender<LoadResult>,
    receiver: Receiver<LoadResult>,
    next_generation: u64,
}

impl Default for ArtworkLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtworkLoader {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            sender,
            receiver,
            next_generation: 1,
        }
    }

    /// Start decoding `url` on a worker thread
    ///
    /// Returns the generation number identifying this request.
    pub fn request(&mut self, url: &str) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;

        let sender = self.sender.clone();
        let url = url.to_string();
        tracing::debug!(generation, url = %url, "Requesting artwork decode");

        let spawned = thread::Builder::new()
            .name("artwork-decode".to_string())
            .spawn({
                let url = url.clone();
                let sender = sender.clone();
                move || {
                    let result = ArtworkSource::parse(&url).and_then(|source| source.decode());
                    // The receiver is gone after unmount; nothing left to notify.
                    let _ = sender.send(LoadResult {
                        generation,
                        url,
                        result,
                    });
                }
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn artwork decode thread: {}", e);
            let _ = sender.send(LoadResult {
                generation,
                url,
                result: Err(ArtworkError::Io(e)),
            });
        }

        generation
    }

    /// Next finished decode, if any (non-blocking)
    pub fn poll(&self) -> Option<LoadResult> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                tracing::error!("Artwork loader channel disconnected");
                None
            }
        }
    }

    /// Block until the next decode finishes (tests and headless use)
    pub fn wait(&self, timeout: std::time::Duration) -> Option<LoadResult> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Generation the next request will receive
    pub fn next_generation(&self) -> u64 {
        self.next_generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::time::Duration;

    #[test]
    fn test_generations_increase() {
        let mut loader = ArtworkLoader::new();
        let first = loader.request("/missing/a.png");
        let second = loader.request("/missing/b.png");
        assert!(second > first);
        assert_eq!(loader.next_generation(), second + 1);
    }

    #[test]
    fn test_failed_decode_reported() {
        let mut loader = ArtworkLoader::new();
        let generation = loader.request("https://example.com/art.png");
        let result = loader.wait(Duration::from_secs(5)).expect("decode result");
        assert_eq!(result.generation, generation);
        assert!(matches!(result.result, Err(ArtworkError::UnsupportedSource(_))));
    }

    #[test]
    fn test_decode_file() {
        let path = std::env::temp_dir().join(format!("mug_mockup_loader_{}.png", std::process::id()));
        RgbaImage::from_pixel(8, 4, Rgba([0, 128, 255, 255])).save(&path).unwrap();

        let mut loader = ArtworkLoader::new();
        let generation = loader.request(path.to_str().unwrap());
        let result = loader.wait(Duration::from_secs(5)).expect("decode result");
        let _ = std::fs::remove_file(&path);

        assert_eq!(result.generation, generation);
        let asset = result.result.unwrap();
        assert_eq!((asset.width(), asset.height()), (8, 4));
    }

    #[test]
    fn test_dropped_loader_is_harmless() {
        let mut loader = ArtworkLoader::new();
        loader.request("/missing/after-unmount.png");
        drop(loader);
        // The worker's send fails silently once the receiver is gone.
        std::thread::sleep(Duration::from_millis(20));
    }
}
