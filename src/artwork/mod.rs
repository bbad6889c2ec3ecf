//! Artwork sources and decoded artwork assets
//!
//! An artwork URL resolves to an `ArtworkSource`, which decodes into an
//! immutable `ArtworkAsset`. Decoding runs off the UI thread in
//! `ArtworkLoader`; `ArtworkWatcher` notices on-disk edits of file sources.

pub mod loader;
pub mod watcher;

pub use loader::{ArtworkLoader, LoadResult};
pub use watcher::ArtworkWatcher;

use base64::Engine;
use image::{DynamicImage, RgbaImage};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Artwork loading errors
#[derive(Debug, thiserror::Error)]
pub enum ArtworkError {
    #[error("failed to read artwork: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode artwork: {0}")]
    Decode(#[from] image::ImageError),
    #[error("artwork has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
    #[error("unsupported artwork source: {0}")]
    UnsupportedSource(String),
    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),
}

/// Where artwork pixels come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtworkSource {
    /// Image file on the local filesystem
    File(PathBuf),
    /// Inline `data:image/...;base64,` payload
    Inline { mime: String, bytes: Vec<u8> },
}

impl ArtworkSource {
    /// Resolve an artwork URL: a plain path, a `file://` URI or a base64 data URI
    pub fn parse(url: &str) -> Result<Self, ArtworkError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ArtworkError::UnsupportedSource("empty artwork URL".to_string()));
        }

        if let Some(rest) = url.strip_prefix("data:") {
            return Self::parse_data_uri(rest);
        }

        if let Some(path) = url.strip_prefix("file://") {
            return Ok(Self::File(PathBuf::from(path)));
        }

        if let Some((scheme, _)) = url.split_once("://") {
            return Err(ArtworkError::UnsupportedSource(format!("{}:// URLs", scheme)));
        }

        Ok(Self::File(PathBuf::from(url)))
    }

    fn parse_data_uri(rest: &str) -> Result<Self, ArtworkError> {
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| ArtworkError::InvalidDataUri("missing ',' separator".to_string()))?;
        let mime = meta
            .strip_suffix(";base64")
            .ok_or_else(|| ArtworkError::InvalidDataUri("only base64 payloads are supported".to_string()))?;
        if !mime.starts_with("image/") {
            return Err(ArtworkError::InvalidDataUri(format!("not an image type: {}", mime)));
        }
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ArtworkError::InvalidDataUri(e.to_string()))?;
        Ok(Self::Inline {
            mime: mime.to_string(),
            bytes,
        })
    }

    /// Filesystem path for file sources (used for change watching)
    pub fn path(&self) -> Option<&Path> {
        match self {
            ArtworkSource::File(path) => Some(path),
            ArtworkSource::Inline { .. } => None,
        }
    }

    /// Read and decode the artwork (blocking)
    pub fn decode(&self) -> Result<ArtworkAsset, ArtworkError> {
        let image = match self {
            ArtworkSource::File(path) => image::ImageReader::open(path)?
                .with_guessed_format()?
                .decode()?,
            ArtworkSource::Inline { bytes, .. } => image::load_from_memory(bytes)?,
        };
        ArtworkAsset::from_dynamic(image)
    }
}

/// A decoded artwork raster, shared immutably between loader and viewer
#[derive(Clone)]
pub struct ArtworkAsset {
    image: Arc<RgbaImage>,
}

impl ArtworkAsset {
    /// Wrap a decoded RGBA image; zero-sized images are rejected
    pub fn new(image: RgbaImage) -> Result<Self, ArtworkError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ArtworkError::Empty { width, height });
        }
        Ok(Self {
            image: Arc::new(image),
        })
    }

    pub fn from_dynamic(image: DynamicImage) -> Result<Self, ArtworkError> {
        Self::new(image.into_rgba8())
    }

    /// Natural width in pixels
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Natural height in pixels
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width() as f32 / self.height() as f32
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Bilinear sample at normalized coordinates, premultiplied RGBA in 0..=1
    ///
    /// Coordinates outside 0..=1 clamp to the edge texels.
    pub fn sample_premultiplied(&self, u: f32, v: f32) -> [f32; 4] {
        let (w, h) = (self.width(), self.height());
        let x = (u * w as f32 - 0.5).clamp(0.0, (w - 1) as f32);
        let y = (v * h as f32 - 0.5).clamp(0.0, (h - 1) as f32);

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(w - 1);
        let y1 = (y0 + 1).min(h - 1);
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        let texel = |tx: u32, ty: u32| -> [f32; 4] {
            let p = self.image.get_pixel(tx, ty).0;
            let a = p[3] as f32 / 255.0;
            [
                p[0] as f32 / 255.0 * a,
                p[1] as f32 / 255.0 * a,
                p[2] as f32 / 255.0 * a,
                a,
            ]
        };

        let c00 = texel(x0, y0);
        let c10 = texel(x1, y0);
        let c01 = texel(x0, y1);
        let c11 = texel(x1, y1);

        let mut out = [0.0; 4];
        for i in 0..4 {
            let top = c00[i] + (c10[i] - c00[i]) * fx;
            let bottom = c01[i] + (c11[i] - c01[i]) * fx;
            out[i] = top + (bottom - top) * fy;
        }
        out
    }
}

impl fmt::Debug for ArtworkAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtworkAsset")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_parse_plain_path() {
        let source = ArtworkSource::parse("art/cat.png").unwrap();
        assert_eq!(source, ArtworkSource::File(PathBuf::from("art/cat.png")));
        assert_eq!(source.path(), Some(Path::new("art/cat.png")));
    }

    #[test]
    fn test_parse_file_uri() {
        let source = ArtworkSource::parse("file:///tmp/art.png").unwrap();
        assert_eq!(source, ArtworkSource::File(PathBuf::from("/tmp/art.png")));
    }

    #[test]
    fn test_remote_urls_unsupported() {
        let err = ArtworkSource::parse("https://example.com/art.png").unwrap_err();
        assert!(matches!(err, ArtworkError::UnsupportedSource(_)));
        assert!(ArtworkSource::parse("   ").is_err());
    }

    #[test]
    fn test_parse_data_uri() {
        let payload = base64::engine::general_purpose::STANDARD.encode([1u8, 2, 3]);
        let source = ArtworkSource::parse(&format!("data:image/png;base64,{}", payload)).unwrap();
        match source {
            ArtworkSource::Inline { mime, bytes } => {
                assert_eq!(mime, "image/png");
                assert_eq!(bytes, vec![1, 2, 3]);
            }
            other => panic!("unexpected source {:?}", other),
        }

        assert!(matches!(
            ArtworkSource::parse("data:text/plain;base64,AAAA"),
            Err(ArtworkError::InvalidDataUri(_))
        ));
        assert!(matches!(
            ArtworkSource::parse("data:image/png,raw"),
            Err(ArtworkError::InvalidDataUri(_))
        ));
    }

    #[test]
    fn test_decode_inline_png() {
        let image = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        let mut png = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .write_to(&mut png, image::ImageFormat::Png)
            .unwrap();
        let uri = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(png.into_inner())
        );

        let asset = ArtworkSource::parse(&uri).unwrap().decode().unwrap();
        assert_eq!((asset.width(), asset.height()), (3, 2));
        assert_eq!(asset.image().get_pixel(2, 1).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_missing_file_fails() {
        let source = ArtworkSource::parse("/definitely/not/here/art.png").unwrap();
        assert!(matches!(source.decode(), Err(ArtworkError::Io(_))));
    }

    #[test]
    fn test_zero_sized_rejected() {
        let err = ArtworkAsset::new(RgbaImage::new(0, 10)).unwrap_err();
        assert!(matches!(err, ArtworkError::Empty { width: 0, height: 10 }));
    }

    #[test]
    fn test_sample_uniform_image() {
        let asset = ArtworkAsset::new(RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]))).unwrap();
        let sample = asset.sample_premultiplied(0.37, 0.81);
        assert!((sample[0] - 1.0).abs() < 1e-6);
        assert_eq!(sample[1], 0.0);
        assert!((sample[3] - 1.0).abs() < 1e-6);
        assert_eq!(asset.aspect_ratio(), 1.0);
    }

    #[test]
    fn test_sample_premultiplies_alpha() {
        let asset = ArtworkAsset::new(RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 0]))).unwrap();
        assert_eq!(asset.sample_premultiplied(0.5, 0.5), [0.0, 0.0, 0.0, 0.0]);
    }
}
