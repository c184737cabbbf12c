// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/source.rs
//
// Decoded source image for one open crop tool.

use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, anyhow};
use image::{DynamicImage, ImageReader, RgbaImage};

use crate::domain::crop::CropResult;
use crate::domain::geometry::Size;

/// Read-only decoded image. Orientation from EXIF is already applied, so the
/// dimensions are the ones the user sees.
pub struct SourceImage {
    pixels: RgbaImage,
}

impl fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.dimensions();
        write!(f, "SourceImage({width}x{height})")
    }
}

impl SourceImage {
    /// Wrap already decoded pixels.
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Decode any supported raster format from memory.
    pub fn decode(bytes: &[u8]) -> CropResult<Self> {
        let image = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .context("failed to read image header")?
            .decode()
            .context("failed to decode image")?;

        let image = match exif_orientation(bytes) {
            Some(orientation) => apply_orientation(image, orientation),
            None => image,
        };

        let pixels = image.to_rgba8();
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(anyhow!("image has no pixels"));
        }

        Ok(Self { pixels })
    }

    /// Read and decode an image file.
    pub fn open(path: &Path) -> CropResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        Self::decode(&bytes).with_context(|| format!("failed to load {}", path.display()))
    }

    /// Natural pixel dimensions (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn natural_size(&self) -> Size {
        Size::from(self.dimensions())
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Decode on the blocking pool, optionally giving up after `timeout`.
pub async fn decode_async(bytes: Vec<u8>, timeout: Option<Duration>) -> CropResult<SourceImage> {
    let task = tokio::task::spawn_blocking(move || SourceImage::decode(&bytes));

    let joined = match timeout {
        Some(limit) => tokio::time::timeout(limit, task)
            .await
            .map_err(|_| anyhow!("image decode timed out after {limit:?}"))?,
        None => task.await,
    };

    joined.context("image decode task failed")?
}

/// Rotate/flip a decoded image according to an EXIF orientation value (1-8).
pub fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

#[cfg(feature = "exif")]
fn exif_orientation(bytes: &[u8]) -> Option<u32> {
    let mut cursor = Cursor::new(bytes);
    let exif = exif::Reader::new().read_from_container(&mut cursor).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    field.value.get_uint(0)
}

#[cfg(not(feature = "exif"))]
fn exif_orientation(_bytes: &[u8]) -> Option<u32> {
    None
}
