// SPDX-License-Identifier: GPL-3.0-or-later
// src/config.rs
//
// Global configuration for the crop tool, with environment overrides.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use image::imageops::FilterType;

use crate::constant::{DEFAULT_CONTAINER_HEIGHT, DEFAULT_CONTAINER_WIDTH, ENV_PREFIX, OUTPUT_DIR};
use crate::domain::crop::{CropSettings, ExportOptions, OutputFormat, OutputSize};
use crate::domain::geometry::Size;

/// Global configuration for the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Viewport size the crop tool is laid out in.
    pub container: Size,
    /// Crop geometry and drag tunables.
    pub crop: CropSettings,
    /// Edge of the exported avatar.
    pub output_size: OutputSize,
    /// Encoding of the exported avatar.
    pub output_format: OutputFormat,
    /// Resampling filter used when the crop and output sizes differ.
    pub filter: FilterType,
    /// Give up decoding after this long. `None` waits forever.
    pub decode_timeout: Option<Duration>,
    /// Directory exported avatars are written to.
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            container: Size::new(DEFAULT_CONTAINER_WIDTH, DEFAULT_CONTAINER_HEIGHT),
            crop: CropSettings::default(),
            output_size: OutputSize::default(),
            output_format: OutputFormat::default(),
            filter: FilterType::Lanczos3,
            decode_timeout: None,
            output_dir: dirs::picture_dir()
                .or_else(dirs::home_dir)
                .map(|dir| dir.join(OUTPUT_DIR))
                .unwrap_or_else(|| PathBuf::from(OUTPUT_DIR)),
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with `AVATAR_CROP_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each
    /// `AVATAR_CROP_*` key. Unset keys keep their default; malformed values
    /// are an error naming the key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let mut config = Self::default();

        if let Some(value) = var("CONTAINER") {
            config.container = parse_dimensions(&value).context("AVATAR_CROP_CONTAINER")?;
        }
        if let Some(value) = var("MIN_SCALE") {
            config.crop.min_scale = parse_positive(&value).context("AVATAR_CROP_MIN_SCALE")?;
        }
        if let Some(value) = var("MAX_SCALE") {
            config.crop.max_scale = parse_positive(&value).context("AVATAR_CROP_MAX_SCALE")?;
        }
        if let Some(value) = var("OUTPUT_SIZE") {
            config.output_size = value.parse().context("AVATAR_CROP_OUTPUT_SIZE")?;
        }
        if let Some(value) = var("FORMAT") {
            config.output_format = value.parse().context("AVATAR_CROP_FORMAT")?;
        }
        if let Some(value) = var("JPEG_QUALITY") {
            let quality = parse_quality(&value).context("AVATAR_CROP_JPEG_QUALITY")?;
            if config.output_format == OutputFormat::Png {
                return Err(anyhow!(
                    "AVATAR_CROP_JPEG_QUALITY is set but AVATAR_CROP_FORMAT is png"
                ));
            }
            config.set_jpeg_quality(quality);
        }
        if let Some(value) = var("FILTER") {
            config.filter = parse_filter(&value).context("AVATAR_CROP_FILTER")?;
        }
        if let Some(value) = var("DECODE_TIMEOUT_MS") {
            let millis: u64 = value
                .trim()
                .parse()
                .with_context(|| format!("AVATAR_CROP_DECODE_TIMEOUT_MS: invalid '{value}'"))?;
            config.decode_timeout = (millis > 0).then(|| Duration::from_millis(millis));
        }
        if let Some(value) = var("OUTPUT_DIR") {
            config.output_dir = PathBuf::from(value);
        }

        if config.crop.min_scale > config.crop.max_scale {
            return Err(anyhow!(
                "min scale {} is larger than max scale {}",
                config.crop.min_scale,
                config.crop.max_scale
            ));
        }

        Ok(config)
    }

    /// Apply a JPEG quality; switches the output format to JPEG.
    pub fn set_jpeg_quality(&mut self, quality: u8) {
        self.output_format = OutputFormat::Jpeg { quality };
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            size: self.output_size,
            format: self.output_format,
            filter: self.filter,
        }
    }
}

/// Parse `WIDTHxHEIGHT` into a measured size.
pub fn parse_dimensions(value: &str) -> anyhow::Result<Size> {
    let (width, height) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow!("invalid dimensions '{value}' (expected WIDTHxHEIGHT)"))?;
    let size = Size::new(parse_positive(width)?, parse_positive(height)?);
    Ok(size)
}

pub fn parse_quality(value: &str) -> anyhow::Result<u8> {
    let quality = u8::from_str(value.trim()).with_context(|| format!("invalid quality '{value}'"))?;
    if !(1..=100).contains(&quality) {
        return Err(anyhow!("quality {quality} is outside 1-100"));
    }
    Ok(quality)
}

pub fn parse_filter(value: &str) -> anyhow::Result<FilterType> {
    match value.trim().to_ascii_lowercase().as_str() {
        "nearest" => Ok(FilterType::Nearest),
        "triangle" | "linear" => Ok(FilterType::Triangle),
        "catmullrom" | "cubic" => Ok(FilterType::CatmullRom),
        "gaussian" => Ok(FilterType::Gaussian),
        "lanczos3" | "lanczos" => Ok(FilterType::Lanczos3),
        other => Err(anyhow!("unknown filter '{other}'")),
    }
}

fn parse_positive(value: &str) -> anyhow::Result<f32> {
    let number = f32::from_str(value.trim()).with_context(|| format!("invalid number '{value}'"))?;
    if !number.is_finite() || number <= 0.0 {
        return Err(anyhow!("'{value}' must be a positive number"));
    }
    Ok(number)
}
