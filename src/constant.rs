// SPDX-License-Identifier: GPL-3.0-or-later
// src/constant.rs
//
// Engine constants that should not be changed by the user.

use image::Rgba;

/// Edge length of the square bounding the circular crop region (viewport pixels).
pub const CROP_SIZE: f32 = 128.0;

/// Default edge length of the rasterized avatar in pixels.
pub const DEFAULT_OUTPUT_SIZE: u32 = 128;

/// Lower zoom clamp. Small enough to shrink the image well below the crop region.
pub const MIN_SCALE: f32 = 0.1;

/// Upper zoom clamp.
pub const MAX_SCALE: f32 = 3.0;

/// Scale change per pixel of corner-handle drag.
pub const RESIZE_SENSITIVITY: f32 = 0.005;

/// Side of the square hit box centered on each crop corner handle.
pub const HANDLE_HIT_SIZE: f32 = 16.0;

/// Drawn side of a corner handle in the preview.
pub const HANDLE_SIZE: f32 = 8.0;

/// Default container (viewport) width in pixels.
pub const DEFAULT_CONTAINER_WIDTH: f32 = 400.0;

/// Default container (viewport) height in pixels.
pub const DEFAULT_CONTAINER_HEIGHT: f32 = 300.0;

/// Default JPEG quality for exported avatars.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Tolerance for scale comparisons.
pub const SCALE_EPSILON: f32 = 0.0001;

/// Tolerance for offset and position comparisons.
pub const OFFSET_EPSILON: f32 = 0.01;

/// Letterbox fill behind sources smaller than the requested crop.
pub const LETTERBOX_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Preview background behind the transformed image.
pub const PREVIEW_BACKGROUND: Rgba<u8> = Rgba([48, 48, 48, 255]);

/// Preview dimming outside the crop circle (alpha applied over the image).
pub const PREVIEW_OVERLAY: Rgba<u8> = Rgba([0, 0, 0, 128]);

/// Crop outline and handle color in the preview.
pub const PREVIEW_STROKE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Crop outline width in the preview.
pub const PREVIEW_BORDER_WIDTH: f32 = 2.0;

/// Default output file stem.
pub const DEFAULT_OUTPUT_STEM: &str = "avatar";

/// Subdirectory created below the pictures directory for exports.
pub const OUTPUT_DIR: &str = "avatars";

/// Prefix of environment variables read by `AppConfig::from_env`.
pub const ENV_PREFIX: &str = "AVATAR_CROP_";
