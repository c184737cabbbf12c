// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop/settings.rs
//
// Tunables shared by viewport initialization and the drag state machine.

use crate::constant::{CROP_SIZE, HANDLE_HIT_SIZE, MAX_SCALE, MIN_SCALE, RESIZE_SENSITIVITY};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropSettings {
    /// Edge of the crop bounding square in viewport pixels.
    pub crop_size: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Scale change per pixel of corner-handle drag.
    pub resize_sensitivity: f32,
    /// Side of the hit box around each corner handle.
    pub handle_hit_size: f32,
}

impl Default for CropSettings {
    fn default() -> Self {
        Self {
            crop_size: CROP_SIZE,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            resize_sensitivity: RESIZE_SENSITIVITY,
            handle_hit_size: HANDLE_HIT_SIZE,
        }
    }
}
