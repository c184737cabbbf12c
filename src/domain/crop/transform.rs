// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop/transform.rs
//
// View state of the source image inside the viewport.

use crate::domain::geometry::Point;

/// Zoom and pan applied to the image's contained ("fit") rectangle.
///
/// `scale` multiplies the fit size about the image center; `offset` is a
/// translation in viewport pixels added afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageTransform {
    pub scale: f32,
    pub offset: Point,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl ImageTransform {
    /// Fresh transform at `scale`, clamped into range, with no pan.
    pub fn new(scale: f32, min_scale: f32, max_scale: f32) -> Self {
        Self {
            scale: scale.clamp(min_scale, max_scale),
            offset: Point::ORIGIN,
            min_scale,
            max_scale,
        }
    }

    /// Same transform with `scale` clamped into `[min_scale, max_scale]`.
    pub fn with_scale(self, scale: f32) -> Self {
        Self {
            scale: scale.clamp(self.min_scale, self.max_scale),
            ..self
        }
    }

    /// Same transform panned by `delta`.
    pub fn panned_by(self, delta: Point) -> Self {
        Self {
            offset: self.offset + delta,
            ..self
        }
    }
}
