// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop/viewport.rs
//
// Container geometry: initial crop placement and "contain" fit of the source.

use super::region::CropRegion;
use super::settings::CropSettings;
use super::transform::ImageTransform;
use crate::domain::geometry::{Rect, Size};

/// A laid-out container with strictly positive dimensions.
///
/// Only constructible through [`Viewport::measure`], so every computation
/// below can divide by the container size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    size: Size,
}

impl Viewport {
    /// Returns `None` until the container has a real measurement.
    pub fn measure(size: Size) -> Option<Self> {
        size.is_measured().then_some(Self { size })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.size.width, self.size.height)
    }

    /// Scale that makes `natural` exactly fit the container on its
    /// relatively larger dimension.
    pub fn fit_scale(&self, natural: Size) -> f32 {
        if natural.aspect() > self.size.aspect() {
            self.size.width / natural.width
        } else {
            self.size.height / natural.height
        }
    }

    /// On-screen rectangle of `natural` under the contain policy, centered,
    /// before any user zoom or pan.
    pub fn contain_rect(&self, natural: Size) -> Rect {
        let image_aspect = natural.aspect();
        if image_aspect > self.size.aspect() {
            let height = self.size.width / image_aspect;
            Rect::new(0.0, (self.size.height - height) / 2.0, self.size.width, height)
        } else {
            let width = self.size.height * image_aspect;
            Rect::new((self.size.width - width) / 2.0, 0.0, width, self.size.height)
        }
    }

    /// Initial crop region (centered) and transform (fit scale, no pan) for a
    /// freshly decoded image. `natural` must be non-empty.
    pub fn initialize(&self, natural: Size, settings: &CropSettings) -> (CropRegion, ImageTransform) {
        let region = CropRegion::centered(self.size, settings.crop_size);
        let fit = self.fit_scale(natural);
        log::debug!(
            "viewport {}x{} image {}x{}: fit scale {fit:.4}",
            self.size.width,
            self.size.height,
            natural.width,
            natural.height
        );
        let transform = ImageTransform::new(fit, settings.min_scale, settings.max_scale);
        (region, transform)
    }
}
