// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop/session.rs
//
// Drag session: gesture classification on pointer-down and the anchor each
// drag mode needs while the pointer moves.

use super::region::CropRegion;
use super::transform::ImageTransform;
use crate::domain::geometry::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Hit-test order; matches [`CropRegion::corners`].
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragMode {
    #[default]
    None,
    MovingCropRegion,
    PanningImage,
    ResizingImage,
}

/// Live gesture between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragSession {
    #[default]
    Idle,
    /// `grab` is the pointer position relative to the region's top-left.
    MovingCropRegion { grab: Point },
    /// `last` is the previous pointer position; pan deltas accumulate.
    PanningImage { last: Point },
    /// Absolute from the drag start; the corner does not change the formula.
    ResizingImage {
        corner: Corner,
        origin: Point,
        start_scale: f32,
    },
}

impl DragSession {
    /// Classify a pointer-down at `pointer` (viewport coordinates).
    ///
    /// Corner handles win over the region body, the body wins over the rest
    /// of the viewport, and anything outside the viewport starts nothing.
    pub fn begin(
        pointer: Point,
        viewport: Rect,
        region: &CropRegion,
        transform: &ImageTransform,
        handle_hit_size: f32,
    ) -> Self {
        let handle = Corner::ALL
            .into_iter()
            .zip(region.corners())
            .find(|(_, center)| Rect::centered_square(*center, handle_hit_size).contains(pointer));

        if let Some((corner, _)) = handle {
            return Self::ResizingImage {
                corner,
                origin: pointer,
                start_scale: transform.scale,
            };
        }

        if region.bounds().contains(pointer) {
            return Self::MovingCropRegion {
                grab: pointer - region.origin(),
            };
        }

        if viewport.contains(pointer) {
            return Self::PanningImage { last: pointer };
        }

        Self::Idle
    }

    pub fn mode(&self) -> DragMode {
        match self {
            Self::Idle => DragMode::None,
            Self::MovingCropRegion { .. } => DragMode::MovingCropRegion,
            Self::PanningImage { .. } => DragMode::PanningImage,
            Self::ResizingImage { .. } => DragMode::ResizingImage,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Corner that started a resize, if any.
    pub fn active_corner(&self) -> Option<Corner> {
        match self {
            Self::ResizingImage { corner, .. } => Some(*corner),
            _ => None,
        }
    }
}
