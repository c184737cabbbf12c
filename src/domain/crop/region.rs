// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop/region.rs
//
// Crop region domain model.

use crate::domain::geometry::{Point, Rect, Size};

/// Square-bounded circular selection in viewport coordinates.
///
/// Only the position moves; `size` is fixed for the lifetime of an open tool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRegion {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

impl CropRegion {
    pub fn new(x: f32, y: f32, size: f32) -> Self {
        Self { x, y, size }
    }

    /// Region of `size` centered in `container`.
    pub fn centered(container: Size, size: f32) -> Self {
        Self::new(
            (container.width - size) / 2.0,
            (container.height - size) / 2.0,
            size,
        )
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }

    /// Corner points in `Corner::ALL` order.
    pub fn corners(&self) -> [Point; 4] {
        let right = self.x + self.size;
        let bottom = self.y + self.size;
        [
            Point::new(self.x, self.y),
            Point::new(right, self.y),
            Point::new(self.x, bottom),
            Point::new(right, bottom),
        ]
    }

    /// Same region moved to `origin`, clamped so it never leaves `container`.
    ///
    /// A container smaller than the region pins it to the top-left.
    pub fn moved_to(&self, origin: Point, container: Size) -> Self {
        let max_x = (container.width - self.size).max(0.0);
        let max_y = (container.height - self.size).max(0.0);
        Self::new(
            origin.x.clamp(0.0, max_x),
            origin.y.clamp(0.0, max_y),
            self.size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_in_400_by_300() {
        let region = CropRegion::centered(Size::new(400.0, 300.0), 128.0);
        assert_eq!(region, CropRegion::new(136.0, 86.0, 128.0));
    }

    #[test]
    fn moved_to_clamps_every_side() {
        let container = Size::new(400.0, 300.0);
        let region = CropRegion::centered(container, 128.0);

        assert_eq!(
            region.moved_to(Point::new(-50.0, -1.0), container).origin(),
            Point::new(0.0, 0.0)
        );
        assert_eq!(
            region.moved_to(Point::new(1000.0, 1000.0), container).origin(),
            Point::new(272.0, 172.0)
        );
    }

    #[test]
    fn corners_follow_top_left_top_right_bottom_left_bottom_right() {
        let region = CropRegion::new(10.0, 20.0, 128.0);
        assert_eq!(
            region.corners(),
            [
                Point::new(10.0, 20.0),
                Point::new(138.0, 20.0),
                Point::new(10.0, 148.0),
                Point::new(138.0, 148.0),
            ]
        );
    }
}
