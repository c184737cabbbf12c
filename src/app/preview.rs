// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/preview.rs
//
// Software render of the crop viewport: transformed image, dimmed
// surroundings, circle outline and corner handles.

use image::imageops::{self, FilterType};
use image::{Pixel, Rgba, RgbaImage};

use crate::app::source::SourceImage;
use crate::constant::{
    HANDLE_SIZE, PREVIEW_BACKGROUND, PREVIEW_BORDER_WIDTH, PREVIEW_OVERLAY, PREVIEW_STROKE,
};
use crate::domain::crop::CropState;
use crate::domain::crop::export::image_rect;
use crate::domain::geometry::{Point, Rect};

/// Largest edge the preview will resample the source to.
const MAX_DRAWN_EDGE: f32 = 8192.0;

pub struct Preview<'a> {
    state: &'a CropState,
    source: &'a SourceImage,
}

impl<'a> Preview<'a> {
    pub fn new(state: &'a CropState, source: &'a SourceImage) -> Self {
        Self { state, source }
    }

    /// Render at container size.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render(&self) -> RgbaImage {
        let size = self.state.viewport.size();
        let width = (size.width.ceil() as u32).max(1);
        let height = (size.height.ceil() as u32).max(1);
        let mut canvas = RgbaImage::from_pixel(width, height, PREVIEW_BACKGROUND);

        self.draw_image(&mut canvas);
        self.draw_overlay(&mut canvas);
        self.draw_border(&mut canvas);
        self.draw_handles(&mut canvas);

        canvas
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn draw_image(&self, canvas: &mut RgbaImage) {
        let rect = image_rect(self.state, self.source.natural_size());
        let width = rect.width.round().clamp(1.0, MAX_DRAWN_EDGE) as u32;
        let height = rect.height.round().clamp(1.0, MAX_DRAWN_EDGE) as u32;

        let drawn = imageops::resize(self.source.pixels(), width, height, FilterType::Triangle);
        imageops::overlay(canvas, &drawn, rect.x.round() as i64, rect.y.round() as i64);
    }

    fn draw_overlay(&self, canvas: &mut RgbaImage) {
        let (center, radius) = self.circle();
        for (x, y, pixel) in canvas.enumerate_pixels_mut() {
            if distance(pixel_center(x, y), center) > radius {
                pixel.blend(&PREVIEW_OVERLAY);
            }
        }
    }

    fn draw_border(&self, canvas: &mut RgbaImage) {
        let (center, radius) = self.circle();
        let half = PREVIEW_BORDER_WIDTH / 2.0;
        for (x, y, pixel) in canvas.enumerate_pixels_mut() {
            if (distance(pixel_center(x, y), center) - radius).abs() <= half {
                *pixel = PREVIEW_STROKE;
            }
        }
    }

    fn draw_handles(&self, canvas: &mut RgbaImage) {
        for corner in self.state.region.corners() {
            fill_rect(canvas, Rect::centered_square(corner, HANDLE_SIZE), PREVIEW_STROKE);
        }
    }

    fn circle(&self) -> (Point, f32) {
        let bounds = self.state.region.bounds();
        (bounds.center(), bounds.width / 2.0)
    }
}

#[allow(clippy::cast_precision_loss)]
fn pixel_center(x: u32, y: u32) -> Point {
    Point::new(x as f32 + 0.5, y as f32 + 0.5)
}

fn distance(a: Point, b: Point) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn fill_rect(canvas: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
    let x0 = rect.x.floor().max(0.0) as u32;
    let y0 = rect.y.floor().max(0.0) as u32;
    let x1 = (rect.right().ceil().max(0.0) as u32).min(canvas.width());
    let y1 = (rect.bottom().ceil().max(0.0) as u32).min(canvas.height());
    for y in y0..y1 {
        for x in x0..x1 {
            canvas.put_pixel(x, y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::crop::{CropSettings, Viewport};
    use crate::domain::geometry::Size;

    fn render(source: &SourceImage) -> RgbaImage {
        let viewport = Viewport::measure(Size::new(400.0, 300.0)).expect("measured");
        let state = CropState::initial(viewport, source.natural_size(), &CropSettings::default());
        Preview::new(&state, source).render()
    }

    #[test]
    fn renders_at_container_size_with_handles() {
        let source = SourceImage::from_rgba(RgbaImage::from_pixel(800, 400, Rgba([0, 200, 0, 255])));
        let frame = render(&source);

        assert_eq!(frame.dimensions(), (400, 300));
        // Top-left handle centered on (136, 86).
        assert_eq!(*frame.get_pixel(136, 86), PREVIEW_STROKE);
        assert_eq!(*frame.get_pixel(263, 213), PREVIEW_STROKE);
    }

    #[test]
    fn inside_the_circle_is_not_dimmed() {
        let source = SourceImage::from_rgba(RgbaImage::from_pixel(800, 400, Rgba([0, 200, 0, 255])));
        let frame = render(&source);

        // Fit scale 0.5 shows the image as 200x100 centered, covering (200, 150).
        let [r, g, b, _] = frame.get_pixel(200, 150).0;
        assert!(r <= 2 && g >= 195 && b <= 2, "{:?}", frame.get_pixel(200, 150));

        // Background corner is outside the circle and gets darker.
        let [r, _, _, _] = frame.get_pixel(2, 2).0;
        assert!(r < PREVIEW_BACKGROUND.0[0]);
    }
}
