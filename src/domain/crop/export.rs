// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop/export.rs
//
// Rasterization: map the visible crop circle back to source pixels, draw it
// into a square bitmap and encode it.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use anyhow::{Context, anyhow, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

use super::CropResult;
use super::interaction::CropState;
use crate::constant::{DEFAULT_JPEG_QUALITY, DEFAULT_OUTPUT_SIZE, LETTERBOX_FILL};
use crate::domain::geometry::{Point, Rect, Size};

// ============================================================================
// Options
// ============================================================================

/// Edge length of the rasterized square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSize {
    /// Whatever the crop covers in source pixels.
    Native,
    /// Resampled to this many pixels.
    Fixed(u32),
}

impl Default for OutputSize {
    fn default() -> Self {
        Self::Fixed(DEFAULT_OUTPUT_SIZE)
    }
}

impl FromStr for OutputSize {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("native") {
            return Ok(Self::Native);
        }
        let edge: u32 = s
            .parse()
            .with_context(|| format!("invalid output size '{s}' (expected pixels or 'native')"))?;
        if edge == 0 {
            bail!("output size must be at least 1 pixel");
        }
        Ok(Self::Fixed(edge))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg { quality: u8 },
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl OutputFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::default()),
            other => Err(anyhow!("unsupported output format '{other}' (expected png or jpeg)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    pub size: OutputSize,
    pub format: OutputFormat,
    pub filter: FilterType,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            size: OutputSize::default(),
            format: OutputFormat::default(),
            filter: FilterType::Lanczos3,
        }
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// Square crop in natural source pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRect {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

/// Result of mapping the crop region onto the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropPlan {
    /// Transformed image rectangle in viewport coordinates.
    pub image: Rect,
    /// Crop origin relative to `image`, after boundary adjustment.
    pub adjusted: Point,
    /// The crop did not fit and was centered on the image instead.
    pub centered: bool,
    pub source: SourceRect,
    pub natural_width: u32,
    pub natural_height: u32,
}

/// Rectangle the transformed image occupies in the viewport: the contain
/// rectangle scaled about its own center, then panned.
pub fn image_rect(state: &CropState, natural: Size) -> Rect {
    let rendered = state.viewport.contain_rect(natural);
    let scale = state.transform.scale;
    let width = rendered.width * scale;
    let height = rendered.height * scale;
    Rect::new(
        rendered.x + (rendered.width - width) / 2.0 + state.transform.offset.x,
        rendered.y + (rendered.height - height) / 2.0 + state.transform.offset.y,
        width,
        height,
    )
}

/// Compute the source-pixel square under the crop region.
///
/// The crop is clamped onto the image edges first; when it still cannot fit
/// (image smaller than the crop on either axis) it is centered on the image.
pub fn plan(state: &CropState, natural_width: u32, natural_height: u32) -> CropPlan {
    let natural = Size::from((natural_width, natural_height));
    let image = image_rect(state, natural);
    let size = state.region.size;

    let crop_x = state.region.x - image.x;
    let crop_y = state.region.y - image.y;

    let mut adjusted_x = crop_x;
    let mut adjusted_y = crop_y;
    if crop_x < 0.0 {
        adjusted_x = 0.0;
    }
    if crop_y < 0.0 {
        adjusted_y = 0.0;
    }
    if crop_x + size > image.width {
        adjusted_x = image.width - size;
    }
    if crop_y + size > image.height {
        adjusted_y = image.height - size;
    }

    let fits = adjusted_x >= 0.0
        && adjusted_y >= 0.0
        && adjusted_x <= image.width - size
        && adjusted_y <= image.height - size;

    if !fits {
        adjusted_x = ((image.width - size) / 2.0).max(0.0);
        adjusted_y = ((image.height - size) / 2.0).max(0.0);
    }

    let scale_x = f64::from(natural_width) / f64::from(image.width);
    let scale_y = f64::from(natural_height) / f64::from(image.height);

    CropPlan {
        image,
        adjusted: Point::new(adjusted_x, adjusted_y),
        centered: !fits,
        source: SourceRect {
            x: f64::from(adjusted_x) * scale_x,
            y: f64::from(adjusted_y) * scale_y,
            size: f64::from(size) * scale_x,
        },
        natural_width,
        natural_height,
    }
}

impl CropPlan {
    /// The source is smaller than the requested square on some axis.
    pub fn needs_letterbox(&self) -> bool {
        f64::from(self.natural_width) < self.source.size
            || f64::from(self.natural_height) < self.source.size
    }

    /// Output edge in pixels for `size`.
    ///
    /// A native edge never exceeds the source's longer side, so a letterboxed
    /// far zoom-out does not allocate a canvas larger than the source itself.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn output_edge(&self, size: OutputSize) -> u32 {
        match size {
            OutputSize::Fixed(edge) => edge.max(1),
            OutputSize::Native => {
                let longest = self.natural_width.max(self.natural_height);
                let edge = self.source.size.round().min(f64::from(longest)) as u32;
                if f64::from(edge) < self.source.size.round() {
                    log::debug!("native edge {:.0} capped to {edge}", self.source.size);
                }
                edge.max(1)
            }
        }
    }

    /// Integer source square, clamped inside the image. `None` when the
    /// source must be letterboxed instead.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_rect(&self) -> Option<(u32, u32, u32)> {
        if self.needs_letterbox() {
            return None;
        }
        let side = (self.source.size.round() as u32)
            .min(self.natural_width)
            .min(self.natural_height)
            .max(1);
        let x = (self.source.x.round().max(0.0) as u32).min(self.natural_width - side);
        let y = (self.source.y.round().max(0.0) as u32).min(self.natural_height - side);
        Some((x, y, side))
    }
}

// ============================================================================
// Raster
// ============================================================================

/// Draw the planned square of `source` into an `edge`-sized bitmap.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rasterize(source: &RgbaImage, plan: &CropPlan, size: OutputSize, filter: FilterType) -> RgbaImage {
    let edge = plan.output_edge(size);

    let Some((x, y, side)) = plan.pixel_rect() else {
        // Keep native pixels: whole source centered on a white field, scaled
        // only by the output/crop ratio.
        let mut canvas = RgbaImage::from_pixel(edge, edge, LETTERBOX_FILL);
        let ratio = f64::from(edge) / plan.source.size;
        let width = ((f64::from(source.width()) * ratio).round() as u32).max(1);
        let height = ((f64::from(source.height()) * ratio).round() as u32).max(1);
        let drawn = if (width, height) == source.dimensions() {
            source.clone()
        } else {
            imageops::resize(source, width, height, filter)
        };
        let left = (i64::from(edge) - i64::from(width)) / 2;
        let top = (i64::from(edge) - i64::from(height)) / 2;
        imageops::overlay(&mut canvas, &drawn, left, top);
        log::debug!("letterboxed {width}x{height} source into {edge}x{edge}");
        return canvas;
    };

    let region = imageops::crop_imm(source, x, y, side, side).to_image();
    if side == edge {
        region
    } else {
        imageops::resize(&region, edge, edge, filter)
    }
}

/// Composite `image` onto an opaque background.
pub fn flatten(image: &RgbaImage, background: Rgba<u8>) -> RgbImage {
    let [br, bg, bb, _] = background.0;
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let alpha = u16::from(a);
        let blend = |fg: u8, bgc: u8| -> u8 {
            let value = (u16::from(fg) * alpha + u16::from(bgc) * (255 - alpha) + 127) / 255;
            u8::try_from(value).unwrap_or(u8::MAX)
        };
        Rgb([blend(r, br), blend(g, bg), blend(b, bb)])
    })
}

/// Encode the bitmap. JPEG output is flattened on white first.
pub fn encode(image: &RgbaImage, format: OutputFormat) -> CropResult<Vec<u8>> {
    let mut bytes = Vec::new();
    match format {
        OutputFormat::Png => {
            DynamicImage::ImageRgba8(image.clone())
                .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
                .context("failed to encode avatar as PNG")?;
        }
        OutputFormat::Jpeg { quality } => {
            let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
            DynamicImage::ImageRgb8(flatten(image, LETTERBOX_FILL))
                .write_with_encoder(encoder)
                .context("failed to encode avatar as JPEG")?;
        }
    }
    Ok(bytes)
}

// ============================================================================
// Payload
// ============================================================================

/// What the persistence collaborator receives on save.
#[derive(Clone)]
pub struct CropPayload {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    /// Crop square in natural source pixels.
    pub source: SourceRect,
    pub natural_width: u32,
    pub natural_height: u32,
    /// Edge of the encoded square.
    pub edge: u32,
}

impl fmt::Debug for CropPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CropPayload")
            .field("bytes", &self.bytes.len())
            .field("format", &self.format)
            .field("source", &self.source)
            .field("natural_width", &self.natural_width)
            .field("natural_height", &self.natural_height)
            .field("edge", &self.edge)
            .finish()
    }
}

impl CropPayload {
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), self.to_base64())
    }
}

/// Plan, rasterize and encode the crop of `source` under `state`.
pub fn export(state: &CropState, source: &RgbaImage, options: &ExportOptions) -> CropResult<CropPayload> {
    let (natural_width, natural_height) = source.dimensions();
    if natural_width == 0 || natural_height == 0 {
        bail!("cannot export an empty image");
    }

    let plan = plan(state, natural_width, natural_height);
    let bitmap = rasterize(source, &plan, options.size, options.filter);
    let bytes = encode(&bitmap, options.format)?;

    log::info!(
        "exported {}x{} avatar from source square ({:.1}, {:.1}) size {:.1}{}",
        bitmap.width(),
        bitmap.height(),
        plan.source.x,
        plan.source.y,
        plan.source.size,
        if plan.centered { " (centered)" } else { "" }
    );

    Ok(CropPayload {
        bytes,
        format: options.format,
        source: plan.source,
        natural_width,
        natural_height,
        edge: bitmap.width(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::OFFSET_EPSILON;
    use crate::domain::crop::settings::CropSettings;
    use crate::domain::crop::viewport::Viewport;

    fn state_for(natural_width: u32, natural_height: u32) -> CropState {
        let viewport = Viewport::measure(Size::new(400.0, 300.0)).expect("measured");
        CropState::initial(
            viewport,
            Size::from((natural_width, natural_height)),
            &CropSettings::default(),
        )
    }

    fn with_scale(mut state: CropState, scale: f32) -> CropState {
        state.transform = state.transform.with_scale(scale);
        state
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < f64::from(OFFSET_EPSILON)
    }

    #[test]
    fn unit_scale_maps_crop_through_fit() {
        // 800x400 shown as 400x200 at (0, 50); crop at (136, 86) is 36px into it.
        let state = with_scale(state_for(800, 400), 1.0);
        let plan = plan(&state, 800, 400);

        assert_eq!(plan.image, Rect::new(0.0, 50.0, 400.0, 200.0));
        assert!(!plan.centered);
        assert_eq!(plan.adjusted, Point::new(136.0, 36.0));
        assert!(close(plan.source.x, 272.0));
        assert!(close(plan.source.y, 72.0));
        assert!(close(plan.source.size, 256.0));
        assert_eq!(plan.pixel_rect(), Some((272, 72, 256)));
    }

    #[test]
    fn crop_hanging_off_an_edge_is_clamped() {
        let mut state = with_scale(state_for(800, 400), 1.0);
        state.transform = state.transform.panned_by(Point::new(200.0, 0.0));
        let plan = plan(&state, 800, 400);

        // Image now starts at x=200; crop at 136 is left of it.
        assert_eq!(plan.adjusted.x, 0.0);
        assert!(!plan.centered);
        assert!(close(plan.source.x, 0.0));
    }

    #[test]
    fn crop_overhanging_the_right_edge_is_pulled_back() {
        // Image spans x in [-300, 100]; the crop starts 436px into a 400px image.
        let mut state = with_scale(state_for(800, 400), 1.0);
        state.transform = state.transform.panned_by(Point::new(-300.0, 0.0));
        let plan = plan(&state, 800, 400);

        assert!(!plan.centered);
        assert_eq!(plan.adjusted.x, plan.image.width - 128.0);
        assert_eq!(plan.adjusted.y, 36.0);
        assert!(close(plan.source.x, 544.0));
        assert!(close(plan.source.x + plan.source.size, 800.0));
        assert_eq!(plan.pixel_rect(), Some((544, 72, 256)));
    }

    #[test]
    fn crop_overhanging_the_bottom_edge_is_pulled_back() {
        // Image spans y in [-50, 150]; the crop starts 136px into a 200px image.
        let mut state = with_scale(state_for(800, 400), 1.0);
        state.transform = state.transform.panned_by(Point::new(0.0, -100.0));
        let plan = plan(&state, 800, 400);

        assert!(!plan.centered);
        assert_eq!(plan.adjusted.y, plan.image.height - 128.0);
        assert_eq!(plan.adjusted.x, 136.0);
        assert!(close(plan.source.y, 144.0));
        assert!(close(plan.source.y + plan.source.size, 400.0));
        assert_eq!(plan.pixel_rect(), Some((272, 144, 256)));
    }

    #[test]
    fn native_edge_is_capped_by_the_source() {
        // 4000x3000 fits at 0.1 already; the 40x30 image is far smaller than the crop.
        let state = with_scale(state_for(4000, 3000), 0.1);
        let plan = plan(&state, 4000, 3000);

        assert!(plan.needs_letterbox());
        assert!(plan.source.size > 12_000.0);
        assert_eq!(plan.output_edge(OutputSize::Native), 4000);
        assert_eq!(plan.output_edge(OutputSize::Fixed(128)), 128);
    }

    #[test]
    fn image_smaller_than_crop_is_centered_and_letterboxed() {
        let state = with_scale(state_for(800, 400), 0.1);
        let plan = plan(&state, 800, 400);

        // 400x200 contain rect scaled to 40x20.
        assert!((plan.image.width - 40.0).abs() < OFFSET_EPSILON);
        assert!((plan.image.height - 20.0).abs() < OFFSET_EPSILON);
        assert!(plan.centered);
        assert_eq!(plan.adjusted, Point::new(0.0, 0.0));
        assert!(plan.needs_letterbox());
        assert_eq!(plan.pixel_rect(), None);

        let source = RgbaImage::from_pixel(800, 400, Rgba([200, 10, 10, 255]));
        let bitmap = rasterize(&source, &plan, OutputSize::Fixed(128), FilterType::Triangle);
        assert_eq!(bitmap.dimensions(), (128, 128));
        assert_eq!(*bitmap.get_pixel(0, 0), LETTERBOX_FILL);
        assert_eq!(*bitmap.get_pixel(127, 127), LETTERBOX_FILL);
        let [r, g, b, a] = bitmap.get_pixel(64, 64).0;
        assert!(r >= 198 && g <= 12 && b <= 12 && a == 255, "{:?}", bitmap.get_pixel(64, 64));
    }

    #[test]
    fn source_square_stays_inside_the_image_for_extreme_transforms() {
        let base = state_for(800, 400);
        let pans = [(-5000.0, 0.0), (5000.0, 5000.0), (0.0, -800.0), (37.0, 12.0)];
        let scales = [0.1, 0.3, 0.5, 1.0, 2.2, 3.0];

        for scale in scales {
            for (px, py) in pans {
                let mut state = with_scale(base, scale);
                state.transform = state.transform.panned_by(Point::new(px, py));
                let plan = plan(&state, 800, 400);

                if !plan.centered {
                    let eps = f64::from(OFFSET_EPSILON);
                    assert!(plan.source.x >= -eps && plan.source.y >= -eps);
                    assert!(
                        plan.source.x + plan.source.size <= 800.0 + eps,
                        "scale {scale} pan ({px}, {py}): {:?}",
                        plan.source
                    );
                    assert!(
                        plan.source.y + plan.source.size <= 400.0 + eps,
                        "scale {scale} pan ({px}, {py}): {:?}",
                        plan.source
                    );
                }

                match plan.pixel_rect() {
                    Some((x, y, side)) => {
                        assert!(x + side <= 800 && y + side <= 400, "scale {scale} pan ({px}, {py})");
                        assert!(plan.source.x >= 0.0 && plan.source.y >= 0.0);
                    }
                    None => assert!(plan.centered, "scale {scale} pan ({px}, {py})"),
                }
            }
        }
    }

    #[test]
    fn native_size_follows_the_source_square() {
        let state = with_scale(state_for(800, 400), 1.0);
        let plan = plan(&state, 800, 400);
        let mut source = RgbaImage::from_pixel(800, 400, Rgba([0, 0, 255, 255]));
        source.put_pixel(272, 72, Rgba([0, 255, 0, 255]));

        let bitmap = rasterize(&source, &plan, OutputSize::Native, FilterType::Nearest);
        assert_eq!(bitmap.dimensions(), (256, 256));
        assert_eq!(*bitmap.get_pixel(0, 0), Rgba([0, 255, 0, 255]));
        assert_eq!(*bitmap.get_pixel(1, 1), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn export_encodes_png_with_metadata() {
        let state = with_scale(state_for(800, 400), 1.0);
        let source = RgbaImage::from_pixel(800, 400, Rgba([10, 20, 30, 255]));
        let options = ExportOptions {
            format: OutputFormat::Png,
            ..ExportOptions::default()
        };

        let payload = export(&state, &source, &options).expect("export");
        assert_eq!(payload.edge, 128);
        assert_eq!((payload.natural_width, payload.natural_height), (800, 400));
        assert!(payload.to_data_url().starts_with("data:image/png;base64,"));

        let decoded = image::load_from_memory(&payload.bytes).expect("decodable");
        assert_eq!((decoded.width(), decoded.height()), (128, 128));
    }

    #[test]
    fn jpeg_export_is_decodable() {
        let state = state_for(640, 480);
        let source = RgbaImage::from_pixel(640, 480, Rgba([90, 90, 90, 128]));
        let payload = export(&state, &source, &ExportOptions::default()).expect("export");
        assert_eq!(payload.format.mime_type(), "image/jpeg");
        assert_eq!(&payload.bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn flatten_blends_toward_background() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
        assert_eq!(*flatten(&image, LETTERBOX_FILL).get_pixel(0, 0), Rgb([255, 255, 255]));

        let opaque = RgbaImage::from_pixel(1, 1, Rgba([12, 34, 56, 255]));
        assert_eq!(*flatten(&opaque, LETTERBOX_FILL).get_pixel(0, 0), Rgb([12, 34, 56]));
    }

    #[test]
    fn output_options_parse() {
        assert_eq!("native".parse::<OutputSize>().ok(), Some(OutputSize::Native));
        assert_eq!("256".parse::<OutputSize>().ok(), Some(OutputSize::Fixed(256)));
        assert!("0".parse::<OutputSize>().is_err());
        assert!("big".parse::<OutputSize>().is_err());
        assert_eq!("PNG".parse::<OutputFormat>().ok(), Some(OutputFormat::Png));
        assert_eq!("jpg".parse::<OutputFormat>().ok(), Some(OutputFormat::default()));
        assert!("gif".parse::<OutputFormat>().is_err());
    }
}
