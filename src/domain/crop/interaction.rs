// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop/interaction.rs
//
// Crop state record and the pure update functions driven by pointer moves.

use super::region::CropRegion;
use super::session::DragSession;
use super::settings::CropSettings;
use super::transform::ImageTransform;
use super::viewport::Viewport;
use crate::domain::geometry::{Point, Size};

/// Everything one open crop tool mutates while the user drags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropState {
    pub viewport: Viewport,
    pub region: CropRegion,
    pub transform: ImageTransform,
}

impl CropState {
    /// Fresh state for an image of `natural` pixels. Nothing carries over
    /// from any previous image.
    pub fn initial(viewport: Viewport, natural: Size, settings: &CropSettings) -> Self {
        let (region, transform) = viewport.initialize(natural, settings);
        Self {
            viewport,
            region,
            transform,
        }
    }
}

/// Move the region so the grabbed point follows the pointer, clamped to the
/// container.
pub fn apply_move_crop_region(state: CropState, pointer: Point, grab: Point) -> CropState {
    CropState {
        region: state
            .region
            .moved_to(pointer - grab, state.viewport.size()),
        ..state
    }
}

/// Pan by the pointer travel since `last`.
pub fn apply_pan(state: CropState, pointer: Point, last: Point) -> CropState {
    CropState {
        transform: state.transform.panned_by(pointer - last),
        ..state
    }
}

/// Zoom from `start_scale` by the pointer travel since `origin`.
///
/// Magnitude is the larger axis travel; only the horizontal sign decides
/// between growing and shrinking. Every corner uses this same formula.
pub fn apply_resize(
    state: CropState,
    pointer: Point,
    origin: Point,
    start_scale: f32,
    sensitivity: f32,
) -> CropState {
    let delta_x = pointer.x - origin.x;
    let delta_y = pointer.y - origin.y;
    let delta = delta_x.abs().max(delta_y.abs());
    let step = delta * sensitivity;
    let scale = if delta_x > 0.0 {
        start_scale + step
    } else {
        start_scale - step
    };

    CropState {
        transform: state.transform.with_scale(scale),
        ..state
    }
}

/// Apply one pointer move for the live `session`.
///
/// Returns the new state and the session to keep; only panning advances its
/// anchor.
pub fn drag_to(
    state: CropState,
    session: DragSession,
    pointer: Point,
    settings: &CropSettings,
) -> (CropState, DragSession) {
    match session {
        DragSession::Idle => (state, session),
        DragSession::MovingCropRegion { grab } => {
            (apply_move_crop_region(state, pointer, grab), session)
        }
        DragSession::PanningImage { last } => (
            apply_pan(state, pointer, last),
            DragSession::PanningImage { last: pointer },
        ),
        DragSession::ResizingImage {
            origin,
            start_scale,
            ..
        } => (
            apply_resize(state, pointer, origin, start_scale, settings.resize_sensitivity),
            session,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::SCALE_EPSILON;
    use crate::domain::crop::session::Corner;

    fn state() -> CropState {
        let viewport = Viewport::measure(Size::new(400.0, 300.0)).expect("measured");
        CropState::initial(viewport, Size::new(800.0, 400.0), &CropSettings::default())
    }

    #[test]
    fn move_clamps_x_and_keeps_y() {
        let start = state();
        assert_eq!(start.region.origin(), Point::new(136.0, 86.0));

        // Grab the exact top-left, then drag by (300, 10).
        let moved = apply_move_crop_region(start, Point::new(436.0, 96.0), Point::ORIGIN);
        assert_eq!(moved.region.origin(), Point::new(272.0, 96.0));
        assert_eq!(moved.transform, start.transform);
    }

    #[test]
    fn move_sequence_stays_in_container() {
        let mut current = state();
        let container = current.viewport.size();
        let grab = Point::new(64.0, 64.0);
        let pointers = [
            (-500.0, 40.0),
            (120.0, -90.0),
            (999.0, 999.0),
            (200.0, 150.0),
            (400.0, 0.0),
            (0.0, 300.0),
        ];

        for (x, y) in pointers {
            current = apply_move_crop_region(current, Point::new(x, y), grab);
            let region = current.region;
            assert!(
                region.x >= 0.0
                    && region.y >= 0.0
                    && region.x <= container.width - region.size
                    && region.y <= container.height - region.size,
                "{region:?}"
            );
        }
    }

    #[test]
    fn pan_composes_incrementally() {
        let settings = CropSettings::default();
        let mut current = state();
        let mut session = DragSession::PanningImage {
            last: Point::new(10.0, 10.0),
        };

        for pointer in [Point::new(15.0, 12.0), Point::new(25.0, 4.0), Point::new(20.0, 4.0)] {
            (current, session) = drag_to(current, session, pointer, &settings);
        }

        assert_eq!(current.transform.offset, Point::new(10.0, -6.0));
        assert_eq!(
            session,
            DragSession::PanningImage {
                last: Point::new(20.0, 4.0)
            }
        );
    }

    #[test]
    fn resize_uses_larger_axis_and_horizontal_sign() {
        let mut start = state();
        start.transform = start.transform.with_scale(1.0);

        let grown = apply_resize(start, Point::new(100.0, -20.0), Point::ORIGIN, 1.0, 0.005);
        assert!((grown.transform.scale - 1.5).abs() < SCALE_EPSILON);

        // Vertical travel dominates but the horizontal sign is negative: shrink.
        let shrunk = apply_resize(start, Point::new(-10.0, 80.0), Point::ORIGIN, 1.0, 0.005);
        assert!((shrunk.transform.scale - 0.6).abs() < SCALE_EPSILON);

        // No horizontal travel at all also shrinks.
        let straight_down = apply_resize(start, Point::new(0.0, 40.0), Point::ORIGIN, 1.0, 0.005);
        assert!((straight_down.transform.scale - 0.8).abs() < SCALE_EPSILON);
    }

    #[test]
    fn resize_is_clamped() {
        let settings = CropSettings::default();
        let start = state();
        let origin = Point::new(264.0, 214.0);
        let session = DragSession::ResizingImage {
            corner: Corner::BottomRight,
            origin,
            start_scale: start.transform.scale,
        };

        for dx in [-2000.0, -300.0, -1.0, 0.0, 1.0, 50.0, 700.0, 5000.0] {
            let (next, kept) = drag_to(start, session, Point::new(origin.x + dx, origin.y), &settings);
            assert!(next.transform.scale >= settings.min_scale);
            assert!(next.transform.scale <= settings.max_scale);
            assert_eq!(kept, session);
        }
    }

    #[test]
    fn every_corner_zooms_the_same() {
        let settings = CropSettings::default();
        let start = state();
        let origin = Point::new(100.0, 100.0);
        let pointer = Point::new(140.0, 90.0);

        let scales: Vec<f32> = Corner::ALL
            .into_iter()
            .map(|corner| {
                let session = DragSession::ResizingImage {
                    corner,
                    origin,
                    start_scale: 1.0,
                };
                drag_to(start, session, pointer, &settings).0.transform.scale
            })
            .collect();

        assert!(scales.iter().all(|s| (s - 1.2).abs() < SCALE_EPSILON), "{scales:?}");
    }

    #[test]
    fn idle_session_changes_nothing() {
        let settings = CropSettings::default();
        let start = state();
        let (next, session) = drag_to(start, DragSession::Idle, Point::new(5.0, 5.0), &settings);
        assert_eq!(next, start);
        assert_eq!(session, DragSession::Idle);
    }
}
