// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop/mod.rs
//
// Avatar crop engine: viewport model, drag state machine, rasterization.

pub mod export;
pub mod interaction;
pub mod region;
pub mod session;
pub mod settings;
pub mod transform;
pub mod viewport;

pub use export::{CropPayload, CropPlan, ExportOptions, OutputFormat, OutputSize, SourceRect};
pub use interaction::{CropState, apply_move_crop_region, apply_pan, apply_resize, drag_to};
pub use region::CropRegion;
pub use session::{Corner, DragMode, DragSession};
pub use settings::CropSettings;
pub use transform::ImageTransform;
pub use viewport::Viewport;

/// Result type shared by the fallible edges of the engine.
pub type CropResult<T> = anyhow::Result<T>;
