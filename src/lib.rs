// SPDX-License-Identifier: GPL-3.0-or-later
// src/lib.rs
//
// Avatar crop engine: pan/zoom a source image inside a fixed viewport, move a
// fixed circular crop region, and rasterize exactly what the circle shows.

pub mod app;
pub mod cli;
pub mod config;
pub mod constant;
pub mod domain;

pub use app::message::CropMessage;
pub use app::model::{CropTool, ToolPhase};
pub use app::persist::{FilePersister, Persister};
pub use app::source::SourceImage;
pub use config::AppConfig;
pub use domain::crop::{CropPayload, CropResult, CropState, ExportOptions, OutputFormat, OutputSize};
