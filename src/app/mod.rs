// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/mod.rs
//
// Crop tool: owns the engine state for one open image and talks to the
// decode and persistence boundaries.

pub mod message;
pub mod model;
pub mod persist;
pub mod preview;
pub mod source;
mod update;
