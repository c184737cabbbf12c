// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/mod.rs
//
// Pure domain model: geometry and the crop engine. No I/O, no async.

pub mod crop;
pub mod geometry;
