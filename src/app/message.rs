// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/message.rs
//
// Crop tool messages: pointer input, layout and decode completions.

use crate::app::source::SourceImage;
use crate::domain::crop::CropResult;
use crate::domain::geometry::{Point, Size};

#[derive(Debug)]
pub enum CropMessage {
    // Layout.
    ContainerMeasured(Size),

    // Decode completion; `generation` is the token returned by `begin_open`.
    ImageDecoded {
        generation: u64,
        result: CropResult<SourceImage>,
    },

    // Pointer input, viewport coordinates. Moves and releases are delivered
    // from anywhere on screen while a drag is live.
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    // Window lost focus or the button was released outside it.
    PointerCancel,

    // Explicit cancel.
    Close,
}
