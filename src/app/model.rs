// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/model.rs
//
// Crop tool state.

use crate::app::source::SourceImage;
use crate::domain::crop::{CropSettings, CropState, DragSession, Viewport};

// =============================================================================
// Enums
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolPhase {
    /// Not shown.
    Closed,
    /// Open, waiting for the decode or for a container measurement.
    Loading,
    /// Open with a decoded image and initialized geometry.
    Ready,
    /// Open, but the image could not be decoded. Only cancel is useful.
    Failed,
}

// =============================================================================
// Model
// =============================================================================

/// One crop tool instance. Owns every piece of mutable crop state.
pub struct CropTool {
    pub(crate) settings: CropSettings,

    // Lifecycle.
    pub(crate) open: bool,
    pub(crate) generation: u64,

    // Inputs.
    pub(crate) container: Option<Viewport>,
    pub(crate) source: Option<SourceImage>,

    // Interaction.
    pub(crate) state: Option<CropState>,
    pub(crate) session: DragSession,

    // UI state.
    pub(crate) error: Option<String>,
}

impl CropTool {
    pub fn new(settings: CropSettings) -> Self {
        Self {
            settings,
            open: false,
            generation: 0,
            container: None,
            source: None,
            state: None,
            session: DragSession::Idle,
            error: None,
        }
    }

    /// Open the tool for a new image and return the token its decode
    /// completion must carry. Everything from a previous image is dropped.
    pub fn begin_open(&mut self) -> u64 {
        self.reset();
        self.open = true;
        self.generation += 1;
        log::debug!("crop tool opened (generation {})", self.generation);
        self.generation
    }

    pub fn phase(&self) -> ToolPhase {
        if !self.open {
            ToolPhase::Closed
        } else if self.state.is_some() {
            ToolPhase::Ready
        } else if self.error.is_some() {
            ToolPhase::Failed
        } else {
            ToolPhase::Loading
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn state(&self) -> Option<&CropState> {
        self.state.as_ref()
    }

    pub fn session(&self) -> DragSession {
        self.session
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error<S: Into<String>>(&mut self, msg: S) {
        self.error = Some(msg.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Drop image, geometry, drag and error. The container measurement is
    /// layout, not crop state, and survives.
    pub fn reset(&mut self) {
        self.source = None;
        self.state = None;
        self.session = DragSession::Idle;
        self.error = None;
    }

    pub fn close(&mut self) {
        self.reset();
        self.open = false;
        log::debug!("crop tool closed");
    }

    /// Compute fresh geometry once the tool is open, the image is decoded
    /// and the container is measured. Otherwise wait.
    pub(crate) fn try_initialize(&mut self) {
        let (true, Some(viewport), Some(source)) = (self.open, self.container, &self.source) else {
            return;
        };
        self.session = DragSession::Idle;
        self.state = Some(CropState::initial(
            viewport,
            source.natural_size(),
            &self.settings,
        ));
    }
}

impl Default for CropTool {
    fn default() -> Self {
        Self::new(CropSettings::default())
    }
}
