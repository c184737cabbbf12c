// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/update.rs
//
// Message routing for the crop tool, plus the save sequence.

use anyhow::bail;

use crate::app::message::CropMessage;
use crate::app::model::CropTool;
use crate::app::persist::Persister;
use crate::domain::crop::export::export;
use crate::domain::crop::{CropResult, DragSession, ExportOptions, Viewport, drag_to};
use crate::domain::geometry::Point;

impl CropTool {
    pub fn update(&mut self, message: CropMessage) {
        match message {
            CropMessage::ContainerMeasured(size) => {
                let measured = Viewport::measure(size);
                if measured.is_none() {
                    log::debug!("container not laid out yet ({}x{})", size.width, size.height);
                }
                if measured != self.container {
                    self.container = measured;
                    self.state = None;
                    self.try_initialize();
                }
            }

            CropMessage::ImageDecoded { generation, result } => {
                if !self.open || generation != self.generation {
                    log::debug!(
                        "ignoring stale decode (generation {generation}, current {})",
                        self.generation
                    );
                    return;
                }
                match result {
                    Ok(source) => {
                        log::debug!("decoded {source:?}");
                        self.source = Some(source);
                        self.clear_error();
                        self.try_initialize();
                    }
                    Err(e) => {
                        log::error!("Failed to decode avatar source: {e:#}");
                        self.source = None;
                        self.state = None;
                        self.set_error(format!("{e:#}"));
                    }
                }
            }

            CropMessage::PointerDown(pointer) => self.pointer_down(pointer),

            CropMessage::PointerMove(pointer) => {
                let Some(state) = self.state else {
                    return;
                };
                if !self.session.is_active() {
                    return;
                }
                let (state, session) = drag_to(state, self.session, pointer, &self.settings);
                self.state = Some(state);
                self.session = session;
            }

            CropMessage::PointerUp | CropMessage::PointerCancel => {
                if self.session.is_active() {
                    log::debug!("drag ended ({:?})", self.session.mode());
                }
                self.session = DragSession::Idle;
            }

            CropMessage::Close => self.close(),
        }
    }

    fn pointer_down(&mut self, pointer: Point) {
        // One session per gesture.
        if self.session.is_active() {
            return;
        }
        let Some(state) = self.state else {
            return;
        };
        self.session = DragSession::begin(
            pointer,
            state.viewport.bounds(),
            &state.region,
            &state.transform,
            self.settings.handle_hit_size,
        );
        log::debug!("drag started at ({}, {}): {:?}", pointer.x, pointer.y, self.session.mode());
    }

    /// Export the current crop, hand it to `persister`, then reset and close.
    ///
    /// Fails without closing when there is nothing to export or encoding
    /// fails. A persister failure is logged and does not stop the close.
    pub async fn save(&mut self, persister: &dyn Persister, options: &ExportOptions) -> CropResult<()> {
        let (Some(state), Some(source)) = (self.state, self.source.as_ref()) else {
            bail!("no decoded image to save");
        };

        let payload = export(&state, source.pixels(), options)?;

        if let Err(e) = persister.persist(payload).await {
            log::error!("Failed to persist avatar: {e:#}");
        }

        self.close();
        Ok(())
    }
}
