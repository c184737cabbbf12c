// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/persist.rs
//
// Persistence seam: where an exported avatar goes after save.

use std::path::PathBuf;

use anyhow::Context;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use crate::domain::crop::{CropPayload, CropResult, OutputFormat};

/// Receives the exported avatar. The crop tool awaits the returned future
/// but never retries and never interprets a failure beyond logging it.
pub trait Persister: Send + Sync {
    fn persist(&self, payload: CropPayload) -> BoxFuture<'_, CropResult<()>>;
}

/// Writes the encoded avatar to `<dir>/<stem>.<ext>`.
#[derive(Debug, Clone)]
pub struct FilePersister {
    dir: PathBuf,
    stem: String,
}

impl FilePersister {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
        }
    }

    /// File the payload lands in for `format`.
    pub fn target(&self, format: OutputFormat) -> PathBuf {
        self.dir.join(format!("{}.{}", self.stem, format.extension()))
    }
}

impl Persister for FilePersister {
    fn persist(&self, payload: CropPayload) -> BoxFuture<'_, CropResult<()>> {
        async move {
            tokio::fs::create_dir_all(&self.dir)
                .await
                .with_context(|| format!("failed to create {}", self.dir.display()))?;

            let path = self.target(payload.format);
            tokio::fs::write(&path, &payload.bytes)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;

            log::info!(
                "saved {} ({} bytes, {}x{} from source square x={:.1} y={:.1} size={:.1} of {}x{})",
                path.display(),
                payload.bytes.len(),
                payload.edge,
                payload.edge,
                payload.source.x,
                payload.source.y,
                payload.source.size,
                payload.natural_width,
                payload.natural_height,
            );
            Ok(())
        }
        .boxed()
    }
}
