use uuid::Uuid;

use crate::canvas::CanvasSurface;
use crate::components::history::{DEFAULT_HISTORY_BOUND, EditHistory};
use crate::error::EditorError;
use crate::gateway::FilterGateway;
use crate::ops::effects::{self, BLUR_SIGMA, Effect};
use crate::store::{SavedRecord, SnapshotStore};

/// Maximum accepted upload size in bytes (5 MB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Tunables for a session. Defaults reflect the product behavior: 20
/// history steps, 5 MB uploads.
#[derive(Clone, Copy)]
pub struct SessionConfig {
    pub history_bound: usize,
    pub max_upload_bytes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_bound: DEFAULT_HISTORY_BOUND,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

// ============================================================================
// SESSION CONTROLLER — orchestrates canvas, history, gateway and store
// ============================================================================

/// One editing session. Owns the drawing surface, the undo/redo history,
/// the filter gateway and the snapshot store; the only component that
/// touches both history and store.
///
/// Every operation either fully applies its state changes or none of them:
/// results are computed (and snapshots encoded) before any state is
/// committed.
pub struct SessionController {
    pub id: Uuid,
    canvas: CanvasSurface,
    history: EditHistory,
    gateway: FilterGateway,
    store: SnapshotStore,
    active: bool,
    config: SessionConfig,
}

impl SessionController {
    pub fn new(store: SnapshotStore, gateway: FilterGateway) -> Self {
        Self::with_config(store, gateway, SessionConfig::default())
    }

    pub fn with_config(store: SnapshotStore, gateway: FilterGateway, config: SessionConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            canvas: CanvasSurface::new(),
            history: EditHistory::new(config.history_bound),
            gateway,
            store,
            active: false,
            config,
        }
    }

    /// True while an image is loaded on the canvas.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn canvas(&self) -> &CanvasSurface {
        &self.canvas
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    // ------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------

    /// Load an uploaded image into the session.
    ///
    /// Rejects files above the size limit (`TooLarge`) and undecodable
    /// bytes (`DecodeFailed`) without touching any state. On success the
    /// image is scaled to fit the viewport, rendered, and the history is
    /// re-seeded with the initial snapshot. Replaces any active image.
    pub fn ingest(&mut self, bytes: &[u8]) -> Result<(), EditorError> {
        if bytes.len() > self.config.max_upload_bytes {
            return Err(EditorError::TooLarge {
                size: bytes.len(),
                limit: self.config.max_upload_bytes,
            });
        }

        let decoded = image::load_from_memory(bytes)
            .map_err(|e| EditorError::DecodeFailed(e.to_string()))?;
        let scaled = CanvasSurface::scale_to_fit(&decoded);

        // Encode the initial snapshot before committing anything.
        let snapshot = crate::canvas::encode_png(&scaled)
            .map(|content| {
                crate::components::history::Snapshot::new(content, scaled.width(), scaled.height())
            })?;

        if self.active {
            self.remove();
        }
        crate::log_info!(
            "session {}: ingested {} bytes -> {}x{}",
            self.id,
            bytes.len(),
            scaled.width(),
            scaled.height()
        );
        self.canvas.set(scaled);
        self.history.reset();
        self.history.push(snapshot);
        self.active = true;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Effects
    // ------------------------------------------------------------------

    /// Apply an effect to the current canvas and push the result onto the
    /// history. `NoImageLoaded` when no image is active; on any failure
    /// neither canvas nor history changes.
    pub fn apply_effect(&mut self, effect: Effect) -> Result<(), EditorError> {
        if !self.active {
            return Err(EditorError::NoImageLoaded);
        }

        let (w, h) = (self.canvas.width(), self.canvas.height());
        let result = if effect.requires_module() {
            self.gateway.dispatch(effect, self.canvas.image_data(), w, h)?
        } else {
            match effect {
                Effect::Invert => effects::invert(self.canvas.image_data(), w, h),
                Effect::Blur => effects::gaussian_blur(self.canvas.image_data(), w, h, BLUR_SIGMA),
                _ => unreachable!("requires_module() covers the remaining effects"),
            }
        };

        // Encode the result snapshot before mutating the surface.
        let snapshot = crate::canvas::encode_png(
            &image::RgbaImage::from_raw(w, h, result.clone()).ok_or(EditorError::BufferSize {
                expected: (w * h * 4) as usize,
                got: result.len(),
            })?,
        )
        .map(|content| crate::components::history::Snapshot::new(content, w, h))?;

        self.canvas.put_image_data(&result)?;
        self.history.push(snapshot);
        crate::log_info!("session {}: applied {}", self.id, effect);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Undo / redo
    // ------------------------------------------------------------------

    /// Step back one edit and re-render. Returns `Ok(false)` when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        match self.history.undo() {
            Some(snapshot) => {
                self.canvas.restore(snapshot)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Restore the most recently undone edit and re-render. Returns
    /// `Ok(false)` when the redo stack is empty.
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        match self.history.redo() {
            Some(snapshot) => {
                self.canvas.restore(snapshot)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Archive the current display state to the snapshot store and start
    /// fresh: on success the session is reset (history cleared, image
    /// removed). `NothingToSave` when no image is active; on a store
    /// failure the in-memory session remains intact and usable.
    pub fn save(&mut self) -> Result<SavedRecord, EditorError> {
        if !self.active {
            return Err(EditorError::NothingToSave);
        }
        let snapshot = self.canvas.snapshot()?;
        let record = self.store.put(&snapshot)?;
        self.remove();
        Ok(record)
    }

    /// Load previously saved content into a fresh session: clears the
    /// active session, renders the content at its native size, and
    /// re-seeds history with that single snapshot.
    pub fn load_saved(&mut self, content: &[u8]) -> Result<(), EditorError> {
        let decoded = image::load_from_memory(content)
            .map_err(|e| EditorError::DecodeFailed(e.to_string()))?;
        let bitmap = decoded.to_rgba8();
        let snapshot = crate::canvas::encode_png(&bitmap)
            .map(|c| crate::components::history::Snapshot::new(c, bitmap.width(), bitmap.height()))?;

        self.remove();
        self.canvas.set(bitmap);
        self.history.push(snapshot);
        self.active = true;
        Ok(())
    }

    /// Clear the surface back to the placeholder, reset the history, and
    /// drop the active image reference.
    pub fn remove(&mut self) {
        self.canvas.clear_to_placeholder();
        self.history.reset();
        self.active = false;
    }

    /// Gallery enumeration: saved records sorted newest-first.
    pub fn saved_images(&self) -> Vec<SavedRecord> {
        let mut records = self.store.get_all();
        records.sort_by(|a, b| b.id.cmp(&a.id));
        records
    }

    /// Destroy all saved records. Confirmation is the caller's job.
    pub fn clear_saved(&mut self) -> Result<usize, EditorError> {
        Ok(self.store.clear()?)
    }
}
