// End-to-end session scenarios: ingest, effects, undo/redo, save/load.

use std::io::Cursor;

use image::{DynamicImage, Rgba, RgbaImage};
use uuid::Uuid;

use photofe::error::EditorError;
use photofe::gateway::FilterGateway;
use photofe::ops::effects::Effect;
use photofe::session::SessionController;
use photofe::store::SnapshotStore;

struct TempStore {
    dir: std::path::PathBuf,
}

impl TempStore {
    fn new() -> Self {
        Self {
            dir: std::env::temp_dir().join(format!("photofe-session-{}", Uuid::new_v4())),
        }
    }

    fn open(&self) -> SnapshotStore {
        SnapshotStore::open(&self.dir).unwrap()
    }
}

impl Drop for TempStore {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

fn session(store: &TempStore) -> SessionController {
    SessionController::new(store.open(), FilterGateway::native())
}

/// PNG-encode a solid-colour image as upload bytes.
fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(rgba)));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
        .unwrap();
    buf
}

#[test]
fn ingest_grayscale_undo_redo_scenario() {
    let store = TempStore::new();
    let mut session = session(&store);

    // Ingest a 10x10 pure-red image -> history has 1 entry.
    session.ingest(&png_bytes(10, 10, [255, 0, 0, 255])).unwrap();
    assert!(session.is_active());
    assert_eq!(session.history().len(), 1);

    // Apply grayscale -> history has 2 entries, R=G=B everywhere.
    session.apply_effect(Effect::Grayscale).unwrap();
    assert_eq!(session.history().len(), 2);
    for px in session.canvas().image_data().chunks_exact(4) {
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }

    // Undo -> the original red image is current again.
    assert!(session.undo().unwrap());
    for px in session.canvas().image_data().chunks_exact(4) {
        assert_eq!(&px[..3], &[255, 0, 0]);
    }

    // Redo -> grayscale result restored.
    assert!(session.redo().unwrap());
    let gray = session.canvas().image_data()[0];
    for px in session.canvas().image_data().chunks_exact(4) {
        assert_eq!(&px[..3], &[gray, gray, gray]);
    }
}

#[test]
fn oversized_upload_is_rejected_without_state_change() {
    let store = TempStore::new();
    let mut session = session(&store);

    let six_mb = vec![0u8; 6 * 1024 * 1024];
    let err = session.ingest(&six_mb).unwrap_err();
    assert!(matches!(err, EditorError::TooLarge { .. }));
    assert!(!session.is_active());
    assert_eq!(session.history().len(), 0);
}

#[test]
fn undecodable_upload_is_rejected_without_state_change() {
    let store = TempStore::new();
    let mut session = session(&store);

    let err = session.ingest(b"definitely not an image").unwrap_err();
    assert!(matches!(err, EditorError::DecodeFailed(_)));
    assert!(!session.is_active());
    assert_eq!(session.history().len(), 0);
}

#[test]
fn effect_without_image_is_rejected() {
    let store = TempStore::new();
    let mut session = session(&store);

    let err = session.apply_effect(Effect::Sepia).unwrap_err();
    assert!(matches!(err, EditorError::NoImageLoaded));
}

#[test]
fn save_on_empty_session_leaves_store_unchanged() {
    let store = TempStore::new();
    let mut session = session(&store);

    let err = session.save().unwrap_err();
    assert!(matches!(err, EditorError::NothingToSave));
    assert!(session.saved_images().is_empty());
}

#[test]
fn save_round_trips_content_and_resets_session() {
    let store = TempStore::new();
    let mut session = session(&store);

    session.ingest(&png_bytes(8, 8, [0, 128, 255, 255])).unwrap();
    let displayed = session.canvas().snapshot().unwrap().content;

    let record = session.save().unwrap();
    assert_eq!(record.content, displayed);

    // Archive-and-start-fresh: session is reset after a successful save.
    assert!(!session.is_active());
    assert_eq!(session.history().len(), 0);

    // The persisted record round-trips byte-for-byte.
    let all = session.saved_images();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].content, displayed);
}

#[test]
fn load_saved_seeds_history_with_single_snapshot() {
    let store = TempStore::new();
    let mut session = session(&store);

    session.ingest(&png_bytes(8, 8, [40, 200, 10, 255])).unwrap();
    session.apply_effect(Effect::Invert).unwrap();
    let record = session.save().unwrap();

    session.load_saved(&record.content).unwrap();
    assert!(session.is_active());
    assert_eq!(session.history().len(), 1);
    // Loaded at native size, nothing to undo.
    assert!(!session.undo().unwrap());
}

#[test]
fn saved_images_are_newest_first() {
    let store = TempStore::new();
    let mut session = session(&store);

    for tone in [10u8, 20, 30] {
        session.ingest(&png_bytes(4, 4, [tone, tone, tone, 255])).unwrap();
        session.save().unwrap();
    }

    let records = session.saved_images();
    assert_eq!(records.len(), 3);
    assert!(records[0].id > records[1].id);
    assert!(records[1].id > records[2].id);
}

#[test]
fn ingest_replaces_active_session() {
    let store = TempStore::new();
    let mut session = session(&store);

    session.ingest(&png_bytes(10, 10, [255, 0, 0, 255])).unwrap();
    session.apply_effect(Effect::Invert).unwrap();
    assert_eq!(session.history().len(), 2);

    // Uploading a new image discards the previous timeline.
    session.ingest(&png_bytes(4, 4, [0, 255, 0, 255])).unwrap();
    assert_eq!(session.history().len(), 1);
    assert!(!session.undo().unwrap());
}

#[test]
fn remove_clears_canvas_and_history() {
    let store = TempStore::new();
    let mut session = session(&store);

    session.ingest(&png_bytes(10, 10, [255, 0, 0, 255])).unwrap();
    session.remove();
    assert!(!session.is_active());
    assert_eq!(session.history().len(), 0);
    // Placeholder dimensions restored.
    assert_eq!(session.canvas().width(), 800);
    assert_eq!(session.canvas().height(), 600);
}

#[test]
fn failed_filter_init_leaves_canvas_and_history_intact() {
    let store = TempStore::new();
    let gateway = FilterGateway::with_loader(Box::new(|| Err("module load failed".to_string())));
    let mut session = SessionController::new(store.open(), gateway);

    session.ingest(&png_bytes(6, 6, [9, 9, 9, 255])).unwrap();
    let before = session.canvas().image_data().to_vec();

    let err = session.apply_effect(Effect::SpectralGlow).unwrap_err();
    assert!(matches!(err, EditorError::FilterInitFailed(_)));
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.canvas().image_data(), &before[..]);

    // In-process effects still work without the collaborator.
    session.apply_effect(Effect::Invert).unwrap();
    assert_eq!(session.history().len(), 2);
}

#[test]
fn clear_saved_empties_the_gallery() {
    let store = TempStore::new();
    let mut session = session(&store);

    session.ingest(&png_bytes(4, 4, [1, 2, 3, 255])).unwrap();
    session.save().unwrap();
    assert_eq!(session.saved_images().len(), 1);

    assert_eq!(session.clear_saved().unwrap(), 1);
    assert!(session.saved_images().is_empty());
}
