// ============================================================================
// ERROR TYPES — session and store failure taxonomy
// ============================================================================
//
// Every operation either fully applies its state changes or none of them;
// these errors carry enough context to report the failure to the user layer.

/// Error type for durable snapshot store operations.
#[derive(Debug)]
pub enum StoreError {
    /// The underlying storage engine could not be opened.
    Unavailable(String),
    /// A write transaction aborted (disk full, permissions, serialization).
    WriteFailed(String),
    /// A stored record exists but cannot be read back.
    Corrupt(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(e) => write!(f, "storage unavailable: {}", e),
            StoreError::WriteFailed(e) => write!(f, "storage write failed: {}", e),
            StoreError::Corrupt(e) => write!(f, "corrupt record: {}", e),
        }
    }
}

/// Error type for session-level editing operations.
#[derive(Debug)]
pub enum EditorError {
    /// Uploaded file exceeds the size limit. No state was changed.
    TooLarge { size: usize, limit: usize },
    /// An effect was requested with no active image.
    NoImageLoaded,
    /// Save was requested with no active image.
    NothingToSave,
    /// Uploaded bytes are not a decodable image.
    DecodeFailed(String),
    /// The current canvas could not be encoded into a snapshot.
    EncodeFailed(String),
    /// The external filter collaborator failed to load.
    FilterInitFailed(String),
    /// A pixel buffer did not match the expected 4 * width * height length.
    BufferSize { expected: usize, got: usize },
    /// Durable store failure. The in-memory session remains valid.
    Store(StoreError),
}

impl std::fmt::Display for EditorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditorError::TooLarge { size, limit } => write!(
                f,
                "image is {:.1} MB, above the {} MB limit",
                *size as f64 / (1024.0 * 1024.0),
                limit / (1024 * 1024)
            ),
            EditorError::NoImageLoaded => write!(f, "no image loaded"),
            EditorError::NothingToSave => write!(f, "nothing to save"),
            EditorError::DecodeFailed(e) => write!(f, "image decode failed: {}", e),
            EditorError::EncodeFailed(e) => write!(f, "snapshot encode failed: {}", e),
            EditorError::FilterInitFailed(e) => write!(f, "filter module failed to load: {}", e),
            EditorError::BufferSize { expected, got } => write!(
                f,
                "pixel buffer length mismatch: expected {} bytes, got {}",
                expected, got
            ),
            EditorError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl From<StoreError> for EditorError {
    fn from(e: StoreError) -> Self {
        EditorError::Store(e)
    }
}
