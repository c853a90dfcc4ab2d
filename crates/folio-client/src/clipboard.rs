//! Clipboard access used by copy buttons.

/// Error returned when the clipboard rejects a write.
#[derive(Debug, thiserror::Error)]
#[error("Clipboard write failed: {0}")]
pub struct ClipboardError(pub String);

/// Text clipboard.
pub trait Clipboard {
    /// Replace the clipboard contents with `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the clipboard is unavailable or denies access.
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard that records writes in memory.
#[derive(Debug, Default)]
pub struct RecordingClipboard {
    writes: Vec<String>,
    deny: bool,
}

impl RecordingClipboard {
    /// Create an empty clipboard that accepts writes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clipboard that rejects every write.
    #[must_use]
    pub fn denied() -> Self {
        Self {
            writes: Vec::new(),
            deny: true,
        }
    }

    /// Accepted writes, oldest first.
    #[must_use]
    pub fn writes(&self) -> &[String] {
        &self.writes
    }
}

impl Clipboard for RecordingClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.deny {
            return Err(ClipboardError("permission denied".to_owned()));
        }
        self.writes.push(text.to_owned());
        Ok(())
    }
}
