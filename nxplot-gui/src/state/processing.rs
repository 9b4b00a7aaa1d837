//! State of background file access.

/// Tracks the state of background reads.
pub struct ProcessingState {
    /// Whether a file or group is being read.
    pub is_loading: bool,
    /// User-facing status message.
    pub status_text: String,
}

impl Default for ProcessingState {
    fn default() -> Self {
        Self {
            is_loading: false,
            status_text: "Ready".to_string(),
        }
    }
}

impl ProcessingState {
    /// Marks a read as started.
    pub fn start(&mut self, text: impl Into<String>) {
        self.is_loading = true;
        self.status_text = text.into();
    }

    /// Marks the read as finished with a final message.
    pub fn finish(&mut self, text: impl Into<String>) {
        self.is_loading = false;
        self.status_text = text.into();
    }
}
