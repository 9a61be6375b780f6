use serde::{Deserialize, Serialize};

/// What a producer wrote into a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkSummary {
    /// Lines written, header included.
    pub lines: u64,
    pub bytes: u64,
    /// Hex-encoded SHA-256 of the written bytes.
    pub sha256: String,
}

impl SinkSummary {
    /// Data rows written, i.e. lines minus the header.
    pub fn rows(&self) -> u64 {
        self.lines.saturating_sub(1)
    }
}
