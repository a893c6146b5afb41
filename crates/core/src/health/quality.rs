//! Latency buckets shown next to the connection indicator

use std::fmt;

/// Coarse connection quality derived from probe latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionQuality {
    Unknown,
    Excellent,
    Good,
    Poor,
    Bad,
}

impl ConnectionQuality {
    /// Bucket a latency in milliseconds; `None` means no probe has completed.
    pub const fn from_latency(latency_ms: Option<u64>) -> Self {
        match latency_ms {
            None => Self::Unknown,
            Some(ms) if ms < 100 => Self::Excellent,
            Some(ms) if ms < 300 => Self::Good,
            Some(ms) if ms < 1000 => Self::Poor,
            Some(_) => Self::Bad,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Poor => "poor",
            Self::Bad => "bad",
        }
    }
}

impl fmt::Display for ConnectionQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
