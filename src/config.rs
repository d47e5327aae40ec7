use crate::ANALYZE_INTERVAL;
use crate::DEFAULT_DEPTH;
use crate::ENGINE_URL;
use crate::LICHESS_URL;
use crate::STORAGE_PATH;
use crate::engine::StockfishOnline;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime knobs. Defaults point at the public services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub lichess_url: String,
    pub engine_url: String,
    pub depth: u8,
    pub interval: Duration,
    pub storage: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lichess_url: LICHESS_URL.to_string(),
            engine_url: ENGINE_URL.to_string(),
            depth: DEFAULT_DEPTH,
            interval: ANALYZE_INTERVAL,
            storage: PathBuf::from(STORAGE_PATH),
        }
    }
}

impl Settings {
    /// Same settings at another depth, kept within what the scorer accepts.
    pub fn with_depth(self, depth: u8) -> Self {
        Self {
            depth: StockfishOnline::clamp(depth),
            ..self
        }
    }
}
