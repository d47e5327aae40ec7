//! Live Lichess game monitoring with rate-limited engine suggestions.
//!
//! One global event stream announces games; every announced game gets its own
//! board stream, a replayed position, and throttled calls to an external
//! evaluation API. Everything observable leaves through the notification bus.
pub mod archive;
pub mod board;
pub mod bus;
pub mod config;
pub mod credential;
pub mod engine;
pub mod incoming;
pub mod lichess;
pub mod monitor;
pub mod ndjson;
pub mod throttle;
pub mod tracker;

#[cfg(test)]
mod testing;

use std::time::Duration;

// ============================================================================
// REMOTE ENDPOINTS
// ============================================================================
/// Base URL of the game server.
pub const LICHESS_URL: &str = "https://lichess.org";
/// Stockfish Online v2 evaluation endpoint.
pub const ENGINE_URL: &str = "https://stockfish.online/api/s/v2.php";

// ============================================================================
// STREAM RECOVERY
// Reconnect delay is min(BACKOFF_CEILING, 2^attempt * BACKOFF_BASE).
// ============================================================================
/// Unit delay doubled on each consecutive failure.
pub const BACKOFF_BASE: Duration = Duration::from_secs(1);
/// Upper bound on a single reconnect delay.
pub const BACKOFF_CEILING: Duration = Duration::from_secs(30);

// ============================================================================
// ANALYSIS
// ============================================================================
/// Minimum spacing between two evaluation calls for the same game.
pub const ANALYZE_INTERVAL: Duration = Duration::from_millis(800);
/// The scorer refuses anything deeper.
pub const MAX_DEPTH: u8 = 20;
/// Depth used for live games.
pub const DEFAULT_DEPTH: u8 = 15;
/// Shallow depth for quick one-off lookups.
pub const QUICK_DEPTH: u8 = 5;
/// Depth for suggestions in someone's game in progress.
pub const CURRENT_DEPTH: u8 = 6;

// ============================================================================
// STORAGE & FAN-OUT
// ============================================================================
/// Storage key holding the bearer credential.
pub const TOKEN_KEY: &str = "lichess_token";
/// Default credential file.
pub const STORAGE_PATH: &str = "chessassist.json";
/// How often the credential file is re-read for writes by other processes.
pub const STORAGE_POLL: Duration = Duration::from_secs(2);
/// Notifications buffered per slow subscriber before it starts lagging.
pub const BUS_CAPACITY: usize = 256;
/// Hard cap the server applies to one past-games export.
pub const ARCHIVE_MAX_GAMES: usize = 300;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (stderr + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to stderr.
/// Stdout stays free for the JSON control protocol.
#[cfg(feature = "cli")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
