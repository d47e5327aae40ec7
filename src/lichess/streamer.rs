use super::GameId;
use super::StreamError;
use crate::ndjson::Lines;
use crate::ndjson::lines;

/// Which long-lived endpoint to open.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// Account-wide incoming events.
    Events,
    /// Moves, clocks and chat of one game.
    Board(GameId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Events => "/api/stream/event".to_string(),
            Self::Board(id) => format!("/api/board/game/stream/{}", id),
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Events => write!(f, "event stream"),
            Self::Board(id) => write!(f, "board stream {}", id),
        }
    }
}

/// Opens authenticated NDJSON streams.
///
/// Resolves once the response head has arrived: a non-success status is an
/// error here, never a line. The returned lines end when the body does.
#[async_trait::async_trait]
pub trait Streamer: Send + Sync {
    async fn open(&self, route: &Route, token: &str) -> Result<Lines, StreamError>;
}

/// [`Streamer`] over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpStreamer {
    http: reqwest::Client,
    base: String,
}

impl HttpStreamer {
    pub fn new(base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Streamer for HttpStreamer {
    async fn open(&self, route: &Route, token: &str) -> Result<Lines, StreamError> {
        let url = format!("{}{}", self.base, route.path());
        log::debug!("connecting {} at {}", route, url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/x-ndjson")
            .send()
            .await?;
        let status = response.status();
        match status.is_success() {
            true => Ok(lines(response.bytes_stream())),
            false => Err(StreamError::status(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
            )),
        }
    }
}
