/// Failures of a long-lived stream, from connect to last line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// No credential is stored, so nothing was attempted.
    NoCredential,
    /// The server answered 401.
    Unauthorized,
    /// The server answered 429.
    RateLimited,
    /// Any other status, or the network gave up.
    Transport(String),
    /// One line was not a usable JSON event.
    MalformedLine(String),
    /// The server ended the body.
    Closed,
}

impl StreamError {
    /// Classify a non-success HTTP status.
    pub fn status(code: u16, reason: &str) -> Self {
        match code {
            401 => Self::Unauthorized,
            429 => Self::RateLimited,
            _ => Self::Transport(format!("HTTP {} {}", code, reason)),
        }
    }
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCredential => write!(f, "no lichess token available"),
            Self::Unauthorized => write!(f, "unauthorized: invalid or expired token"),
            Self::RateLimited => write!(f, "rate limited by lichess"),
            Self::Transport(s) => write!(f, "transport: {}", s),
            Self::MalformedLine(s) => write!(f, "malformed line: {}", s),
            Self::Closed => write!(f, "stream closed by server"),
        }
    }
}

impl std::error::Error for StreamError {}

impl From<serde_json::Error> for StreamError {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedLine(e.to_string())
    }
}

impl From<reqwest::Error> for StreamError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
