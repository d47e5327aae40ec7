/// The scorer could not be reached or did not answer with JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    Transport(String),
    Status(u16),
    Body(String),
}

impl std::fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(s) => write!(f, "engine unreachable: {}", s),
            Self::Status(code) => write!(f, "engine answered HTTP {}", code),
            Self::Body(s) => write!(f, "engine answered garbage: {}", s),
        }
    }
}

impl std::error::Error for EvaluationError {}

impl From<reqwest::Error> for EvaluationError {
    fn from(e: reqwest::Error) -> Self {
        match e.is_decode() {
            true => Self::Body(e.to_string()),
            false => Self::Transport(e.to_string()),
        }
    }
}
