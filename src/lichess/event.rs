use super::GameId;
use super::StreamError;
use serde_json::Value;

/// Classification of an account-wide event by its `type` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    GameStart,
    GameFull,
    GameFinish,
    Challenge,
    ChallengeCanceled,
    Other(String),
}

impl From<&str> for EventKind {
    fn from(s: &str) -> Self {
        match s {
            "gameStart" => Self::GameStart,
            "gameFull" => Self::GameFull,
            "gameFinish" => Self::GameFinish,
            "challenge" => Self::Challenge,
            "challengeCanceled" => Self::ChallengeCanceled,
            other => Self::Other(other.to_string()),
        }
    }
}

/// One line of the incoming events stream.
/// Consumed as soon as it is classified; the raw payload is kept for
/// events that are only forwarded.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalEvent {
    pub kind: EventKind,
    pub game: Option<GameId>,
    pub payload: Value,
}

impl GlobalEvent {
    /// Whether this event announces a game that may need a board stream.
    pub fn starts(&self) -> bool {
        matches!(self.kind, EventKind::GameStart | EventKind::GameFull)
    }
    pub fn finishes(&self) -> bool {
        matches!(self.kind, EventKind::GameFinish)
    }
}

impl TryFrom<&str> for GlobalEvent {
    type Error = StreamError;
    fn try_from(line: &str) -> Result<Self, Self::Error> {
        let payload = serde_json::from_str::<Value>(line)?;
        let kind = payload
            .get("type")
            .and_then(Value::as_str)
            .map(EventKind::from)
            .ok_or_else(|| StreamError::MalformedLine(format!("untyped event: {}", line)))?;
        let game = payload
            .get("game")
            .and_then(|g| g.get("id").or_else(|| g.get("gameId")))
            .and_then(Value::as_str)
            .map(GameId::from);
        Ok(Self {
            kind,
            game,
            payload,
        })
    }
}
