use super::StreamError;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// Cumulative game progress. `moves` is the whole game so far, never a delta.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    #[serde(default)]
    pub moves: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wtime: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub btime: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winc: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binc: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
}

impl GameState {
    pub fn moves(&self) -> Vec<&str> {
        self.moves.split_whitespace().collect()
    }
}

/// First line of every board stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameFull {
    #[serde(default)]
    pub initial_fen: Option<String>,
    #[serde(default)]
    pub state: GameState,
}

impl GameFull {
    /// Explicit starting position, if the game did not start from the standard one.
    pub fn initial(&self) -> Option<&str> {
        self.initial_fen
            .as_deref()
            .map(str::trim)
            .filter(|fen| !fen.is_empty() && *fen != "startpos")
    }
}

/// One line of a per-game board stream.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    GameFull { full: GameFull, raw: Value },
    GameState(GameState),
    ChatLine(Value),
    OpponentGone(Value),
    Other(String),
}

impl BoardEvent {
    pub fn kind(&self) -> &str {
        match self {
            Self::GameFull { .. } => "gameFull",
            Self::GameState(_) => "gameState",
            Self::ChatLine(_) => "chatLine",
            Self::OpponentGone(_) => "opponentGone",
            Self::Other(kind) => kind,
        }
    }
}

impl TryFrom<&str> for BoardEvent {
    type Error = StreamError;
    fn try_from(line: &str) -> Result<Self, Self::Error> {
        let raw = serde_json::from_str::<Value>(line)?;
        match raw.get("type").and_then(Value::as_str) {
            Some("gameFull") => Ok(Self::GameFull {
                full: serde_json::from_value(raw.clone())?,
                raw,
            }),
            Some("gameState") => Ok(Self::GameState(serde_json::from_value(raw)?)),
            Some("chatLine") => Ok(Self::ChatLine(raw)),
            Some("opponentGone") => Ok(Self::OpponentGone(raw)),
            Some(other) => Ok(Self::Other(other.to_string())),
            None => Err(StreamError::MalformedLine(format!("untyped board event: {}", line))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_full_without_initial_fen() {
        let line = r#"{"type":"gameFull","id":"abc123","initialFen":"startpos","state":{"type":"gameState","moves":"e2e4 e7e5","wtime":180000,"btime":180000,"status":"started"}}"#;
        match BoardEvent::try_from(line).unwrap() {
            BoardEvent::GameFull { full, raw } => {
                assert_eq!(full.initial(), None);
                assert_eq!(full.state.moves(), vec!["e2e4", "e7e5"]);
                assert_eq!(full.state.wtime, Some(180000));
                assert_eq!(raw["id"], "abc123");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn game_full_with_custom_position() {
        let line = r#"{"type":"gameFull","initialFen":"8/8/8/8/8/8/4K3/4k3 w - - 0 1","state":{"moves":""}}"#;
        match BoardEvent::try_from(line).unwrap() {
            BoardEvent::GameFull { full, .. } => {
                assert_eq!(full.initial(), Some("8/8/8/8/8/8/4K3/4k3 w - - 0 1"));
                assert!(full.state.moves().is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn game_state_fields() {
        let line = r#"{"type":"gameState","moves":"e2e4  e7e5 g1f3","wtime":1000,"btime":2000,"winc":0,"binc":0,"status":"started"}"#;
        let BoardEvent::GameState(state) = BoardEvent::try_from(line).unwrap() else {
            panic!("expected gameState");
        };
        assert_eq!(state.moves().len(), 3);
        assert_eq!(state.btime, Some(2000));
        assert_eq!(state.status.as_deref(), Some("started"));
    }

    #[test]
    fn passthrough_and_unknown() {
        let chat = BoardEvent::try_from(r#"{"type":"chatLine","username":"bob","text":"gl","room":"player"}"#).unwrap();
        assert_eq!(chat.kind(), "chatLine");
        let gone = BoardEvent::try_from(r#"{"type":"opponentGone","gone":true,"claimWinInSeconds":10}"#).unwrap();
        assert!(matches!(gone, BoardEvent::OpponentGone(ref v) if v["gone"] == true));
        let other = BoardEvent::try_from(r#"{"type":"chatLineSpectator"}"#).unwrap();
        assert_eq!(other, BoardEvent::Other("chatLineSpectator".to_string()));
    }

    #[test]
    fn malformed() {
        assert!(BoardEvent::try_from("{\"type\":").is_err());
        assert!(BoardEvent::try_from(r#"{"type":"gameState","wtime":"soon"}"#).is_err());
    }
}
