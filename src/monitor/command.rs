use crate::lichess::GameId;
use serde::Deserialize;
use serde::Serialize;

/// Inbound control message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    #[serde(alias = "setLichessToken")]
    SetCredential { token: String },
    ClearCredential,
    #[serde(alias = "startStreamMonitoring")]
    StartMonitoring,
    #[serde(alias = "stopStreamMonitoring")]
    StopMonitoring,
    GetGameState { game_id: GameId },
}

impl TryFrom<&str> for Command {
    type Error = serde_json::Error;
    fn try_from(line: &str) -> Result<Self, Self::Error> {
        serde_json::from_str(line)
    }
}

/// Outcome of one [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Reply {
    TokenSet,
    TokenCleared,
    Monitoring,
    Stopped,
    Active {
        game_id: GameId,
        fen: String,
        moves: Vec<String>,
        applied: usize,
    },
    NotFound { game_id: GameId },
    Error { message: String },
}
