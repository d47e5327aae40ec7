use crate::lichess::GameId;
use crate::lichess::GameState;
use crate::throttle::AnalysisResult;
use serde::Serialize;
use serde_json::Value;

/// Messages sent to the presentation layer.
/// Per-game messages carry the game id so listeners can route them.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Notification {
    /// Board stream opened; full server payload.
    GameFull { game_id: GameId, payload: Value },
    /// Moves and clocks after any update.
    GameState { game_id: GameId, payload: Progress },
    Chat { game_id: GameId, payload: Value },
    OpponentGone { game_id: GameId, payload: Value },
    /// Board stream ended, for whatever reason.
    StreamClosed { game_id: GameId },
    /// Engine suggestion for the latest analysed position.
    Analysis(AnalysisResult),
    /// Account-wide event with no board-level meaning (challenges and such).
    LichessEvent { payload: Value },
}

impl Notification {
    pub fn game(&self) -> Option<&GameId> {
        match self {
            Self::GameFull { game_id, .. }
            | Self::GameState { game_id, .. }
            | Self::Chat { game_id, .. }
            | Self::OpponentGone { game_id, .. }
            | Self::StreamClosed { game_id } => Some(game_id),
            Self::Analysis(result) => Some(&result.game_id),
            Self::LichessEvent { .. } => None,
        }
    }
}

/// The part of a `gameState` a listener cares about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub moves: String,
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub status: Option<String>,
}

impl From<&GameState> for Progress {
    fn from(state: &GameState) -> Self {
        Self {
            moves: state.moves.clone(),
            wtime: state.wtime,
            btime: state.btime,
            status: state.status.clone(),
        }
    }
}
