use crate::engine::Evaluation;
use crate::engine::Score;
use crate::lichess::GameId;
use serde::Serialize;

/// Which board event produced a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    GameFull,
    GameState,
}

/// A position waiting for the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub game_id: GameId,
    pub fen: String,
    pub move_count: usize,
    pub origin: Origin,
}

/// Engine suggestion for one analysed position.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub game_id: GameId,
    pub best_move: Option<String>,
    pub ponder: Option<String>,
    pub evaluation: Option<Score>,
    pub pv: Option<String>,
    pub depth: Option<u8>,
    pub fen: String,
    pub move_count: usize,
}

impl From<(AnalysisRequest, Evaluation)> for AnalysisResult {
    fn from((request, evaluation): (AnalysisRequest, Evaluation)) -> Self {
        Self {
            game_id: request.game_id,
            best_move: evaluation.best_move,
            ponder: evaluation.ponder,
            evaluation: evaluation.score,
            pv: evaluation.pv,
            depth: evaluation.depth,
            fen: request.fen,
            move_count: request.move_count,
        }
    }
}
