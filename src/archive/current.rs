use crate::engine::Evaluation;
use crate::engine::EvaluationError;
use crate::engine::Evaluator;
use crate::tracker::Tracker;
use serde::Serialize;
use serde_json::Value;

/// A player's game in progress and the position it has reached.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentGame {
    pub username: String,
    pub game: Value,
    pub fen: String,
}

/// Engine suggestion for a player's game in progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub username: String,
    pub game_data: Value,
    pub fen: String,
    pub analysis: Evaluation,
    /// Milliseconds since the epoch.
    pub timestamp: u64,
}

impl CurrentGame {
    /// Position of an exported game: the FEN it carries, or its moves
    /// replayed from its starting position.
    pub fn new(username: &str, data: Value) -> Self {
        let game = data.get("game").unwrap_or(&data);
        let fen = ["fen", "lastFen"]
            .iter()
            .find_map(|key| game[*key].as_str())
            .map(str::to_string)
            .unwrap_or_else(|| Self::replay(game));
        Self {
            username: username.to_string(),
            game: data,
            fen,
        }
    }

    fn replay(game: &Value) -> String {
        let moves = game["moves"]
            .as_str()
            .unwrap_or_default()
            .split_whitespace()
            .collect::<Vec<_>>();
        let mut tracker: Tracker = Tracker::default();
        tracker.restart(game["initialFen"].as_str(), &moves);
        tracker.fen()
    }

    /// Ask the engine; the reported depth falls back to the one requested.
    pub async fn analyze(
        self,
        evaluator: &dyn Evaluator,
        depth: u8,
    ) -> Result<Suggestion, EvaluationError> {
        log::info!("analyzing current game of {}", self.username);
        let mut analysis = evaluator.evaluate(&self.fen, depth).await?;
        analysis.depth.get_or_insert(depth);
        Ok(Suggestion {
            username: self.username,
            game_data: self.game,
            fen: self.fen,
            analysis,
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or_default(),
        })
    }
}
