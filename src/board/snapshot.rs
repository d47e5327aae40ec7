use crate::lichess::GameId;

/// Current position of a tracked game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub game_id: GameId,
    pub fen: String,
    /// Legal moves in UCI notation.
    pub legal: Vec<String>,
    pub applied: usize,
}
