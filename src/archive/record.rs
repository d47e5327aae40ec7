use serde::Serialize;
use serde_json::Value;

/// Result of a game for one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

/// One player of an exported game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub username: String,
    pub rating: Option<u64>,
    pub rating_diff: Option<i64>,
    pub result: Outcome,
}

/// Flattened view of one exported game.
///
/// Only checkmates are counted as decisive; every other ending is a draw
/// for both seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub game_id: String,
    /// Creation time, milliseconds since the epoch.
    pub date: Option<u64>,
    pub speed: String,
    pub variant: String,
    pub white: Seat,
    pub black: Seat,
    pub moves: String,
    /// Empty unless the export was asked for PGN.
    pub pgn: String,
    /// Final position, when the export carries one.
    pub fen: Option<String>,
    pub status: Option<String>,
    /// Human wording of the status, e.g. `"Checkmate"`.
    pub termination: Option<String>,
    pub winner: Option<String>,
    pub time_control: String,
}

impl GameRecord {
    /// Individual moves, in export notation.
    pub fn plies(&self) -> Vec<&str> {
        self.moves.split_whitespace().collect()
    }
}

impl GameRecord {
    fn seat(game: &Value, color: &str, winner: Option<&str>, mated: bool) -> Seat {
        let player = &game["players"][color];
        Seat {
            username: player["user"]["name"]
                .as_str()
                .unwrap_or("Anonymous")
                .to_string(),
            rating: player["rating"].as_u64(),
            rating_diff: player["ratingDiff"].as_i64().filter(|d| *d != 0),
            result: match (mated, winner) {
                (true, Some(w)) if w == color => Outcome::Win,
                (true, Some(_)) => Outcome::Loss,
                _ => Outcome::Draw,
            },
        }
    }
}

impl From<&Value> for GameRecord {
    fn from(game: &Value) -> Self {
        let text = |key: &str| game[key].as_str().map(str::to_string);
        let winner = game["winner"].as_str();
        let mated = game["status"].as_str() == Some("mate");
        let clock = &game["clock"];
        Self {
            game_id: text("id").unwrap_or_default(),
            date: game["createdAt"].as_u64(),
            speed: text("speed").unwrap_or_else(|| "unknown".to_string()),
            variant: text("variant").unwrap_or_else(|| "unknown".to_string()),
            white: Self::seat(game, "white", winner, mated),
            black: Self::seat(game, "black", winner, mated),
            moves: text("moves").unwrap_or_default(),
            pgn: text("pgn").unwrap_or_default(),
            fen: text("fen").or_else(|| text("lastFen")),
            status: text("status"),
            termination: text("statusName"),
            winner: winner.map(str::to_string),
            time_control: match (clock["initial"].as_u64(), clock["increment"].as_u64()) {
                (Some(initial), Some(increment)) => format!("{}+{}", initial, increment),
                _ => "unlimited".to_string(),
            },
        }
    }
}
