use super::*;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

const FEATURES: [&str; 6] = ["moves", "pgn", "fen", "timeControl", "speed", "variant"];
const LABELS: [&str; 2] = ["result", "winner"];

/// What a sample of a [`Dataset`] is made of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    pub total_samples: usize,
    pub features: Vec<String>,
    pub labels: Vec<String>,
}

/// How fetching one player's games went in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Fetched {
    Success { games_count: usize },
    Error { error: String },
}

/// Past games flattened for offline study, with their statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub games: Vec<GameRecord>,
    pub statistics: Statistics,
    pub dataset: Descriptor,
    /// Per-player outcome, only for datasets merged from several players.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub user_stats: BTreeMap<String, Fetched>,
}

impl From<Vec<GameRecord>> for Dataset {
    fn from(games: Vec<GameRecord>) -> Self {
        log::debug!("building dataset of {} games", games.len());
        Self {
            statistics: Statistics::from(games.as_slice()),
            dataset: Descriptor {
                total_samples: games.len(),
                features: FEATURES.iter().map(|f| f.to_string()).collect(),
                labels: LABELS.iter().map(|l| l.to_string()).collect(),
            },
            games,
            user_stats: BTreeMap::new(),
        }
    }
}

impl From<&[Value]> for Dataset {
    fn from(games: &[Value]) -> Self {
        Self::from(games.iter().map(GameRecord::from).collect::<Vec<_>>())
    }
}

impl Dataset {
    /// Pretty JSON, two-space indented.
    pub fn export(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Features and labels per game, ready for a model trainer.
    pub fn training(&self, username: &str) -> TrainingSet {
        TrainingSet {
            metadata: Metadata {
                username: username.to_string(),
                total_samples: self.games.len(),
                generated_at: std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_millis() as u64)
                    .unwrap_or_default(),
                statistics: self.statistics.clone(),
            },
            training_set: self.games.iter().map(Sample::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSet {
    pub metadata: Metadata,
    pub training_set: Vec<Sample>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub username: String,
    pub total_samples: usize,
    /// Milliseconds since the epoch.
    pub generated_at: u64,
    pub statistics: Statistics,
}

/// One game as model input, expected output and bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub features: Features,
    pub labels: Labels,
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    pub moves: String,
    pub pgn: String,
    pub fen: Option<String>,
    pub time_control: String,
    pub speed: String,
    pub variant: String,
    pub opponent_rating: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Labels {
    pub result: Outcome,
    pub winner: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub game_id: String,
    pub date: Option<u64>,
}

impl From<&GameRecord> for Sample {
    fn from(game: &GameRecord) -> Self {
        Self {
            features: Features {
                moves: game.moves.clone(),
                pgn: game.pgn.clone(),
                fen: game.fen.clone(),
                time_control: game.time_control.clone(),
                speed: game.speed.clone(),
                variant: game.variant.clone(),
                opponent_rating: game.black.rating,
            },
            labels: Labels {
                result: game.white.result,
                winner: game.winner.clone(),
                status: game.status.clone(),
            },
            meta: Meta {
                game_id: game.game_id.clone(),
                date: game.date,
            },
        }
    }
}
