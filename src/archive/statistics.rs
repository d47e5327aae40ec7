use super::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregates over a set of games, seen from white's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_games: usize,
    pub by_speed: BTreeMap<String, usize>,
    pub by_variant: BTreeMap<String, usize>,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    /// Mean rating of the black seat, rounded; zero when no game has one.
    pub average_opponent_rating: u64,
    pub oldest: Option<u64>,
    pub newest: Option<u64>,
    /// Wins over decisive games, e.g. `"66.67%"`, or `"N/A"`.
    pub win_rate: String,
}

impl From<&[GameRecord]> for Statistics {
    fn from(records: &[GameRecord]) -> Self {
        let mut by_speed = BTreeMap::new();
        let mut by_variant = BTreeMap::new();
        for record in records {
            *by_speed.entry(record.speed.clone()).or_insert(0) += 1;
            *by_variant.entry(record.variant.clone()).or_insert(0) += 1;
        }
        let count = |outcome: Outcome| {
            records
                .iter()
                .filter(|r| r.white.result == outcome)
                .count()
        };
        let wins = count(Outcome::Win);
        let losses = count(Outcome::Loss);
        let ratings = records
            .iter()
            .filter_map(|r| r.black.rating)
            .filter(|r| *r > 0)
            .collect::<Vec<_>>();
        let average_opponent_rating = match ratings.len() {
            0 => 0,
            n => (ratings.iter().sum::<u64>() as f64 / n as f64).round() as u64,
        };
        let win_rate = match wins + losses {
            0 => "N/A".to_string(),
            decisive => format!("{:.2}%", wins as f64 / decisive as f64 * 100.0),
        };
        Self {
            total_games: records.len(),
            by_speed,
            by_variant,
            wins,
            losses,
            draws: count(Outcome::Draw),
            average_opponent_rating,
            oldest: records.iter().filter_map(|r| r.date).min(),
            newest: records.iter().filter_map(|r| r.date).max(),
            win_rate,
        }
    }
}
