use serde::Serialize;
use serde_json::Value;

const BEST: [&str; 3] = ["bestmove", "best", "move"];
const EVAL: [&str; 3] = ["evaluation", "eval", "score"];
const MATE: [&str; 2] = ["mate", "mateIn"];
const LINE: [&str; 3] = ["pv", "continuation", "line"];

/// Engine opinion of a position. Positive favours white.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Score {
    /// Forced mate in `moves`; negative when black mates.
    #[serde(rename = "mate")]
    Mate { moves: i64 },
    /// Raw centipawns and the same value in pawns, two decimals.
    #[serde(rename = "cp")]
    Centipawns { value: f64, pawns: f64 },
}

impl Score {
    pub fn centipawns(value: f64) -> Self {
        Self::Centipawns {
            value,
            pawns: value.round() / 100.0,
        }
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mate { moves } => write!(f, "#{}", moves),
            Self::Centipawns { pawns, .. } => write!(f, "{:+.2}", pawns),
        }
    }
}

/// Normalized scorer answer. Every field is optional: a response missing or
/// garbling a field yields `None` for it, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub best_move: Option<String>,
    pub ponder: Option<String>,
    pub score: Option<Score>,
    pub pv: Option<String>,
    pub depth: Option<u8>,
}

impl From<&Value> for Evaluation {
    fn from(data: &Value) -> Self {
        let (best_move, ponder) = first(data, &BEST)
            .and_then(Value::as_str)
            .map(bestmove)
            .unwrap_or_default();
        Self {
            best_move,
            ponder,
            score: score(data),
            pv: first(data, &LINE).and_then(line),
            depth: data
                .get("depth")
                .and_then(number)
                .filter(|d| *d >= 0.0)
                .map(|d| d.min(u8::MAX as f64) as u8),
        }
    }
}

/// First alias present with a non-null value.
fn first<'a>(data: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|k| data.get(*k))
        .find(|v| !v.is_null())
}

/// Numbers sometimes arrive as strings.
fn number(v: &Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
        .filter(|n| n.is_finite())
}

fn mate(v: &Value) -> Option<Score> {
    number(v)
        .map(|n| n.trunc() as i64)
        .filter(|n| *n != 0)
        .map(|moves| Score::Mate { moves })
}

fn score(data: &Value) -> Option<Score> {
    if let Some(forced) = first(data, &MATE).and_then(mate) {
        return Some(forced);
    }
    match first(data, &EVAL)? {
        nested @ Value::Object(_) => nested
            .get("mate")
            .and_then(mate)
            .or_else(|| nested.get("cp").and_then(number).map(Score::centipawns)),
        flat => number(flat).map(Score::centipawns),
    }
}

/// `"bestmove e2e4 ponder e7e5"` or plain `"e2e4"`.
fn bestmove(s: &str) -> (Option<String>, Option<String>) {
    let mut tokens = s.split_whitespace().skip_while(|t| *t == "bestmove");
    let best = tokens.next().filter(|t| *t != "(none)").map(String::from);
    let ponder = tokens
        .skip_while(|t| *t != "ponder")
        .nth(1)
        .map(String::from);
    (best, ponder)
}

fn line(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Array(moves) => Some(
            moves
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" "),
        )
        .filter(|s| !s.is_empty()),
        _ => None,
    }
}
