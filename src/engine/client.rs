use super::*;
use crate::MAX_DEPTH;

/// Scores one position. Stateless: every call is independent.
#[async_trait::async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, fen: &str, depth: u8) -> Result<Evaluation, EvaluationError>;
}

/// Stockfish Online REST API.
#[derive(Debug, Clone)]
pub struct StockfishOnline {
    http: reqwest::Client,
    endpoint: String,
}

impl StockfishOnline {
    pub fn new(endpoint: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    /// Search depth actually requested for `depth`.
    pub fn clamp(depth: u8) -> u8 {
        depth.clamp(1, MAX_DEPTH)
    }
}

#[async_trait::async_trait]
impl Evaluator for StockfishOnline {
    async fn evaluate(&self, fen: &str, depth: u8) -> Result<Evaluation, EvaluationError> {
        let depth = Self::clamp(depth);
        log::debug!("evaluating {} at depth {}", fen, depth);
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("fen", fen.to_string()), ("depth", depth.to_string())])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EvaluationError::Status(status.as_u16()));
        }
        let data = response.json::<serde_json::Value>().await?;
        log::trace!("engine raw response {}", data);
        Ok(Evaluation::from(&data))
    }
}
