use super::*;
use crate::bus::Bus;
use crate::bus::Notification;
use crate::engine::Evaluator;
use std::sync::Arc;

/// Whatever happens to a position once the throttle lets it through.
#[async_trait::async_trait]
pub trait Analyst: Send + Sync {
    async fn analyze(&self, request: AnalysisRequest);
}

/// Asks the engine and publishes its answer. Failures are logged and
/// dropped; the next position will be analysed anyway.
pub struct Analyzer {
    evaluator: Arc<dyn Evaluator>,
    bus: Bus,
    depth: u8,
}

impl Analyzer {
    pub fn new(evaluator: Arc<dyn Evaluator>, bus: Bus, depth: u8) -> Self {
        Self {
            evaluator,
            bus,
            depth,
        }
    }
}

#[async_trait::async_trait]
impl Analyst for Analyzer {
    async fn analyze(&self, request: AnalysisRequest) {
        if request.fen.is_empty() {
            log::warn!("empty position for game {}", request.game_id);
            return;
        }
        log::debug!("analyzing position of {}", request.game_id);
        match self.evaluator.evaluate(&request.fen, self.depth).await {
            Err(e) => log::error!("analysis for {} failed: {}", request.game_id, e),
            Ok(evaluation) => {
                log::info!(
                    "analysis for {}: best={} eval={}",
                    request.game_id,
                    evaluation.best_move.as_deref().unwrap_or("-"),
                    evaluation
                        .score
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                );
                let mut result = AnalysisResult::from((request, evaluation));
                result.depth.get_or_insert(self.depth);
                self.bus.publish(Notification::Analysis(result));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Score;
    use crate::lichess::GameId;
    use crate::testing::Scorer;

    fn request(fen: &str) -> AnalysisRequest {
        AnalysisRequest {
            game_id: GameId::from("g1"),
            fen: fen.to_string(),
            move_count: 3,
            origin: Origin::GameFull,
        }
    }

    #[tokio::test]
    async fn publishes_success() {
        let bus = Bus::default();
        let mut rx = bus.subscribe();
        let scorer = Arc::new(Scorer::default());
        Analyzer::new(scorer.clone(), bus, 15).analyze(request("fen-a")).await;
        let Notification::Analysis(result) = rx.recv().await.unwrap() else {
            panic!("expected analysis");
        };
        assert_eq!(result.fen, "fen-a");
        assert_eq!(result.move_count, 3);
        assert_eq!(result.best_move.as_deref(), Some("e2e4"));
        assert_eq!(result.evaluation, Some(Score::centipawns(20.0)));
        assert_eq!(scorer.calls(), vec![("fen-a".to_string(), 15)]);
        assert_eq!(result.depth, Some(15));
    }

    #[tokio::test]
    async fn reported_depth_wins() {
        let bus = Bus::default();
        let mut rx = bus.subscribe();
        let scorer = Arc::new(Scorer::at_depth(12));
        Analyzer::new(scorer, bus, 18).analyze(request("fen-b")).await;
        let Notification::Analysis(result) = rx.recv().await.unwrap() else {
            panic!("expected analysis");
        };
        assert_eq!(result.depth, Some(12));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["depth"], 12);
        assert_eq!(json["gameId"], "g1");
    }

    #[tokio::test]
    async fn failure_publishes_nothing() {
        let bus = Bus::default();
        let mut rx = bus.subscribe();
        let scorer = Arc::new(Scorer::failing());
        Analyzer::new(scorer.clone(), bus, 15).analyze(request("fen-a")).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(scorer.calls().len(), 1);
    }

    #[tokio::test]
    async fn empty_position_skips_engine() {
        let scorer = Arc::new(Scorer::default());
        Analyzer::new(scorer.clone(), Bus::default(), 15).analyze(request("")).await;
        assert!(scorer.calls().is_empty());
    }
}
