use super::*;
use crate::lichess::GameId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Rate state of one game. `pending` present means a deferred dispatch is
/// scheduled; `latest` is what it will carry when it fires.
#[derive(Default)]
struct Slot {
    last: Option<Instant>,
    pending: Option<JoinHandle<()>>,
    latest: Option<AnalysisRequest>,
}

/// At most one dispatch per `interval` per game.
///
/// A submission inside the interval is not dropped: the first one schedules a
/// single deferred dispatch at `last + interval`, later ones only replace the
/// request it will carry, so the freshest position is what gets analysed.
#[derive(Clone)]
pub struct Throttle {
    interval: Duration,
    analyst: Arc<dyn Analyst>,
    slots: Arc<Mutex<HashMap<GameId, Slot>>>,
}

impl Throttle {
    pub fn new(analyst: Arc<dyn Analyst>, interval: Duration) -> Self {
        Self {
            interval,
            analyst,
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn submit(&self, request: AnalysisRequest) {
        let now = Instant::now();
        let mut slots = self.slots.lock().await;
        let slot = slots.entry(request.game_id.clone()).or_default();
        if slot.pending.is_some() {
            slot.latest = Some(request);
            return;
        }
        match slot.last.filter(|last| now.duration_since(*last) < self.interval) {
            None => {
                slot.last = Some(now);
                self.dispatch(request);
            }
            Some(last) => {
                log::debug!("deferring analysis of {}", request.game_id);
                let due = last + self.interval;
                let game = request.game_id.clone();
                slot.latest = Some(request);
                slot.pending = Some(self.defer(game, due));
            }
        }
    }

    /// Drop all state of a closed game, including a scheduled dispatch.
    pub async fn forget(&self, game: &GameId) {
        if let Some(pending) = self
            .slots
            .lock()
            .await
            .remove(game)
            .and_then(|slot| slot.pending)
        {
            pending.abort();
        }
    }

    /// Whether any rate state is held for `game`.
    pub async fn tracks(&self, game: &GameId) -> bool {
        self.slots.lock().await.contains_key(game)
    }

    fn dispatch(&self, request: AnalysisRequest) {
        let analyst = self.analyst.clone();
        tokio::spawn(async move { analyst.analyze(request).await });
    }

    fn defer(&self, game: GameId, due: Instant) -> JoinHandle<()> {
        let analyst = self.analyst.clone();
        let slots = self.slots.clone();
        tokio::spawn(async move {
            tokio::time::sleep_until(due).await;
            let request = {
                let mut slots = slots.lock().await;
                let Some(slot) = slots.get_mut(&game) else {
                    log::debug!("dropping deferred analysis of closed game {}", game);
                    return;
                };
                slot.pending = None;
                slot.last = Some(Instant::now());
                slot.latest.take()
            };
            if let Some(request) = request {
                analyst.analyze(request).await;
            }
        })
    }
}
