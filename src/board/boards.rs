use super::*;
use crate::bus::Bus;
use crate::bus::Notification;
use crate::bus::Progress;
use crate::credential::Credential;
use crate::credential::Token;
use crate::lichess::BoardEvent;
use crate::lichess::GameId;
use crate::lichess::Route;
use crate::lichess::Streamer;
use crate::throttle::AnalysisRequest;
use crate::throttle::Origin;
use crate::throttle::Throttle;
use crate::tracker::Advance;
use crate::tracker::Tracker;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use tokio::sync::RwLock;
use tokio::sync::oneshot;

/// Registry entry of one tracked game. Exists from the moment the id is
/// reserved until the stream is released; dropping it cancels the read.
struct Board {
    session: u64,
    connected: bool,
    tracker: Tracker,
    halt: oneshot::Sender<()>,
}

/// Per-game board streams.
///
/// Each tracked game has exactly one entry and at most one read task. The
/// entry is reserved before the connection is attempted, so concurrent
/// announcements of the same game open a single stream. Locks are never
/// held across a network await.
#[derive(Clone)]
pub struct Boards {
    credential: Credential,
    streamer: Arc<dyn Streamer>,
    throttle: Throttle,
    bus: Bus,
    games: Arc<RwLock<HashMap<GameId, Board>>>,
    count: Arc<AtomicU64>,
}

impl Boards {
    pub fn new(
        credential: Credential,
        streamer: Arc<dyn Streamer>,
        throttle: Throttle,
        bus: Bus,
    ) -> Self {
        Self {
            credential,
            streamer,
            throttle,
            bus,
            games: Arc::new(RwLock::new(HashMap::new())),
            count: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Start following a game. No-op if it is already tracked.
    pub async fn open(&self, game: GameId) {
        let Some(token) = self.credential.get() else {
            log::warn!("no token, not opening board stream for {}", game);
            return;
        };
        let session = self.count.fetch_add(1, Ordering::Relaxed);
        let (halt, rx) = oneshot::channel();
        {
            let mut games = self.games.write().await;
            if games.contains_key(&game) {
                log::debug!("already tracking {}", game);
                return;
            }
            games.insert(
                game.clone(),
                Board {
                    session,
                    connected: false,
                    tracker: Tracker::default(),
                    halt,
                },
            );
        }
        log::info!("opening board stream for {}", game);
        tokio::spawn(self.clone().watch(game, session, token, rx));
    }

    /// Stop following a game. No-op if it is not tracked.
    pub async fn close(&self, game: &GameId) {
        let Some(board) = self.games.write().await.remove(game) else {
            return;
        };
        let _ = board.halt.send(());
        self.throttle.forget(game).await;
        if board.connected {
            self.bus.publish(Notification::StreamClosed {
                game_id: game.clone(),
            });
        }
        log::info!("closed board stream for {}", game);
    }

    pub async fn close_all(&self) {
        for game in self.tracked().await {
            self.close(&game).await;
        }
    }

    pub async fn is_tracked(&self, game: &GameId) -> bool {
        self.games.read().await.contains_key(game)
    }

    pub async fn tracked(&self) -> Vec<GameId> {
        self.games.read().await.keys().cloned().collect()
    }

    pub async fn snapshot(&self, game: &GameId) -> Option<GameSnapshot> {
        self.games.read().await.get(game).map(|board| GameSnapshot {
            game_id: game.clone(),
            fen: board.tracker.fen(),
            legal: board.tracker.legal(),
            applied: board.tracker.applied(),
        })
    }
}

impl Boards {
    /// Read task of one session. Ends on halt, stream end, or stream error.
    async fn watch(
        self,
        game: GameId,
        session: u64,
        token: Token,
        mut halt: oneshot::Receiver<()>,
    ) {
        let route = Route::Board(game.clone());
        let opened = tokio::select! {
            biased;
            _ = &mut halt => return,
            opened = self.streamer.open(&route, token.secret()) => opened,
        };
        let mut lines = match opened {
            Ok(lines) => lines,
            Err(e) => {
                log::warn!("could not open {}: {}", route, e);
                self.release(&game, session).await;
                return;
            }
        };
        if !self.connect(&game, session).await {
            return;
        }
        loop {
            tokio::select! {
                biased;
                _ = &mut halt => return,
                line = lines.next() => match line {
                    Some(Ok(line)) => {
                        self.dispatch(&game, &line).await;
                    }
                    Some(Err(e)) => {
                        log::warn!("{} failed: {}", route, e);
                        break;
                    }
                    None => {
                        log::info!("{} ended", route);
                        break;
                    }
                },
            }
        }
        self.release(&game, session).await;
    }

    /// Mark the session's entry live with a fresh tracker.
    async fn connect(&self, game: &GameId, session: u64) -> bool {
        match self.games.write().await.get_mut(game) {
            Some(board) if board.session == session => {
                board.connected = true;
                board.tracker = Tracker::default();
                log::info!("board stream for {} connected", game);
                true
            }
            _ => false,
        }
    }

    /// Remove the session's entry, if still present. Only a stream that
    /// actually connected announces its end.
    async fn release(&self, game: &GameId, session: u64) {
        let removed = {
            let mut games = self.games.write().await;
            match games.get(game).map(|board| board.session) {
                Some(current) if current == session => games.remove(game),
                _ => None,
            }
        };
        if let Some(board) = removed {
            self.throttle.forget(game).await;
            if board.connected {
                self.bus.publish(Notification::StreamClosed {
                    game_id: game.clone(),
                });
            }
        }
    }

    /// Handle one board line. Returns what the tracker made of it for
    /// events that carry moves.
    async fn dispatch(&self, game: &GameId, line: &str) -> Option<Advance> {
        let event = match BoardEvent::try_from(line) {
            Ok(event) => event,
            Err(e) => {
                log::warn!("skipping line on board stream {}: {}", game, e);
                return None;
            }
        };
        log::trace!("{} on board stream {}", event.kind(), game);
        match event {
            BoardEvent::GameFull { full, raw } => {
                let moves = full.state.moves();
                let initial = full.initial();
                let advance = self
                    .replay(game, Origin::GameFull, |t| t.restart(initial, &moves))
                    .await;
                self.bus.publish(Notification::GameFull {
                    game_id: game.clone(),
                    payload: raw,
                });
                advance
            }
            BoardEvent::GameState(state) => {
                let moves = state.moves();
                let advance = self
                    .replay(game, Origin::GameState, |t| t.advance(&moves))
                    .await;
                self.bus.publish(Notification::GameState {
                    game_id: game.clone(),
                    payload: Progress::from(&state),
                });
                advance
            }
            BoardEvent::ChatLine(payload) => {
                self.bus.publish(Notification::Chat {
                    game_id: game.clone(),
                    payload,
                });
                None
            }
            BoardEvent::OpponentGone(payload) => {
                self.bus.publish(Notification::OpponentGone {
                    game_id: game.clone(),
                    payload,
                });
                None
            }
            BoardEvent::Other(kind) => {
                log::debug!("ignoring {} on board stream {}", kind, game);
                None
            }
        }
    }

    /// Apply `update` to the game's tracker and submit the resulting position
    /// if it moved. The submission happens under the registry lock so a
    /// concurrent `close` forgets it rather than racing it.
    async fn replay<F>(&self, game: &GameId, origin: Origin, update: F) -> Option<Advance>
    where
        F: FnOnce(&mut Tracker) -> Advance,
    {
        let mut games = self.games.write().await;
        let board = games.get_mut(game)?;
        let advance = update(&mut board.tracker);
        match advance {
            Advance::Unchanged => {}
            Advance::Stale { reported, applied } => log::warn!(
                "stale state for {}: {} moves reported, {} applied",
                game,
                reported,
                applied
            ),
            Advance::Moved { applied, rejected } => {
                if rejected > 0 {
                    log::warn!("{} of {} moves rejected in {}", rejected, applied, game);
                }
                let request = AnalysisRequest {
                    game_id: game.clone(),
                    fen: board.tracker.fen(),
                    move_count: applied,
                    origin,
                };
                self.throttle.submit(request).await;
            }
        }
        Some(advance)
    }
}
