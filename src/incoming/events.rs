use super::*;
use crate::board::Boards;
use crate::bus::Bus;
use crate::bus::Notification;
use crate::credential::Credential;
use crate::credential::Token;
use crate::lichess::GlobalEvent;
use crate::lichess::Route;
use crate::lichess::StreamError;
use crate::lichess::Streamer;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Where the global connection currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// Waiting out a reconnect delay.
    Backoff,
}

#[derive(Default)]
struct Connection {
    phase: Phase,
    session: u64,
    backoff: Backoff,
    halt: Option<oneshot::Sender<()>>,
    supervisor: Option<JoinHandle<()>>,
}

/// The single account-wide event stream.
///
/// Announced games are handed to [`Boards`]; everything else goes out on the
/// bus untouched. A session number tags each connection attempt so that a
/// superseded read can never overwrite the state of a newer one.
#[derive(Clone)]
pub struct Events {
    credential: Credential,
    streamer: Arc<dyn Streamer>,
    boards: Boards,
    bus: Bus,
    conn: Arc<Mutex<Connection>>,
}

impl Events {
    pub fn new(
        credential: Credential,
        streamer: Arc<dyn Streamer>,
        boards: Boards,
        bus: Bus,
    ) -> Self {
        Self {
            credential,
            streamer,
            boards,
            bus,
            conn: Arc::new(Mutex::new(Connection::default())),
        }
    }

    pub async fn phase(&self) -> Phase {
        self.conn.lock().await.phase
    }

    /// Connect and consume until the stream ends.
    ///
    /// Returns `Ok` immediately if a connection is already up or in
    /// progress, and `Ok` after a deliberate [`close`](Self::close).
    pub async fn open(&self) -> Result<(), StreamError> {
        let token = self.credential.get().ok_or(StreamError::NoCredential)?;
        let (session, mut halt) = {
            let mut conn = self.conn.lock().await;
            if matches!(conn.phase, Phase::Connected | Phase::Connecting) {
                log::debug!("event stream already {:?}", conn.phase);
                return Ok(());
            }
            let (tx, rx) = oneshot::channel();
            conn.session += 1;
            conn.phase = Phase::Connecting;
            conn.halt = Some(tx);
            (conn.session, rx)
        };
        let result = self.consume(session, &token, &mut halt).await;
        {
            let mut conn = self.conn.lock().await;
            if conn.session == session {
                conn.phase = Phase::Disconnected;
                conn.halt = None;
            }
        }
        result
    }

    /// Keep the stream open, waiting `min(30s, 2^attempt s)` between
    /// failures. Gives up only when there is no credential or the stream
    /// was closed on purpose.
    pub async fn open_with_backoff(&self) {
        loop {
            match self.open().await {
                Ok(()) => return,
                Err(StreamError::NoCredential) => {
                    log::warn!("no token, event stream stays down");
                    return;
                }
                Err(e) => {
                    let delay = {
                        let mut conn = self.conn.lock().await;
                        conn.phase = Phase::Backoff;
                        conn.backoff.fail()
                    };
                    log::warn!("event stream down ({}), retrying in {:?}", e, delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Run [`open_with_backoff`](Self::open_with_backoff) in the background
    /// unless it already is.
    pub async fn start(&self) {
        let mut conn = self.conn.lock().await;
        if conn.supervisor.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }
        let events = self.clone();
        conn.supervisor = Some(tokio::spawn(async move { events.open_with_backoff().await }));
        log::info!("event stream supervisor started");
    }

    /// Cancel the read and any pending retry. Idempotent.
    pub async fn close(&self) {
        let mut conn = self.conn.lock().await;
        if let Some(halt) = conn.halt.take() {
            let _ = halt.send(());
        }
        if let Some(supervisor) = conn.supervisor.take() {
            supervisor.abort();
        }
        if conn.phase != Phase::Disconnected {
            log::info!("event stream closed");
        }
        conn.session += 1;
        conn.phase = Phase::Disconnected;
    }

    pub async fn restart(&self) {
        self.close().await;
        self.conn.lock().await.backoff.reset();
        self.start().await;
    }
}

impl Events {
    async fn consume(
        &self,
        session: u64,
        token: &Token,
        halt: &mut oneshot::Receiver<()>,
    ) -> Result<(), StreamError> {
        let opened = tokio::select! {
            biased;
            _ = &mut *halt => return Ok(()),
            opened = self.streamer.open(&Route::Events, token.secret()) => opened,
        };
        let mut lines = opened?;
        {
            let mut conn = self.conn.lock().await;
            if conn.session != session {
                return Ok(());
            }
            conn.phase = Phase::Connected;
            conn.backoff.reset();
        }
        log::info!("event stream connected");
        loop {
            tokio::select! {
                biased;
                _ = &mut *halt => return Ok(()),
                line = lines.next() => match line {
                    Some(Ok(line)) => self.route(session, &line).await,
                    Some(Err(e)) => return Err(e),
                    None => return Err(StreamError::Closed),
                },
            }
        }
    }

    /// Hand one line to its consumer. Boards are only opened while
    /// `session` is still current, so a closed stream cannot open new ones.
    async fn route(&self, session: u64, line: &str) {
        let event = match GlobalEvent::try_from(line) {
            Ok(event) => event,
            Err(e) => {
                log::warn!("skipping line on event stream: {}", e);
                return;
            }
        };
        log::debug!("{:?} on event stream", event.kind);
        if event.starts() {
            let Some(game) = event.game else {
                log::warn!("{:?} without a game id", event.kind);
                return;
            };
            let conn = self.conn.lock().await;
            if conn.session != session {
                log::debug!("event stream closed, not opening {}", game);
                return;
            }
            if !self.boards.is_tracked(&game).await {
                self.boards.open(game).await;
            }
            drop(conn);
        } else if event.finishes() {
            match event.game {
                Some(game) => self.boards.close(&game).await,
                None => log::warn!("{:?} without a game id", event.kind),
            }
        } else {
            self.bus.publish(Notification::LichessEvent {
                payload: event.payload,
            });
        }
    }
}
