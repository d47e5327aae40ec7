use super::*;
use crate::board::Boards;
use crate::credential::Credential;
use crate::incoming::Events;
use crate::lichess::StreamError;
use tokio::task::JoinHandle;

/// Everything a presentation layer can ask of the running system.
#[derive(Clone)]
pub struct Monitor {
    credential: Credential,
    boards: Boards,
    events: Events,
}

impl Monitor {
    pub fn new(credential: Credential, boards: Boards, events: Events) -> Self {
        Self {
            credential,
            boards,
            events,
        }
    }

    /// Follow credential changes and start monitoring if a token is already
    /// stored. A new token restarts the event stream; a cleared one stops
    /// everything.
    pub async fn launch(&self) -> JoinHandle<()> {
        let monitor = self.clone();
        let mut rx = self.credential.watch();
        let watcher = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let present = rx.borrow_and_update().is_some();
                match present {
                    true => monitor.events.restart().await,
                    false => monitor.stop().await,
                }
            }
        });
        if self.credential.get().is_some() {
            self.events.start().await;
        }
        watcher
    }

    pub async fn handle(&self, command: Command) -> Reply {
        log::debug!("handling {:?}", command);
        match command {
            Command::SetCredential { token } => match self.credential.set(token) {
                Ok(_) => Reply::TokenSet,
                Err(e) => Reply::Error {
                    message: e.to_string(),
                },
            },
            Command::ClearCredential => match self.credential.clear() {
                Ok(_) => Reply::TokenCleared,
                Err(e) => Reply::Error {
                    message: e.to_string(),
                },
            },
            Command::StartMonitoring => match self.credential.get() {
                None => Reply::Error {
                    message: StreamError::NoCredential.to_string(),
                },
                Some(_) => {
                    self.events.start().await;
                    Reply::Monitoring
                }
            },
            Command::StopMonitoring => {
                self.stop().await;
                Reply::Stopped
            }
            Command::GetGameState { game_id } => match self.boards.snapshot(&game_id).await {
                Some(snapshot) => Reply::Active {
                    game_id,
                    fen: snapshot.fen,
                    moves: snapshot.legal,
                    applied: snapshot.applied,
                },
                None => Reply::NotFound { game_id },
            },
        }
    }

    /// Close every board stream, then the event stream. Announcements
    /// routed while the boards were closing are swept once the event stream
    /// can no longer open any.
    pub async fn stop(&self) {
        self.boards.close_all().await;
        self.events.close().await;
        self.boards.close_all().await;
        log::info!("monitoring stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Bus;
    use crate::credential::MemoryStorage;
    use crate::incoming::Phase;
    use crate::lichess::GameId;
    use crate::lichess::Route;
    use crate::testing::Recorder;
    use crate::testing::Script;
    use crate::throttle::Throttle;
    use std::sync::Arc;
    use std::time::Duration;

    struct Fixture {
        monitor: Monitor,
        boards: Boards,
        events: Events,
        script: Arc<Script>,
    }

    fn fixture(token: Option<&str>) -> Fixture {
        let credential = Credential::load(Arc::new(MemoryStorage::default())).unwrap();
        if let Some(token) = token {
            credential.set(token).unwrap();
        }
        let script = Arc::new(Script::default());
        let bus = Bus::default();
        let throttle = Throttle::new(Arc::new(Recorder::default()), crate::ANALYZE_INTERVAL);
        let boards = Boards::new(credential.clone(), script.clone(), throttle, bus.clone());
        let events = Events::new(credential.clone(), script.clone(), boards.clone(), bus);
        let monitor = Monitor::new(credential, boards.clone(), events.clone());
        Fixture {
            monitor,
            boards,
            events,
            script,
        }
    }

    fn start(game: &str) -> Result<String, StreamError> {
        Ok(format!(
            r#"{{"type":"gameStart","game":{{"gameId":"{}"}}}}"#,
            game
        ))
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_every_stream() {
        let f = fixture(Some("tok"));
        let global = f.script.serve(Route::Events);
        let a = f.script.serve(Route::Board(GameId::from("a")));
        let b = f.script.serve(Route::Board(GameId::from("b")));
        f.monitor.launch().await;
        global.send(start("a")).unwrap();
        global.send(start("b")).unwrap();
        settle().await;
        assert_eq!(f.boards.tracked().await.len(), 2);
        assert_eq!(f.monitor.handle(Command::StopMonitoring).await, Reply::Stopped);
        assert!(f.boards.tracked().await.is_empty());
        assert_eq!(f.events.phase().await, Phase::Disconnected);
        settle().await;
        assert!(global.is_closed());
        assert!(a.is_closed());
        assert!(b.is_closed());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn stop_wins_against_incoming_announcements() {
        for _ in 0..10 {
            let f = fixture(Some("tok"));
            let global = f.script.serve(Route::Events);
            let _feeds = (0..200)
                .map(|i| f.script.serve(Route::Board(GameId::from(format!("g{}", i)))))
                .collect::<Vec<_>>();
            f.monitor.launch().await;
            let flood = tokio::spawn(async move {
                for i in 0..200 {
                    if global.send(start(&format!("g{}", i))).is_err() {
                        break;
                    }
                    tokio::task::yield_now().await;
                }
            });
            tokio::time::sleep(Duration::from_millis(2)).await;
            assert_eq!(f.monitor.handle(Command::StopMonitoring).await, Reply::Stopped);
            tokio::time::sleep(Duration::from_millis(20)).await;
            assert!(f.boards.tracked().await.is_empty());
            assert_eq!(f.events.phase().await, Phase::Disconnected);
            flood.abort();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn launch_without_token_stays_idle() {
        let f = fixture(None);
        f.monitor.launch().await;
        settle().await;
        assert_eq!(f.script.opened(&Route::Events), 0);
        assert!(matches!(
            f.monitor.handle(Command::StartMonitoring).await,
            Reply::Error { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn new_token_starts_and_clearing_stops() {
        let f = fixture(None);
        let _global = f.script.serve(Route::Events);
        f.monitor.launch().await;
        let reply = f
            .monitor
            .handle(Command::SetCredential {
                token: "lip_new".to_string(),
            })
            .await;
        assert_eq!(reply, Reply::TokenSet);
        settle().await;
        assert_eq!(f.script.tokens(), vec!["lip_new".to_string()]);
        assert_eq!(f.events.phase().await, Phase::Connected);
        assert_eq!(
            f.monitor.handle(Command::ClearCredential).await,
            Reply::TokenCleared
        );
        settle().await;
        assert_eq!(f.events.phase().await, Phase::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn game_state_lookup() {
        let f = fixture(Some("tok"));
        let global = f.script.serve(Route::Events);
        let board = f.script.serve(Route::Board(GameId::from("g1")));
        f.monitor.launch().await;
        global.send(start("g1")).unwrap();
        settle().await;
        board
            .send(Ok(
                r#"{"type":"gameFull","state":{"type":"gameState","moves":"e2e4"}}"#.to_string(),
            ))
            .unwrap();
        settle().await;
        let Reply::Active {
            game_id,
            fen,
            moves,
            applied,
        } = f
            .monitor
            .handle(Command::GetGameState {
                game_id: GameId::from("g1"),
            })
            .await
        else {
            panic!("expected active game");
        };
        assert_eq!(game_id, GameId::from("g1"));
        assert_eq!(applied, 1);
        assert_eq!(
            fen,
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
        assert_eq!(moves.len(), 20);
        assert_eq!(
            f.monitor
                .handle(Command::GetGameState {
                    game_id: GameId::from("zzz"),
                })
                .await,
            Reply::NotFound {
                game_id: GameId::from("zzz")
            }
        );
    }
}
