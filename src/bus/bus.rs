use super::Notification;
use crate::BUS_CAPACITY;
use tokio::sync::broadcast;

/// Fire-and-forget publisher. Publishing never fails and never waits:
/// with no listener the message is dropped, a lagging listener loses the
/// oldest messages.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Notification>,
}

impl Default for Bus {
    fn default() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }
}

impl Bus {
    pub fn publish(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            log::trace!("no listener for notification");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lichess::GameId;

    #[test]
    fn publish_without_listener_is_silent() {
        Bus::default().publish(Notification::StreamClosed {
            game_id: GameId::from("nobody"),
        });
    }

    #[tokio::test]
    async fn every_listener_receives() {
        let bus = Bus::default();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();
        bus.publish(Notification::StreamClosed {
            game_id: GameId::from("g1"),
        });
        assert_eq!(a.recv().await.unwrap().game(), Some(&GameId::from("g1")));
        assert_eq!(b.recv().await.unwrap().game(), Some(&GameId::from("g1")));
    }
}
