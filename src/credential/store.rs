use super::*;
use crate::TOKEN_KEY;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

type Listener = Box<dyn Fn(Option<&Token>) + Send + Sync>;

/// Process-wide holder of the bearer credential.
///
/// Loaded from [`Storage`] at startup. Every change is persisted first,
/// then announced synchronously to each listener exactly once, and finally
/// visible to async watchers. Writing the current value again changes nothing.
/// Writes made to the storage by someone else are picked up by
/// [`reload`](Self::reload) and announced the same way.
/// Listeners run while the store is locked and must not write to it.
#[derive(Clone)]
pub struct Credential {
    storage: Arc<dyn Storage>,
    value: Arc<watch::Sender<Option<Token>>>,
    listeners: Arc<Mutex<Vec<Listener>>>,
}

impl Credential {
    pub fn load(storage: Arc<dyn Storage>) -> anyhow::Result<Self> {
        let token = Self::read(storage.as_ref())?;
        match token {
            Some(_) => log::info!("token loaded from storage"),
            None => log::warn!("no lichess token in storage"),
        }
        Ok(Self {
            storage,
            value: Arc::new(watch::Sender::new(token)),
            listeners: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn get(&self) -> Option<Token> {
        self.value.borrow().clone()
    }

    /// Returns whether the stored value changed. An empty token clears.
    pub fn set(&self, token: impl Into<Token>) -> anyhow::Result<bool> {
        let token = token.into();
        match token.secret().is_empty() {
            true => self.replace(None),
            false => self.replace(Some(token)),
        }
    }

    pub fn clear(&self) -> anyhow::Result<bool> {
        self.replace(None)
    }

    /// Register a callback run synchronously on every change.
    pub fn on_change<F>(&self, listener: F)
    where
        F: Fn(Option<&Token>) + Send + Sync + 'static,
    {
        self.lock().push(Box::new(listener));
    }

    /// Async view of the current value.
    pub fn watch(&self) -> watch::Receiver<Option<Token>> {
        self.value.subscribe()
    }

    /// Adopt what the storage holds now. Returns whether that differed from
    /// the current value; nothing is written back.
    pub fn reload(&self) -> anyhow::Result<bool> {
        let listeners = self.lock();
        let stored = Self::read(self.storage.as_ref())?;
        self.commit(&listeners, stored, false)
    }

    /// Re-read the storage every `every` until the handle is aborted.
    pub fn follow(&self, every: Duration) -> JoinHandle<()> {
        let credential = self.clone();
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(every);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                match credential.reload() {
                    Ok(true) => log::info!("token changed in storage"),
                    Ok(false) => {}
                    Err(e) => log::warn!("could not re-read token storage: {}", e),
                }
            }
        })
    }

    fn read(storage: &dyn Storage) -> anyhow::Result<Option<Token>> {
        Ok(storage
            .load(TOKEN_KEY)?
            .filter(|s| !s.is_empty())
            .map(Token::from))
    }

    fn replace(&self, next: Option<Token>) -> anyhow::Result<bool> {
        let listeners = self.lock();
        self.commit(&listeners, next, true)
    }

    fn commit(
        &self,
        listeners: &[Listener],
        next: Option<Token>,
        persist: bool,
    ) -> anyhow::Result<bool> {
        if *self.value.borrow() == next {
            return Ok(false);
        }
        if persist {
            self.storage
                .store(TOKEN_KEY, next.as_ref().map(Token::secret))?;
        }
        self.value.send_replace(next.clone());
        listeners.iter().for_each(|notify| notify(next.as_ref()));
        match next {
            Some(_) => log::info!("token updated"),
            None => log::info!("token cleared"),
        }
        Ok(true)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Listener>> {
        self.listeners
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    fn counted(credential: &Credential) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        credential.on_change(move |_| {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn change_notifies_once() {
        let credential = Credential::load(Arc::new(MemoryStorage::default())).unwrap();
        let count = counted(&credential);
        assert!(credential.set("lip_a").unwrap());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(credential.get(), Some(Token::from("lip_a")));
    }

    #[test]
    fn same_value_is_noop() {
        let credential = Credential::load(Arc::new(MemoryStorage::default())).unwrap();
        let count = counted(&credential);
        credential.set("lip_a").unwrap();
        assert!(!credential.set("lip_a").unwrap());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(credential.set("lip_b").unwrap());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn clear_and_empty() {
        let credential = Credential::load(Arc::new(MemoryStorage::default())).unwrap();
        assert!(!credential.clear().unwrap());
        credential.set("lip_a").unwrap();
        assert!(credential.set("").unwrap());
        assert_eq!(credential.get(), None);
    }

    #[test]
    fn persists_and_restores() {
        let storage = Arc::new(MemoryStorage::default());
        Credential::load(storage.clone()).unwrap().set("lip_a").unwrap();
        assert_eq!(storage.load(TOKEN_KEY).unwrap().as_deref(), Some("lip_a"));
        let restored = Credential::load(storage).unwrap();
        assert_eq!(restored.get(), Some(Token::from("lip_a")));
    }

    #[test]
    fn outside_writes_are_adopted_on_reload() {
        let storage = Arc::new(MemoryStorage::default());
        let ours = Credential::load(storage.clone()).unwrap();
        let theirs = Credential::load(storage.clone()).unwrap();
        let count = counted(&ours);
        theirs.set("lip_x").unwrap();
        assert_eq!(ours.get(), None);
        assert!(ours.reload().unwrap());
        assert_eq!(ours.get(), Some(Token::from("lip_x")));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!ours.reload().unwrap());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        theirs.clear().unwrap();
        assert!(ours.reload().unwrap());
        assert_eq!(ours.get(), None);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn reload_follows_shared_file() {
        let dir = std::env::temp_dir().join(format!("chessassist-shared-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("store.json");
        let _ = std::fs::remove_file(&path);
        let ours = Credential::load(Arc::new(FileStorage::new(&path))).unwrap();
        let theirs = Credential::load(Arc::new(FileStorage::new(&path))).unwrap();
        theirs.set("lip_file").unwrap();
        assert!(ours.reload().unwrap());
        assert_eq!(ours.get(), Some(Token::from("lip_file")));
    }

    #[tokio::test(start_paused = true)]
    async fn follow_picks_up_outside_writes() {
        let storage = Arc::new(MemoryStorage::default());
        let credential = Credential::load(storage.clone()).unwrap();
        let count = counted(&credential);
        let mut rx = credential.watch();
        let follower = credential.follow(Duration::from_secs(2));
        storage.store(TOKEN_KEY, Some("lip_y")).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(Token::from("lip_y")));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        storage.store(TOKEN_KEY, None).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), None);
        assert_eq!(count.load(Ordering::SeqCst), 2);
        follower.abort();
    }

    #[tokio::test]
    async fn watchers_see_changes() {
        let credential = Credential::load(Arc::new(MemoryStorage::default())).unwrap();
        let mut rx = credential.watch();
        credential.set("lip_a").unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(Token::from("lip_a")));
    }
}
