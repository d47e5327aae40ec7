use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Durable string key-value entries.
pub trait Storage: Send + Sync {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>>;
    /// `None` removes the entry.
    fn store(&self, key: &str, value: Option<&str>) -> anyhow::Result<()>;
}

/// Flat JSON object on disk, rewritten whole on every store.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(serde_json::Map::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(serde_json::Map::new()),
            Err(e) => Err(anyhow::anyhow!("read {}: {}", self.path.display(), e)),
        }
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self
            .read()?
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(String::from))
    }

    fn store(&self, key: &str, value: Option<&str>) -> anyhow::Result<()> {
        let mut entries = self.read()?;
        match value {
            Some(v) => entries.insert(key.to_string(), serde_json::Value::from(v)),
            None => entries.remove(key),
        };
        let staging = self.path.with_extension("tmp");
        std::fs::write(&staging, serde_json::to_string_pretty(&entries)?)?;
        std::fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

/// In-process storage; forgets everything on exit.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory storage poisoned"))?
            .get(key)
            .cloned())
    }

    fn store(&self, key: &str, value: Option<&str>) -> anyhow::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory storage poisoned"))?;
        match value {
            Some(v) => entries.insert(key.to_string(), v.to_string()),
            None => entries.remove(key),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("chessassist-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join("store.json")
    }

    #[test]
    fn file_round_trip_survives_reopen() {
        let path = scratch("reopen");
        FileStorage::new(&path).store("lichess_token", Some("lip_abc")).unwrap();
        FileStorage::new(&path).store("other", Some("kept")).unwrap();
        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.load("lichess_token").unwrap().as_deref(), Some("lip_abc"));
        reopened.store("lichess_token", None).unwrap();
        assert_eq!(reopened.load("lichess_token").unwrap(), None);
        assert_eq!(reopened.load("other").unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn missing_file_is_empty() {
        let path = scratch("missing").with_file_name("absent.json");
        assert_eq!(FileStorage::new(path).load("lichess_token").unwrap(), None);
    }

    #[test]
    fn memory() {
        let storage = MemoryStorage::default();
        storage.store("k", Some("v")).unwrap();
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("v"));
        storage.store("k", None).unwrap();
        assert_eq!(storage.load("k").unwrap(), None);
    }
}
