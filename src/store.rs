use crate::error::StoreError;
use crate::models::Chat;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Capability contract for the subscriber set.
///
/// Implementations are internally synchronized; the dispatcher calls them
/// from both of its loops without any further locking. `list` returns chats
/// in ascending id order so replies and fan-out order are deterministic.
pub trait ChatStore: Send + Sync {
    fn list(&self) -> Result<Vec<Chat>, StoreError>;

    fn add(&self, chat: Chat) -> Result<(), StoreError>;

    /// Removing a chat that was never added is not an error.
    fn remove(&self, chat: &Chat) -> Result<(), StoreError>;
}

/// Volatile store, used in tests and when no store path is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    chats: Mutex<BTreeMap<i64, Chat>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChatStore for MemoryStore {
    fn list(&self) -> Result<Vec<Chat>, StoreError> {
        let chats = self.chats.lock().expect("store mutex poisoned");
        Ok(chats.values().cloned().collect())
    }

    fn add(&self, chat: Chat) -> Result<(), StoreError> {
        let mut chats = self.chats.lock().expect("store mutex poisoned");
        chats.insert(chat.id, chat);
        Ok(())
    }

    fn remove(&self, chat: &Chat) -> Result<(), StoreError> {
        let mut chats = self.chats.lock().expect("store mutex poisoned");
        chats.remove(&chat.id);
        Ok(())
    }
}

/// Durable store: the full subscriber set is rewritten to a JSON file after
/// every successful mutation, via a temp file and rename so readers never
/// observe a partial write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    chats: Mutex<BTreeMap<i64, Chat>>,
}

impl FileStore {
    /// Loads the existing set if the file is present; a missing file starts
    /// the store empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let chats = match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let entries: Vec<Chat> = serde_json::from_str(&contents)?;
                entries.into_iter().map(|c| (c.id, c)).collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            chats: Mutex::new(chats),
        })
    }

    fn persist(&self, chats: &BTreeMap<i64, Chat>) -> Result<(), StoreError> {
        let entries: Vec<&Chat> = chats.values().collect();
        let json = serde_json::to_string_pretty(&entries)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ChatStore for FileStore {
    fn list(&self) -> Result<Vec<Chat>, StoreError> {
        let chats = self.chats.lock().expect("store mutex poisoned");
        Ok(chats.values().cloned().collect())
    }

    fn add(&self, chat: Chat) -> Result<(), StoreError> {
        let mut chats = self.chats.lock().expect("store mutex poisoned");
        chats.insert(chat.id, chat);
        self.persist(&chats)
    }

    fn remove(&self, chat: &Chat) -> Result<(), StoreError> {
        let mut chats = self.chats.lock().expect("store mutex poisoned");
        if chats.remove(&chat.id).is_some() {
            self.persist(&chats)?;
        }
        Ok(())
    }
}
