use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::outbox::Outbox;

pub type ConnectionId = u64;

/// Name to connection table shared by every connection task and the router.
///
/// All access goes through one async mutex. Entries remember which connection
/// registered them so a connection can only ever remove its own entry.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Mutex<HashMap<String, Entry>>,
}

#[derive(Debug)]
struct Entry {
    id: ConnectionId,
    outbox: Outbox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    NameTaken,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `name` for connection `id`. The first holder keeps the name.
    pub async fn register(
        &self,
        name: &str,
        id: ConnectionId,
        outbox: Outbox,
    ) -> Result<(), RegisterError> {
        let mut entries = self.entries.lock().await;

        if entries.contains_key(name) {
            return Err(RegisterError::NameTaken);
        }

        entries.insert(name.to_string(), Entry { id, outbox });
        Ok(())
    }

    /// Releases `name` if connection `id` still holds it.
    pub async fn unregister(&self, name: &str, id: ConnectionId) -> bool {
        let mut entries = self.entries.lock().await;
        match entries.get(name) {
            Some(entry) if entry.id == id => {
                entries.remove(name);
                true
            }
            _ => false,
        }
    }

    pub async fn lookup(&self, name: &str) -> Option<Outbox> {
        let entries = self.entries.lock().await;
        entries.get(name).map(|entry| entry.outbox.clone())
    }

    /// Connection currently holding `name`. Inspection only; routing goes through `lookup`.
    pub async fn holder(&self, name: &str) -> Option<ConnectionId> {
        let entries = self.entries.lock().await;
        entries.get(name).map(|entry| entry.id)
    }

    /// Registered names in sorted order, for inspection and tests.
    pub async fn names(&self) -> Vec<String> {
        let entries = self.entries.lock().await;
        let mut names: Vec<String> = entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered names, for inspection and tests.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// For inspection and tests.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
