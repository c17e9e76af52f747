// JSON snapshot store
// Every mutation rewrites the snapshot: temp file + rename under an exclusive lock file

use async_trait::async_trait;
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::{
    Analysis, AnalysisId, Conversation, ConversationId, ConversationStore, NewAnalysis,
    NewConversation, StoreError, Tables, User, UserId,
};

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    tables: Mutex<Tables>,
}

impl FileStore {
    /// Open the snapshot at `path`, starting empty when it does not exist yet
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tables = if path.exists() {
            let contents = fs::read_to_string(path)?;
            serde_json::from_str(&contents)?
        } else {
            Tables::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            tables: Mutex::new(tables),
        })
    }

    /// Write the snapshot on the blocking pool; the tables lock stays held meanwhile
    async fn persist(&self, tables: &Tables) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(tables)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_snapshot(&path, &json))
            .await
            .map_err(|e| StoreError::Unavailable(format!("snapshot writer failed: {}", e)))?
    }

    /// Apply a mutation to a copy and swap it in only once it is on disk
    async fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut Tables) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.tables.lock().await;
        let mut next = guard.clone();
        let value = apply(&mut next)?;

        if let Err(e) = self.persist(&next).await {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to write store snapshot");
            return Err(e);
        }

        *guard = next;
        Ok(value)
    }
}

/// Lock file, temp file, rename
fn write_snapshot(path: &Path, json: &str) -> Result<(), StoreError> {
    let lock_path = path.with_extension("lock");
    let lock_file = OpenOptions::new()
        .create(true)
        .write(true)
        .open(&lock_path)?;
    lock_file.lock_exclusive()?;

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, json)?;
    fs::rename(&temp_path, path)?;

    // Lock released when lock_file drops
    Ok(())
}

#[async_trait]
impl ConversationStore for FileStore {
    async fn create_user(&self, username: &str, is_admin: bool) -> Result<User, StoreError> {
        self.mutate(|t| t.create_user(username, is_admin)).await
    }

    async fn user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.tables.lock().await.user(id))
    }

    async fn insert_conversation(&self, new: NewConversation) -> Result<Conversation, StoreError> {
        self.mutate(|t| t.insert_conversation(new)).await
    }

    async fn conversation(
        &self,
        user_id: UserId,
        id: ConversationId,
    ) -> Result<Option<Conversation>, StoreError> {
        Ok(self.tables.lock().await.conversation(user_id, id))
    }

    async fn latest_unanalyzed(&self, user_id: UserId) -> Result<Option<Conversation>, StoreError> {
        Ok(self.tables.lock().await.latest_unanalyzed(user_id))
    }

    async fn recent_conversations(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<Conversation>, StoreError> {
        Ok(self.tables.lock().await.recent_conversations(user_id, limit))
    }

    async fn record_analysis(&self, new: NewAnalysis) -> Result<Analysis, StoreError> {
        self.mutate(|t| t.record_analysis(new)).await
    }

    async fn analyses(&self, user_id: UserId, limit: usize) -> Result<Vec<Analysis>, StoreError> {
        Ok(self.tables.lock().await.analyses(user_id, limit))
    }

    async fn analysis(&self, user_id: UserId, id: AnalysisId) -> Result<Option<Analysis>, StoreError> {
        Ok(self.tables.lock().await.analysis(user_id, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = FileStore::open(&path).unwrap();
            let user = store.create_user("alice", false).await.unwrap();
            store
                .insert_conversation(NewConversation {
                    user_id: user.id,
                    user_input: "今天很开心".to_string(),
                    assistant_response: "很高兴听到你有开心的事情！".to_string(),
                })
                .await
                .unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        let user = reopened.user(1).await.unwrap().unwrap();
        assert_eq!(user.username, "alice");

        let conversations = reopened.recent_conversations(1, 10).await.unwrap();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].user_input, "今天很开心");
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_state_untouched() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(&dir.path().join("store.json")).unwrap();

        store.create_user("alice", false).await.unwrap();
        assert!(store.create_user("alice", false).await.is_err());

        // The rejected insert must not have consumed an id
        let bob = store.create_user("bob", false).await.unwrap();
        assert_eq!(bob.id, 2);
    }

    #[tokio::test]
    async fn test_write_failure_is_reported_and_discarded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::open(&path).unwrap();

        // A directory where the temp file should go makes the write fail
        fs::create_dir(path.with_extension("tmp")).unwrap();
        let err = store.create_user("alice", false).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(store.user(1).await.unwrap().is_none());

        fs::remove_dir(path.with_extension("tmp")).unwrap();
        let alice = store.create_user("alice", false).await.unwrap();
        assert_eq!(alice.id, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_all_persisted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let store = std::sync::Arc::new(FileStore::open(&path).unwrap());

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = std::sync::Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.create_user(&format!("user{}", i), false).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        for id in 1..=16 {
            assert!(reopened.user(id).await.unwrap().is_some());
        }
    }

    #[test]
    fn test_malformed_snapshot_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(FileStore::open(&path), Err(StoreError::Malformed(_))));
    }
}
