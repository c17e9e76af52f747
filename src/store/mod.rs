// Store module
// Persistence of users, conversations and analyses behind one async trait

mod file;
mod memory;
mod tables;
mod types;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use tables::Tables;
pub use types::{
    Analysis, AnalysisId, Conversation, ConversationId, NewAnalysis, NewConversation, User, UserId,
};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{StorageConfig, StoreKind};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("user {0} does not exist")]
    UnknownUser(UserId),

    #[error("conversation {0} does not exist for this user")]
    UnknownConversation(ConversationId),

    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store snapshot is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage used by the chat and analysis services
///
/// Listing methods return newest first. Lookups scoped by user return `None`
/// for records owned by someone else.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn create_user(&self, username: &str, is_admin: bool) -> Result<User, StoreError>;

    async fn user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn insert_conversation(&self, new: NewConversation) -> Result<Conversation, StoreError>;

    async fn conversation(
        &self,
        user_id: UserId,
        id: ConversationId,
    ) -> Result<Option<Conversation>, StoreError>;

    async fn latest_unanalyzed(&self, user_id: UserId) -> Result<Option<Conversation>, StoreError>;

    async fn recent_conversations(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<Conversation>, StoreError>;

    /// Persist the analysis and mark its conversation analyzed, atomically
    async fn record_analysis(&self, new: NewAnalysis) -> Result<Analysis, StoreError>;

    async fn analyses(&self, user_id: UserId, limit: usize) -> Result<Vec<Analysis>, StoreError>;

    async fn analysis(&self, user_id: UserId, id: AnalysisId) -> Result<Option<Analysis>, StoreError>;
}

/// Build the store selected in the config
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn ConversationStore>, StoreError> {
    match config.kind {
        StoreKind::Memory => {
            tracing::info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreKind::File => {
            tracing::info!(path = %config.path.display(), "Using file store");
            Ok(Arc::new(FileStore::open(&config.path)?))
        }
    }
}
