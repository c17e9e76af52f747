// Volatile store, lost on restart

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    Analysis, AnalysisId, Conversation, ConversationId, ConversationStore, NewAnalysis,
    NewConversation, StoreError, Tables, User, UserId,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn create_user(&self, username: &str, is_admin: bool) -> Result<User, StoreError> {
        self.tables.write().await.create_user(username, is_admin)
    }

    async fn user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.user(id))
    }

    async fn insert_conversation(&self, new: NewConversation) -> Result<Conversation, StoreError> {
        self.tables.write().await.insert_conversation(new)
    }

    async fn conversation(
        &self,
        user_id: UserId,
        id: ConversationId,
    ) -> Result<Option<Conversation>, StoreError> {
        Ok(self.tables.read().await.conversation(user_id, id))
    }

    async fn latest_unanalyzed(&self, user_id: UserId) -> Result<Option<Conversation>, StoreError> {
        Ok(self.tables.read().await.latest_unanalyzed(user_id))
    }

    async fn recent_conversations(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<Conversation>, StoreError> {
        Ok(self.tables.read().await.recent_conversations(user_id, limit))
    }

    async fn record_analysis(&self, new: NewAnalysis) -> Result<Analysis, StoreError> {
        self.tables.write().await.record_analysis(new)
    }

    async fn analyses(&self, user_id: UserId, limit: usize) -> Result<Vec<Analysis>, StoreError> {
        Ok(self.tables.read().await.analyses(user_id, limit))
    }

    async fn analysis(&self, user_id: UserId, id: AnalysisId) -> Result<Option<Analysis>, StoreError> {
        Ok(self.tables.read().await.analysis(user_id, id))
    }
}
