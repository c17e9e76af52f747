// Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;

use solace::config::ChatConfig;
use solace::metrics::ServiceMetrics;
use solace::service::{AnalysisService, ChatService};
use solace::store::{
    Analysis, AnalysisId, Conversation, ConversationId, ConversationStore, MemoryStore,
    NewAnalysis, NewConversation, StoreError, User, UserId,
};
use solace::Engine;

/// Store whose every operation fails, as if the backing storage went away
pub struct FailingStore;

fn down() -> StoreError {
    StoreError::Unavailable("backing storage offline".to_string())
}

#[async_trait]
impl ConversationStore for FailingStore {
    async fn create_user(&self, _username: &str, _is_admin: bool) -> Result<User, StoreError> {
        Err(down())
    }

    async fn user(&self, _id: UserId) -> Result<Option<User>, StoreError> {
        Err(down())
    }

    async fn insert_conversation(&self, _new: NewConversation) -> Result<Conversation, StoreError> {
        Err(down())
    }

    async fn conversation(
        &self,
        _user_id: UserId,
        _id: ConversationId,
    ) -> Result<Option<Conversation>, StoreError> {
        Err(down())
    }

    async fn latest_unanalyzed(&self, _user_id: UserId) -> Result<Option<Conversation>, StoreError> {
        Err(down())
    }

    async fn recent_conversations(
        &self,
        _user_id: UserId,
        _limit: usize,
    ) -> Result<Vec<Conversation>, StoreError> {
        Err(down())
    }

    async fn record_analysis(&self, _new: NewAnalysis) -> Result<Analysis, StoreError> {
        Err(down())
    }

    async fn analyses(&self, _user_id: UserId, _limit: usize) -> Result<Vec<Analysis>, StoreError> {
        Err(down())
    }

    async fn analysis(&self, _user_id: UserId, _id: AnalysisId) -> Result<Option<Analysis>, StoreError> {
        Err(down())
    }
}

pub struct Services {
    pub engine: Engine,
    pub chat: ChatService,
    pub analysis: AnalysisService,
    pub metrics: ServiceMetrics,
}

/// Services over the built-in data with a deterministic continuity setting
pub fn services_with(store: Arc<dyn ConversationStore>, continuity_probability: f64) -> Services {
    let engine = Engine::builtin().expect("built-in data loads");
    let metrics = ServiceMetrics::new().expect("metrics registry");
    let config = ChatConfig {
        memory_depth: 3,
        continuity_probability,
    };

    Services {
        chat: ChatService::new(engine.clone(), Arc::clone(&store), config, metrics.clone()),
        analysis: AnalysisService::new(engine.clone(), store, metrics.clone()),
        engine,
        metrics,
    }
}

pub fn services() -> Services {
    services_with(Arc::new(MemoryStore::new()), 0.0)
}
