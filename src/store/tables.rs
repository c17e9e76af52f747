// In-memory tables shared by every store backend
// Pure data manipulation; locking and persistence live in the backends

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::{
    Analysis, AnalysisId, Conversation, ConversationId, NewAnalysis, NewConversation, User, UserId,
};
use super::StoreError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tables {
    users: BTreeMap<UserId, User>,
    conversations: BTreeMap<ConversationId, Conversation>,
    analyses: BTreeMap<AnalysisId, Analysis>,
    next_user_id: UserId,
    next_conversation_id: ConversationId,
    next_analysis_id: AnalysisId,
}

impl Tables {
    pub fn create_user(&mut self, username: &str, is_admin: bool) -> Result<User, StoreError> {
        if self.users.values().any(|u| u.username == username) {
            return Err(StoreError::UsernameTaken(username.to_string()));
        }

        self.next_user_id += 1;
        let user = User {
            id: self.next_user_id,
            username: username.to_string(),
            is_admin,
            created_at: Utc::now(),
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn user(&self, id: UserId) -> Option<User> {
        self.users.get(&id).cloned()
    }

    pub fn insert_conversation(&mut self, new: NewConversation) -> Result<Conversation, StoreError> {
        if !self.users.contains_key(&new.user_id) {
            return Err(StoreError::UnknownUser(new.user_id));
        }

        self.next_conversation_id += 1;
        let conversation = Conversation {
            id: self.next_conversation_id,
            user_id: new.user_id,
            user_input: new.user_input,
            assistant_response: new.assistant_response,
            created_at: Utc::now(),
            is_analyzed: false,
        };
        self.conversations.insert(conversation.id, conversation.clone());
        Ok(conversation)
    }

    /// Conversation by id, only if owned by the user
    pub fn conversation(&self, user_id: UserId, id: ConversationId) -> Option<Conversation> {
        self.conversations
            .get(&id)
            .filter(|c| c.user_id == user_id)
            .cloned()
    }

    /// Ids grow with insertion time, so reverse id order is newest first
    fn conversations_of(&self, user_id: UserId) -> impl Iterator<Item = &Conversation> {
        self.conversations
            .values()
            .rev()
            .filter(move |c| c.user_id == user_id)
    }

    pub fn latest_unanalyzed(&self, user_id: UserId) -> Option<Conversation> {
        self.conversations_of(user_id)
            .find(|c| !c.is_analyzed)
            .cloned()
    }

    pub fn recent_conversations(&self, user_id: UserId, limit: usize) -> Vec<Conversation> {
        self.conversations_of(user_id).take(limit).cloned().collect()
    }

    /// Insert the analysis and flag its conversation in one step
    pub fn record_analysis(&mut self, new: NewAnalysis) -> Result<Analysis, StoreError> {
        let conversation = self
            .conversations
            .get_mut(&new.conversation_id)
            .filter(|c| c.user_id == new.user_id)
            .ok_or(StoreError::UnknownConversation(new.conversation_id))?;
        conversation.is_analyzed = true;

        self.next_analysis_id += 1;
        let analysis = Analysis {
            id: self.next_analysis_id,
            user_id: new.user_id,
            conversation_id: new.conversation_id,
            core_issue: new.summary.core_issue,
            emotion: new.summary.emotion,
            conclusion: new.summary.conclusion,
            analyzed_at: Utc::now(),
        };
        self.analyses.insert(analysis.id, analysis.clone());
        Ok(analysis)
    }

    pub fn analyses(&self, user_id: UserId, limit: usize) -> Vec<Analysis> {
        self.analyses
            .values()
            .rev()
            .filter(|a| a.user_id == user_id)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn analysis(&self, user_id: UserId, id: AnalysisId) -> Option<Analysis> {
        self.analyses
            .get(&id)
            .filter(|a| a.user_id == user_id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Summary;
    use crate::lexicon::CoreIssue;

    fn summary() -> Summary {
        Summary {
            emotion: None,
            core_issue: CoreIssue::DailySharing,
            conclusion: "这是一次很好的自我表达，继续保持开放的沟通".to_string(),
        }
    }

    fn chat(tables: &mut Tables, user_id: UserId, text: &str) -> Conversation {
        tables
            .insert_conversation(NewConversation {
                user_id,
                user_input: text.to_string(),
                assistant_response: "嗯".to_string(),
            })
            .unwrap()
    }

    #[test]
    fn test_usernames_are_unique() {
        let mut tables = Tables::default();
        let first = tables.create_user("alice", false).unwrap();
        assert_eq!(first.id, 1);

        let err = tables.create_user("alice", true).unwrap_err();
        assert!(matches!(err, StoreError::UsernameTaken(name) if name == "alice"));
    }

    #[test]
    fn test_conversation_requires_user() {
        let mut tables = Tables::default();
        let err = tables
            .insert_conversation(NewConversation {
                user_id: 9,
                user_input: "hi".to_string(),
                assistant_response: String::new(),
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownUser(9)));
    }

    #[test]
    fn test_recent_is_newest_first_and_per_user() {
        let mut tables = Tables::default();
        let alice = tables.create_user("alice", false).unwrap().id;
        let bob = tables.create_user("bob", false).unwrap().id;

        chat(&mut tables, alice, "one");
        chat(&mut tables, bob, "bob");
        chat(&mut tables, alice, "two");
        chat(&mut tables, alice, "three");

        let texts: Vec<String> = tables
            .recent_conversations(alice, 2)
            .into_iter()
            .map(|c| c.user_input)
            .collect();
        assert_eq!(texts, vec!["three", "two"]);
        assert!(tables.conversation(bob, 1).is_none());
    }

    #[test]
    fn test_record_analysis_marks_conversation() {
        let mut tables = Tables::default();
        let alice = tables.create_user("alice", false).unwrap().id;
        let first = chat(&mut tables, alice, "one");
        let second = chat(&mut tables, alice, "two");

        assert_eq!(tables.latest_unanalyzed(alice).unwrap().id, second.id);

        tables
            .record_analysis(NewAnalysis {
                user_id: alice,
                conversation_id: second.id,
                summary: summary(),
            })
            .unwrap();

        assert!(tables.conversation(alice, second.id).unwrap().is_analyzed);
        assert_eq!(tables.latest_unanalyzed(alice).unwrap().id, first.id);
        assert_eq!(tables.analyses(alice, 10).len(), 1);
    }

    #[test]
    fn test_record_analysis_checks_owner() {
        let mut tables = Tables::default();
        let alice = tables.create_user("alice", false).unwrap().id;
        let bob = tables.create_user("bob", false).unwrap().id;
        let conversation = chat(&mut tables, alice, "mine");

        let err = tables
            .record_analysis(NewAnalysis {
                user_id: bob,
                conversation_id: conversation.id,
                summary: summary(),
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownConversation(id) if id == conversation.id));
        assert!(!tables.conversation(alice, conversation.id).unwrap().is_analyzed);
    }
}
