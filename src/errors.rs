// Error types and user-friendly messages
//
// `ServiceError` is what the chat and analysis services return; the HTTP
// adapter maps each variant to a status code. The message helpers turn
// loading failures into actionable text for the CLI.

use thiserror::Error;

use crate::store::{AnalysisId, ConversationId, StoreError, UserId};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("conversation {0} not found")]
    ConversationNotFound(ConversationId),

    #[error("no conversation waiting for analysis")]
    NothingToAnalyze,

    #[error("analysis {0} not found")]
    AnalysisNotFound(AnalysisId),

    #[error("framework '{0}' not found")]
    FrameworkNotFound(String),

    #[error("knowledge base is disabled")]
    KnowledgeDisabled,

    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    /// Persistence failed; nothing was fabricated in its place
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl ServiceError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::InvalidInput(_) => "invalid_input",
            ServiceError::UserNotFound(_) => "user_not_found",
            ServiceError::ConversationNotFound(_) => "conversation_not_found",
            ServiceError::NothingToAnalyze => "nothing_to_analyze",
            ServiceError::AnalysisNotFound(_) => "analysis_not_found",
            ServiceError::FrameworkNotFound(_) => "framework_not_found",
            ServiceError::KnowledgeDisabled => "knowledge_disabled",
            ServiceError::UsernameTaken(_) => "username_taken",
            ServiceError::Unavailable(_) => "unavailable",
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UsernameTaken(name) => ServiceError::UsernameTaken(name),
            StoreError::UnknownUser(id) => ServiceError::UserNotFound(id),
            StoreError::UnknownConversation(id) => ServiceError::ConversationNotFound(id),
            other => {
                tracing::error!(error = %other, "Store operation failed");
                ServiceError::Unavailable(other.to_string())
            }
        }
    }
}

/// Format a config parse error with helpful suggestions
pub fn config_parse_error(path: &str, error: &str) -> String {
    format!(
        "Failed to parse config file {}\n\n\
        \x1b[1;33mError:\x1b[0m {}\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Check config file syntax:\n\
           \x1b[36mcat {}\x1b[0m\n\n\
        2. Compare with the documented sections:\n\
           [server] [data] [storage] [chat] [logging]\n\n\
        3. Common mistakes:\n\
           • Missing quotes around strings\n\
           • storage.kind other than \"memory\" or \"file\"\n\
           • continuity_probability outside 0.0..=1.0",
        path, error, path
    )
}

/// Format a data file not found error with helpful suggestions
pub fn file_not_found_error(path: &str, description: &str) -> String {
    format!(
        "{} not found: {}\n\n\
        \x1b[1;33mPossible causes:\x1b[0m\n\
        • File has been moved or deleted\n\
        • Wrong path in config or SOLACE_DATA_DIR\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Check if file exists:\n\
           \x1b[36mls -la {}\x1b[0m\n\n\
        2. Remove the path from the config to use the built-in data",
        description, path, path
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_service_errors() {
        let err: ServiceError = StoreError::UnknownUser(7).into();
        assert!(matches!(err, ServiceError::UserNotFound(7)));

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err: ServiceError = StoreError::Io(io).into();
        assert_eq!(err.kind(), "unavailable");
        assert!(err.to_string().contains("disk gone"));
    }

    #[test]
    fn test_config_parse_error_names_path() {
        let msg = config_parse_error("/tmp/solace.toml", "expected `=`");
        assert!(msg.contains("/tmp/solace.toml"));
        assert!(msg.contains("expected `=`"));
    }

    #[test]
    fn test_file_not_found_suggests_builtin() {
        let msg = file_not_found_error("/data/lexicon.json", "Lexicon");
        assert!(msg.starts_with("Lexicon not found"));
        assert!(msg.contains("built-in data"));
    }
}
