// Service layer
// Async orchestration of the pure engine and the conversation store

mod analysis;
mod chat;

pub use analysis::{AnalysisDetail, AnalysisService};
pub use chat::{ChatOutcome, ChatService, MemoryTurn};

use crate::errors::ServiceError;

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;

/// Listing limit: default 10, accepted range 1..=100
pub fn validate_limit(limit: Option<usize>) -> Result<usize, ServiceError> {
    match limit {
        None => Ok(DEFAULT_LIMIT),
        Some(n) if (1..=MAX_LIMIT).contains(&n) => Ok(n),
        Some(n) => Err(ServiceError::InvalidInput(format!(
            "limit must be between 1 and {}, got {}",
            MAX_LIMIT, n
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_limit() {
        assert_eq!(validate_limit(None).unwrap(), 10);
        assert_eq!(validate_limit(Some(1)).unwrap(), 1);
        assert_eq!(validate_limit(Some(100)).unwrap(), 100);
        assert!(validate_limit(Some(0)).is_err());
        assert!(validate_limit(Some(101)).is_err());
    }
}
