// Knowledge module
// Optional structured lookup that enriches replies

mod base;

pub use base::{Framework, IssueProfile, IssueTable, KnowledgeBase, KnowledgeMatch, SafetyGuidelines};
