// Lexicon module
// Immutable keyword dictionaries and response text, loaded once and injected

mod labels;
mod tables;

pub use labels::{emotion_or_neutral, CoreIssue, Emotion, Scene, Topic};
pub use tables::{
    CategoryKeywords, CombinationRule, CrisisKeywords, CrisisTemplate, Lexicon, ResponseTexts,
    SummaryTexts, Technique,
};
