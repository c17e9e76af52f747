// Matcher module
// Keyword-driven scene/emotion classification

mod scene;

pub use scene::{dominant, Classification, SceneMatcher};
