// Guide question book
// Follow-up questions filed by scene, ranked by priority

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::lexicon::Scene;

const BUILTIN_GUIDES: &str = include_str!("../../data/guide_questions.json");

fn default_priority() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideQuestion {
    pub scene: Scene,
    pub question_text: String,
    /// 1 is the highest rank
    #[serde(default = "default_priority")]
    pub priority: u32,
}

#[derive(Debug, Clone, Default)]
pub struct GuideBook {
    questions: Vec<GuideQuestion>,
}

impl GuideBook {
    pub fn new(questions: Vec<GuideQuestion>) -> Self {
        Self { questions }
    }

    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_GUIDES).context("Built-in guide questions are invalid")
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read guide questions: {}", path.display()))?;

        Self::from_json_str(&contents)
            .with_context(|| format!("Failed to load guide questions from {}", path.display()))
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let questions: Vec<GuideQuestion> =
            serde_json::from_str(contents).context("Failed to parse guide questions JSON")?;
        Ok(Self::new(questions))
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Questions of one scene, best first; equal priority keeps file order
    pub fn for_scene(&self, scene: Scene) -> Vec<&GuideQuestion> {
        let mut matches: Vec<&GuideQuestion> =
            self.questions.iter().filter(|q| q.scene == scene).collect();
        matches.sort_by_key(|q| q.priority);
        matches
    }

    /// Questions of the first scene in `scenes` that has any, best first
    pub fn pick_all(&self, scenes: &[Scene]) -> Vec<&GuideQuestion> {
        scenes
            .iter()
            .map(|scene| self.for_scene(*scene))
            .find(|questions| !questions.is_empty())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{Emotion, Topic};

    #[test]
    fn test_builtin_guides_load() {
        let book = GuideBook::builtin().unwrap();
        assert_eq!(book.len(), 25);
        assert_eq!(book.for_scene(Scene::General).len(), 5);
    }

    #[test]
    fn test_priority_then_file_order() {
        let book = GuideBook::builtin().unwrap();
        let questions = book.for_scene(Scene::Emotion(Emotion::Anxiety));

        let priorities: Vec<u32> = questions.iter().map(|q| q.priority).collect();
        assert_eq!(priorities, vec![1, 1, 2]);
        assert_eq!(questions[0].question_text, "能告诉我是什么具体的情况让你感到焦虑吗？");
        assert_eq!(questions[1].question_text, "当你感到焦虑时，你的身体有什么反应？");
    }

    #[test]
    fn test_pick_all_falls_back_across_scenes() {
        let book = GuideBook::builtin().unwrap();

        // No questions are filed under 学习问题 or 孤独
        let picked = book.pick_all(&[
            Scene::Topic(Topic::Study),
            Scene::Emotion(Emotion::Loneliness),
            Scene::General,
        ]);
        assert_eq!(picked.len(), 5);
        assert!(picked.iter().all(|q| q.scene == Scene::General));
        assert_eq!(picked[0].question_text, "能告诉我更多关于这个情况的细节吗？");

        assert!(GuideBook::default().pick_all(&[Scene::General]).is_empty());
    }

    #[test]
    fn test_missing_priority_defaults_to_one() {
        let book = GuideBook::from_json_str(r#"[{"scene": "通用", "question_text": "还好吗？"}]"#).unwrap();
        assert_eq!(book.for_scene(Scene::General)[0].priority, 1);
    }

    #[test]
    fn test_unknown_scene_rejected() {
        let err = GuideBook::from_json_str(r#"[{"scene": "天气", "question_text": "?"}]"#);
        assert!(err.is_err());
    }
}
