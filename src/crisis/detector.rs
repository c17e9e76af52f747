// Crisis phrase detector

use serde::Serialize;

use crate::lexicon::CrisisKeywords;

/// Why a text was flagged
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CrisisSignal {
    /// A direct self-harm phrase
    Direct { phrase: String },
    /// One word each from the life, pain and ending sets
    Combined {
        life: String,
        pain: String,
        ending: String,
    },
}

#[derive(Debug, Clone)]
pub struct CrisisDetector {
    keywords: CrisisKeywords,
}

impl CrisisDetector {
    pub fn new(keywords: CrisisKeywords) -> Self {
        Self { keywords }
    }

    /// Detect if text contains crisis language
    pub fn detect_crisis(&self, text: &str) -> bool {
        self.assess(text).is_some()
    }

    /// Two-tier check: any direct phrase, or life + pain + ending words together
    pub fn assess(&self, text: &str) -> Option<CrisisSignal> {
        let text_lower = text.to_lowercase();

        if let Some(phrase) = first_hit(&self.keywords.direct, &text_lower) {
            tracing::warn!(phrase = %phrase, "Crisis detected: direct self-harm phrase");
            return Some(CrisisSignal::Direct {
                phrase: phrase.to_string(),
            });
        }

        let life = first_hit(&self.keywords.life, &text_lower)?;
        let pain = first_hit(&self.keywords.pain, &text_lower)?;
        let ending = first_hit(&self.keywords.ending, &text_lower)?;

        tracing::warn!(
            life = %life,
            pain = %pain,
            ending = %ending,
            "Crisis detected: life/pain/ending combination"
        );
        Some(CrisisSignal::Combined {
            life: life.to_string(),
            pain: pain.to_string(),
            ending: ending.to_string(),
        })
    }
}

fn first_hit<'a>(words: &'a [String], text_lower: &str) -> Option<&'a str> {
    words
        .iter()
        .find(|word| text_lower.contains(word.as_str()))
        .map(String::as_str)
}
