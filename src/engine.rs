// Classification engine
// Pure core: classify, respond and summarize over tables loaded once at start-up

use anyhow::{bail, Result};
use std::path::Path;
use std::sync::Arc;

use crate::analysis::{Summarizer, Summary};
use crate::config::DataConfig;
use crate::errors::file_not_found_error;
use crate::knowledge::KnowledgeBase;
use crate::lexicon::{Emotion, Lexicon, Topic};
use crate::matcher::{Classification, SceneMatcher};
use crate::respond::{GuideBook, Reply, ResponseAssembler};

/// Stateless and cheap to clone; every table sits behind an `Arc`
#[derive(Debug, Clone)]
pub struct Engine {
    matcher: SceneMatcher,
    assembler: ResponseAssembler,
    summarizer: Summarizer,
}

impl Engine {
    pub fn new(
        lexicon: Arc<Lexicon>,
        guides: Arc<GuideBook>,
        knowledge: Option<Arc<KnowledgeBase>>,
    ) -> Self {
        let matcher = SceneMatcher::new(Arc::clone(&lexicon));
        let mut assembler = ResponseAssembler::new(lexicon, guides);
        if let Some(kb) = knowledge {
            assembler = assembler.with_knowledge(kb);
        }
        let summarizer = Summarizer::new(matcher.clone());

        Self {
            matcher,
            assembler,
            summarizer,
        }
    }

    /// Engine over the built-in data, knowledge base included
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(
            Arc::new(Lexicon::builtin()?),
            Arc::new(GuideBook::builtin()?),
            Some(Arc::new(KnowledgeBase::builtin()?)),
        ))
    }

    /// Engine over the data files named in the config, built-ins for the rest
    pub fn from_config(data: &DataConfig) -> Result<Self> {
        let lexicon = match &data.lexicon_path {
            Some(path) => {
                ensure_exists(path, "Lexicon")?;
                Lexicon::load_from_file(path)?
            }
            None => Lexicon::builtin()?,
        };

        let guides = match &data.guide_questions_path {
            Some(path) => {
                ensure_exists(path, "Guide questions file")?;
                GuideBook::load_from_file(path)?
            }
            None => GuideBook::builtin()?,
        };

        let knowledge = if !data.knowledge_enabled {
            None
        } else {
            match &data.knowledge_path {
                Some(path) => {
                    ensure_exists(path, "Knowledge base")?;
                    Some(KnowledgeBase::load_from_file(path)?)
                }
                None => Some(KnowledgeBase::builtin()?),
            }
        };

        tracing::info!(
            emotions = lexicon.emotions.len(),
            topics = lexicon.topics.len(),
            guide_questions = guides.len(),
            knowledge = knowledge.is_some(),
            "Engine data loaded"
        );

        Ok(Self::new(
            Arc::new(lexicon),
            Arc::new(guides),
            knowledge.map(Arc::new),
        ))
    }

    pub fn classify(&self, text: &str) -> Classification {
        self.matcher.classify(text)
    }

    pub fn respond(&self, emotion: Option<Emotion>, topic: Option<Topic>, is_crisis: bool) -> Reply {
        self.assembler.respond(emotion, topic, is_crisis)
    }

    pub fn respond_to(&self, classification: &Classification) -> Reply {
        self.assembler.respond_to(classification)
    }

    pub fn summarize(&self, text: &str) -> Summary {
        self.summarizer.summarize(text)
    }

    pub fn knowledge(&self) -> Option<&Arc<KnowledgeBase>> {
        self.assembler.knowledge()
    }

    pub fn lexicon(&self) -> &Arc<Lexicon> {
        self.matcher.lexicon()
    }
}

fn ensure_exists(path: &Path, description: &str) -> Result<()> {
    if !path.exists() {
        bail!(file_not_found_error(&path.display().to_string(), description));
    }
    Ok(())
}
