// Analysis module

mod summarizer;

pub use summarizer::{Summarizer, Summary};
