// Crisis module
// Heuristic self-harm language detection

mod detector;

pub use detector::{CrisisDetector, CrisisSignal};
