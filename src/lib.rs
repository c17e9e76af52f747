// Solace - Keyword-driven psychology chat backend
// Library exports

// Classification core
pub mod analysis;
pub mod crisis;
pub mod engine;
pub mod knowledge;
pub mod lexicon;
pub mod matcher;
pub mod respond;
pub mod router;

// Services and adapters
pub mod config;
pub mod errors;
pub mod metrics;
pub mod server;
pub mod service;
pub mod store;

pub use engine::Engine;
