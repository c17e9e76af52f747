// Router module
// Picks the response strategy for a classified message

mod decision;

pub use decision::{ResponseRouter, RouteDecision, RouteSignals};
