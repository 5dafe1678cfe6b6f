pub mod deals;
pub mod search;

pub use deals::{ControllerState, DealListController, LoadOutcome};
pub use search::{toggle_sources, AiSearchController, SearchOutcome};
