pub mod engine;
pub mod memory;

pub use engine::{HistoryIterator, HistoryScan, ResultsIterator, ResultsScan, StateStore, StorageResult};
pub use memory::{VecHistoryIterator, VecResultsIterator, WorldState};
