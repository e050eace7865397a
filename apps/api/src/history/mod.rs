pub mod index;
pub mod loader;

pub use index::HistoricalDataIndex;
