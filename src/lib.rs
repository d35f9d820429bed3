pub mod apis;
pub mod assembler;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod types;

// Fetching and debug side effects
pub mod infra;

pub use assembler::{AssemblerConfig, EventRecordAssembler};
pub use normalize::{normalize, DateRange};
pub use types::{EventRecord, RawRow, Source};
