pub mod review_writer;
pub mod summary;

pub use review_writer::ReviewWriter;
pub use summary::{LowConfidence, ResultSummary};
