pub mod data_merger;
pub mod extractor;
pub mod ingest_processor;
pub mod resampler;

pub use data_merger::{DuplicatePolicy, IncrementalMerger, ToleranceMatch};
pub use extractor::ObservationExtractor;
pub use ingest_processor::IngestProcessor;
pub use resampler::Resampler;
