pub mod dataset_reader;
pub mod noaa_client;
pub mod windowed_fetcher;

pub use dataset_reader::DatasetReader;
pub use noaa_client::{parse_observations, NoaaClient, ObservationSource};
pub use windowed_fetcher::{split_windows, NoopSleeper, Sleeper, ThreadSleeper, WindowedFetcher};
