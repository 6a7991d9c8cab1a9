pub mod config;
pub mod errors;
pub mod fetcher;
pub mod locator;
pub mod extractor;
pub mod pipeline;
pub mod report;
pub mod delay_manager;
pub mod logger;

// Exporting types for convenience
pub use config::{Config, RunOptions, Session};
pub use errors::{ConfigError, FetchError, WriteError};
pub use extractor::{BillExtractor, ExtractionRecord};
pub use fetcher::{Fetch, HttpFetcher};
pub use locator::Locator;
pub use pipeline::{Aggregator, Pipeline, RunStats};
pub use report::ReportRow;
