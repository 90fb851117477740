//! # akta-refresh
//!
//! Keeps the corpus current with its tracked statutory sources.
//!
//! - [`fetch::DocumentFetcher`] is the fetch seam; [`HttpFetcher`] serves
//!   `http(s)://` and `file://` sources
//! - [`normalize`] turns fetched HTML or text into heading-marked text
//! - [`SourceRegistry`] holds the configured sources
//! - [`RefreshScheduler`] runs refresh passes on demand or on an interval
//!
//! The same put-then-reindex path backs local ingest through [`ingest`].

pub mod error;
pub mod fetch;
pub mod normalize;
pub mod registry;
pub mod scheduler;
pub mod testing;

pub use error::{FetchError, RefreshError};
pub use fetch::{DocumentFetcher, Fetched, HttpFetcher};
pub use registry::{SourceRegistry, TrackedSource};
pub use scheduler::{RefreshScheduler, ingest};
