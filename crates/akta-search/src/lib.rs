//! # akta-search
//!
//! Statute chunking, indexing and retrieval for Akta.
//!
//! - [`chunker`] cuts normalized statute text into section-bounded chunks
//! - [`indexer::Indexer`] embeds chunks, persists them in the corpus store and
//!   publishes them to the live index
//! - [`index::IndexHandle`] holds the live index as a versioned snapshot that
//!   is swapped atomically
//! - [`retriever::Retriever`] scores a query against one snapshot
//!
//! The live index is a derived cache: [`indexer::Indexer::rebuild_from_store`]
//! reconstructs it from the corpus store alone.

pub mod chunker;
pub mod error;
pub mod index;
pub mod indexer;
pub mod lexical;
pub mod retriever;

pub use error::SearchError;
pub use index::{IndexHandle, IndexSnapshot};
pub use indexer::{Indexer, RebuildReport, ReindexReport};
pub use retriever::{RetrievalOutcome, Retriever};
