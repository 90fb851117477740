#![allow(dead_code)]

use std::sync::Arc;

use akta_config::RetrievalConfig;
use akta_core::CorpusDocument;
use akta_corpus::CorpusStore;
use akta_embeddings::EmbeddingService;
use akta_search::{IndexHandle, Indexer, Retriever};
use chrono::{TimeZone, Utc};

pub const SOURCE: &str = "https://example.org/employment-act-1955";

pub const ACT: &str = "EMPLOYMENT ACT 1955

An Act relating to employment.

PART II
CONTRACTS OF SERVICE

12. Notice of termination of contract

(1) Either party to a contract of service may at any time give to the other party notice of his intention to terminate such contract of service.

(2) The notice period shall be four weeks if the employee has been employed for less than two years, and six weeks if employed for two years or more but less than five years.

PART XII
REST DAYS, HOURS OF WORK, HOLIDAYS AND OTHER CONDITIONS OF SERVICE

60A. Hours of work

(1) An employee shall not be required to work more than eight hours in one day or forty-five hours in one week.";

pub fn act(day: u32) -> CorpusDocument {
    CorpusDocument::new(
        SOURCE,
        "Employment Act 1955",
        ACT,
        Utc.with_ymd_and_hms(2026, 1, day, 0, 0, 0).unwrap(),
    )
}

pub struct Fixture {
    pub store: Arc<CorpusStore>,
    pub handle: Arc<IndexHandle>,
    pub indexer: Indexer,
}

pub fn fixture(embedder: Arc<dyn EmbeddingService>) -> Fixture {
    let store = Arc::new(CorpusStore::open_in_memory().expect("in-memory store"));
    with_store(store, embedder)
}

pub fn with_store(store: Arc<CorpusStore>, embedder: Arc<dyn EmbeddingService>) -> Fixture {
    let handle = Arc::new(IndexHandle::new());
    let indexer = Indexer::new(Arc::clone(&store), embedder, Arc::clone(&handle), 256);
    Fixture {
        store,
        handle,
        indexer,
    }
}

pub fn retriever(handle: &Arc<IndexHandle>, embedder: Arc<dyn EmbeddingService>) -> Retriever {
    Retriever::new(Arc::clone(handle), embedder, &RetrievalConfig::default())
}
