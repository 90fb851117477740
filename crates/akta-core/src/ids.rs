//! Content hashing and deterministic id derivation.
//!
//! Ids are derived rather than random so that re-indexing unchanged content
//! reproduces the same chunk ids byte for byte.

use sha2::{Digest, Sha256};

/// Prefix for corpus document ids.
pub const PREFIX_DOCUMENT: &str = "doc";
/// Prefix for corpus chunk ids.
pub const PREFIX_CHUNK: &str = "chk";

/// Length of the hex suffix used in derived ids.
const ID_HEX_LEN: usize = 16;

/// Lowercase hex SHA-256 of `text`.
#[must_use]
pub fn content_hash(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

/// Stable document id for a tracked source. Every version of the same
/// `source_url` shares this id; versions differ by `content_hash`.
#[must_use]
pub fn document_id(source_url: &str) -> String {
    prefixed(PREFIX_DOCUMENT, source_url.trim())
}

/// Chunk id derived from the owning document version and chunk position.
#[must_use]
pub fn chunk_id(document_id: &str, content_hash: &str, chunk_index: usize) -> String {
    prefixed(
        PREFIX_CHUNK,
        &format!("{document_id}:{content_hash}:{chunk_index}"),
    )
}

fn prefixed(prefix: &str, material: &str) -> String {
    let hash = content_hash(material);
    format!("{prefix}-{}", &hash[..ID_HEX_LEN])
}
