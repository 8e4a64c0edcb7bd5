use thiserror::Error;

use crate::types::{Key, PageId};

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not insert. Error: Duplicate Key")]
    DuplicateKey { key: Key },

    #[error("Could not insert into table")]
    CapacityExceeded { max_pages: u32 },

    #[error("Page {page_id} is out of bounds (max pages: {max_pages})")]
    PageOutOfBounds { page_id: PageId, max_pages: u32 },

    #[error("Page is full (page_id: {page_id})")]
    PageFull { page_id: PageId },

    #[error("Serialization/deserialization error: {details}")]
    SerializationError { details: String },

    #[error("Invalid page size: {expected} bytes, got {actual} bytes")]
    InvalidPageSize { expected: usize, actual: usize },

    #[error("Corrupted page: page_id={page_id}, reason={reason}")]
    CorruptedPage { page_id: PageId, reason: String },

    #[error("Corrupted database file: {reason}")]
    CorruptedFile { reason: String },

    #[error("Invalid page type: {0}")]
    InvalidPageType(u8),
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
