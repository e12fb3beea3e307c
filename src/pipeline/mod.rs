// Classification pipeline: documents in, predictions out.

pub mod batch;
pub mod classify;
pub mod document;

pub use batch::{classify_batch, read_jsonl};
pub use classify::{classify_document, Classification, ClassifyError};
pub use document::{Document, DocumentError, DEFAULT_MAX_CONTENT_CHARS, MAX_TITLE_CHARS};
