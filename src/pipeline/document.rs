// Document: the raw (title, content) pair submitted for classification.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_TITLE_CHARS: usize = 500;
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 20_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("title is {len} characters, maximum is {max}")]
    TitleTooLong { len: usize, max: usize },

    #[error("content must not be empty")]
    EmptyContent,

    #[error("content is {len} characters, maximum is {max}")]
    ContentTooLong { len: usize, max: usize },

    #[error("document has no text after trimming")]
    Blank,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
}

impl Document {
    pub fn new(title: Option<String>, content: impl Into<String>) -> Self {
        Self {
            title,
            content: content.into(),
        }
    }

    /// Check length limits (counted in characters) and that some text
    /// remains once combined and trimmed.
    pub fn validate(&self, max_content_chars: usize) -> Result<(), DocumentError> {
        if let Some(title) = &self.title {
            let len = title.chars().count();
            if len > MAX_TITLE_CHARS {
                return Err(DocumentError::TitleTooLong {
                    len,
                    max: MAX_TITLE_CHARS,
                });
            }
        }

        let len = self.content.chars().count();
        if len == 0 {
            return Err(DocumentError::EmptyContent);
        }
        if len > max_content_chars {
            return Err(DocumentError::ContentTooLong {
                len,
                max: max_content_chars,
            });
        }

        if self.combined().is_empty() {
            return Err(DocumentError::Blank);
        }
        Ok(())
    }

    /// `title + " " + content` when a non-empty title is present, else the
    /// content alone, trimmed.
    pub fn combined(&self) -> String {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => format!("{} {}", title, self.content).trim().to_string(),
            _ => self.content.trim().to_string(),
        }
    }
}
