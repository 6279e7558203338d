use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::TopicId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopicError {
    #[error("topic name cannot be empty")]
    EmptyName,
}

/// Trims a topic name and rejects blank input.
///
/// # Errors
///
/// Returns `TopicError::EmptyName` if the name is empty or whitespace-only.
pub fn normalize_topic_name(name: &str) -> Result<String, TopicError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TopicError::EmptyName);
    }
    Ok(trimmed.to_owned())
}

/// A named category grouping questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    id: TopicId,
    name: String,
}

impl Topic {
    /// Creates a topic with a trimmed name.
    ///
    /// # Errors
    ///
    /// Returns `TopicError::EmptyName` if the name is blank.
    pub fn new(id: TopicId, name: impl AsRef<str>) -> Result<Self, TopicError> {
        let name = normalize_topic_name(name.as_ref())?;
        Ok(Self { id, name })
    }

    #[must_use]
    pub fn id(&self) -> TopicId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_rejects_blank_name() {
        let err = Topic::new(TopicId::new(1), "   ").unwrap_err();
        assert_eq!(err, TopicError::EmptyName);
    }

    #[test]
    fn topic_trims_name() {
        let topic = Topic::new(TopicId::new(4), "  Geography ").unwrap();
        assert_eq!(topic.id(), TopicId::new(4));
        assert_eq!(topic.name(), "Geography");
    }
}
