#![forbid(unsafe_code)]

//! Storage gateway for the quiz catalog.
//!
//! Services depend on the repository traits in [`repository`]; the
//! [`sqlite`] module provides the durable backend and
//! [`repository::InMemoryRepository`] a test double with the same constraint
//! behavior.

pub mod config;
pub mod repository;
pub mod sqlite;

pub use config::StorageConfig;
pub use repository::{QuestionRepository, Storage, StorageError, TopicRepository};
