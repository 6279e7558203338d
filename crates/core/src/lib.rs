#![forbid(unsafe_code)]

//! Domain model for the quiz catalog: topics, questions, answer options,
//! authoring drafts and the score tally. Nothing in this crate performs I/O.

pub mod model;
pub mod text;
pub mod time;

pub use time::Clock;
