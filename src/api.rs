//! Endpoint schemas and the [`crate::Client`] methods that call them.

pub mod assistants;
pub mod chat;
pub mod completion;
pub mod edits;
pub mod fine_tunes;
