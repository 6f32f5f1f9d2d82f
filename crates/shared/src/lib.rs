//! Vocabulary shared by the interaction core, the engine and the front-ends.

pub mod domain;
pub mod error;
pub mod protocol;
