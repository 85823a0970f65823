mod client;
mod definitions;

pub use client::DictionaryClient;
pub use definitions::{DefinitionsClient, DefinitionsError};
