//! nyaya - legal document assistant for Indian languages.
//!
//! Core library shared by the workspace crates: configuration, the closed
//! set of supported languages, the provider registry over the LLM backends,
//! and the normalizer that turns free-text model replies into typed values.

// Closed enums expose `from_str` returning Option<Self>, not the
// Result that std::str::FromStr requires.
#![allow(clippy::should_implement_trait)]

pub mod config;
pub mod language;
pub mod llm;
pub mod normalize;

pub use config::{Config, ConfigError};
pub use language::LanguageCode;
pub use llm::{Backend, BackendKind, ProviderRegistry, RegistryError};
pub use normalize::WinProbability;
