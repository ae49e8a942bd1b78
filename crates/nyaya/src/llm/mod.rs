//! AI backends and the registry that tracks which are usable.
//!
//! Supports three providers:
//! - OpenAI: `/v1/chat/completions`, bearer auth
//! - Groq: same API shape as OpenAI, text-only by default
//! - Google Gemini: `generateContent`, API key header

mod backend;
pub mod gemini;
mod http;
pub mod openai;
mod registry;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;
#[cfg(test)]
mod test_server;

pub use backend::{
    Backend, BackendKind, Capabilities, CompletionRequest, InlineImage, LlmBackend, LlmError,
};
pub use registry::{ProviderRegistry, ProviderStatus, RegistryError};
