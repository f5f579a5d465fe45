mod http;
mod provider;

pub use http::{HttpEmbeddingConfig, HttpEmbeddingProvider};
pub use provider::EmbeddingProvider;

#[cfg(test)]
pub use provider::MockEmbeddingProvider;
