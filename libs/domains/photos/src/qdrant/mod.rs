mod client;
mod config;
mod transport;

pub use client::QdrantPhotoRepository;
pub use config::QdrantConfig;
pub use transport::QdrantTransport;

#[cfg(test)]
pub use transport::MockQdrantTransport;
