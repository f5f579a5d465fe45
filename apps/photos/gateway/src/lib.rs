//! Photo Search Gateway
//!
//! HTTP front for text-to-image search and similar-photo recommendations.
//!
//! ## Architecture
//!
//! ```text
//! Browser / SPA                    Indexer
//!   ↓ public listener (/api/v1)      ↓ internal listener (/v1/index)
//! ┌──────────────────────────────────────────┐
//! │        PhotoService (domain_photos)      │
//! └───────────┬──────────────────┬───────────┘
//!             ↓                  ↓
//!   Embedding service (HTTP)   Qdrant (gRPC)
//! ```
//!
//! ## Modules
//!
//! - `config`: Environment-driven listener configuration
//! - `tracing`: Subscriber setup (JSON for prod, pretty for dev)
//! - `server`: Startup bootstrap, both listeners, graceful shutdown

pub mod config;
pub mod server;
pub mod tracing;

pub use config::{ConfigError, Environment, GatewayConfig, ListenerConfig};
pub use server::run;
