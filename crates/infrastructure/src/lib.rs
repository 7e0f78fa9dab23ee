//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_backend_gateway;
mod in_memory_backend_gateway;
mod in_memory_session_token_store;
mod tracing_notifier;

pub use http_backend_gateway::{HttpBackendGateway, HttpEntityWriter};
pub use in_memory_backend_gateway::{InMemoryBackendGateway, InMemoryEntityWriter};
pub use in_memory_session_token_store::InMemorySessionTokenStore;
pub use tracing_notifier::TracingNotifier;
