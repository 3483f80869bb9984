// Adapters layer: concrete implementations of the service port.

pub mod http;
pub mod sse;
