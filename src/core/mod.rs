pub mod credentials;
pub mod demo;
pub mod display;

pub use crate::domain::model::{ChatResponse, Payload, StreamChunk};
pub use crate::domain::ports::{AiService, ChunkStream};
pub use crate::utils::error::Result;
