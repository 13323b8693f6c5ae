pub mod chat_service;
pub mod model_catalog;

pub use chat_service::{ChatOptions, ChatService, HttpChatService, ResponseStream, StreamChunk};
pub use model_catalog::{HttpModelSource, ModelSource, resolve_selection};
