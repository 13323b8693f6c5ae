pub mod conversation;

pub use conversation::{Conversation, Role, Turn};
