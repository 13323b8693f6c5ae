pub mod controllers;
pub mod markup;
pub mod models;
pub mod repositories;
pub mod services;
pub mod views;

pub use controllers::{ChatController, ControllerConfig, TranscriptMode};
pub use markup::FormatPolicy;
pub use models::{Conversation, Role, Turn};
pub use views::{Clipboard, NodeId, RenderSurface, ScrollMetrics, SurfaceCommand, UiEvent};
