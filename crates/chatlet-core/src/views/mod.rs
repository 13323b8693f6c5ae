pub mod message_view;
pub mod surface;

pub use message_view::{MessageView, ScrollModel};
pub use surface::{Clipboard, NodeId, RenderSurface, ScrollMetrics, SurfaceCommand, UiEvent};
