use serde::{Deserialize, Serialize};

use crate::models::Role;

/// Identifier of one message bubble on the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Scroll geometry of the message container, reported by the surface on every
/// scroll event and after content mutations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub client_height: f64,
    pub scroll_height: f64,
}

/// The widget's side of the rendering seam.
///
/// Everything the engine does to the page goes through this trait, so the
/// formatting and state-machine logic can run headlessly with the surface
/// mocked. The web host realizes it by shipping [`SurfaceCommand`]s to the
/// embedded shell; tests record the calls.
pub trait RenderSurface: Send + Sync {
    /// Append a message bubble and return its node id.
    fn append_message(&self, role: Role, html: &str) -> NodeId;
    /// Replace a bubble's rendered content with a full re-render.
    fn replace_message_content(&self, node: NodeId, html: &str);
    /// Mark a bubble as failed and show plain error text.
    fn set_message_error(&self, node: NodeId, text: &str);
    /// Show or hide the typing indicator inside an assistant bubble.
    fn set_typing(&self, node: NodeId, visible: bool);
    /// Enable or disable the submit control.
    fn set_send_enabled(&self, enabled: bool);
    /// Scroll the message container to the bottom.
    fn scroll_to_bottom(&self);
    /// Show or hide the jump-to-bottom control.
    fn set_jump_visible(&self, visible: bool);
    /// Relabel one copy control ("Copy" / "Copied!").
    fn set_copy_label(&self, node: NodeId, block: usize, label: &str);
    /// Populate the model picker, preselecting one entry.
    fn set_model_options(&self, models: &[String], selected: Option<&str>);
    /// Degrade the model picker to a single non-selectable error entry.
    fn set_model_error(&self, message: &str);
}

/// Clipboard capability. May fail silently per platform policy.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> anyhow::Result<()>;
}

/// Wire form of every [`RenderSurface`] mutation, consumed by the shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceCommand {
    AppendMessage { id: NodeId, role: Role, html: String },
    ReplaceContent { id: NodeId, html: String },
    SetError { id: NodeId, text: String },
    SetTyping { id: NodeId, visible: bool },
    SetSendEnabled { enabled: bool },
    ScrollToBottom,
    SetJumpVisible { visible: bool },
    SetCopyLabel { id: NodeId, block: usize, label: String },
    SetModelOptions { models: Vec<String>, selected: Option<String> },
    SetModelError { message: String },
    WriteClipboard { text: String },
}

/// Events flowing from the surface back into the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    Submit { text: String },
    Scroll { metrics: ScrollMetrics },
    CopyClicked { id: NodeId, block: usize },
    ModelSelected { model: String },
    JumpClicked,
}
