use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use chatlet_core::{Clipboard, NodeId, RenderSurface, Role, SurfaceCommand};

/// Surface implementation that forwards every mutation to the connected shell
/// as one JSON command over the WebSocket. Node ids are allocated here since
/// the shell addresses bubbles by the ids it was told at append time.
pub struct WsSurface {
    commands: UnboundedSender<SurfaceCommand>,
    next_id: AtomicU64,
}

impl WsSurface {
    pub fn new(commands: UnboundedSender<SurfaceCommand>) -> Self {
        Self {
            commands,
            next_id: AtomicU64::new(0),
        }
    }

    fn send(&self, command: SurfaceCommand) {
        // A send failure means the shell hung up; the controller task is torn
        // down right after, so dropped commands are harmless.
        if self.commands.send(command).is_err() {
            debug!("surface command dropped after shell disconnect");
        }
    }
}

impl RenderSurface for WsSurface {
    fn append_message(&self, role: Role, html: &str) -> NodeId {
        let id = NodeId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.send(SurfaceCommand::AppendMessage {
            id,
            role,
            html: html.to_string(),
        });
        id
    }

    fn replace_message_content(&self, node: NodeId, html: &str) {
        self.send(SurfaceCommand::ReplaceContent {
            id: node,
            html: html.to_string(),
        });
    }

    fn set_message_error(&self, node: NodeId, text: &str) {
        self.send(SurfaceCommand::SetError {
            id: node,
            text: text.to_string(),
        });
    }

    fn set_typing(&self, node: NodeId, visible: bool) {
        self.send(SurfaceCommand::SetTyping { id: node, visible });
    }

    fn set_send_enabled(&self, enabled: bool) {
        self.send(SurfaceCommand::SetSendEnabled { enabled });
    }

    fn scroll_to_bottom(&self) {
        self.send(SurfaceCommand::ScrollToBottom);
    }

    fn set_jump_visible(&self, visible: bool) {
        self.send(SurfaceCommand::SetJumpVisible { visible });
    }

    fn set_copy_label(&self, node: NodeId, block: usize, label: &str) {
        self.send(SurfaceCommand::SetCopyLabel {
            id: node,
            block,
            label: label.to_string(),
        });
    }

    fn set_model_options(&self, models: &[String], selected: Option<&str>) {
        self.send(SurfaceCommand::SetModelOptions {
            models: models.to_vec(),
            selected: selected.map(str::to_string),
        });
    }

    fn set_model_error(&self, message: &str) {
        self.send(SurfaceCommand::SetModelError {
            message: message.to_string(),
        });
    }
}

impl Clipboard for WsSurface {
    /// Clipboard writes happen in the browser; the host just relays the text.
    fn write_text(&self, text: &str) -> Result<()> {
        self.send(SurfaceCommand::WriteClipboard {
            text: text.to_string(),
        });
        Ok(())
    }
}
