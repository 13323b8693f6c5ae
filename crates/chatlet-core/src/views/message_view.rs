use std::sync::Arc;

use crate::models::Role;

use super::surface::{NodeId, RenderSurface, ScrollMetrics};

/// Pixel tolerance under which the viewport counts as "at the bottom" for
/// auto-scroll purposes.
const NEAR_BOTTOM_THRESHOLD: f64 = 40.0;

/// Pixel tolerance used for the jump-to-bottom control's visibility. Tighter
/// than the auto-scroll threshold so the control disappears only when the
/// user is truly at the bottom.
const JUMP_VISIBLE_THRESHOLD: f64 = 20.0;

/// Headless model of the message container's scroll position, fed by the
/// surface's scroll reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollModel {
    metrics: ScrollMetrics,
}

impl ScrollModel {
    pub fn update(&mut self, metrics: ScrollMetrics) {
        self.metrics = metrics;
    }

    /// Whether the viewport is within the auto-scroll threshold of the bottom.
    pub fn is_near_bottom(&self) -> bool {
        self.metrics.scroll_top + self.metrics.client_height
            >= self.metrics.scroll_height - NEAR_BOTTOM_THRESHOLD
    }

    /// Whether the jump-to-bottom control should be shown.
    pub fn jump_visible(&self) -> bool {
        self.metrics.scroll_top + self.metrics.client_height
            < self.metrics.scroll_height - JUMP_VISIBLE_THRESHOLD
    }
}

/// Appends message nodes to the scrolling container and owns the auto-scroll
/// policy: sample whether the viewport is near the bottom *before* mutating
/// content, scroll after only if that sample was true. This never yanks the
/// view down while the user is reading history.
pub struct MessageView {
    surface: Arc<dyn RenderSurface>,
    scroll: ScrollModel,
}

impl MessageView {
    pub fn new(surface: Arc<dyn RenderSurface>) -> Self {
        Self {
            surface,
            scroll: ScrollModel::default(),
        }
    }

    pub fn update_scroll(&mut self, metrics: ScrollMetrics) {
        self.scroll.update(metrics);
    }

    pub fn jump_visible(&self) -> bool {
        self.scroll.jump_visible()
    }

    /// Append a user bubble with already-formatted markup.
    pub fn append_user(&self, html: &str) -> NodeId {
        let was_near_bottom = self.scroll.is_near_bottom();
        let node = self.surface.append_message(Role::User, html);
        if was_near_bottom {
            self.surface.scroll_to_bottom();
        }
        node
    }

    /// Append an empty assistant bubble for the upcoming stream.
    pub fn create_assistant_placeholder(&self) -> NodeId {
        let was_near_bottom = self.scroll.is_near_bottom();
        let node = self.surface.append_message(Role::Assistant, "");
        if was_near_bottom {
            self.surface.scroll_to_bottom();
        }
        node
    }

    pub fn show_typing(&self, node: NodeId) {
        self.surface.set_typing(node, true);
    }

    pub fn hide_typing(&self, node: NodeId) {
        self.surface.set_typing(node, false);
    }

    /// Replace a bubble's content with a full re-render, preserving the
    /// reader's place unless they were already near the bottom.
    pub fn replace_content(&self, node: NodeId, html: &str) {
        let was_near_bottom = self.scroll.is_near_bottom();
        self.surface.replace_message_content(node, html);
        if was_near_bottom {
            self.surface.scroll_to_bottom();
        }
    }
}
