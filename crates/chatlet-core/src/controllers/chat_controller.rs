use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, warn};

use crate::markup::{self, FormatPolicy};
use crate::models::Conversation;
use crate::repositories::SelectedModelRepository;
use crate::services::{ChatOptions, ChatService, ModelSource, StreamChunk, resolve_selection};
use crate::views::{Clipboard, MessageView, NodeId, RenderSurface, UiEvent};

/// How long a copy control shows its acknowledgement label before reverting.
const COPY_ACK_DURATION: Duration = Duration::from_millis(1500);

/// What the outbound prompt payload carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranscriptMode {
    /// The full conversation rendered as alternating role-labeled lines.
    FullHistory,
    /// The bare latest prompt only.
    LatestOnly,
}

/// Host-selected behavior switches. Both captured widget variants are
/// reproducible by combining these two axes.
#[derive(Debug, Clone, Copy)]
pub struct ControllerConfig {
    pub transcript_mode: TranscriptMode,
    pub format_policy: FormatPolicy,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            transcript_mode: TranscriptMode::FullHistory,
            format_policy: FormatPolicy::Rich,
        }
    }
}

/// Request/stream lifecycle. At most one cycle is in flight; concurrent
/// submits are prevented by disabling the submit control, not by cancelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Sending,
    Streaming,
}

/// Owns the conversation, drives the request/stream loop, and wires formatter
/// and code-renderer output into the message view on every streamed chunk.
///
/// All mutable state lives here and is touched only from the single task that
/// runs [`ChatController::run`], so no locking discipline is needed.
pub struct ChatController {
    conversation: Conversation,
    phase: Phase,
    models: Vec<String>,
    selected_model: Option<String>,
    view: MessageView,
    surface: Arc<dyn RenderSurface>,
    chat: Arc<dyn ChatService>,
    clipboard: Arc<dyn Clipboard>,
    selection_repo: Arc<dyn SelectedModelRepository>,
    config: ControllerConfig,
    /// Trimmed code text per rendered block, keyed by bubble, for the copy
    /// controls.
    code_blocks: HashMap<NodeId, Vec<String>>,
}

impl ChatController {
    pub fn new(
        surface: Arc<dyn RenderSurface>,
        chat: Arc<dyn ChatService>,
        clipboard: Arc<dyn Clipboard>,
        selection_repo: Arc<dyn SelectedModelRepository>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            conversation: Conversation::new(),
            phase: Phase::Idle,
            models: Vec::new(),
            selected_model: None,
            view: MessageView::new(Arc::clone(&surface)),
            surface,
            chat,
            clipboard,
            selection_repo,
            config,
            code_blocks: HashMap::new(),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn selected_model(&self) -> Option<&str> {
        self.selected_model.as_deref()
    }

    /// The model list as loaded at startup. Read-only afterwards.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Load the model list once and populate the picker. A fetch failure
    /// degrades the picker to an error entry and must not abort startup.
    pub async fn init_models(&mut self, source: &dyn ModelSource) {
        match source.load().await {
            Ok(models) => {
                let persisted = match self.selection_repo.load().await {
                    Ok(value) => value,
                    Err(err) => {
                        warn!(error = %err, "failed to load persisted model selection");
                        None
                    }
                };
                self.selected_model = resolve_selection(&models, persisted.as_deref());
                self.surface
                    .set_model_options(&models, self.selected_model.as_deref());
                self.models = models;
            }
            Err(err) => {
                error!(error = ?err, "failed to load model list");
                self.surface.set_model_error("Error loading models");
            }
        }
    }

    /// Drive the controller from a surface event stream until it closes.
    /// Returns the controller so hosts and tests can inspect final state.
    pub async fn run(mut self, mut events: UnboundedReceiver<UiEvent>) -> Self {
        while let Some(event) = events.recv().await {
            match event {
                UiEvent::Submit { text } => self.handle_submit(text, &mut events).await,
                other => self.handle_passive(other),
            }
        }
        self
    }

    async fn handle_submit(&mut self, text: String, events: &mut UnboundedReceiver<UiEvent>) {
        if self.phase != Phase::Idle {
            debug!("submit ignored while a cycle is in flight");
            return;
        }
        let prompt = text.trim().to_string();
        if prompt.is_empty() {
            // Whitespace-only input is a no-op, not an error.
            return;
        }
        self.send_message(prompt, events).await;
    }

    /// Events that are valid in any phase.
    fn handle_passive(&mut self, event: UiEvent) {
        match event {
            // Submits are routed separately; one arriving here means it was
            // received mid-cycle while the control is disabled.
            UiEvent::Submit { .. } => debug!("submit ignored while a cycle is in flight"),
            UiEvent::Scroll { metrics } => {
                self.view.update_scroll(metrics);
                self.surface.set_jump_visible(self.view.jump_visible());
            }
            UiEvent::JumpClicked => {
                self.surface.scroll_to_bottom();
                self.surface.set_jump_visible(false);
            }
            UiEvent::CopyClicked { id, block } => self.handle_copy(id, block),
            UiEvent::ModelSelected { model } => self.handle_model_selected(model),
        }
    }

    /// Copy a block's code text (control label excluded) and acknowledge on
    /// the control for a short fixed duration.
    fn handle_copy(&self, id: NodeId, block: usize) {
        let Some(code) = self
            .code_blocks
            .get(&id)
            .and_then(|blocks| blocks.get(block))
        else {
            warn!(node = id.0, block, "copy requested for unknown code block");
            return;
        };

        if let Err(err) = self.clipboard.write_text(code) {
            // The clipboard capability may fail silently per platform policy.
            debug!(error = %err, "clipboard write failed");
        }

        self.surface.set_copy_label(id, block, "Copied!");
        let surface = Arc::clone(&self.surface);
        tokio::spawn(async move {
            tokio::time::sleep(COPY_ACK_DURATION).await;
            surface.set_copy_label(id, block, "Copy");
        });
    }

    fn handle_model_selected(&mut self, model: String) {
        self.selected_model = Some(model.clone());
        let save = self.selection_repo.save(model);
        tokio::spawn(async move {
            if let Err(err) = save.await {
                warn!(error = %err, "failed to persist model selection");
            }
        });
    }

    fn build_prompt(&self) -> String {
        match self.config.transcript_mode {
            TranscriptMode::FullHistory => {
                format!("{}\nAssistant:", self.conversation.render_transcript())
            }
            TranscriptMode::LatestOnly => self
                .conversation
                .latest_user_content()
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// One full Idle → Sending → Streaming → Idle cycle.
    async fn send_message(&mut self, prompt: String, events: &mut UnboundedReceiver<UiEvent>) {
        self.conversation.push_user(prompt.clone());
        self.view
            .append_user(&markup::format(&prompt, FormatPolicy::LinkifyOnly));

        let node = self.view.create_assistant_placeholder();
        self.view.show_typing(node);
        self.surface.set_send_enabled(false);
        self.phase = Phase::Sending;

        match self.stream_response(node, events).await {
            Ok(full_text) => {
                self.conversation.push_assistant(full_text);
            }
            Err(err) => {
                // No rollback of partial content, no retry: mark the bubble
                // and settle back to Idle.
                error!(error = ?err, "chat stream failed");
                self.view.hide_typing(node);
                self.surface.set_message_error(node, &format!("Error: {err}"));
            }
        }

        // Re-enabled unconditionally, success or failure.
        self.surface.set_send_enabled(true);
        self.phase = Phase::Idle;
    }

    /// Consume the response stream, re-rendering the whole buffer into the
    /// assistant bubble on every text chunk. Passive surface events keep
    /// flowing between chunks.
    async fn stream_response(
        &mut self,
        node: NodeId,
        events: &mut UnboundedReceiver<UiEvent>,
    ) -> Result<String> {
        let prompt = self.build_prompt();
        let options = ChatOptions {
            model: self.selected_model.clone().unwrap_or_default(),
            stream: true,
        };

        let mut stream = self.chat.stream_chat(&prompt, &options).await?;
        self.phase = Phase::Streaming;
        self.view.hide_typing(node);

        let mut buffer = String::new();
        let mut events_open = true;
        loop {
            tokio::select! {
                biased;

                maybe_chunk = stream.next() => {
                    let Some(chunk) = maybe_chunk else { break };
                    match chunk? {
                        StreamChunk::Text(text) => {
                            buffer.push_str(&text);
                            let rendered =
                                markup::render_buffer(&buffer, self.config.format_policy);
                            self.code_blocks.insert(node, rendered.code_blocks);
                            self.view.replace_content(node, &rendered.html);
                        }
                        StreamChunk::Done => break,
                    }
                }

                maybe_event = events.recv(), if events_open => {
                    match maybe_event {
                        Some(event) => self.handle_passive(event),
                        None => events_open = false,
                    }
                }
            }
        }

        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicU64, Ordering};

    use anyhow::anyhow;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::sync::mpsc;

    use crate::models::Role;
    use crate::repositories::InMemorySelectedModelRepository;
    use crate::services::ResponseStream;
    use crate::views::{ScrollMetrics, SurfaceCommand};

    #[derive(Default)]
    struct RecordingSurface {
        commands: Mutex<Vec<SurfaceCommand>>,
        next_id: AtomicU64,
    }

    impl RecordingSurface {
        fn commands(&self) -> Vec<SurfaceCommand> {
            self.commands.lock().clone()
        }

        fn push(&self, cmd: SurfaceCommand) {
            self.commands.lock().push(cmd);
        }

        fn last_content(&self, node: NodeId) -> Option<String> {
            self.commands()
                .into_iter()
                .rev()
                .find_map(|cmd| match cmd {
                    SurfaceCommand::ReplaceContent { id, html } if id == node => Some(html),
                    _ => None,
                })
        }
    }

    impl RenderSurface for RecordingSurface {
        fn append_message(&self, role: Role, html: &str) -> NodeId {
            let id = NodeId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
            self.push(SurfaceCommand::AppendMessage {
                id,
                role,
                html: html.to_string(),
            });
            id
        }

        fn replace_message_content(&self, node: NodeId, html: &str) {
            self.push(SurfaceCommand::ReplaceContent {
                id: node,
                html: html.to_string(),
            });
        }

        fn set_message_error(&self, node: NodeId, text: &str) {
            self.push(SurfaceCommand::SetError {
                id: node,
                text: text.to_string(),
            });
        }

        fn set_typing(&self, node: NodeId, visible: bool) {
            self.push(SurfaceCommand::SetTyping { id: node, visible });
        }

        fn set_send_enabled(&self, enabled: bool) {
            self.push(SurfaceCommand::SetSendEnabled { enabled });
        }

        fn scroll_to_bottom(&self) {
            self.push(SurfaceCommand::ScrollToBottom);
        }

        fn set_jump_visible(&self, visible: bool) {
            self.push(SurfaceCommand::SetJumpVisible { visible });
        }

        fn set_copy_label(&self, node: NodeId, block: usize, label: &str) {
            self.push(SurfaceCommand::SetCopyLabel {
                id: node,
                block,
                label: label.to_string(),
            });
        }

        fn set_model_options(&self, models: &[String], selected: Option<&str>) {
            self.push(SurfaceCommand::SetModelOptions {
                models: models.to_vec(),
                selected: selected.map(str::to_string),
            });
        }

        fn set_model_error(&self, message: &str) {
            self.push(SurfaceCommand::SetModelError {
                message: message.to_string(),
            });
        }
    }

    #[derive(Default)]
    struct RecordingClipboard {
        copied: Mutex<Vec<String>>,
    }

    impl Clipboard for RecordingClipboard {
        fn write_text(&self, text: &str) -> Result<()> {
            self.copied.lock().push(text.to_string());
            Ok(())
        }
    }

    struct ScriptedChat {
        script: Mutex<Option<Vec<Result<StreamChunk>>>>,
        prompts: Mutex<Vec<String>>,
        options: Mutex<Vec<ChatOptions>>,
    }

    impl ScriptedChat {
        fn with_chunks(chunks: Vec<Result<StreamChunk>>) -> Self {
            Self {
                script: Mutex::new(Some(chunks)),
                prompts: Mutex::new(Vec::new()),
                options: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatService for ScriptedChat {
        async fn stream_chat(
            &self,
            prompt: &str,
            options: &ChatOptions,
        ) -> Result<ResponseStream> {
            self.prompts.lock().push(prompt.to_string());
            self.options.lock().push(options.clone());
            let chunks = self
                .script
                .lock()
                .take()
                .ok_or_else(|| anyhow!("script already consumed"))?;
            Ok(Box::pin(futures::stream::iter(chunks)))
        }
    }

    struct StubSource(Vec<String>);

    #[async_trait]
    impl ModelSource for StubSource {
        async fn load(&self) -> Result<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ModelSource for FailingSource {
        async fn load(&self) -> Result<Vec<String>> {
            Err(anyhow!("fetch failed"))
        }
    }

    struct Fixture {
        surface: Arc<RecordingSurface>,
        clipboard: Arc<RecordingClipboard>,
    }

    fn controller_with(
        chunks: Vec<Result<StreamChunk>>,
        config: ControllerConfig,
    ) -> (ChatController, Fixture) {
        let surface = Arc::new(RecordingSurface::default());
        let clipboard = Arc::new(RecordingClipboard::default());
        let controller = ChatController::new(
            surface.clone(),
            Arc::new(ScriptedChat::with_chunks(chunks)),
            clipboard.clone(),
            Arc::new(InMemorySelectedModelRepository::new()),
            config,
        );
        (controller, Fixture { surface, clipboard })
    }

    fn text(s: &str) -> Result<StreamChunk> {
        Ok(StreamChunk::Text(s.to_string()))
    }

    #[tokio::test]
    async fn test_successful_cycle_records_both_turns() {
        let (controller, fx) = controller_with(
            vec![text("Hi "), text("there"), Ok(StreamChunk::Done)],
            ControllerConfig::default(),
        );

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(UiEvent::Submit {
            text: "Hello".into(),
        })
        .unwrap();
        drop(tx);
        let controller = controller.run(rx).await;

        let turns = controller.conversation().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "Hello");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].content, "Hi there");

        // The assistant bubble (second append) ends as a single paragraph.
        assert_eq!(
            fx.surface.last_content(NodeId(2)).as_deref(),
            Some("<p>Hi there</p>")
        );

        // Submit control disabled for the cycle, re-enabled at the end.
        let commands = fx.surface.commands();
        let disabled = commands
            .iter()
            .position(|c| *c == SurfaceCommand::SetSendEnabled { enabled: false });
        let enabled = commands
            .iter()
            .position(|c| *c == SurfaceCommand::SetSendEnabled { enabled: true });
        assert!(disabled.is_some() && enabled.is_some());
        assert!(disabled < enabled);
    }

    #[tokio::test]
    async fn test_full_history_prompt_carries_transcript() {
        let chat = Arc::new(ScriptedChat::with_chunks(vec![
            text("Hi"),
            Ok(StreamChunk::Done),
        ]));
        let surface = Arc::new(RecordingSurface::default());
        let controller = ChatController::new(
            surface,
            chat.clone(),
            Arc::new(RecordingClipboard::default()),
            Arc::new(InMemorySelectedModelRepository::new()),
            ControllerConfig::default(),
        );

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(UiEvent::Submit {
            text: "Hello".into(),
        })
        .unwrap();
        drop(tx);
        controller.run(rx).await;

        assert_eq!(chat.prompts.lock().as_slice(), ["User: Hello\nAssistant:"]);
        assert!(chat.options.lock()[0].stream);
    }

    #[tokio::test]
    async fn test_latest_only_prompt_is_bare() {
        let chat = Arc::new(ScriptedChat::with_chunks(vec![
            text("Hi"),
            Ok(StreamChunk::Done),
        ]));
        let controller = ChatController::new(
            Arc::new(RecordingSurface::default()),
            chat.clone(),
            Arc::new(RecordingClipboard::default()),
            Arc::new(InMemorySelectedModelRepository::new()),
            ControllerConfig {
                transcript_mode: TranscriptMode::LatestOnly,
                format_policy: FormatPolicy::LinkifyOnly,
            },
        );

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(UiEvent::Submit {
            text: "Hello".into(),
        })
        .unwrap();
        drop(tx);
        controller.run(rx).await;

        assert_eq!(chat.prompts.lock().as_slice(), ["Hello"]);
    }

    #[tokio::test]
    async fn test_empty_submit_is_silent_noop() {
        let (controller, fx) =
            controller_with(vec![Ok(StreamChunk::Done)], ControllerConfig::default());

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(UiEvent::Submit { text: "   ".into() }).unwrap();
        drop(tx);
        let controller = controller.run(rx).await;

        assert!(controller.conversation().is_empty());
        assert!(fx.surface.commands().is_empty());
    }

    #[tokio::test]
    async fn test_mid_stream_failure_marks_bubble_and_drops_turn() {
        let (controller, fx) = controller_with(
            vec![text("Hel"), Err(anyhow!("boom"))],
            ControllerConfig::default(),
        );

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(UiEvent::Submit {
            text: "Hello".into(),
        })
        .unwrap();
        drop(tx);
        let controller = controller.run(rx).await;

        // Only the user turn survives.
        assert_eq!(controller.conversation().len(), 1);
        assert_eq!(controller.conversation().turns()[0].role, Role::User);

        let commands = fx.surface.commands();
        // Partial content was rendered and is not rolled back.
        assert!(commands.iter().any(|c| matches!(
            c,
            SurfaceCommand::ReplaceContent { html, .. } if html == "<p>Hel</p>"
        )));
        assert!(commands.iter().any(|c| matches!(
            c,
            SurfaceCommand::SetError { text, .. } if text == "Error: boom"
        )));
        // Submit control comes back even on failure.
        assert!(
            commands
                .iter()
                .any(|c| *c == SurfaceCommand::SetSendEnabled { enabled: true })
        );
    }

    #[tokio::test]
    async fn test_typing_indicator_shown_then_hidden() {
        let (controller, fx) = controller_with(
            vec![text("Hi"), Ok(StreamChunk::Done)],
            ControllerConfig::default(),
        );

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(UiEvent::Submit { text: "q".into() }).unwrap();
        drop(tx);
        controller.run(rx).await;

        let commands = fx.surface.commands();
        let shown = commands.iter().position(|c| {
            *c == SurfaceCommand::SetTyping {
                id: NodeId(2),
                visible: true,
            }
        });
        let hidden = commands.iter().position(|c| {
            *c == SurfaceCommand::SetTyping {
                id: NodeId(2),
                visible: false,
            }
        });
        assert!(shown.is_some() && hidden.is_some());
        assert!(shown < hidden);
    }

    #[tokio::test]
    async fn test_scroll_far_from_bottom_suppresses_autoscroll() {
        let (controller, fx) = controller_with(
            vec![text("x"), Ok(StreamChunk::Done)],
            ControllerConfig::default(),
        );

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(UiEvent::Scroll {
            metrics: ScrollMetrics {
                scroll_top: 0.0,
                client_height: 400.0,
                scroll_height: 2000.0,
            },
        })
        .unwrap();
        tx.send(UiEvent::Submit { text: "q".into() }).unwrap();
        drop(tx);
        controller.run(rx).await;

        let commands = fx.surface.commands();
        assert!(!commands.iter().any(|c| *c == SurfaceCommand::ScrollToBottom));
        // Jump control was made visible by the scroll report.
        assert!(
            commands
                .iter()
                .any(|c| *c == SurfaceCommand::SetJumpVisible { visible: true })
        );
    }

    #[tokio::test]
    async fn test_near_bottom_keeps_autoscrolling() {
        let (controller, fx) = controller_with(
            vec![text("x"), Ok(StreamChunk::Done)],
            ControllerConfig::default(),
        );

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(UiEvent::Submit { text: "q".into() }).unwrap();
        drop(tx);
        controller.run(rx).await;

        assert!(
            fx.surface
                .commands()
                .iter()
                .any(|c| *c == SurfaceCommand::ScrollToBottom)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_control_copies_code_and_reverts_label() {
        let (controller, fx) = controller_with(
            vec![text("```const x = 1```"), Ok(StreamChunk::Done)],
            ControllerConfig::default(),
        );

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(UiEvent::Submit { text: "q".into() }).unwrap();
        // The assistant bubble is the second appended node.
        tx.send(UiEvent::CopyClicked {
            id: NodeId(2),
            block: 0,
        })
        .unwrap();
        drop(tx);
        controller.run(rx).await;

        assert_eq!(fx.clipboard.copied.lock().as_slice(), ["const x = 1"]);
        assert!(fx.surface.commands().iter().any(|c| matches!(
            c,
            SurfaceCommand::SetCopyLabel { label, .. } if label == "Copied!"
        )));

        // After the acknowledgement window the label reverts.
        tokio::time::sleep(Duration::from_millis(1600)).await;
        tokio::task::yield_now().await;
        let labels: Vec<String> = fx
            .surface
            .commands()
            .into_iter()
            .filter_map(|c| match c {
                SurfaceCommand::SetCopyLabel { label, .. } => Some(label),
                _ => None,
            })
            .collect();
        assert_eq!(labels, ["Copied!", "Copy"]);
    }

    #[tokio::test]
    async fn test_model_picker_scenario() {
        let surface = Arc::new(RecordingSurface::default());
        let repo = Arc::new(InMemorySelectedModelRepository::new());
        let source = StubSource(vec!["a".to_string(), "b".to_string()]);

        let mut controller = ChatController::new(
            surface.clone(),
            Arc::new(ScriptedChat::with_chunks(vec![])),
            Arc::new(RecordingClipboard::default()),
            repo.clone(),
            ControllerConfig::default(),
        );

        // No persisted selection: defaults to the first entry.
        controller.init_models(&source).await;
        assert_eq!(controller.models(), ["a", "b"]);
        assert_eq!(controller.selected_model(), Some("a"));

        // User selects "b": persisted immediately.
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(UiEvent::ModelSelected { model: "b".into() }).unwrap();
        drop(tx);
        controller.run(rx).await;
        assert_eq!(repo.load().await.unwrap(), Some("b".to_string()));

        // "Reload": a fresh controller over the same store preselects "b".
        let mut reloaded = ChatController::new(
            surface.clone(),
            Arc::new(ScriptedChat::with_chunks(vec![])),
            Arc::new(RecordingClipboard::default()),
            repo,
            ControllerConfig::default(),
        );
        reloaded.init_models(&source).await;
        assert_eq!(reloaded.selected_model(), Some("b"));
        assert!(surface.commands().iter().any(|c| matches!(
            c,
            SurfaceCommand::SetModelOptions { selected: Some(s), .. } if s == "b"
        )));
    }

    #[tokio::test]
    async fn test_model_list_failure_degrades_picker() {
        let surface = Arc::new(RecordingSurface::default());
        let mut controller = ChatController::new(
            surface.clone(),
            Arc::new(ScriptedChat::with_chunks(vec![])),
            Arc::new(RecordingClipboard::default()),
            Arc::new(InMemorySelectedModelRepository::new()),
            ControllerConfig::default(),
        );

        controller.init_models(&FailingSource).await;
        assert_eq!(controller.selected_model(), None);
        assert!(surface.commands().iter().any(|c| matches!(
            c,
            SurfaceCommand::SetModelError { message } if message == "Error loading models"
        )));
    }

    #[tokio::test]
    async fn test_selected_model_rides_in_chat_options() {
        let chat = Arc::new(ScriptedChat::with_chunks(vec![
            text("ok"),
            Ok(StreamChunk::Done),
        ]));
        let mut controller = ChatController::new(
            Arc::new(RecordingSurface::default()),
            chat.clone(),
            Arc::new(RecordingClipboard::default()),
            Arc::new(InMemorySelectedModelRepository::new()),
            ControllerConfig::default(),
        );
        controller
            .init_models(&StubSource(vec!["m-1".to_string()]))
            .await;

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(UiEvent::Submit { text: "q".into() }).unwrap();
        drop(tx);
        controller.run(rx).await;

        assert_eq!(chat.options.lock()[0].model, "m-1");
    }
}
