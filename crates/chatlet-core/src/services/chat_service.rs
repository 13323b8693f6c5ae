use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde_json::json;
use tracing::debug;

/// Stream chunks emitted during responses
#[derive(Debug, Clone)]
pub enum StreamChunk {
    Text(String),
    Done,
}

/// Type alias for response streams
pub type ResponseStream = BoxStream<'static, Result<StreamChunk>>;

/// Request configuration carried alongside the prompt payload.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub model: String,
    pub stream: bool,
}

/// The streaming chat capability. The prompt is a single rendered string —
/// either the full role-labeled transcript or the bare latest message,
/// depending on the controller's transcript mode.
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn stream_chat(&self, prompt: &str, options: &ChatOptions) -> Result<ResponseStream>;
}

/// `ChatService` over an OpenAI-compatible `/chat/completions` SSE endpoint.
pub struct HttpChatService {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpChatService {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    fn build_body(&self, prompt: &str, options: &ChatOptions) -> serde_json::Value {
        json!({
            "model": options.model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": options.stream,
        })
    }
}

/// One parsed server-sent frame.
#[derive(Debug, PartialEq)]
enum SseFrame {
    Text(String),
    Done,
}

/// Parse one line of an SSE body. Non-`data:` lines and keep-alives yield
/// nothing; a malformed JSON payload is an error that terminates the stream.
fn parse_sse_line(line: &str) -> Result<Option<SseFrame>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(None);
    };
    let data = data.trim_start();
    if data == "[DONE]" {
        return Ok(Some(SseFrame::Done));
    }

    let value: serde_json::Value =
        serde_json::from_str(data).context("malformed stream chunk")?;
    if let Some(text) = value["choices"][0]["delta"]["content"].as_str()
        && !text.is_empty()
    {
        return Ok(Some(SseFrame::Text(text.to_string())));
    }
    Ok(None)
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn stream_chat(&self, prompt: &str, options: &ChatOptions) -> Result<ResponseStream> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!(url = %url, model = %options.model, "starting chat stream");

        let mut request = self.client.post(&url).json(&self.build_body(prompt, options));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.context("chat request failed")?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("chat request failed with status {status}"));
        }

        let mut bytes = response.bytes_stream();
        let stream = async_stream::stream! {
            let mut pending = String::new();
            let mut done = false;
            while let Some(item) = bytes.next().await {
                let chunk = match item {
                    Ok(chunk) => chunk,
                    Err(err) => {
                        yield Err(anyhow!(err).context("stream read error"));
                        return;
                    }
                };
                pending.push_str(&String::from_utf8_lossy(&chunk));

                // Process every complete line buffered so far.
                while let Some(pos) = pending.find('\n') {
                    let line: String = pending.drain(..=pos).collect();
                    match parse_sse_line(&line) {
                        Ok(Some(SseFrame::Text(text))) => yield Ok(StreamChunk::Text(text)),
                        Ok(Some(SseFrame::Done)) => {
                            done = true;
                            break;
                        }
                        Ok(None) => {}
                        Err(err) => {
                            yield Err(err);
                            return;
                        }
                    }
                }
                if done {
                    break;
                }
            }
            // A transport may end without newline-terminating its last frame.
            if !done && !pending.is_empty() {
                match parse_sse_line(&pending) {
                    Ok(Some(SseFrame::Text(text))) => yield Ok(StreamChunk::Text(text)),
                    Ok(_) => {}
                    Err(err) => {
                        yield Err(err);
                        return;
                    }
                }
            }
            yield Ok(StreamChunk::Done);
        };

        Ok(Box::pin(stream))
    }
}
