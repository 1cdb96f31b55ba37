//! HTTP LLM provider for OpenAI-compatible chat-completions APIs.
//!
//! Talks directly to `{api_base}/chat/completions` with bearer auth. Gemini's
//! OpenAI-compatible endpoint, OpenAI itself, and local gateways all work.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, error};

use parley_core::types::{
    ChatCompletionRequest, ChatCompletionResponse, LlmResponse, Message, ToolDefinition,
};

use crate::error::ProviderError;
use crate::sse::{apply_payload, SseLineBuffer, ToolCallAccumulator, DONE_SENTINEL};
use crate::traits::{ChunkStream, LlmProvider, LlmRequestConfig, StreamChunk};

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// A provider that talks to any OpenAI-compatible HTTP API.
pub struct HttpProvider {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://generativelanguage.googleapis.com/v1beta/openai"`).
    api_base: String,
    /// API key for Bearer authentication.
    api_key: String,
    /// Default model for this provider instance.
    default_model: String,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("api_base", &self.api_base)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl HttpProvider {
    /// Create a new provider.
    ///
    /// # Arguments
    /// * `api_base`: Base URL; `/chat/completions` is appended.
    /// * `api_key` : Bearer token.
    /// * `model`   : Default model identifier.
    /// * `timeout` : Whole-request timeout.
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;

        Ok(HttpProvider {
            client,
            api_base: api_base.into(),
            api_key: api_key.into(),
            default_model: model.into(),
        })
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }

    fn build_request(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
        stream: bool,
    ) -> ChatCompletionRequest {
        // An empty tool list is sent as no tools at all; some backends reject `[]`.
        let tools = tools.filter(|t| !t.is_empty());
        ChatCompletionRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            tools: tools.map(|t| t.to_vec()),
            tool_choice: tools.map(|_| "auto".to_string()),
            max_tokens: Some(config.max_tokens),
            temperature: Some(config.temperature),
            stream,
        }
    }

    /// POST the request and turn non-success statuses into errors.
    async fn send(&self, body: &ChatCompletionRequest) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                ProviderError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(status = %status, body = %body, "API error");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl LlmProvider for HttpProvider {
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError> {
        debug!(
            model = %model,
            messages = messages.len(),
            tools = tools.map_or(0, |t| t.len()),
            "Calling LLM"
        );

        let body = self.build_request(messages, tools, model, config, false);
        let response = self.send(&body).await?;

        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, "Failed to parse LLM response");
            ProviderError::Decode(e.to_string())
        })?;
        let llm_resp = parsed
            .into_llm_response()
            .ok_or(ProviderError::EmptyResponse)?;

        debug!(
            has_content = llm_resp.content.is_some(),
            tool_calls = llm_resp.tool_calls.len(),
            finish_reason = llm_resp.finish_reason.as_deref().unwrap_or("?"),
            "LLM response received"
        );
        Ok(llm_resp)
    }

    async fn chat_stream(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<ChunkStream, ProviderError> {
        debug!(
            model = %model,
            messages = messages.len(),
            tools = tools.map_or(0, |t| t.len()),
            "Calling LLM (streaming)"
        );

        let body = self.build_request(messages, tools, model, config, true);
        let response = self.send(&body).await?;
        let mut bytes = response.bytes_stream();

        let stream = async_stream::try_stream! {
            let mut lines = SseLineBuffer::default();
            let mut calls = ToolCallAccumulator::default();
            let mut finish_reason: Option<String> = None;
            let mut done = false;

            while let Some(chunk) = bytes.next().await {
                let chunk = chunk.map_err(|e| ProviderError::Stream(e.to_string()))?;
                for data in lines.push(&chunk)? {
                    if data == DONE_SENTINEL {
                        done = true;
                        break;
                    }
                    let update = apply_payload(&data, &mut calls)?;
                    for text in update.text {
                        yield StreamChunk::TextDelta(text);
                    }
                    if update.finish_reason.is_some() {
                        finish_reason = update.finish_reason;
                    }
                }
                if done {
                    break;
                }
            }

            if !done {
                if let Some(data) = lines.finish()?.filter(|d| d != DONE_SENTINEL) {
                    let update = apply_payload(&data, &mut calls)?;
                    for text in update.text {
                        yield StreamChunk::TextDelta(text);
                    }
                    if update.finish_reason.is_some() {
                        finish_reason = update.finish_reason;
                    }
                }
            }

            if !done && finish_reason.is_none() {
                Err::<(), _>(ProviderError::Stream("stream ended without completion".into()))?;
            }

            if !calls.is_empty() {
                let assembled = calls.finish();
                debug!(tool_calls = assembled.len(), "streamed tool calls assembled");
                yield StreamChunk::ToolCalls(assembled);
            }

            yield StreamChunk::Done { finish_reason };
        };

        Ok(stream.boxed())
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn display_name(&self) -> &str {
        "OpenAI-compatible"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base: &str) -> HttpProvider {
        HttpProvider::new(base, "test-key-123", "gemini-2.0-flash", Duration::from_secs(5)).unwrap()
    }

    fn sse_body(events: &[serde_json::Value]) -> String {
        let mut body = String::new();
        for event in events {
            body.push_str(&format!("data: {}\n\n", event));
        }
        body.push_str("data: [DONE]\n\n");
        body
    }

    // ── Unit tests ──

    #[test]
    fn test_completions_url_trailing_slash() {
        let p = provider("https://example.test/v1beta/openai/");
        assert_eq!(
            p.completions_url(),
            "https://example.test/v1beta/openai/chat/completions"
        );
    }

    #[test]
    fn test_completions_url_no_trailing_slash() {
        let p = provider("https://example.test/v1");
        assert_eq!(p.completions_url(), "https://example.test/v1/chat/completions");
    }

    #[test]
    fn test_empty_tool_list_is_omitted() {
        let p = provider("http://localhost");
        let req = p.build_request(
            &[Message::user("hi")],
            Some(&[]),
            "m",
            &LlmRequestConfig::default(),
            false,
        );
        assert!(req.tools.is_none());
        assert!(req.tool_choice.is_none());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let p = provider("http://localhost");
        assert!(!format!("{p:?}").contains("test-key-123"));
    }

    // ── Blocking mode ──

    #[tokio::test]
    async fn test_chat_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-test",
                "choices": [{
                    "message": { "content": "Hello! How can I help?", "tool_calls": null },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
            })))
            .mount(&mock_server)
            .await;

        let p = provider(&mock_server.uri());
        let resp = p
            .chat(&[Message::user("Hello")], None, "gemini-2.0-flash", &LlmRequestConfig::default())
            .await
            .unwrap();

        assert_eq!(resp.content.as_deref(), Some("Hello! How can I help?"));
        assert!(!resp.has_tool_calls());
        assert_eq!(resp.usage.as_ref().unwrap().total_tokens, 15);
    }

    #[tokio::test]
    async fn test_chat_with_tool_calls_sends_tools() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "gemini-2.0-flash",
                "tool_choice": "auto",
                "tools": [{"type": "function", "function": {"name": "student_info_tool"}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-tools",
                "choices": [{
                    "message": {
                        "content": null,
                        "tool_calls": [{
                            "id": "call_abc123",
                            "type": "function",
                            "function": {
                                "name": "student_info_tool",
                                "arguments": "{\"student_id\": 3}"
                            }
                        }]
                    },
                    "finish_reason": "tool_calls"
                }],
                "usage": null
            })))
            .mount(&mock_server)
            .await;

        let tool_def = ToolDefinition::new(
            "student_info_tool",
            "Get information about a student by their ID.",
            serde_json::json!({"type": "object", "properties": {"student_id": {"type": "integer"}}}),
        );

        let p = provider(&mock_server.uri());
        let resp = p
            .chat(
                &[Message::user("Who is student 3?")],
                Some(&[tool_def]),
                "gemini-2.0-flash",
                &LlmRequestConfig::default(),
            )
            .await
            .unwrap();

        assert!(resp.content.is_none());
        assert_eq!(resp.tool_calls.len(), 1);
        assert_eq!(resp.tool_calls[0].id, "call_abc123");
    }

    #[tokio::test]
    async fn test_chat_api_error_is_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit exceeded"))
            .mount(&mock_server)
            .await;

        let p = provider(&mock_server.uri());
        let err = p
            .chat(&[Message::user("Hello")], None, "m", &LlmRequestConfig::default())
            .await
            .unwrap_err();

        match err {
            ProviderError::Status { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("Rate limit"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chat_network_error() {
        // Point to a port that's not listening
        let p = provider("http://127.0.0.1:1");
        let err = p
            .chat(&[Message::user("Hello")], None, "m", &LlmRequestConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }

    #[tokio::test]
    async fn test_chat_malformed_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let p = provider(&mock_server.uri());
        let err = p
            .chat(&[Message::user("Hello")], None, "m", &LlmRequestConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[tokio::test]
    async fn test_chat_empty_choices() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "x", "choices": []})),
            )
            .mount(&mock_server)
            .await;

        let p = provider(&mock_server.uri());
        let err = p
            .chat(&[Message::user("Hello")], None, "m", &LlmRequestConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse));
    }

    // ── Streaming mode ──

    #[tokio::test]
    async fn test_chat_stream_text_deltas_in_order() {
        let mock_server = MockServer::start().await;

        let body = sse_body(&[
            serde_json::json!({"choices": [{"delta": {"role": "assistant", "content": "Hel"}, "finish_reason": null}]}),
            serde_json::json!({"choices": [{"delta": {"content": "lo"}, "finish_reason": null}]}),
            serde_json::json!({"choices": [{"delta": {"content": " there"}, "finish_reason": "stop"}]}),
        ]);

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({"stream": true})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .mount(&mock_server)
            .await;

        let p = provider(&mock_server.uri());
        let chunks: Vec<StreamChunk> = p
            .chat_stream(&[Message::user("Hi")], None, "m", &LlmRequestConfig::default())
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(
            chunks,
            vec![
                StreamChunk::TextDelta("Hel".into()),
                StreamChunk::TextDelta("lo".into()),
                StreamChunk::TextDelta(" there".into()),
                StreamChunk::Done {
                    finish_reason: Some("stop".into())
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_chat_stream_assembles_tool_calls() {
        let mock_server = MockServer::start().await;

        let body = sse_body(&[
            serde_json::json!({"choices": [{"delta": {"tool_calls": [{
                "index": 0, "id": "call_w", "type": "function",
                "function": {"name": "current_weather_tool", "arguments": "{\"location\":"}
            }]}, "finish_reason": null}]}),
            serde_json::json!({"choices": [{"delta": {"tool_calls": [{
                "index": 0, "function": {"arguments": " \"Lahore\"}"}
            }]}, "finish_reason": "tool_calls"}]}),
        ]);

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        let p = provider(&mock_server.uri());
        let chunks: Vec<StreamChunk> = p
            .chat_stream(&[Message::user("weather?")], None, "m", &LlmRequestConfig::default())
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(chunks.len(), 2);
        match &chunks[0] {
            StreamChunk::ToolCalls(calls) => {
                assert_eq!(calls[0].id, "call_w");
                assert_eq!(calls[0].function.name, "current_weather_tool");
                assert_eq!(calls[0].function.arguments, r#"{"location": "Lahore"}"#);
            }
            other => panic!("expected tool calls, got {other:?}"),
        }
        assert_eq!(
            chunks[1],
            StreamChunk::Done {
                finish_reason: Some("tool_calls".into())
            }
        );
    }

    #[tokio::test]
    async fn test_chat_stream_status_error_before_stream() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let p = provider(&mock_server.uri());
        let result = p
            .chat_stream(&[Message::user("Hi")], None, "m", &LlmRequestConfig::default())
            .await;
        assert!(matches!(result, Err(ProviderError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_chat_stream_bad_payload_errors_mid_stream() {
        let mock_server = MockServer::start().await;
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\ndata: {broken\n\n";
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        let p = provider(&mock_server.uri());
        let mut stream = p
            .chat_stream(&[Message::user("Hi")], None, "m", &LlmRequestConfig::default())
            .await
            .unwrap();

        assert_eq!(
            stream.next().await.unwrap().unwrap(),
            StreamChunk::TextDelta("ok".into())
        );
        assert!(matches!(
            stream.next().await.unwrap(),
            Err(ProviderError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_chat_stream_truncated_without_completion_errors() {
        let mock_server = MockServer::start().await;
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"par\"}}]}\n\n";
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        let p = provider(&mock_server.uri());
        let mut stream = p
            .chat_stream(&[Message::user("Hi")], None, "m", &LlmRequestConfig::default())
            .await
            .unwrap();

        assert_eq!(
            stream.next().await.unwrap().unwrap(),
            StreamChunk::TextDelta("par".into())
        );
        assert!(matches!(
            stream.next().await.unwrap(),
            Err(ProviderError::Stream(_))
        ));
    }

    #[tokio::test]
    async fn test_chat_stream_finish_reason_without_done_completes() {
        let mock_server = MockServer::start().await;
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"},\"finish_reason\":\"stop\"}]}\n\n";
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        let p = provider(&mock_server.uri());
        let chunks: Vec<StreamChunk> = p
            .chat_stream(&[Message::user("Hi")], None, "m", &LlmRequestConfig::default())
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(
            chunks,
            vec![
                StreamChunk::TextDelta("ok".into()),
                StreamChunk::Done {
                    finish_reason: Some("stop".into())
                },
            ]
        );
    }
}
