//! Gemini REST backend using `streamGenerateContent` with server-sent events.

use super::{GenerationRequest, GenerationService, RewriteError, TextStream};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini HTTP client. Built once at startup and shared by every rewrite.
#[derive(Clone)]
pub struct GeminiService {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiService {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    fn stream_url(&self, model: &str) -> String {
        format!(
            "{}/{model}:streamGenerateContent?alt=sse",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl GenerationService for GeminiService {
    async fn stream_generate(&self, request: GenerationRequest) -> Result<TextStream, RewriteError> {
        if self.api_key.trim().is_empty() {
            return Err(RewriteError::Config(
                "no API key configured; set GEMINI_API_KEY".to_string(),
            ));
        }

        let body = GenerateContentRequest::from(&request);
        let response = self
            .client
            .post(self.stream_url(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read Gemini error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        let bytes = Box::pin(response.bytes_stream());
        let fragments = futures_util::stream::unfold(
            Some((bytes, SseDecoder::default())),
            |state| async move {
                let (mut bytes, mut decoder) = state?;
                match bytes.next().await {
                    Some(Ok(chunk)) => Some((decoder.feed(&chunk), Some((bytes, decoder)))),
                    Some(Err(err)) => {
                        Some((vec![Err(RewriteError::Http(err))], Some((bytes, decoder))))
                    }
                    None => Some((decoder.finish(), None)),
                }
            },
        )
        .flat_map(futures_util::stream::iter);

        Ok(Box::pin(fragments))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

impl From<&GenerationRequest> for GenerateContentRequest {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: request.message.clone(),
                }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: request.system_instruction.clone(),
                }],
            },
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        }
    }
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

impl ErrorBody {
    fn describe(self, fallback: &str) -> String {
        let message = self.message.unwrap_or_else(|| fallback.to_string());
        match self.status {
            Some(status) if !status.is_empty() => format!("{status}: {message}"),
            _ => message,
        }
    }
}

/// Splits an SSE byte stream into `data:` payloads. Network chunks may end
/// mid-line, so incomplete lines stay buffered until the next feed.
#[derive(Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    fn feed(&mut self, bytes: &[u8]) -> Vec<Result<String, RewriteError>> {
        self.buffer.extend_from_slice(bytes);
        let mut out = Vec::new();

        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            out.extend(decode_line(&line));
        }

        out
    }

    /// Decodes whatever is left once the byte stream ends. The last event
    /// is not always followed by a newline.
    fn finish(&mut self) -> Vec<Result<String, RewriteError>> {
        let rest = std::mem::take(&mut self.buffer);
        decode_line(&rest).into_iter().collect()
    }
}

fn decode_line(line: &[u8]) -> Option<Result<String, RewriteError>> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches(['\r', '\n']);

    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    Some(parse_payload(data))
}

fn parse_payload(data: &str) -> Result<String, RewriteError> {
    let payload: GenerateContentResponse = serde_json::from_str(data)?;
    if let Some(error) = payload.error {
        return Err(RewriteError::Stream(error.describe("")));
    }

    Ok(payload
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default())
}

fn map_http_error(status: StatusCode, body: &str) -> RewriteError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| wrapper.error.describe(body))
        .unwrap_or_else(|_| body.trim().to_string());

    let message = if message.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        message
    };

    RewriteError::Api {
        status: status.as_u16(),
        message,
    }
}
