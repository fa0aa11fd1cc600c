//! Streams a prompt rewrite from a text-generation service and relays the
//! result to the UI thread as [`AppEvent`]s.

use crate::catalog::OptimizationConfig;
use crate::event::AppEvent;
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::{mpsc, Arc};
use tokio::runtime::Handle;

pub mod gemini;
pub mod prompt;

pub use gemini::GeminiService;

pub const GENERIC_FAILURE_MESSAGE: &str = "未知错误发生，请重试";

#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Stream(String),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Incremental text fragments, in arrival order.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, RewriteError>> + Send>>;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub system_instruction: String,
    pub temperature: f32,
    pub message: String,
}

impl GenerationRequest {
    pub fn for_rewrite(raw_input: &str, config: &OptimizationConfig) -> Self {
        Self {
            model: prompt::REWRITE_MODEL.to_string(),
            system_instruction: prompt::SYSTEM_INSTRUCTION.to_string(),
            temperature: prompt::REWRITE_TEMPERATURE,
            message: prompt::rewrite_message(raw_input, config),
        }
    }
}

/// A remote model that can stream a reply to a single user message.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn stream_generate(&self, request: GenerationRequest) -> Result<TextStream, RewriteError>;
}

#[derive(Clone)]
pub struct RewriteClient {
    service: Arc<dyn GenerationService>,
    runtime_handle: Handle,
    tx: mpsc::Sender<AppEvent>,
}

impl RewriteClient {
    pub fn new(
        service: Arc<dyn GenerationService>,
        runtime_handle: Handle,
        tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        Self {
            service,
            runtime_handle,
            tx,
        }
    }

    /// Starts a rewrite and returns immediately. Emits one `RewriteChunk`
    /// per non-empty fragment, then exactly one of `RewriteCompleted` or
    /// `RewriteFailed`. Blank input must be rejected by the caller.
    pub fn stream_rewrite(&self, request_id: u64, raw_input: &str, config: &OptimizationConfig) {
        let request = GenerationRequest::for_rewrite(raw_input, config);
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();

        self.runtime_handle.spawn(async move {
            log::info!(
                "rewrite #{request_id} started (model {}, {} chars)",
                request.model,
                request.message.chars().count()
            );
            let event = match relay_fragments(service.as_ref(), request, request_id, &tx).await {
                Ok(full_text) => {
                    log::info!(
                        "rewrite #{request_id} completed ({} chars)",
                        full_text.chars().count()
                    );
                    AppEvent::RewriteCompleted {
                        request_id,
                        full_text,
                    }
                }
                Err(err) => {
                    log::warn!("rewrite #{request_id} failed: {err}");
                    AppEvent::RewriteFailed {
                        request_id,
                        message: failure_message(&err),
                    }
                }
            };
            // The receiver is gone once the window closes; nothing to do then.
            let _ = tx.send(event);
        });
    }
}

async fn relay_fragments(
    service: &dyn GenerationService,
    request: GenerationRequest,
    request_id: u64,
    tx: &mpsc::Sender<AppEvent>,
) -> Result<String, RewriteError> {
    let mut fragments = service.stream_generate(request).await?;
    let mut full_text = String::new();

    while let Some(fragment) = fragments.next().await {
        let text = fragment?;
        if text.is_empty() {
            continue;
        }
        full_text.push_str(&text);
        if tx.send(AppEvent::RewriteChunk { request_id, text }).is_err() {
            log::debug!("rewrite #{request_id} abandoned; receiver closed");
            break;
        }
    }

    Ok(full_text)
}

fn failure_message(err: &RewriteError) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        GENERIC_FAILURE_MESSAGE.to_string()
    } else {
        message
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{GenerationRequest, GenerationService, RewriteError, TextStream};
    use async_trait::async_trait;
    use std::sync::Mutex;

    pub enum Step {
        Text(&'static str),
        Fail(&'static str),
    }

    /// Replays a fixed script of fragments and records every request.
    pub struct ScriptedService {
        steps: Mutex<Vec<Vec<Step>>>,
        setup_error: Option<&'static str>,
        pub requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedService {
        pub fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: Mutex::new(vec![steps]),
                setup_error: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn failing_setup(message: &'static str) -> Self {
            Self {
                steps: Mutex::new(Vec::new()),
                setup_error: Some(message),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().expect("requests lock").len()
        }
    }

    #[async_trait]
    impl GenerationService for ScriptedService {
        async fn stream_generate(
            &self,
            request: GenerationRequest,
        ) -> Result<TextStream, RewriteError> {
            self.requests.lock().expect("requests lock").push(request);
            if let Some(message) = self.setup_error {
                return Err(RewriteError::Stream(message.to_string()));
            }

            let steps = self.steps.lock().expect("steps lock").pop().unwrap_or_default();
            let items: Vec<Result<String, RewriteError>> = steps
                .into_iter()
                .map(|step| match step {
                    Step::Text(text) => Ok(text.to_string()),
                    Step::Fail(message) => Err(RewriteError::Stream(message.to_string())),
                })
                .collect();
            Ok(Box::pin(futures_util::stream::iter(items)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{ScriptedService, Step};
    use super::{
        relay_fragments, GenerationRequest, GenerationService, RewriteClient, RewriteError,
        TextStream, GENERIC_FAILURE_MESSAGE,
    };
    use crate::catalog::{OptimizationConfig, TargetModel};
    use crate::event::AppEvent;
    use async_trait::async_trait;
    use futures_util::StreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};
    use std::time::Duration;

    /// Endless stream of fragments that counts how many were pulled.
    struct CountingService {
        pulled: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl GenerationService for CountingService {
        async fn stream_generate(
            &self,
            _request: GenerationRequest,
        ) -> Result<TextStream, RewriteError> {
            let pulled = Arc::clone(&self.pulled);
            let fragments = futures_util::stream::repeat("one".to_string()).map(move |text| {
                pulled.fetch_add(1, Ordering::SeqCst);
                Ok(text)
            });
            Ok(Box::pin(fragments))
        }
    }

    fn run(service: Arc<ScriptedService>) -> Vec<AppEvent> {
        let runtime = tokio::runtime::Runtime::new().expect("runtime should start");
        let (tx, rx) = mpsc::channel();
        let client = RewriteClient::new(service, runtime.handle().clone(), tx);
        let config = OptimizationConfig {
            target_model: TargetModel::Claude,
            ..OptimizationConfig::default()
        };

        client.stream_rewrite(7, "make it better", &config);

        let mut events = Vec::new();
        loop {
            let event = rx
                .recv_timeout(Duration::from_secs(5))
                .expect("rewrite should finish");
            let terminal = !matches!(event, AppEvent::RewriteChunk { .. });
            events.push(event);
            if terminal {
                break;
            }
        }
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        events
    }

    #[test]
    fn chunks_are_relayed_in_order_then_completed_once() {
        let service = Arc::new(ScriptedService::new(vec![
            Step::Text("# Task"),
            Step::Text(""),
            Step::Text("\nWrite"),
            Step::Text(" code"),
        ]));
        let events = run(Arc::clone(&service));

        assert_eq!(
            events,
            vec![
                AppEvent::RewriteChunk { request_id: 7, text: "# Task".into() },
                AppEvent::RewriteChunk { request_id: 7, text: "\nWrite".into() },
                AppEvent::RewriteChunk { request_id: 7, text: " code".into() },
                AppEvent::RewriteCompleted { request_id: 7, full_text: "# Task\nWrite code".into() },
            ]
        );

        let requests = service.requests.lock().expect("requests lock");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "gemini-2.5-flash");
        assert!((requests[0].temperature - 0.7).abs() < f32::EPSILON);
        assert!(requests[0].message.contains("Claude 3.5 Sonnet/Opus"));
        assert!(requests[0].message.contains("\"\"\"\nmake it better\n\"\"\""));
    }

    #[test]
    fn closed_receiver_stops_pulling_fragments() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let service = CountingService {
            pulled: Arc::clone(&pulled),
        };
        let (tx, rx) = mpsc::channel();
        drop(rx);

        let runtime = tokio::runtime::Runtime::new().expect("runtime should start");
        let request = GenerationRequest::for_rewrite("draft", &OptimizationConfig::default());
        let result = runtime.block_on(relay_fragments(&service, request, 3, &tx));

        assert_eq!(result.expect("relay should not fail"), "one");
        assert_eq!(pulled.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn mid_stream_error_replaces_completion() {
        let service = Arc::new(ScriptedService::new(vec![
            Step::Text("partial"),
            Step::Fail("quota exceeded"),
            Step::Text("never seen"),
        ]));
        let events = run(service);

        assert_eq!(
            events,
            vec![
                AppEvent::RewriteChunk { request_id: 7, text: "partial".into() },
                AppEvent::RewriteFailed { request_id: 7, message: "quota exceeded".into() },
            ]
        );
    }

    #[test]
    fn setup_error_fails_before_any_chunk() {
        let events = run(Arc::new(ScriptedService::failing_setup("bad key")));
        assert_eq!(
            events,
            vec![AppEvent::RewriteFailed { request_id: 7, message: "bad key".into() }]
        );
    }

    #[test]
    fn empty_error_message_falls_back_to_generic_text() {
        let events = run(Arc::new(ScriptedService::failing_setup("")));
        assert_eq!(
            events,
            vec![AppEvent::RewriteFailed {
                request_id: 7,
                message: GENERIC_FAILURE_MESSAGE.into()
            }]
        );
    }
}
