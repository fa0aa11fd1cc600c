use crate::catalog::OptimizationConfig;
use crate::event::AppEvent;
use crate::history::store::HistoryStore;
use crate::history::{History, HistoryItem};
use crate::rewrite::RewriteClient;
use std::time::{Duration, Instant};

pub const COPIED_FEEDBACK: Duration = Duration::from_secs(2);

/// What a running rewrite was started with. Captured at submit time so
/// selector changes while streaming do not leak into the history entry.
#[derive(Debug, Clone)]
struct PendingRewrite {
    request_id: u64,
    original: String,
    config: OptimizationConfig,
}

/// Session state and user actions, independent of the egui view.
pub struct Controller {
    rewriter: RewriteClient,
    store: HistoryStore,
    input: String,
    output: String,
    config: OptimizationConfig,
    pending: Option<PendingRewrite>,
    next_request_id: u64,
    copied_until: Option<Instant>,
    confirm_clear_open: bool,
}

impl Controller {
    pub fn new(rewriter: RewriteClient, store: HistoryStore) -> Self {
        Self {
            rewriter,
            store,
            input: String::new(),
            output: String::new(),
            config: OptimizationConfig::default(),
            pending: None,
            next_request_id: 1,
            copied_until: None,
            confirm_clear_open: false,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn input_char_count(&self) -> usize {
        self.input.chars().count()
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn config(&self) -> &OptimizationConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut OptimizationConfig {
        &mut self.config
    }

    pub fn history(&self) -> &History {
        self.store.history()
    }

    pub fn is_streaming(&self) -> bool {
        self.pending.is_some()
    }

    pub fn can_submit(&self) -> bool {
        !self.is_streaming() && !self.input.trim().is_empty()
    }

    /// Starts a rewrite of the current input. Returns `false` without
    /// touching any state when the input is blank or a rewrite is running.
    pub fn submit(&mut self) -> bool {
        if !self.can_submit() {
            return false;
        }

        let pending = PendingRewrite {
            request_id: self.next_request_id,
            original: self.input.clone(),
            config: self.config.clone(),
        };
        self.next_request_id += 1;
        self.output.clear();

        self.rewriter
            .stream_rewrite(pending.request_id, &pending.original, &pending.config);
        self.pending = Some(pending);
        true
    }

    pub fn apply_event(&mut self, event: AppEvent) {
        let is_current = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.request_id == event.request_id());
        if !is_current {
            log::debug!("dropping event for stale rewrite #{}", event.request_id());
            return;
        }

        match event {
            AppEvent::RewriteChunk { text, .. } => {
                self.output.push_str(&text);
            }
            AppEvent::RewriteCompleted { full_text, .. } => {
                if let Some(pending) = self.pending.take() {
                    self.store
                        .append(HistoryItem::new(pending.original, full_text, pending.config));
                }
            }
            AppEvent::RewriteFailed { message, .. } => {
                self.pending = None;
                self.output = format!("错误: {message}。请重试。");
            }
        }
    }

    /// Returns the text to put on the clipboard and starts the "copied"
    /// indicator. Repeated copies extend the indicator.
    pub fn copy_output(&mut self, now: Instant) -> Option<String> {
        if self.output.is_empty() {
            return None;
        }
        let until = now + COPIED_FEEDBACK;
        self.copied_until = Some(self.copied_until.map_or(until, |prev| prev.max(until)));
        Some(self.output.clone())
    }

    pub fn is_copied(&self, now: Instant) -> bool {
        self.copied_until.is_some_and(|until| now < until)
    }

    pub fn copied_remaining(&self, now: Instant) -> Option<Duration> {
        self.copied_until
            .and_then(|until| until.checked_duration_since(now))
            .filter(|remaining| !remaining.is_zero())
    }

    /// Restores input, output and selectors from a history entry.
    pub fn load_from_history(&mut self, id: &str) -> bool {
        let Some(item) = self.store.history().get(id) else {
            return false;
        };
        self.input = item.original.clone();
        self.output = item.optimized.clone();
        self.config = item.config.clone();
        true
    }

    pub fn request_clear_history(&mut self) {
        self.confirm_clear_open = true;
    }

    pub fn is_clear_history_pending(&self) -> bool {
        self.confirm_clear_open
    }

    /// Answers the confirmation opened by [`Self::request_clear_history`].
    pub fn resolve_clear_history(&mut self, confirmed: bool) {
        if !std::mem::take(&mut self.confirm_clear_open) {
            return;
        }
        if confirmed {
            self.store.clear();
            log::info!("history cleared");
        }
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }
}
