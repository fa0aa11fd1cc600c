/// Messages from background rewrite tasks to the UI thread. Every variant
/// carries the id of the submission it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    RewriteChunk { request_id: u64, text: String },
    RewriteCompleted { request_id: u64, full_text: String },
    RewriteFailed { request_id: u64, message: String },
}

impl AppEvent {
    pub fn request_id(&self) -> u64 {
        match self {
            Self::RewriteChunk { request_id, .. }
            | Self::RewriteCompleted { request_id, .. }
            | Self::RewriteFailed { request_id, .. } => *request_id,
        }
    }
}
