use crate::catalog::OptimizationConfig;
use serde::{Deserialize, Serialize};

pub mod store;

pub const HISTORY_LIMIT: usize = 50;

/// One completed rewrite, as shown in the history panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub original: String,
    pub optimized: String,
    /// Unix time in milliseconds.
    pub timestamp: i64,
    pub config: OptimizationConfig,
}

impl HistoryItem {
    pub fn new(original: String, optimized: String, config: OptimizationConfig) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            original,
            optimized,
            timestamp: chrono::Utc::now().timestamp_millis(),
            config,
        }
    }
}

/// Newest-first list of rewrites, never longer than [`HISTORY_LIMIT`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    items: Vec<HistoryItem>,
}

impl History {
    pub fn from_items(mut items: Vec<HistoryItem>) -> Self {
        items.truncate(HISTORY_LIMIT);
        Self { items }
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub(crate) fn push_front(&mut self, item: HistoryItem) {
        self.items.insert(0, item);
        self.items.truncate(HISTORY_LIMIT);
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}
