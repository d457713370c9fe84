use serde::{Deserialize, Serialize};

/// A part crossed its completion threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub part: String,
    /// Tracker tick on which the part completed
    pub tick: u64,
    /// Completed through `force_complete` rather than treatment
    pub forced: bool,
}

/// Pending completion events plus the session's completion order
#[derive(Debug, Clone, Default)]
pub struct CompletionEvents {
    pending: Vec<CompletionEvent>,
    history: Vec<CompletionEvent>,
}

impl CompletionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: CompletionEvent) {
        self.history.push(event.clone());
        self.pending.push(event);
    }

    /// Take every event not yet delivered
    pub fn drain(&mut self) -> Vec<CompletionEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// All completions of the session, oldest first
    pub fn history(&self) -> &[CompletionEvent] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.history.clear();
    }
}
