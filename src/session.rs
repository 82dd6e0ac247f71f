//! Conversion-session state, driven by discrete events.
//!
//! One conversion moves through idle -> loading -> ready/failed. A new
//! input selection resets whatever came before; there is no cancellation
//! of an in-flight read, the next selection simply supersedes it.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading { filename: String },
    Ready { filename: String, rows: usize },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    FileSelected { filename: String },
    ReadSucceeded { rows: usize },
    ReadFailed { message: String },
}

impl SessionState {
    pub fn new() -> Self {
        SessionState::Idle
    }

    /// Applies one event. Transitions are total: an event that does not
    /// apply in the current state leaves the state unchanged.
    pub fn apply(self, event: SessionEvent) -> SessionState {
        match (self, event) {
            // Selecting a file resets any prior outcome.
            (_, SessionEvent::FileSelected { filename }) => SessionState::Loading { filename },
            (SessionState::Loading { filename }, SessionEvent::ReadSucceeded { rows }) => {
                SessionState::Ready { filename, rows }
            }
            (SessionState::Loading { .. }, SessionEvent::ReadFailed { message }) => {
                SessionState::Failed { message }
            }
            (state, _) => state,
        }
    }

    pub fn status_label(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Loading { .. } => "loading",
            SessionState::Ready { .. } => "ready",
            SessionState::Failed { .. } => "error",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading { .. })
    }

    /// Whether there is content worth emitting. Zero extracted rows keep
    /// the download affordance disabled.
    pub fn has_content(&self) -> bool {
        matches!(self, SessionState::Ready { rows, .. } if *rows > 0)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
