use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// Shared write-once flag observed cooperatively by the orchestrator and
/// every in-flight job. Setting it stops new work at the next checkpoint;
/// it never interrupts a collaborator call already in flight.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

const STATE_IDLE: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_COMPLETED: u8 = 2;
const STATE_CANCELLED: u8 = 3;

/// Caller-owned handle for one batch. Replaces process-global "running"
/// state: the dashboard layer keeps the handle and triggers `cancel` on
/// user request.
#[derive(Debug, Clone)]
pub struct BatchHandle {
    token: CancelToken,
    state: Arc<AtomicU8>,
}

impl Default for BatchHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchHandle {
    pub fn new() -> Self {
        Self {
            token: CancelToken::new(),
            state: Arc::new(AtomicU8::new(STATE_IDLE)),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn state(&self) -> BatchState {
        match self.state.load(Ordering::SeqCst) {
            STATE_RUNNING => BatchState::Running,
            STATE_COMPLETED => BatchState::Completed,
            STATE_CANCELLED => BatchState::Cancelled,
            _ => BatchState::Idle,
        }
    }

    /// Set by the batch runner at start and completion.
    pub fn set_state(&self, state: BatchState) {
        let raw = match state {
            BatchState::Idle => STATE_IDLE,
            BatchState::Running => STATE_RUNNING,
            BatchState::Completed => STATE_COMPLETED,
            BatchState::Cancelled => STATE_CANCELLED,
        };
        self.state.store(raw, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_write_once_to_true() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn handle_state_transitions() {
        let handle = BatchHandle::new();
        assert_eq!(handle.state(), BatchState::Idle);
        handle.set_state(BatchState::Running);
        assert_eq!(handle.state(), BatchState::Running);
        handle.cancel();
        assert!(handle.is_cancelled());
        handle.set_state(BatchState::Cancelled);
        assert_eq!(handle.state(), BatchState::Cancelled);
    }

    #[test]
    fn clones_share_the_flag() {
        let handle = BatchHandle::new();
        let token = handle.token();
        handle.cancel();
        assert!(token.is_cancelled());
    }
}
