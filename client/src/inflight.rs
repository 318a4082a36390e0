//! One-at-a-time submission guard

use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::error::{ClientError, ClientResult};

/// Allows a single outstanding mutating request per form
#[derive(Debug, Clone, Default)]
pub struct SubmitGuard {
    current: Arc<Mutex<Option<Uuid>>>,
}

impl SubmitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Uuid>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Take the in-flight token, or fail immediately if one is outstanding
    pub fn try_acquire(&self) -> ClientResult<InFlightToken> {
        let mut slot = self.slot();
        if slot.is_some() {
            tracing::warn!("Submission refused: another is in flight");
            return Err(ClientError::SubmissionInFlight);
        }
        let id = Uuid::new_v4();
        *slot = Some(id);
        Ok(InFlightToken {
            id,
            guard: self.clone(),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.slot().is_some()
    }
}

/// Held for the duration of a submission; released on drop
#[derive(Debug)]
pub struct InFlightToken {
    id: Uuid,
    guard: SubmitGuard,
}

impl InFlightToken {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for InFlightToken {
    fn drop(&mut self) {
        let mut slot = self.guard.slot();
        if *slot == Some(self.id) {
            *slot = None;
        }
    }
}
