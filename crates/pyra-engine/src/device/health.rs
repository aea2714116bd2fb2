use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use super::error::SessionError;

/// First device loss recorded for a session.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DeviceLoss {
    pub reason: String,
    pub message: String,
}

impl DeviceLoss {
    pub fn to_error(&self) -> SessionError {
        SessionError::DeviceLost {
            reason: self.reason.clone(),
            message: self.message.clone(),
        }
    }
}

/// Device-side signals raised from backend callbacks.
///
/// wgpu may invoke the callbacks from any thread, so the state is atomic. Only the first loss
/// is kept; later reports for the same device are ignored.
#[derive(Debug, Default)]
pub struct DeviceHealth {
    lost: OnceLock<DeviceLoss>,
    uncaptured_errors: AtomicU64,
}

impl DeviceHealth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a device loss. Returns `false` if a loss was already recorded.
    pub fn mark_lost(&self, reason: impl Into<String>, message: impl Into<String>) -> bool {
        self.lost
            .set(DeviceLoss {
                reason: reason.into(),
                message: message.into(),
            })
            .is_ok()
    }

    pub fn lost(&self) -> Option<&DeviceLoss> {
        self.lost.get()
    }

    pub fn is_lost(&self) -> bool {
        self.lost.get().is_some()
    }

    pub(crate) fn record_uncaptured(&self) -> u64 {
        self.uncaptured_errors.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Number of backend errors reported outside any error scope.
    pub fn uncaptured_errors(&self) -> u64 {
        self.uncaptured_errors.load(Ordering::Relaxed)
    }
}
