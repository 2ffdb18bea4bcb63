use async_trait::async_trait;

use crate::models::{DispatchMode, DispatchResult, NotificationPayload};

/// Sends patient and clinic notices for an appointment.
///
/// Implementations must not fail: every delivery problem is reported inside
/// the returned [`DispatchResult`].
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(&self, payload: &NotificationPayload, mode: DispatchMode) -> DispatchResult;
}
