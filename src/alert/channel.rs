//! Alert channel seam.

use async_trait::async_trait;

/// Best-effort secondary channel for alerts and update mirrors.
///
/// Implementations never return errors; delivery failures are logged and
/// reported as `false`.
#[async_trait]
pub trait AlertChannel: Send + Sync {
    /// Send an operator alert.
    async fn notify(&self, text: &str) -> bool;

    /// Mirror a published update. Channels that only carry alerts ignore it.
    async fn announce(&self, _text: &str) -> bool {
        false
    }
}

/// Channel used when no webhook is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledAlerts;

#[async_trait]
impl AlertChannel for DisabledAlerts {
    async fn notify(&self, text: &str) -> bool {
        tracing::debug!("Alerts disabled, dropping: {}", text);
        false
    }
}
