use std::time::Duration;

use async_trait::async_trait;

use crate::route::{AudioRoute, OutputOverride};
use crate::session::{AudioCategory, AudioMode, CategoryOptions};

/// Errors reported by the OS audio session API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Deactivation was requested but the session is not active. Callers
    /// that only want the session to be inactive treat this as success.
    #[error("audio session is not active")]
    NotActive,
    /// Another client holds the hardware or I/O is still running.
    #[error("audio session is busy")]
    Busy,
    /// No device is available for the requested direction.
    #[error("no {0} device available")]
    NoDevice(&'static str),
    /// The OS rejected the request.
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// The OS-level audio session shared by every audio client of the app.
///
/// Implementations wrap the platform API. Activation is asynchronous because
/// it may block briefly on the hardware.
#[async_trait]
pub trait AudioSessionBackend: Send + Sync {
    /// Activates or deactivates the session. With `notify_others`, other
    /// audio clients on the device are told to yield (on activation) or that
    /// they may resume (on deactivation).
    async fn set_active(&self, active: bool, notify_others: bool) -> Result<(), BackendError>;

    /// Applies category, mode and options in one call.
    fn set_category(
        &self,
        category: AudioCategory,
        mode: AudioMode,
        options: CategoryOptions,
    ) -> Result<(), BackendError>;

    fn set_mode(&self, mode: AudioMode) -> Result<(), BackendError>;

    fn set_preferred_sample_rate(&self, sample_rate: f64) -> Result<(), BackendError>;

    fn set_preferred_io_buffer_duration(&self, duration: Duration) -> Result<(), BackendError>;

    fn override_output_port(&self, port: OutputOverride) -> Result<(), BackendError>;

    /// Ports currently used for input and output.
    fn current_route(&self) -> AudioRoute;

    /// Sample rate the hardware actually runs at.
    fn sample_rate(&self) -> f64;

    /// I/O buffer duration the hardware actually uses.
    fn io_buffer_duration(&self) -> Duration;
}
