use posecoach_audio::AudioError;

use crate::subsystems::{SubsystemError, SubsystemKind};

/// Recoverable failures of the exercise session flow.
///
/// The display string is what the coordinator publishes as `last_error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Camera or microphone is not authorized.
    #[error("Missing required permissions")]
    PermissionDenied,
    /// The shared audio session could not be configured.
    #[error("Audio setup failed")]
    AudioConfiguration(#[source] AudioError),
    /// The audio route for a spoken message could not be applied.
    #[error("Audio route change failed")]
    AudioRoute(#[source] AudioError),
    /// The operation needs an active exercise session.
    #[error("No active exercise session")]
    NotActive,
    #[error("Failed to start the {kind} subsystem: {source}")]
    SubsystemStart {
        kind: SubsystemKind,
        #[source]
        source: SubsystemError,
    },
}
