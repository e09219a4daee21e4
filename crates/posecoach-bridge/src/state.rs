//! Observable session state shared with the UI.

use std::fmt;

/// Phase of the exercise session state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Idle,
    /// Waiting on the OS for camera and microphone authorization.
    CheckingPermissions,
    /// Applying the shared audio session configuration.
    ConfiguringAudio,
    Active,
    /// Subsystems and the audio session are being released.
    CleaningUp,
}

impl SessionPhase {
    /// Whether a start sequence is currently in flight.
    pub fn is_starting(self) -> bool {
        matches!(self, Self::CheckingPermissions | Self::ConfiguringAudio)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::CheckingPermissions => "checking permissions",
            Self::ConfiguringAudio => "configuring audio",
            Self::Active => "active",
            Self::CleaningUp => "cleaning up",
        };
        f.write_str(name)
    }
}

/// Aggregate readiness published by the session coordinator.
///
/// There is exactly one writer (the coordinator); the UI only observes it.
/// `is_session_active` and `is_cleaning_up` are never both true: both are
/// derived from [`ResourceState::phase`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceState {
    /// Subsystem references have been registered with the coordinator.
    pub is_initialized: bool,
    pub is_cleaning_up: bool,
    pub is_session_active: bool,
    /// Human-readable reason of the last failed start, cleared on the next
    /// start attempt.
    pub last_error: Option<String>,
    /// Current state machine phase. Lets the UI surface "still working"
    /// while the OS has not answered yet.
    pub phase: SessionPhase,
}

impl ResourceState {
    /// Builds the published state for the given phase.
    pub fn new(phase: SessionPhase, is_initialized: bool, last_error: Option<String>) -> Self {
        Self {
            is_initialized,
            is_cleaning_up: phase == SessionPhase::CleaningUp,
            is_session_active: phase == SessionPhase::Active,
            last_error,
            phase,
        }
    }
}
